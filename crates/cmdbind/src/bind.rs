//! Turn tokenized arguments into the ordered, typed argument list.

use crate::convert::Converter;
use crate::env::Environment;
use crate::error::{BindError, flag_display};
use crate::interpolate::DefaultsContext;
use crate::list_encoding;
use crate::spec::{GroupedParam, OptionParam, ParamKind, Parameter, PositionalParam, Spec, ValueShape};
use crate::tokenize::Arguments;
use crate::validate::{Executable, Validator};
use crate::value::Value;
use cmdbind_metadata::{ContainerKind, ValueType};

/// Walks a spec's parameters in order, pulling raw values from an
/// [`Arguments`] snapshot and converting them.
#[derive(Clone, Copy)]
pub struct Binder<'e> {
    converter: &'e dyn Converter,
    validator: &'e dyn Validator,
}

impl<'e> Binder<'e> {
    pub fn new(env: &'e Environment) -> Self {
        Self {
            converter: env.converter(),
            validator: env.validator(),
        }
    }

    pub fn with_parts(converter: &'e dyn Converter, validator: &'e dyn Validator) -> Self {
        Self {
            converter,
            validator,
        }
    }

    /// Tokenize and convert `argv` against `spec` in one step.
    pub fn bind<S: AsRef<str>>(
        &self,
        spec: &Spec,
        argv: &[S],
        defaults: &dyn DefaultsContext,
    ) -> Result<Vec<Value>, BindError> {
        let mut args = Arguments::bind(spec, argv, defaults)?;
        self.convert(&mut args)
    }

    /// Convert a snapshot into the argument list of its spec.
    ///
    /// Fails if any positional token or option entry is left unconsumed.
    pub fn convert(&self, args: &mut Arguments<'_>) -> Result<Vec<Value>, BindError> {
        let spec = args.spec();
        let values = self.convert_params(args, spec.params(), 0)?;

        if args.remaining_positionals() > 0 {
            return Err(BindError::ExcessArgument {
                values: args.drain_positionals(),
            });
        }
        if !args.options().is_empty() {
            return Err(BindError::UnknownOption {
                names: args.drain_options(),
            });
        }
        Ok(values)
    }

    /// Convert `params` in order. `after` is the number of scalar
    /// positionals bound later by enclosing specs.
    fn convert_params(
        &self,
        args: &mut Arguments<'_>,
        params: &[Parameter],
        after: usize,
    ) -> Result<Vec<Value>, BindError> {
        let mut values = Vec::with_capacity(params.len());
        for (i, param) in params.iter().enumerate() {
            let value = match param.kind() {
                ParamKind::Option(opt) => self.convert_option(args, param, opt)?,
                ParamKind::Grouped(group) => {
                    let downstream = after + reserved(args, &params[i + 1..]);
                    self.convert_grouped(args, group, downstream)?
                }
                ParamKind::Positional(pos) if pos.is_listable() => {
                    let downstream = after + reserved(args, &params[i + 1..]);
                    self.convert_glob(args, param, pos, downstream)?
                }
                ParamKind::Positional(pos) => self.convert_positional(args, param, pos)?,
            };
            values.push(value);
        }
        Ok(values)
    }

    fn convert_option(
        &self,
        args: &mut Arguments<'_>,
        param: &Parameter,
        opt: &OptionParam,
    ) -> Result<Value, BindError> {
        let raw = args.take_option(opt.name());
        let description = describe(param, Some(opt));

        match opt.shape() {
            ValueShape::Scalar(ty) => match raw {
                Some(raw) => Ok(self.converter.convert(&raw, ty, &description)?),
                None if ty.is_bool() => Ok(Value::Bool(false)),
                None => Ok(Value::Null),
            },
            ValueShape::Listable { container, element } => {
                let elements = match raw {
                    Some(raw) => list_encoding::split(&raw),
                    None => Vec::new(),
                };
                let elements = expand_enum_shortcut(element, elements);
                let value = self.collect(param, container, element, elements, &description)?;
                if opt.is_required() && value.items().is_some_and(<[Value]>::is_empty) {
                    return Err(BindError::MissingRequiredOption {
                        names: vec![opt.name().to_string()],
                    });
                }
                Ok(value)
            }
        }
    }

    fn convert_grouped(
        &self,
        args: &mut Arguments<'_>,
        group: &GroupedParam,
        after: usize,
    ) -> Result<Value, BindError> {
        let nested = group.spec();

        if is_unset(args, group) {
            // Defaults of an absent nullable group are consumed, not bound.
            for name in nested.options().keys() {
                args.take_option(name);
            }
            tracing::trace!(group = group.type_name(), "nullable group left unset");
            return Ok(Value::Null);
        }

        let values = self.convert_params(args, nested.params(), after)?;
        let target = Executable::Constructor(group.type_name());
        self.validator
            .validate(&target, &values)
            .map_err(|messages| BindError::Validation {
                target: target.to_string(),
                messages,
            })?;

        Ok(Value::Group {
            ty: group.type_name().to_string(),
            args: values,
        })
    }

    fn convert_positional(
        &self,
        args: &mut Arguments<'_>,
        param: &Parameter,
        pos: &PositionalParam,
    ) -> Result<Value, BindError> {
        let ty = pos.shape().element();
        let Some(raw) = args.take_positional() else {
            return Err(BindError::MissingArgument {
                param: param.name().to_string(),
                expected: ty.display_name().to_string(),
            });
        };
        Ok(self.converter.convert(&raw, ty, &describe(param, None))?)
    }

    fn convert_glob(
        &self,
        args: &mut Arguments<'_>,
        param: &Parameter,
        pos: &PositionalParam,
        downstream: usize,
    ) -> Result<Value, BindError> {
        let ValueShape::Listable { container, element } = pos.shape() else {
            return self.convert_positional(args, param, pos);
        };

        let take = args.remaining_positionals().saturating_sub(downstream);
        let mut elements = Vec::with_capacity(take);
        for _ in 0..take {
            if let Some(raw) = args.take_positional() {
                elements.push(raw);
            }
        }
        self.collect(param, container, element, elements, &describe(param, None))
    }

    fn collect(
        &self,
        param: &Parameter,
        container: &ContainerKind,
        element: &ValueType,
        elements: Vec<String>,
        description: &str,
    ) -> Result<Value, BindError> {
        if let ContainerKind::Abstract(name) = container {
            return Err(BindError::UnsupportedContainer {
                param: param.name().to_string(),
                container: name.clone(),
            });
        }

        let items = elements
            .iter()
            .map(|raw| self.converter.convert(raw, element, description))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(assemble(container.clone(), items))
    }
}

/// A nullable group none of whose options was supplied binds `Null`.
fn is_unset(args: &Arguments<'_>, group: &GroupedParam) -> bool {
    group.is_nullable() && !group.spec().options().keys().any(|n| args.is_supplied(n))
}

/// Scalar positionals that `params` will still bind, grouped ones included.
fn reserved(args: &Arguments<'_>, params: &[Parameter]) -> usize {
    params
        .iter()
        .map(|p| match p.kind() {
            ParamKind::Positional(pos) if !pos.is_listable() => 1,
            ParamKind::Grouped(group) if !is_unset(args, group) => {
                reserved(args, group.spec().params())
            }
            _ => 0,
        })
        .sum()
}

/// For enum elements, a lone `"true"` selects every constant in declared
/// order and a lone `"false"` selects none.
fn expand_enum_shortcut(element: &ValueType, elements: Vec<String>) -> Vec<String> {
    let ValueType::Enum(decl) = element else {
        return elements;
    };
    match elements.as_slice() {
        [only] if only.eq_ignore_ascii_case("true") => decl.constants.clone(),
        [only] if only.eq_ignore_ascii_case("false") => Vec::new(),
        _ => elements,
    }
}

fn assemble(kind: ContainerKind, items: Vec<Value>) -> Value {
    let items = match kind {
        ContainerKind::OrderedSet => {
            let mut unique: Vec<Value> = Vec::with_capacity(items.len());
            for item in items {
                if !unique.contains(&item) {
                    unique.push(item);
                }
            }
            unique
        }
        ContainerKind::SortedSet => {
            let mut sorted = items;
            sorted.sort_by(Value::natural_cmp);
            sorted.dedup();
            sorted
        }
        _ => items,
    };
    Value::Collection { kind, items }
}

fn describe(param: &Parameter, opt: Option<&OptionParam>) -> String {
    if !param.description().is_empty() {
        return param.description().to_string();
    }
    match opt {
        Some(opt) => flag_display(opt.name()),
        None => format!("<{}>", param.name()),
    }
}
