//! Normalized, immutable specification of a command signature.
//!
//! A [`Spec`] is built once from declared parameters and then shared
//! read-only by every invocation. It owns:
//! - the option table (primary name -> option, insertion-ordered)
//! - the alias table (alias -> primary name)
//! - the ordered positional list
//! - the full ordered parameter list (invocation order)
//!
//! Options of grouped parameters are registered in the enclosing spec as
//! well, so every name typed on the command line resolves against the
//! top-level spec.

use crate::error::ConfigurationError;
use crate::list_encoding;
use cmdbind_metadata::{
    ConstructorDecl, ContainerKind, DefaultDecl, GroupTypeDecl, OptionDecl, ParamDecl, TypeDecl,
    ValueType,
};
use indexmap::IndexMap;

/// Scalar or listable shape of an option or positional parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueShape {
    Scalar(ValueType),
    Listable {
        container: ContainerKind,
        element: ValueType,
    },
}

impl ValueShape {
    pub fn is_listable(&self) -> bool {
        matches!(self, Self::Listable { .. })
    }

    /// The type a single raw value converts to.
    pub fn element(&self) -> &ValueType {
        match self {
            Self::Scalar(ty) => ty,
            Self::Listable { element, .. } => element,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Self::Scalar(ty) => ty.display_name().to_string(),
            Self::Listable { container, element } => {
                format!("{}<{}>", container.display_name(), element.display_name())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct OptionParam {
    name: String,
    aliases: Vec<String>,
    default: Option<String>,
    required: bool,
    shape: ValueShape,
}

impl OptionParam {
    /// Primary name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Raw default; sentinel-encoded for listable options.
    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn shape(&self) -> &ValueShape {
        &self.shape
    }

    pub fn is_listable(&self) -> bool {
        self.shape.is_listable()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone)]
pub struct PositionalParam {
    shape: ValueShape,
}

impl PositionalParam {
    pub fn shape(&self) -> &ValueShape {
        &self.shape
    }

    pub fn is_listable(&self) -> bool {
        self.shape.is_listable()
    }
}

#[derive(Debug, Clone)]
pub struct GroupedParam {
    type_name: String,
    nullable: bool,
    constructor: ConstructorDecl,
    spec: Spec,
}

impl GroupedParam {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// The constructor chosen to build the aggregate.
    pub fn constructor(&self) -> &ConstructorDecl {
        &self.constructor
    }

    pub fn spec(&self) -> &Spec {
        &self.spec
    }
}

#[derive(Debug, Clone)]
pub enum ParamKind {
    Option(OptionParam),
    Positional(PositionalParam),
    Grouped(GroupedParam),
}

#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    index: usize,
    description: String,
    kind: ParamKind,
}

impl Parameter {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position in the declared parameter list.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> &ParamKind {
        &self.kind
    }
}

#[derive(Debug, Clone, Default)]
pub struct Spec {
    options: IndexMap<String, OptionParam>,
    aliases: IndexMap<String, String>,
    positionals: Vec<usize>,
    params: Vec<Parameter>,
}

impl Spec {
    /// Build a spec from a declared parameter list.
    pub fn build(params: &[ParamDecl]) -> Result<Self, ConfigurationError> {
        let spec = build_with_prefixes(params, &[])?;
        tracing::debug!(
            options = spec.options.len(),
            aliases = spec.aliases.len(),
            positionals = spec.positionals.len(),
            "built command spec"
        );
        Ok(spec)
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Every option by primary name, including nested grouped options.
    pub fn options(&self) -> &IndexMap<String, OptionParam> {
        &self.options
    }

    pub fn aliases(&self) -> &IndexMap<String, String> {
        &self.aliases
    }

    pub fn positionals(&self) -> impl Iterator<Item = &Parameter> {
        self.positionals.iter().map(|&i| &self.params[i])
    }

    /// Positional parameters at this level and inside grouped parameters.
    pub fn positional_count(&self) -> usize {
        self.positionals.len()
            + self
                .params
                .iter()
                .map(|p| match &p.kind {
                    ParamKind::Grouped(g) => g.spec.positional_count(),
                    _ => 0,
                })
                .sum::<usize>()
    }

    /// Resolve a primary name or alias to its option.
    pub fn resolve(&self, name: &str) -> Option<&OptionParam> {
        if let Some(opt) = self.options.get(name) {
            return Some(opt);
        }
        self.aliases
            .get(name)
            .and_then(|primary| self.options.get(primary))
    }

    pub fn knows(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// One entry per declared option: its raw default, if any.
    pub fn defaults(&self) -> IndexMap<String, Option<String>> {
        self.options
            .iter()
            .map(|(name, opt)| (name.clone(), opt.default.clone()))
            .collect()
    }

    fn register(&mut self, opt: &OptionParam) -> Result<(), ConfigurationError> {
        if self.options.contains_key(&opt.name) || self.aliases.contains_key(&opt.name) {
            return Err(ConfigurationError::DuplicateOption {
                name: opt.name.clone(),
            });
        }
        for (i, alias) in opt.aliases.iter().enumerate() {
            if alias == &opt.name
                || opt.aliases[..i].contains(alias)
                || self.options.contains_key(alias)
                || self.aliases.contains_key(alias)
            {
                return Err(ConfigurationError::DuplicateAlias {
                    name: alias.clone(),
                });
            }
        }

        self.options.insert(opt.name.clone(), opt.clone());
        for alias in &opt.aliases {
            self.aliases.insert(alias.clone(), opt.name.clone());
        }
        Ok(())
    }

    /// Register every option of a nested spec in this one.
    fn absorb(&mut self, nested: &Spec) -> Result<(), ConfigurationError> {
        for opt in nested.options.values() {
            self.register(opt)?;
        }
        Ok(())
    }
}

fn build_with_prefixes(
    params: &[ParamDecl],
    prefixes: &[String],
) -> Result<Spec, ConfigurationError> {
    let mut spec = Spec::default();

    for (index, decl) in params.iter().enumerate() {
        let kind = match (&decl.ty, &decl.option) {
            (TypeDecl::Aggregate(group), option) => {
                if decl.default.is_some() {
                    return Err(ConfigurationError::DefaultOnPositional {
                        param: decl.name.clone(),
                    });
                }
                let prefixes = match option {
                    Some(opt) => {
                        check_names(decl, opt)?;
                        combine_prefixes(prefixes, &opt.names)
                    }
                    None => prefixes.to_vec(),
                };
                let grouped = build_grouped(group, &prefixes)?;
                spec.absorb(&grouped.spec)?;
                ParamKind::Grouped(grouped)
            }
            (ty, Some(opt)) => {
                let option = build_option(decl, ty, opt, prefixes)?;
                spec.register(&option)?;
                ParamKind::Option(option)
            }
            (ty, None) => {
                if decl.default.is_some() {
                    return Err(ConfigurationError::DefaultOnPositional {
                        param: decl.name.clone(),
                    });
                }
                spec.positionals.push(spec.params.len());
                ParamKind::Positional(PositionalParam {
                    shape: shape_of(ty),
                })
            }
        };

        spec.params.push(Parameter {
            name: decl.name.clone(),
            index,
            description: decl.description.clone(),
            kind,
        });
    }

    Ok(spec)
}

fn build_grouped(
    group: &GroupTypeDecl,
    prefixes: &[String],
) -> Result<GroupedParam, ConfigurationError> {
    let constructor = group
        .constructors
        .iter()
        .find(|c| c.annotated)
        .or_else(|| group.constructors.first())
        .ok_or_else(|| ConfigurationError::NoConstructor {
            type_name: group.name.clone(),
        })?;

    let spec = build_with_prefixes(&constructor.params, prefixes)?;
    Ok(GroupedParam {
        type_name: group.name.clone(),
        nullable: group.nullable,
        constructor: constructor.clone(),
        spec,
    })
}

fn build_option(
    decl: &ParamDecl,
    ty: &TypeDecl,
    opt: &OptionDecl,
    prefixes: &[String],
) -> Result<OptionParam, ConfigurationError> {
    check_names(decl, opt)?;

    let prefixes: Vec<&str> = if prefixes.is_empty() {
        vec![""]
    } else {
        prefixes.iter().map(String::as_str).collect()
    };
    let mut all: Vec<String> = Vec::new();
    for prefix in &prefixes {
        for name in &opt.names {
            all.push(format!("{prefix}{}", name.trim()));
        }
    }
    let name = all.remove(0);

    let shape = shape_of(ty);
    let default = match (&decl.default, shape.is_listable()) {
        (None, _) => None,
        (Some(DefaultDecl::Value(v)), true) => Some(list_encoding::encode([v])),
        (Some(DefaultDecl::Values(vs)), true) => Some(list_encoding::encode(vs)),
        (Some(DefaultDecl::Value(v)), false) => Some(v.clone()),
        (Some(DefaultDecl::Values(vs)), false) => match vs.as_slice() {
            [single] => Some(single.clone()),
            _ => {
                return Err(ConfigurationError::ListDefaultOnScalar {
                    name,
                    count: vs.len(),
                });
            }
        },
    };

    Ok(OptionParam {
        name,
        aliases: all,
        default,
        required: opt.required,
        shape,
    })
}

fn check_names(decl: &ParamDecl, opt: &OptionDecl) -> Result<(), ConfigurationError> {
    if opt.names.is_empty() || opt.names.iter().any(|n| n.trim().is_empty()) {
        return Err(ConfigurationError::EmptyOptionName {
            param: decl.name.clone(),
        });
    }
    Ok(())
}

fn combine_prefixes(outer: &[String], inner: &[String]) -> Vec<String> {
    if outer.is_empty() {
        return inner.iter().map(|p| p.trim().to_string()).collect();
    }
    outer
        .iter()
        .flat_map(|o| inner.iter().map(move |i| format!("{o}{}", i.trim())))
        .collect()
}

fn shape_of(ty: &TypeDecl) -> ValueShape {
    match ty {
        TypeDecl::Scalar(v) => ValueShape::Scalar(v.clone()),
        TypeDecl::Listable { container, element } => ValueShape::Listable {
            container: container.clone(),
            element: element.clone(),
        },
        // Aggregates are always routed to `build_grouped`.
        TypeDecl::Aggregate(group) => ValueShape::Scalar(ValueType::Named(group.name.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdbind_metadata::EnumDecl;
    use pretty_assertions::assert_eq;

    fn address() -> GroupTypeDecl {
        GroupTypeDecl::new("Address").constructor(ConstructorDecl::annotated(vec![
            ParamDecl::option("street", ValueType::String),
            ParamDecl::option("city", ValueType::String).default_value("Springfield"),
        ]))
    }

    #[test]
    fn options_aliases_and_positionals_are_separated() {
        let spec = Spec::build(&[
            ParamDecl::option("message", ValueType::String)
                .alias("m")
                .required(),
            ParamDecl::positional("file", ValueType::Path),
            ParamDecl::option("all", ValueType::Bool).default_value("false"),
        ])
        .unwrap();

        assert_eq!(
            spec.options().keys().collect::<Vec<_>>(),
            vec!["message", "all"]
        );
        assert_eq!(spec.aliases().get("m").map(String::as_str), Some("message"));
        assert_eq!(
            spec.positionals().map(Parameter::name).collect::<Vec<_>>(),
            vec!["file"]
        );
        assert_eq!(spec.params().len(), 3);
        assert_eq!(spec.params()[1].index(), 1);
        assert_eq!(spec.resolve("m").unwrap().name(), "message");
        assert!(spec.resolve("message").unwrap().is_required());
    }

    #[test]
    fn duplicate_primary_fails() {
        let err = Spec::build(&[
            ParamDecl::option("verbose", ValueType::Bool),
            ParamDecl::option("verbose", ValueType::Bool),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DuplicateOption {
                name: "verbose".into()
            }
        );
    }

    #[test]
    fn duplicate_alias_fails() {
        let err = Spec::build(&[
            ParamDecl::option("verbose", ValueType::Bool).alias("v"),
            ParamDecl::option("version", ValueType::Bool).alias("v"),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigurationError::DuplicateAlias { name: "v".into() });
    }

    #[test]
    fn alias_colliding_with_primary_fails() {
        let err = Spec::build(&[
            ParamDecl::option("v", ValueType::Bool),
            ParamDecl::option("verbose", ValueType::Bool).alias("v"),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigurationError::DuplicateAlias { name: "v".into() });
    }

    #[test]
    fn default_on_positional_fails() {
        let err = Spec::build(&[ParamDecl::positional("file", ValueType::Path).default_value("x")])
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DefaultOnPositional {
                param: "file".into()
            }
        );
    }

    #[test]
    fn multi_value_default_on_scalar_fails() {
        let err = Spec::build(&[
            ParamDecl::option("mode", ValueType::String).default_values(["a", "b"])
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::ListDefaultOnScalar { count: 2, .. }
        ));
    }

    #[test]
    fn listable_defaults_are_encoded() {
        let spec = Spec::build(&[
            ParamDecl::option("tag", TypeDecl::list(ValueType::String)).default_values(["a", "b"]),
            ParamDecl::option("none", TypeDecl::list(ValueType::String))
                .default_values(Vec::<String>::new()),
            ParamDecl::option("undeclared", TypeDecl::list(ValueType::String)),
        ])
        .unwrap();

        let defaults = spec.defaults();
        let tag = defaults["tag"].as_deref().unwrap();
        assert_eq!(
            list_encoding::decode(tag),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(
            list_encoding::decode(defaults["none"].as_deref().unwrap()),
            Some(vec![])
        );
        assert_eq!(defaults["undeclared"], None);
    }

    #[test]
    fn grouped_options_are_registered_in_parent() {
        let spec = Spec::build(&[
            ParamDecl::grouped("home", address()),
            ParamDecl::option("name", ValueType::String),
        ])
        .unwrap();

        assert!(spec.knows("street"));
        assert_eq!(spec.resolve("city").unwrap().default(), Some("Springfield"));
        let ParamKind::Grouped(g) = spec.params()[0].kind() else {
            panic!("expected grouped");
        };
        assert_eq!(g.type_name(), "Address");
        assert_eq!(g.spec().options().len(), 2);
    }

    #[test]
    fn prefixes_make_primary_and_aliases() {
        let spec = Spec::build(&[ParamDecl::prefixed(
            "home",
            address(),
            ["home.", "h."],
        )])
        .unwrap();

        let street = spec.resolve("h.street").unwrap();
        assert_eq!(street.name(), "home.street");
        assert_eq!(street.aliases(), &["h.street".to_string()]);
        assert!(!spec.knows("street"));
    }

    #[test]
    fn nested_prefixes_combine() {
        let person = GroupTypeDecl::new("Person").constructor(ConstructorDecl::new(vec![
            ParamDecl::prefixed("addr", address(), ["addr."]),
        ]));
        let spec = Spec::build(&[ParamDecl::prefixed("owner", person, ["owner."])]).unwrap();
        assert!(spec.knows("owner.addr.street"));
    }

    #[test]
    fn same_group_twice_without_prefix_collides() {
        let err = Spec::build(&[
            ParamDecl::grouped("home", address()),
            ParamDecl::grouped("work", address()),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DuplicateOption {
                name: "street".into()
            }
        );
    }

    #[test]
    fn annotated_constructor_is_preferred() {
        let group = GroupTypeDecl::new("Pair")
            .constructor(ConstructorDecl::new(vec![ParamDecl::option(
                "raw",
                ValueType::String,
            )]))
            .constructor(ConstructorDecl::annotated(vec![
                ParamDecl::option("left", ValueType::Int),
                ParamDecl::option("right", ValueType::Int),
            ]));
        let spec = Spec::build(&[ParamDecl::grouped("pair", group)]).unwrap();
        assert!(spec.knows("left"));
        assert!(!spec.knows("raw"));
    }

    #[test]
    fn aggregate_without_constructor_fails() {
        let err = Spec::build(&[ParamDecl::grouped("x", GroupTypeDecl::new("Empty"))]).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::NoConstructor {
                type_name: "Empty".into()
            }
        );
    }

    #[test]
    fn positional_count_includes_grouped() {
        let with_pos = GroupTypeDecl::new("Target").constructor(ConstructorDecl::new(vec![
            ParamDecl::positional("dest", ValueType::Path),
        ]));
        let spec = Spec::build(&[
            ParamDecl::positional("src", ValueType::Path),
            ParamDecl::grouped("target", with_pos),
            ParamDecl::option(
                "color",
                ValueType::Enum(EnumDecl::new("Color", ["RED", "GREEN"])),
            ),
        ])
        .unwrap();
        assert_eq!(spec.positional_count(), 2);
    }
}
