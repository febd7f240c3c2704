//! String to typed value conversion.

use crate::error::ConversionError;
use crate::value::Value;
use cmdbind_metadata::ValueType;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Converts one raw token into a value of the declared type.
pub trait Converter: Send + Sync {
    fn convert(
        &self,
        raw: &str,
        ty: &ValueType,
        description: &str,
    ) -> Result<Value, ConversionError>;
}

/// Parser for a custom [`ValueType::Named`] type.
pub type NamedParser = Arc<dyn Fn(&str) -> Result<Value, String> + Send + Sync>;

/// Converter for every built-in type plus registered named types.
#[derive(Clone, Default)]
pub struct StandardConverter {
    parsers: HashMap<String, NamedParser>,
}

impl fmt::Debug for StandardConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.parsers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("StandardConverter")
            .field("parsers", &names)
            .finish()
    }
}

impl StandardConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parser for `ValueType::Named(name)`.
    pub fn with_parser<F>(mut self, name: impl Into<String>, parser: F) -> Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.parsers.insert(name.into(), Arc::new(parser));
        self
    }

    /// Register a named type whose values keep their raw text.
    pub fn with_text_type(self, name: impl Into<String>) -> Self {
        let name = name.into();
        let ty = name.clone();
        self.with_parser(name, move |raw| {
            Ok(Value::Custom {
                ty: ty.clone(),
                raw: raw.to_string(),
            })
        })
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl Converter for StandardConverter {
    fn convert(
        &self,
        raw: &str,
        ty: &ValueType,
        description: &str,
    ) -> Result<Value, ConversionError> {
        let fail = |reason: String| ConversionError {
            raw: raw.to_string(),
            target: ty.display_name().to_string(),
            description: description.to_string(),
            reason,
        };

        match ty {
            ValueType::String => Ok(Value::Str(raw.to_string())),
            ValueType::Path => Ok(Value::Path(PathBuf::from(raw))),
            ValueType::Bool => parse_bool(raw)
                .map(Value::Bool)
                .ok_or_else(|| fail("expected true or false".to_string())),
            ValueType::Int => raw
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| fail(e.to_string())),
            ValueType::UInt => raw
                .trim()
                .parse::<u64>()
                .map(Value::UInt)
                .map_err(|e| fail(e.to_string())),
            ValueType::Float => raw
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| fail(e.to_string())),
            ValueType::Char => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err(fail("expected exactly one character".to_string())),
                }
            }
            ValueType::Enum(decl) => decl
                .constants
                .iter()
                .position(|c| c.eq_ignore_ascii_case(raw.trim()))
                .map(|ordinal| Value::Enum {
                    ty: decl.name.clone(),
                    constant: decl.constants[ordinal].clone(),
                    ordinal,
                })
                .ok_or_else(|| {
                    fail(format!("possible values: {}", decl.constants.join(", ")))
                }),
            ValueType::Named(name) => match self.parsers.get(name) {
                Some(parser) => parser(raw).map_err(fail),
                None => Err(fail(format!("unsupported target type '{name}'"))),
            },
        }
    }
}
