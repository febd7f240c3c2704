//! Error taxonomy.
//!
//! - [`ConfigurationError`]: raised while building a spec or registering a
//!   command. Fatal for that registration, never retried.
//! - [`BindError`]: raised per invocation while tokenizing, converting or
//!   validating. Aborts only that invocation.
//! - [`Error`]: command execution (dispatch, binding, the handler itself).

use thiserror::Error;

/// Render an option name the way a user would type it: `-x` for single
/// character names, `--name` otherwise.
pub fn flag_display(name: &str) -> String {
    if name.chars().count() == 1 {
        format!("-{name}")
    } else {
        format!("--{name}")
    }
}

fn flags(names: &[String]) -> String {
    names
        .iter()
        .map(|n| flag_display(n))
        .collect::<Vec<_>>()
        .join(", ")
}

fn plural(names: &[String]) -> &'static str {
    if names.len() == 1 { "" } else { "s" }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("duplicate option: {}", flag_display(.name))]
    DuplicateOption { name: String },

    #[error("duplicate alias: {}", flag_display(.name))]
    DuplicateAlias { name: String },

    #[error("parameter '{param}' is not an option and cannot declare a default")]
    DefaultOnPositional { param: String },

    #[error("option {} is not listable but declares {count} default values", flag_display(.name))]
    ListDefaultOnScalar { name: String, count: usize },

    #[error("parameter '{param}' declares an empty option name")]
    EmptyOptionName { param: String },

    #[error("aggregate type '{type_name}' declares no constructor")]
    NoConstructor { type_name: String },

    #[error("'{name}' is registered both as a command and as a group")]
    NameConflict { name: String },
}

/// Failure of the external string-to-value conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert '{raw}' to {target} for {description}: {reason}")]
pub struct ConversionError {
    pub raw: String,
    pub target: String,
    pub description: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("unknown option{}: {}", plural(.names), flags(.names))]
    UnknownOption { names: Vec<String> },

    #[error("invalid option: {token}")]
    InvalidOption { token: String },

    #[error("missing required option{}: {}", plural(.names), flags(.names))]
    MissingRequiredOption { names: Vec<String> },

    #[error("option{} specified more than once: {}", plural(.names), flags(.names))]
    RepeatedOption { names: Vec<String> },

    #[error("missing argument '{param}' of type {expected}")]
    MissingArgument { param: String, expected: String },

    #[error("excess argument{}: {}", plural(.values), .values.join(", "))]
    ExcessArgument { values: Vec<String> },

    #[error("unsupported container type '{container}' for parameter '{param}'")]
    UnsupportedContainer { param: String, container: String },

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("validation failed for {target}: {}", .messages.join("; "))]
    Validation {
        target: String,
        messages: Vec<String>,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error("missing sub-command for '{group}'")]
    MissingSubcommand { group: String },

    #[error("unknown sub-command '{name}' for '{group}'")]
    UnknownSubcommand { group: String, name: String },

    #[error(transparent)]
    Invocation(#[from] anyhow::Error),
}

impl Error {
    /// The binding error behind this failure, if any.
    pub fn as_bind(&self) -> Option<&BindError> {
        match self {
            Self::Bind(e) => Some(e),
            _ => None,
        }
    }
}
