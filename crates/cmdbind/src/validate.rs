//! Validation hook run on bound arguments before invocation.

use crate::value::Value;
use std::fmt;

/// What is about to receive bound arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Executable<'a> {
    /// A command handler, by command name.
    Command(&'a str),
    /// The constructor of an aggregate, by type name.
    Constructor(&'a str),
}

impl fmt::Display for Executable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(name) => write!(f, "command '{name}'"),
            Self::Constructor(name) => write!(f, "constructor of '{name}'"),
        }
    }
}

/// Checks bound arguments after binding and before construction/invocation.
///
/// An `Err` carries one human-readable message per violated rule.
pub trait Validator: Send + Sync {
    fn validate(&self, target: &Executable<'_>, args: &[Value]) -> Result<(), Vec<String>>;
}

/// Accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValidation;

impl Validator for NoValidation {
    fn validate(&self, _target: &Executable<'_>, _args: &[Value]) -> Result<(), Vec<String>> {
        Ok(())
    }
}

impl<F> Validator for F
where
    F: Fn(&Executable<'_>, &[Value]) -> Result<(), Vec<String>> + Send + Sync,
{
    fn validate(&self, target: &Executable<'_>, args: &[Value]) -> Result<(), Vec<String>> {
        self(target, args)
    }
}
