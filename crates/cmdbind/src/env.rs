//! Collaborators shared by every bind of a command tree.

use crate::convert::{Converter, StandardConverter};
use crate::interpolate::{DefaultsContext, EnvContext};
use crate::validate::{NoValidation, Validator};
use std::fmt;
use std::sync::Arc;

/// The collaborators a binding run depends on.
///
/// Cheap to clone; shared read-only by every invocation.
#[derive(Clone)]
pub struct Environment {
    converter: Arc<dyn Converter>,
    validator: Arc<dyn Validator>,
    defaults: Arc<dyn DefaultsContext>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            converter: Arc::new(StandardConverter::default()),
            validator: Arc::new(NoValidation),
            defaults: Arc::new(EnvContext),
        }
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment").finish_non_exhaustive()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_converter(mut self, converter: impl Converter + 'static) -> Self {
        self.converter = Arc::new(converter);
        self
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn with_defaults(mut self, defaults: impl DefaultsContext + 'static) -> Self {
        self.defaults = Arc::new(defaults);
        self
    }

    pub fn converter(&self) -> &dyn Converter {
        self.converter.as_ref()
    }

    pub fn validator(&self) -> &dyn Validator {
        self.validator.as_ref()
    }

    pub fn defaults(&self) -> &dyn DefaultsContext {
        self.defaults.as_ref()
    }
}
