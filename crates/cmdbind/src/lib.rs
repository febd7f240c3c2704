//! Declarative command-line binding.
//!
//! A command declares its parameters ([`cmdbind_metadata::CommandDecl`]).
//! At registration the declaration is compiled into a [`Spec`]; each
//! invocation then runs three stages against it:
//!
//! 1. [`Arguments::bind`] splits raw tokens into positionals and resolved
//!    options, filling in interpolated defaults.
//! 2. [`Binder`] converts the raw strings into typed [`Value`]s in
//!    declaration order, constructing aggregates and collections.
//! 3. The [`Validator`] checks the result before the handler runs.
//!
//! Commands sharing a name are overloads ([`Overloaded`]); groups route
//! by sub-command name ([`CommandGroup`]); [`Main`] is the root.

mod bind;
mod command;
mod convert;
mod env;
mod error;
mod group;
mod interpolate;
pub mod list_encoding;
mod registry;
mod spec;
mod tokenize;
mod validate;
mod value;

pub use bind::Binder;
pub use command::{Cmd, Command, Handler, Overloaded, handler};
pub use convert::{Converter, NamedParser, StandardConverter};
pub use env::Environment;
pub use error::{BindError, ConfigurationError, ConversionError, Error, flag_display};
pub use group::{CommandGroup, Entry};
pub use interpolate::{DefaultsContext, EnvContext, Layered, MapContext, interpolate};
pub use registry::Main;
pub use spec::{GroupedParam, OptionParam, ParamKind, Parameter, PositionalParam, Spec, ValueShape};
pub use tokenize::Arguments;
pub use validate::{Executable, NoValidation, Validator};
pub use value::Value;

pub use cmdbind_metadata as metadata;
