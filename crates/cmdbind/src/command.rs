//! Runnable commands: one signature, or several overloaded signatures.

use crate::bind::Binder;
use crate::env::Environment;
use crate::error::{BindError, ConfigurationError, Error};
use crate::spec::Spec;
use crate::validate::Executable;
use crate::value::Value;
use cmdbind_metadata::CommandDecl;
use std::fmt;
use std::sync::Arc;

/// Procedure invoked with the bound argument list.
pub type Handler = Arc<dyn Fn(Vec<Value>) -> anyhow::Result<Value> + Send + Sync>;

/// Wrap a closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(Vec<Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Anything that can be executed with raw command-line tokens.
pub trait Cmd: Send + Sync {
    fn name(&self) -> &str;

    fn exec(&self, env: &Environment, argv: &[String]) -> Result<Value, Error>;
}

/// One command signature with its handler.
#[derive(Clone)]
pub struct Command {
    name: String,
    description: String,
    spec: Spec,
    handler: Handler,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

impl Command {
    /// Build the spec for `decl`. Configuration errors are fatal here.
    pub fn new(decl: &CommandDecl, handler: Handler) -> Result<Self, ConfigurationError> {
        let spec = Spec::build(&decl.params)?;
        Ok(Self {
            name: decl.name.clone(),
            description: decl.description.clone(),
            spec,
            handler,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    /// Tokenize and convert `argv`. No validation, no invocation.
    pub fn bind<S: AsRef<str>>(
        &self,
        env: &Environment,
        argv: &[S],
    ) -> Result<Vec<Value>, BindError> {
        Binder::new(env).bind(&self.spec, argv, env.defaults())
    }

    fn validate(&self, env: &Environment, values: &[Value]) -> Result<(), BindError> {
        let target = Executable::Command(&self.name);
        env.validator()
            .validate(&target, values)
            .map_err(|messages| BindError::Validation {
                target: target.to_string(),
                messages,
            })
    }

    fn invoke(&self, env: &Environment, values: Vec<Value>) -> Result<Value, Error> {
        self.validate(env, &values)?;
        tracing::debug!(command = %self.name, args = values.len(), "invoking command");
        Ok((self.handler)(values)?)
    }
}

impl Cmd for Command {
    fn name(&self) -> &str {
        &self.name
    }

    fn exec(&self, env: &Environment, argv: &[String]) -> Result<Value, Error> {
        let values = self.bind(env, argv)?;
        self.invoke(env, values)
    }
}

/// Several signatures sharing one command name.
///
/// Candidates are tried narrowest first (fewest positional parameters, ties
/// in registration order). The first that binds is invoked; when none does,
/// only the last candidate's error is reported.
#[derive(Debug, Clone)]
pub struct Overloaded {
    name: String,
    /// Narrowest candidate; `rest` stays sorted behind it.
    first: Command,
    rest: Vec<Command>,
}

impl Overloaded {
    pub fn new(first: Command) -> Self {
        Self {
            name: first.name.clone(),
            first,
            rest: Vec::new(),
        }
    }

    pub fn push(&mut self, cmd: Command) {
        let width = cmd.spec.positional_count();
        if width < self.first.spec.positional_count() {
            let previous = std::mem::replace(&mut self.first, cmd);
            self.rest.insert(0, previous);
        } else {
            let at = self
                .rest
                .partition_point(|c| c.spec.positional_count() <= width);
            self.rest.insert(at, cmd);
        }
    }

    /// Candidates in the order they are tried.
    pub fn candidates(&self) -> impl Iterator<Item = &Command> {
        std::iter::once(&self.first).chain(&self.rest)
    }

    /// Pick the first candidate that binds `argv`, with its bound values.
    pub fn select<S: AsRef<str>>(
        &self,
        env: &Environment,
        argv: &[S],
    ) -> Result<(&Command, Vec<Value>), BindError> {
        let mut last_error = match self.first.bind(env, argv) {
            Ok(values) => return Ok((&self.first, values)),
            Err(err) => err,
        };
        tracing::debug!(command = %self.name, attempt = 0, error = %last_error, "overload rejected");
        for (attempt, cmd) in self.rest.iter().enumerate().map(|(i, c)| (i + 1, c)) {
            match cmd.bind(env, argv) {
                Ok(values) => {
                    tracing::debug!(command = %self.name, attempt, "overload selected");
                    return Ok((cmd, values));
                }
                Err(err) => {
                    tracing::debug!(command = %self.name, attempt, error = %err, "overload rejected");
                    last_error = err;
                }
            }
        }
        Err(last_error)
    }
}

impl Cmd for Overloaded {
    fn name(&self) -> &str {
        &self.name
    }

    fn exec(&self, env: &Environment, argv: &[String]) -> Result<Value, Error> {
        let (cmd, values) = self.select(env, argv)?;
        cmd.invoke(env, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolate::MapContext;
    use cmdbind_metadata::{ParamDecl, ValueType};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn echo(tag: &'static str) -> Handler {
        handler(move |args| {
            Ok(Value::Group {
                ty: tag.to_string(),
                args,
            })
        })
    }

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    fn env() -> Environment {
        Environment::new().with_defaults(MapContext::new())
    }

    fn commit_overloads() -> Overloaded {
        let narrow = CommandDecl::new("commit")
            .param(ParamDecl::option("message", ValueType::String).alias("m"))
            .param(ParamDecl::positional("file", ValueType::Path));
        let wide = CommandDecl::new("commit")
            .param(ParamDecl::option("message", ValueType::String).alias("m"))
            .param(ParamDecl::positional("file", ValueType::Path))
            .param(ParamDecl::positional("other", ValueType::Path));

        // Registered widest first; selection still starts from the narrowest.
        let mut cmds = Overloaded::new(Command::new(&wide, echo("wide")).unwrap());
        cmds.push(Command::new(&narrow, echo("narrow")).unwrap());
        cmds
    }

    #[test]
    fn command_binds_and_invokes() {
        let decl = CommandDecl::new("add")
            .param(ParamDecl::option("all", ValueType::Bool).default_value("false"))
            .param(ParamDecl::positional("file", ValueType::Path));
        let cmd = Command::new(&decl, echo("add")).unwrap();
        let out = cmd.exec(&env(), &argv(&["--all", "repo"])).unwrap();
        assert_eq!(
            out.group_args().unwrap(),
            &[Value::Bool(true), Value::Path(PathBuf::from("repo"))]
        );
    }

    #[test]
    fn overload_picks_matching_shape() {
        let cmds = commit_overloads();

        let out = cmds.exec(&env(), &argv(&["-m=x", "a.txt"])).unwrap();
        assert_eq!(out, Value::Group {
            ty: "narrow".into(),
            args: vec![Value::Str("x".into()), Value::Path(PathBuf::from("a.txt"))],
        });

        let out = cmds.exec(&env(), &argv(&["-m=x", "a.txt", "b.txt"])).unwrap();
        let Value::Group { ty, args } = out else {
            panic!("expected group");
        };
        assert_eq!(ty, "wide");
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn overload_reports_last_error_only() {
        let cmds = commit_overloads();
        let err = cmds.select(&env(), &["a", "b", "c"]).unwrap_err();
        assert_eq!(
            err,
            BindError::ExcessArgument {
                values: vec!["c".into()]
            }
        );

        let err = cmds.select(&env(), &[] as &[&str]).unwrap_err();
        assert_eq!(
            err,
            BindError::MissingArgument {
                param: "file".into(),
                expected: "Path".into()
            }
        );
    }

    #[test]
    fn candidates_are_kept_narrowest_first() {
        let mut cmds = commit_overloads();
        let bare = CommandDecl::new("commit")
            .param(ParamDecl::option("message", ValueType::String).alias("m"));
        cmds.push(Command::new(&bare, echo("bare")).unwrap());
        let widths: Vec<usize> = cmds.candidates().map(|c| c.spec().positional_count()).collect();
        assert_eq!(widths, vec![0, 1, 2]);
    }

    #[test]
    fn single_candidate_reports_its_own_error() {
        let decl = CommandDecl::new("show").param(ParamDecl::positional("rev", ValueType::String));
        let cmds = Overloaded::new(Command::new(&decl, echo("show")).unwrap());
        let err = cmds.select(&env(), &[] as &[&str]).unwrap_err();
        assert_eq!(
            err,
            BindError::MissingArgument {
                param: "rev".into(),
                expected: "String".into()
            }
        );
    }

    #[test]
    fn command_validation_runs_before_handler() {
        fn reject(target: &Executable<'_>, _args: &[Value]) -> Result<(), Vec<String>> {
            match target {
                Executable::Command(name) => Err(vec![format!("{name} is disabled")]),
                Executable::Constructor(_) => Ok(()),
            }
        }
        let env = env().with_validator(reject);
        let cmd = Command::new(
            &CommandDecl::new("rm"),
            handler(|_| anyhow::bail!("handler must not run")),
        )
        .unwrap();
        let err = cmd.exec(&env, &[]).unwrap_err();
        assert_eq!(
            err.as_bind(),
            Some(&BindError::Validation {
                target: "command 'rm'".into(),
                messages: vec!["rm is disabled".into()],
            })
        );
    }

    #[test]
    fn handler_errors_are_invocation_errors() {
        let cmd = Command::new(
            &CommandDecl::new("fail"),
            handler(|_| anyhow::bail!("boom")),
        )
        .unwrap();
        let err = cmd.exec(&env(), &[]).unwrap_err();
        assert!(matches!(err, Error::Invocation(_)));
        assert_eq!(err.to_string(), "boom");
    }
}
