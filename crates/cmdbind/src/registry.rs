//! Top-level entry point: a root group plus the environment it binds with.

use crate::command::{Cmd, Command, Handler};
use crate::env::Environment;
use crate::error::{ConfigurationError, Error};
use crate::group::CommandGroup;
use crate::value::Value;
use cmdbind_metadata::{CommandDecl, CommandTable, GroupDecl};

#[derive(Debug, Clone)]
pub struct Main {
    root: CommandGroup,
    env: Environment,
}

impl Main {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            root: CommandGroup::new(name),
            env: Environment::default(),
        }
    }

    pub fn with_environment(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    /// Register every command and group in `table`.
    ///
    /// Stops at the first configuration error; nothing is registered
    /// partially from a failed table.
    pub fn from_table<F>(
        name: impl Into<String>,
        table: &CommandTable,
        handler_for: F,
    ) -> Result<Self, ConfigurationError>
    where
        F: Fn(&CommandDecl) -> Handler,
    {
        let root = GroupDecl {
            name: name.into(),
            description: String::new(),
            commands: table.commands.clone(),
            groups: table.groups.clone(),
        };
        let root = CommandGroup::from_decl(&root, &handler_for)?;
        tracing::debug!(
            root = %root.name(),
            entries = root.names().count(),
            "command table loaded"
        );
        Ok(Self {
            root,
            env: Environment::default(),
        })
    }

    pub fn register(&mut self, decl: &CommandDecl, handler: Handler) -> Result<(), ConfigurationError> {
        self.root.add_command(Command::new(decl, handler)?)
    }

    /// Register a nested group declaration, resolving handlers per command.
    pub fn group<F>(&mut self, decl: &GroupDecl, handler_for: F) -> Result<(), ConfigurationError>
    where
        F: Fn(&CommandDecl) -> Handler,
    {
        self.root.add_group(CommandGroup::from_decl(decl, &handler_for)?)
    }

    pub fn register_group(&mut self, group: CommandGroup) -> Result<(), ConfigurationError> {
        self.root.add_group(group)
    }

    pub fn root(&self) -> &CommandGroup {
        &self.root
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Dispatch `argv` (starting at the sub-command name) and run it.
    pub fn exec<S: AsRef<str>>(&self, argv: &[S]) -> Result<Value, Error> {
        let argv: Vec<String> = argv.iter().map(|s| s.as_ref().to_string()).collect();
        self.root.exec(&self.env, &argv)
    }
}
