//! Sub-command routing.

use crate::command::{Cmd, Command, Handler, Overloaded};
use crate::env::Environment;
use crate::error::{ConfigurationError, Error};
use crate::value::Value;
use cmdbind_metadata::{CommandDecl, GroupDecl};
use indexmap::IndexMap;

/// A registered sub-command: a (possibly overloaded) command or a nested group.
#[derive(Debug, Clone)]
pub enum Entry {
    Command(Overloaded),
    Group(CommandGroup),
}

impl Cmd for Entry {
    fn name(&self) -> &str {
        match self {
            Self::Command(c) => c.name(),
            Self::Group(g) => g.name(),
        }
    }

    fn exec(&self, env: &Environment, argv: &[String]) -> Result<Value, Error> {
        match self {
            Self::Command(c) => c.exec(env, argv),
            Self::Group(g) => g.exec(env, argv),
        }
    }
}

/// Routes the first token to a named sub-command and forwards the rest.
#[derive(Debug, Clone, Default)]
pub struct CommandGroup {
    name: String,
    description: String,
    entries: IndexMap<String, Entry>,
}

impl CommandGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Build a group (and its nested groups) from a declaration.
    ///
    /// `handler_for` supplies the procedure for every declared command.
    pub fn from_decl<F>(decl: &GroupDecl, handler_for: &F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&CommandDecl) -> Handler,
    {
        let mut group = Self::new(&decl.name).describe(&decl.description);
        for cmd in &decl.commands {
            group.add_command(Command::new(cmd, handler_for(cmd))?)?;
        }
        for nested in &decl.groups {
            group.add_group(Self::from_decl(nested, handler_for)?)?;
        }
        Ok(group)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Register a command. A second signature under the same name becomes
    /// an overload of the first.
    pub fn add_command(&mut self, cmd: Command) -> Result<(), ConfigurationError> {
        match self.entries.get_mut(cmd.name()) {
            None => {
                self.entries
                    .insert(cmd.name().to_string(), Entry::Command(Overloaded::new(cmd)));
            }
            Some(Entry::Command(existing)) => existing.push(cmd),
            Some(Entry::Group(_)) => {
                return Err(ConfigurationError::NameConflict {
                    name: cmd.name().to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn add_group(&mut self, group: CommandGroup) -> Result<(), ConfigurationError> {
        if self.entries.contains_key(group.name()) {
            return Err(ConfigurationError::NameConflict {
                name: group.name().to_string(),
            });
        }
        self.entries
            .insert(group.name().to_string(), Entry::Group(group));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    /// Sub-command names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Cmd for CommandGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn exec(&self, env: &Environment, argv: &[String]) -> Result<Value, Error> {
        let Some((sub, rest)) = argv.split_first() else {
            return Err(Error::MissingSubcommand {
                group: self.name.clone(),
            });
        };
        let Some(entry) = self.entries.get(sub) else {
            return Err(Error::UnknownSubcommand {
                group: self.name.clone(),
                name: sub.clone(),
            });
        };
        tracing::debug!(group = %self.name, sub = %sub, "dispatching");
        entry.exec(env, rest)
    }
}
