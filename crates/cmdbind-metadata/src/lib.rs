//! Declaration model for cmdbind commands.
//!
//! This crate intentionally does **not** depend on the binding engine.
//! A command is declared as plain data: an ordered list of parameters, each
//! describing its type, whether it is an option (and under which names),
//! defaults and requiredness. The data types here are used for:
//! - building command specs in `cmdbind` (builder API)
//! - loading a whole command table from JSON (the `cmdbind` binary)

use serde::{Deserialize, Serialize};

/// Current version of the JSON `CommandTable` payload.
pub const TABLE_FORMAT_VERSION: u32 = 1;

/// Declared enumeration: a closed, ordered set of constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct EnumDecl {
    pub name: String,
    pub constants: Vec<String>,
}

impl EnumDecl {
    pub fn new<I, S>(name: impl Into<String>, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            constants: constants.into_iter().map(Into::into).collect(),
        }
    }
}

/// Target type of a single raw value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueType {
    String,
    Bool,
    Int,
    #[serde(rename = "uint")]
    UInt,
    Float,
    Char,
    Path,
    Enum(EnumDecl),
    /// A custom type converted by a parser registered under this name.
    Named(String),
}

impl ValueType {
    /// Human-readable type name used in error messages.
    pub fn display_name(&self) -> &str {
        match self {
            Self::String => "String",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float => "float",
            Self::Char => "char",
            Self::Path => "Path",
            Self::Enum(e) => &e.name,
            Self::Named(name) => name,
        }
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }
}

/// Container a listable parameter is assembled into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerKind {
    Array,
    List,
    /// Insertion-ordered set.
    OrderedSet,
    /// Naturally sorted set.
    SortedSet,
    Queue,
    /// A concrete container type with no idiomatic default; cannot be built.
    Abstract(String),
}

impl ContainerKind {
    pub fn display_name(&self) -> &str {
        match self {
            Self::Array => "array",
            Self::List => "list",
            Self::OrderedSet => "ordered-set",
            Self::SortedSet => "sorted-set",
            Self::Queue => "queue",
            Self::Abstract(name) => name,
        }
    }
}

/// One constructor of an aggregate type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ConstructorDecl {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamDecl>,
    /// Whether the constructor's parameters carry binding metadata.
    #[serde(default)]
    pub annotated: bool,
}

impl ConstructorDecl {
    pub fn new(params: Vec<ParamDecl>) -> Self {
        Self {
            params,
            annotated: false,
        }
    }

    pub fn annotated(params: Vec<ParamDecl>) -> Self {
        Self {
            params,
            annotated: true,
        }
    }
}

/// An aggregate type whose value is constructed from its own nested options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct GroupTypeDecl {
    pub name: String,
    /// Construct as null when none of the nested options was supplied.
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructors: Vec<ConstructorDecl>,
}

impl GroupTypeDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn constructor(mut self, ctor: ConstructorDecl) -> Self {
        self.constructors.push(ctor);
        self
    }
}

/// Declared type of a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeDecl {
    Scalar(ValueType),
    Listable {
        container: ContainerKind,
        element: ValueType,
    },
    Aggregate(GroupTypeDecl),
}

impl TypeDecl {
    pub fn list(element: ValueType) -> Self {
        Self::Listable {
            container: ContainerKind::List,
            element,
        }
    }

    pub fn array(element: ValueType) -> Self {
        Self::Listable {
            container: ContainerKind::Array,
            element,
        }
    }

    pub fn is_listable(&self) -> bool {
        matches!(self, Self::Listable { .. })
    }

    pub fn display_name(&self) -> String {
        match self {
            Self::Scalar(ty) => ty.display_name().to_string(),
            Self::Listable { container, element } => {
                format!("{}<{}>", container.display_name(), element.display_name())
            }
            Self::Aggregate(group) => group.name.clone(),
        }
    }
}

impl From<ValueType> for TypeDecl {
    fn from(ty: ValueType) -> Self {
        Self::Scalar(ty)
    }
}

/// A declared default: one raw value, or several for listable options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultDecl {
    Value(String),
    Values(Vec<String>),
}

/// Option metadata attached to a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct OptionDecl {
    /// First entry is the primary name. On an aggregate parameter these are
    /// prefixes applied to every nested option name.
    pub names: Vec<String>,
    #[serde(default)]
    pub required: bool,
}

/// One formal parameter of a command or constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParamDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDecl,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<OptionDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultDecl>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl ParamDecl {
    /// Declare an option named `name` (`--name`).
    pub fn option(name: impl Into<String>, ty: impl Into<TypeDecl>) -> Self {
        let name = name.into();
        Self {
            option: Some(OptionDecl {
                names: vec![name.clone()],
                required: false,
            }),
            name,
            ty: ty.into(),
            default: None,
            description: String::new(),
        }
    }

    /// Declare a positional parameter.
    pub fn positional(name: impl Into<String>, ty: impl Into<TypeDecl>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            option: None,
            default: None,
            description: String::new(),
        }
    }

    /// Declare an aggregate parameter without option names (no prefixes).
    pub fn grouped(name: impl Into<String>, group: GroupTypeDecl) -> Self {
        Self::positional(name, TypeDecl::Aggregate(group))
    }

    /// Declare an aggregate parameter whose nested options are prefixed.
    pub fn prefixed<I, S>(name: impl Into<String>, group: GroupTypeDecl, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            option: Some(OptionDecl {
                names: prefixes.into_iter().map(Into::into).collect(),
                required: false,
            }),
            ..Self::grouped(name, group)
        }
    }

    /// Add an alternate name. Turns a positional parameter into an option.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        match &mut self.option {
            Some(opt) => opt.names.push(alias),
            None => {
                self.option = Some(OptionDecl {
                    names: vec![self.name.clone(), alias],
                    required: false,
                })
            }
        }
        self
    }

    pub fn required(mut self) -> Self {
        if let Some(opt) = &mut self.option {
            opt.required = true;
        }
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(DefaultDecl::Value(value.into()));
        self
    }

    pub fn default_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default = Some(DefaultDecl::Values(
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_option(&self) -> bool {
        self.option.is_some()
    }
}

/// One command signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct CommandDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamDecl>,
}

impl CommandDecl {
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

    pub fn param(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }
}

/// A named group of sub-commands (which may include nested groups).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct GroupDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandDecl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupDecl>,
}

impl GroupDecl {
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

    pub fn command(mut self, cmd: CommandDecl) -> Self {
        self.commands.push(cmd);
        self
    }

    pub fn group(mut self, group: GroupDecl) -> Self {
        self.groups.push(group);
        self
    }
}

/// JSON payload describing a whole command table.
///
/// Several `CommandDecl`s sharing a name are overloads of one command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommandTable {
    pub format_version: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandDecl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupDecl>,
}

impl Default for CommandTable {
    fn default() -> Self {
        Self {
            format_version: TABLE_FORMAT_VERSION,
            commands: Vec::new(),
            groups: Vec::new(),
        }
    }
}

impl CommandTable {
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Encode as pretty JSON bytes.
    pub fn to_json_bytes(&self) -> Vec<u8> {
        serde_json::to_vec_pretty(self).unwrap_or_default()
    }
}
