use anyhow::{Context, Result, bail};
use cmdbind::MapContext;
use cmdbind::metadata::{
    CommandDecl, CommandTable, ConstructorDecl, EnumDecl, GroupDecl, GroupTypeDecl, ParamDecl,
    TypeDecl, ValueType,
};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TABLE_NAME: &str = "cmdbind.json";

#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub path: PathBuf,
    pub table: CommandTable,
}

impl LoadedTable {
    /// Number of command signatures, overloads and nested groups included.
    pub fn signature_count(&self) -> usize {
        fn count(group: &GroupDecl) -> usize {
            group.commands.len() + group.groups.iter().map(count).sum::<usize>()
        }
        self.table.commands.len() + self.table.groups.iter().map(count).sum::<usize>()
    }
}

/// Read a table from `path`, or `cmdbind.json` in the current directory.
pub fn load_table(path: Option<&Path>) -> Result<LoadedTable> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;

    let path = match path {
        Some(p) => resolve_against(&cwd, p),
        None => cwd.join(DEFAULT_TABLE_NAME),
    };
    if !path.exists() {
        bail!("command table not found: {}", path.display());
    }

    let bytes =
        fs::read(&path).with_context(|| format!("failed to read table: {}", path.display()))?;
    let table = CommandTable::from_json(&bytes)
        .with_context(|| format!("failed to parse table JSON: {}", path.display()))?;
    if table.format_version != cmdbind::metadata::TABLE_FORMAT_VERSION {
        tracing::warn!(
            found = table.format_version,
            expected = cmdbind::metadata::TABLE_FORMAT_VERSION,
            "unexpected table format version"
        );
    }

    Ok(LoadedTable { path, table })
}

/// Read `KEY=VALUE` pairs from a dotenv file for default interpolation.
pub fn load_env_file(path: &Path) -> Result<MapContext> {
    dotenvy::from_path_iter(path)
        .with_context(|| format!("failed to open env file: {}", path.display()))?
        .collect::<Result<MapContext, _>>()
        .with_context(|| format!("failed to parse env file: {}", path.display()))
}

/// A small table showing every parameter kind.
pub fn example_table() -> CommandTable {
    let address = GroupTypeDecl::new("Address")
        .nullable()
        .constructor(ConstructorDecl::annotated(vec![
            ParamDecl::option("street", ValueType::String),
            ParamDecl::option("city", ValueType::String).default_value("${CITY}"),
        ]));

    CommandTable {
        commands: vec![
            CommandDecl::new("commit")
                .describe("Record changes")
                .param(ParamDecl::option("message", ValueType::String).alias("m").required())
                .param(ParamDecl::option("all", ValueType::Bool).alias("a"))
                .param(ParamDecl::positional("file", ValueType::Path)),
            CommandDecl::new("commit")
                .describe("Record changes to two files")
                .param(ParamDecl::option("message", ValueType::String).alias("m").required())
                .param(ParamDecl::option("all", ValueType::Bool).alias("a"))
                .param(ParamDecl::positional("file", ValueType::Path))
                .param(ParamDecl::positional("other", ValueType::Path)),
            CommandDecl::new("tag")
                .param(
                    ParamDecl::option(
                        "level",
                        TypeDecl::list(ValueType::Enum(EnumDecl::new(
                            "Level",
                            ["low", "mid", "high"],
                        ))),
                    )
                    .default_values(["low"]),
                )
                .param(ParamDecl::positional("names", TypeDecl::list(ValueType::String))),
        ],
        groups: vec![GroupDecl::new("contact").describe("Address book").command(
            CommandDecl::new("add")
                .param(ParamDecl::positional("name", ValueType::String))
                .param(ParamDecl::prefixed("home", address, ["home-"])),
        )],
        ..Default::default()
    }
}

/// Write the example table to `dest`, leaving an existing file alone unless
/// `overwrite` is set.
pub fn write_example_table(dest: &Path, overwrite: bool) -> Result<bool> {
    if dest.exists() && !overwrite {
        return Ok(false);
    }

    let mut out = example_table().to_json_bytes();
    out.push(b'\n');

    let tmp = dest.with_extension("tmp");
    fs::write(&tmp, &out).with_context(|| format!("failed to write {}", tmp.display()))?;
    if overwrite && dest.exists() {
        fs::remove_file(dest).with_context(|| format!("failed to remove {}", dest.display()))?;
    }
    fs::rename(&tmp, dest)
        .with_context(|| format!("failed to move {} into place", dest.display()))?;
    Ok(true)
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
