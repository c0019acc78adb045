//! Command catalog files
//!
//! Operators keep frequently-used commands in TOML files: named lists of
//! labelled commands, and numbered sets grouping a described sequence.
//! Entries are hex-parsed and length-checked at load time, so a command
//! taken from a catalog can never fail transaction validation later.
//!
//! ```toml
//! [[list]]
//! name = "afe"
//!
//! [[list.command]]
//! label = "read status"
//! hex = "0x00 0x02 0x2B 0x0A"
//!
//! [[set]]
//! id = 1
//! description = "calibration sequence"
//! commands = ["0x00 0x01 0x3D 0x6E", "0x00 0x01 0x3D 0x6F"]
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::engine::COMMAND_LEN;
use crate::hex;

/// Errors raised while loading a catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The file could not be read.
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for the catalog schema.
    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A command entry failed hex parsing or the length check.
    #[error("catalog entry `{label}`: {source}")]
    Entry {
        /// Label (or set id) of the offending entry.
        label: String,
        /// Underlying parse/validation failure.
        source: crate::error::Error,
    },
}

/// One labelled command in a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEntry {
    /// Operator-facing label.
    pub label: String,
    /// The command bytes, exactly 4 long.
    pub bytes: Vec<u8>,
}

/// A named, ordered list of labelled commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandList {
    /// List name, used to address entries as `list:label`.
    pub name: String,
    /// Entries in file order.
    pub entries: Vec<CommandEntry>,
}

/// A numbered, described group of commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSet {
    /// Set identifier.
    pub id: u32,
    /// Operator-facing description.
    pub description: String,
    /// Commands in file order.
    pub commands: Vec<Vec<u8>>,
}

/// All lists and sets of one catalog file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Named command lists, in file order.
    pub lists: Vec<CommandList>,
    /// Grouped command sets, in file order.
    pub sets: Vec<CommandSet>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    list: Vec<ListDef>,
    #[serde(default)]
    set: Vec<SetDef>,
}

#[derive(Debug, Deserialize)]
struct ListDef {
    name: String,
    #[serde(default)]
    command: Vec<EntryDef>,
}

#[derive(Debug, Deserialize)]
struct EntryDef {
    label: String,
    hex: String,
}

#[derive(Debug, Deserialize)]
struct SetDef {
    id: u32,
    description: String,
    #[serde(default)]
    commands: Vec<String>,
}

impl Catalog {
    /// Load a catalog from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&text)?;
        log::info!(
            "loaded {} command list(s), {} set(s) from {}",
            catalog.lists.len(),
            catalog.sets.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parse a catalog from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(text)?;

        let mut lists = Vec::with_capacity(file.list.len());
        for def in file.list {
            let mut entries = Vec::with_capacity(def.command.len());
            for entry in def.command {
                let bytes = parse_command(&entry.hex).map_err(|source| CatalogError::Entry {
                    label: format!("{}:{}", def.name, entry.label),
                    source,
                })?;
                entries.push(CommandEntry {
                    label: entry.label,
                    bytes,
                });
            }
            lists.push(CommandList {
                name: def.name,
                entries,
            });
        }

        let mut sets = Vec::with_capacity(file.set.len());
        for def in file.set {
            let mut commands = Vec::with_capacity(def.commands.len());
            for (i, text) in def.commands.iter().enumerate() {
                let bytes = parse_command(text).map_err(|source| CatalogError::Entry {
                    label: format!("set {} entry {}", def.id, i + 1),
                    source,
                })?;
                commands.push(bytes);
            }
            sets.push(CommandSet {
                id: def.id,
                description: def.description,
                commands,
            });
        }

        Ok(Self { lists, sets })
    }

    /// Find a list entry by list name and label.
    pub fn find(&self, list: &str, label: &str) -> Option<&CommandEntry> {
        self.lists
            .iter()
            .find(|l| l.name == list)?
            .entries
            .iter()
            .find(|e| e.label == label)
    }
}

fn parse_command(text: &str) -> crate::error::Result<Vec<u8>> {
    let bytes = hex::parse(text)?;
    if bytes.len() != COMMAND_LEN {
        return Err(crate::error::Error::InvalidCommandLength(bytes.len()));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[list]]
name = "afe"

[[list.command]]
label = "read status"
hex = "0x00 0x02 0x2B 0x0A"

[[list.command]]
label = "write gain"
hex = "0x00 0x01 0x3D 0x6E"

[[set]]
id = 1
description = "calibration sequence"
commands = ["0x00 0x01 0x3D 0x6E", "0x00 0x01 0x3D 0x6F"]
"#;

    #[test]
    fn loads_lists_and_sets_in_order() {
        let catalog = Catalog::from_toml_str(SAMPLE).unwrap();
        assert_eq!(catalog.lists.len(), 1);
        assert_eq!(catalog.sets.len(), 1);

        let list = &catalog.lists[0];
        assert_eq!(list.name, "afe");
        assert_eq!(list.entries[0].label, "read status");
        assert_eq!(list.entries[0].bytes, vec![0x00, 0x02, 0x2B, 0x0A]);
        assert_eq!(list.entries[1].label, "write gain");

        let set = &catalog.sets[0];
        assert_eq!(set.id, 1);
        assert_eq!(set.commands.len(), 2);
        assert_eq!(set.commands[1], vec![0x00, 0x01, 0x3D, 0x6F]);
    }

    #[test]
    fn find_addresses_entries_by_list_and_label() {
        let catalog = Catalog::from_toml_str(SAMPLE).unwrap();
        let entry = catalog.find("afe", "write gain").unwrap();
        assert_eq!(entry.bytes, vec![0x00, 0x01, 0x3D, 0x6E]);
        assert!(catalog.find("afe", "missing").is_none());
        assert!(catalog.find("other", "read status").is_none());
    }

    #[test]
    fn rejects_bad_hex_with_the_offending_label() {
        let text = r#"
[[list]]
name = "afe"

[[list.command]]
label = "broken"
hex = "0x00 0xZZ 0x2B 0x0A"
"#;
        let err = Catalog::from_toml_str(text).unwrap_err();
        match err {
            CatalogError::Entry { label, .. } => assert_eq!(label, "afe:broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_wrong_length_commands_at_load() {
        let text = r#"
[[set]]
id = 7
description = "short"
commands = ["0x00 0x01"]
"#;
        let err = Catalog::from_toml_str(text).unwrap_err();
        match err {
            CatalogError::Entry { label, source } => {
                assert_eq!(label, "set 7 entry 1");
                assert_eq!(source, crate::error::Error::InvalidCommandLength(2));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_file_is_an_empty_catalog() {
        assert_eq!(Catalog::from_toml_str("").unwrap(), Catalog::default());
    }
}
