//! Catalog listing command

use std::path::Path;

use uisbridge_core::catalog::Catalog;
use uisbridge_core::hex;

/// Print the lists and sets of a command catalog file.
pub fn run_lists(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::from_file(file)?;

    for list in &catalog.lists {
        println!("List `{}` ({} commands)", list.name, list.entries.len());
        for entry in &list.entries {
            println!("  {:24} {}", entry.label, hex::format(&entry.bytes));
        }
        println!();
    }

    for set in &catalog.sets {
        println!("Set {} - {}", set.id, set.description);
        for command in &set.commands {
            println!("  {}", hex::format(command));
        }
        println!();
    }

    if catalog.lists.is_empty() && catalog.sets.is_empty() {
        println!("Catalog is empty");
    }

    Ok(())
}
