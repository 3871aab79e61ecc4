use std::path::PathBuf;

use crate::commands::load_mapping;
use crate::error::CliResult;
use crate::output::mapping_table;

pub fn run(rules: &[PathBuf]) -> CliResult<()> {
    let mapping = load_mapping(rules)?;
    println!("{}", mapping_table(&mapping));
    let classes = mapping.dedup_classes();
    if !classes.is_empty() {
        println!("dedup classes: {}", classes.join(", "));
    }
    Ok(())
}
