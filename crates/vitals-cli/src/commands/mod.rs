//! CLI command implementations

pub mod detect;
pub mod synthesize;

use crate::error::CliResult;
use serde::Serialize;
use std::path::Path;

/// Read a whole input file.
pub(crate) fn read_input(path: &Path) -> CliResult<String> {
    Ok(std::fs::read_to_string(path)?)
}

/// Write `data` to stdout as JSON.
pub(crate) fn print_json<T: Serialize + ?Sized>(data: &T, pretty: bool) -> CliResult<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(data)?
    } else {
        serde_json::to_string(data)?
    };
    println!("{}", rendered);
    Ok(())
}
