use std::collections::BTreeMap;
use std::path::Path;
use std::{fs, io};

use anyhow::{Context, Error};
use minijinja::Value;
use serde::Deserialize;

pub const STDIN_STDOUT: &str = "-";

/// Loads a JSON context file.
///
/// Returns the parsed toplevel object plus whether stdin was consumed,
/// which the caller needs to know because the template (or the REPL)
/// may want stdin as well.
pub fn load_file(path: &Path) -> Result<(Value, bool), Error> {
    let (contents, stdin_used) = if path == Path::new(STDIN_STDOUT) {
        (
            io::read_to_string(io::stdin()).context("unable to read data from stdin")?,
            true,
        )
    } else {
        (
            fs::read_to_string(path)
                .with_context(|| format!("unable to read data file '{}'", path.display()))?,
            false,
        )
    };

    let data: Value = serde_json::from_str(&contents)
        .with_context(|| format!("invalid JSON in data file '{}'", path.display()))?;
    let map: BTreeMap<String, Value> =
        Deserialize::deserialize(data).context("failed to interpret input data as object")?;
    Ok((Value::from_serialize(&map), stdin_used))
}
