use crate::types::errors::Error;
use serde::Serialize;
use std::path::Path;

/// Save any serializable value as pretty-printed JSON
pub fn save_json<T: Serialize>(value: &T, output_path: &Path) -> Result<(), Error> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(output_path, json)?;
    Ok(())
}
