//! File system utility helpers
use std::fs;
use std::path::Path;

/// Read a Go source file as UTF-8 text, stripping a UTF-8 BOM if present.
pub fn read_source_file(path: &Path) -> std::io::Result<String> {
    let mut content = fs::read_to_string(path)?;
    if content.starts_with('\u{FEFF}') {
        content = content.trim_start_matches('\u{FEFF}').to_string();
    }
    Ok(content)
}
