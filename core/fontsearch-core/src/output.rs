/// Ways to hand a font listing to the outside world
///
/// Plain names for people and shell pipelines, paths for scripts that want
/// to open the files, and JSON or NDJSON for anything that parses.
///
/// Made with care at FontLab https://www.fontlab.com/
use std::io::Write;

use anyhow::Result;

use crate::catalog::FontEntry;

/// One display name per line.
pub fn write_names<'a>(
    entries: impl IntoIterator<Item = &'a FontEntry>,
    mut w: impl Write,
) -> Result<()> {
    for entry in entries {
        writeln!(w, "{}", entry.display_name)?;
    }
    Ok(())
}

/// One font path per line, `#<index>` marking collection faces.
pub fn write_paths<'a>(
    entries: impl IntoIterator<Item = &'a FontEntry>,
    mut w: impl Write,
) -> Result<()> {
    for entry in entries {
        writeln!(w, "{}", entry.path_with_index())?;
    }
    Ok(())
}

/// Write entries as a prettified JSON array.
pub fn write_json_pretty(entries: &[&FontEntry], mut w: impl Write) -> Result<()> {
    let json = serde_json::to_string_pretty(entries)?;
    w.write_all(json.as_bytes())?;
    w.write_all(b"\n")?;
    Ok(())
}

/// Write entries as newline-delimited JSON (NDJSON).
pub fn write_ndjson(entries: &[&FontEntry], mut w: impl Write) -> Result<()> {
    for item in entries {
        let line = serde_json::to_string(item)?;
        w.write_all(line.as_bytes())?;
        w.write_all(b"\n")?;
    }
    Ok(())
}
