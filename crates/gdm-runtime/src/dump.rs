//! Verbose-mode dumps framed by `---START <caption>---` / `---END <caption>---`.

use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

/// Pretty JSON dump of `data`. Serialization failures are printed in the frame.
pub fn dump_data<W: Write, S: Serialize + ?Sized>(w: &mut W, caption: &str, data: &S) -> io::Result<()> {
    writeln!(w, "---START {caption}---")?;
    match serde_json::to_string_pretty(data) {
        Ok(json) => writeln!(w, "{json}")?,
        Err(err) => writeln!(w, "error marshalling: {err}")?,
    }
    writeln!(w, "---END {caption}---")
}

/// Dump a file's contents. A read failure is printed in the frame.
pub fn dump_file<W: Write>(w: &mut W, caption: &str, path: &Path) -> io::Result<()> {
    writeln!(w, "---START {caption}---")?;
    match std::fs::read_to_string(path) {
        Ok(contents) => writeln!(w, "{contents}")?,
        Err(err) => writeln!(w, "error reading file: {err}")?,
    }
    writeln!(w, "---END {caption}---")
}
