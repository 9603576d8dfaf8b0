//! JSON output for CLI commands
//!
//! - Output: single JSON object per command on stdout
//! - UTF-8 only

use std::io::{self, Write};

use serde_json::Value;

use super::errors::CliResult;

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_response_to(&mut handle, data)
}

/// Write a success response `{"status":"ok","data":...}` as one line
pub fn write_response_to<W: Write>(writer: &mut W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    serde_json::to_writer(&mut *writer, &response)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}
