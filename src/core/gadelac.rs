//! External GDL pre-translation through the `gadelac` executable.
//!
//! The tool is run as `gadelac --backend gdl -o OUTPUT INPUT` on scratch
//! files. Exit code 1 means it rejected the rules; any other failure,
//! including a missing executable, is an engine failure.

use std::fs;
use std::io::ErrorKind;
use std::process::Command;
use tracing::debug;

use crate::error::{GdlError, Result};

/// Run the pre-translator over `text` and return its GDL output.
pub(crate) fn translate(text: &str, command: &str) -> Result<String> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input.gdl");
    let output = dir.path().join("output.gdl");
    fs::write(&input, text)?;

    let result = Command::new(command)
        .arg("--backend")
        .arg("gdl")
        .arg("-o")
        .arg(&output)
        .arg(&input)
        .output();

    let run = match result {
        Ok(run) => run,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(GdlError::EngineFailure(format!(
                "pre-translator {command:?} not found"
            )))
        }
        Err(e) => {
            return Err(GdlError::EngineFailure(format!(
                "could not run pre-translator {command:?}: {e}"
            )))
        }
    };

    let stderr = String::from_utf8_lossy(&run.stderr);
    match run.status.code() {
        Some(0) => {
            let translated = fs::read_to_string(&output)?;
            debug!(
                command,
                input_len = text.len(),
                output_len = translated.len(),
                "pre-translated rules"
            );
            Ok(translated)
        }
        Some(1) => Err(GdlError::InvalidRules(format!(
            "gadelac identified invalid GDL: {}",
            stderr.trim()
        ))),
        code => Err(GdlError::EngineFailure(format!(
            "pre-translator {command:?} failed with status {code:?}: {}",
            stderr.trim()
        ))),
    }
}
