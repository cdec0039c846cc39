//! Presentation of rendered content to a file or stdout.

use std::path::Path;

use crate::shared::error::LynkError;

/// Write `content` to `output` when given, otherwise print it.
pub fn present(content: &str, output: Option<&Path>) -> Result<(), LynkError> {
    match output {
        Some(path) => std::fs::write(path, content).map_err(|e| LynkError::FileWrite {
            path: path.to_path_buf(),
            details: e.to_string(),
        }),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}
