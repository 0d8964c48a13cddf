//! Whole-file read and write for the editor. Failures are logged and reported
//! as an empty string or `false`; the caller decides what to tell the user.

use std::path::Path;

use tracing::warn;

/// Reads the whole file as text. Invalid UTF-8 is replaced and CRLF line
/// endings become LF. Returns an empty string if the file cannot be read.
pub fn read_file(path: &Path) -> String {
    match std::fs::read(path) {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes);
            if text.contains("\r\n") {
                text.replace("\r\n", "\n")
            } else {
                text.into_owned()
            }
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not open file for reading");
            String::new()
        }
    }
}

/// Replaces the file's content with `content`. Returns `false` on failure.
pub fn write_file(path: &Path, content: &str) -> bool {
    match std::fs::write(path, content) {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not open file for writing");
            false
        }
    }
}
