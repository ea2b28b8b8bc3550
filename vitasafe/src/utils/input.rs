// vitasafe/src/utils/input.rs
//! Reading command input from a file or stdin.

use log::debug;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read input file {}: {source}", path.display())]
    File { path: PathBuf, source: io::Error },

    #[error("Failed to read from stdin: {0}")]
    Stdin(#[source] io::Error),

    #[error("Input is empty")]
    Empty,
}

/// Reads all of `path`, or all of stdin when no path is given.
pub fn read_input(path: Option<&Path>) -> Result<String, InputError> {
    let text = match path {
        Some(path) => {
            debug!("Reading input from {}.", path.display());
            std::fs::read_to_string(path).map_err(|source| InputError::File {
                path: path.to_path_buf(),
                source,
            })?
        }
        None => {
            debug!("Reading input from stdin.");
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(InputError::Stdin)?;
            buffer
        }
    };
    if text.trim().is_empty() {
        return Err(InputError::Empty);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn reads_files() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "hello").unwrap();
        assert_eq!(read_input(Some(file.path())).unwrap(), "hello");
    }

    #[test]
    fn blank_files_are_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "  \n").unwrap();
        assert!(matches!(read_input(Some(file.path())), Err(InputError::Empty)));
    }

    #[test]
    fn missing_files_name_the_path() {
        let err = read_input(Some(Path::new("/no/such/input.json"))).unwrap_err();
        assert!(err.to_string().contains("/no/such/input.json"));
    }
}
