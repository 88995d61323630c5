use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A type alias for handling `Result`s with `Error`
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving a configuration document.
///
/// Only these errors ever affect the validity flag of a resolved
/// configuration; everything else degrades to a default value.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file is missing or unreadable
    #[error("unable to open configuration file {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Document is structurally malformed
    #[error("malformed configuration document: {0}")]
    DocumentParse(String),

    /// A required section is missing from the document
    #[error("required section <{0}> not found")]
    MissingSection(&'static str),
}
