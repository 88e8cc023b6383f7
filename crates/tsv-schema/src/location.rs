//! # Schema Location
//!
//! Canonical, absolute address of a schema document. The schema engine
//! resolves `$ref`s relative to the document's own URL, so a location is
//! always an absolute `file://` URL by the time it reaches [`crate::compile`].

use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

use crate::compile::SchemaCompileError;

/// Absolute `file://` URL of a JSON-Schema document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaLocation {
    url: Url,
}

impl SchemaLocation {
    /// Build a location from a filesystem path.
    ///
    /// Relative paths are joined against the current working directory
    /// before being converted to a URL. The file is not required to exist
    /// yet; a missing document surfaces later as a load error.
    ///
    /// # Errors
    ///
    /// Returns `SchemaCompileError::Location` if the working directory
    /// cannot be determined or the path cannot be expressed as a URL.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaCompileError> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            let cwd = std::env::current_dir().map_err(|e| SchemaCompileError::Location {
                path: path.display().to_string(),
                reason: format!("cannot determine current directory: {e}"),
            })?;
            cwd.join(path)
        };

        let url = Url::from_file_path(&absolute).map_err(|()| SchemaCompileError::Location {
            path: absolute.display().to_string(),
            reason: "path cannot be expressed as a file URL".to_string(),
        })?;

        Ok(Self { url })
    }

    /// Wrap an already-absolute URL. Only `file://` URLs are accepted.
    pub fn from_url(url: Url) -> Result<Self, SchemaCompileError> {
        if url.scheme() != "file" || url.to_file_path().is_err() {
            return Err(SchemaCompileError::Location {
                path: url.to_string(),
                reason: "only local file:// schema locations are supported".to_string(),
            });
        }
        Ok(Self { url })
    }

    /// The canonical URL of the document.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The local path the URL points at.
    pub fn to_file_path(&self) -> Result<PathBuf, SchemaCompileError> {
        file_path_of(&self.url)
    }
}

impl fmt::Display for SchemaLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

pub(crate) fn file_path_of(url: &Url) -> Result<PathBuf, SchemaCompileError> {
    if url.scheme() != "file" {
        return Err(SchemaCompileError::Location {
            path: url.to_string(),
            reason: format!("unsupported URL scheme '{}'", url.scheme()),
        });
    }
    url.to_file_path().map_err(|()| SchemaCompileError::Location {
        path: url.to_string(),
        reason: "URL does not name a local file".to_string(),
    })
}
