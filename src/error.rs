//! Error taxonomy for font import and rendering paths
//!
//! Failures inside import/packing are caught and logged at the boundary;
//! none are fatal. Cache resolve/draw paths never surface errors at all,
//! they degrade to "no geometry" / no-op draws.

use thiserror::Error;

/// Errors produced by font import, atlas packing and resource access.
#[derive(Debug, Error)]
pub enum Error {
    /// File unreadable or unwritable through the resource store.
    #[error("resource '{path}': {source}")]
    Resource {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed font descriptor document.
    #[error("descriptor parse: {0}")]
    Parse(String),

    /// The vector engine rejected the font bytes, or the packer
    /// produced zero usable output.
    #[error("rasterization: {0}")]
    Rasterization(String),
}

impl Error {
    pub fn resource(path: impl Into<String>, source: std::io::Error) -> Self {
        Error::Resource {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
