// src/error.rs
use motemplate_template_core::TemplateError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading templates from disk or rendering them.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: TemplateError,
    },

    #[error("Partial file {} does not have a valid partial name", .path.display())]
    InvalidPartialName { path: PathBuf },

    #[error("Rendering failed: {0}")]
    Render(#[from] TemplateError),
}
