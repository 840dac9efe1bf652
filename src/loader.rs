//! Loads templates and their partials from the filesystem.
use crate::error::LoaderError;
use motemplate_engine::MotemplateParser;
use motemplate_engine::identifier::is_valid_segment;
use motemplate_template_core::{CompiledTemplate, TemplateParser};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Parses template files, making every file of a partials directory
/// available to them by file stem.
#[derive(Default)]
pub struct TemplateLoader {
    parser: MotemplateParser,
}

impl TemplateLoader {
    /// Registers every regular file in `partials_dir` as a partial named
    /// after its file stem (`header.mt` becomes `{{+header}}`).
    pub fn new(partials_dir: impl AsRef<Path>) -> Result<Self, LoaderError> {
        let dir = partials_dir.as_ref();
        let io_error = |source| LoaderError::Io { path: dir.to_path_buf(), source };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut parser = MotemplateParser::new();
        for path in paths {
            let name = partial_name(&path)?;
            let source = read(&path)?;
            log::debug!("Registering partial '{}' from {}", name, path.display());
            parser = parser
                .with_partial(&name, &source)
                .map_err(|source| LoaderError::Template { path: path.clone(), source })?;
        }
        Ok(Self { parser })
    }

    pub fn partial_names(&self) -> impl Iterator<Item = &str> {
        self.parser.partial_names()
    }

    /// Parses the template at `path`, named after its file stem.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Arc<dyn CompiledTemplate>, LoaderError> {
        let path = path.as_ref();
        let source = read(path)?;
        let name = path.file_stem().and_then(|stem| stem.to_str());
        self.parser
            .parse(&source, name)
            .map_err(|source| LoaderError::Template { path: path.to_path_buf(), source })
    }
}

fn partial_name(path: &Path) -> Result<String, LoaderError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|name| is_valid_segment(name))
        .map(str::to_string)
        .ok_or_else(|| LoaderError::InvalidPartialName { path: path.to_path_buf() })
}

fn read(path: &Path) -> Result<String, LoaderError> {
    fs::read_to_string(path).map_err(|source| LoaderError::Io { path: PathBuf::from(path), source })
}
