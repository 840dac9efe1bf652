//! Motemplate: logic-less templates with partials and context scoping.
//!
//! The engine lives in `motemplate-engine`; this crate re-exports it together
//! with the engine-agnostic abstractions and adds a filesystem loader.
//!
//! ```no_run
//! use motemplate::{Motemplate, Value};
//! use serde_json::json;
//!
//! let template = Motemplate::new("Hello {{name}}!", None)?;
//! let output = template.render([Value::from(json!({ "name": "World" }))]);
//! assert_eq!(output.text, "Hello World!");
//! # Ok::<(), motemplate::ParseError>(())
//! ```

pub mod error;
pub mod loader;

pub use error::LoaderError;
pub use loader::TemplateLoader;

pub use motemplate_engine::{
    CompiledMotemplate, Context, FnContext, IncludeFrame, Location, Motemplate, MotemplateParser,
    ParseError, Partial, Value,
};
pub use motemplate_template_core::{
    CompiledTemplate, ExecutionConfig, RenderOutput, TemplateError, TemplateFlags, TemplateParser,
};
