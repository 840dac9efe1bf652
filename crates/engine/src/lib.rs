//! Motemplate: a logic-less template engine.
//!
//! Templates are parsed once into an immutable tree and rendered against a
//! stack of contexts. Rendering never fails: identifiers that cannot be
//! resolved are reported in the output's error list while the rest of the
//! template renders normally.
//!
//! ```text
//! {{name}}            escaped interpolation
//! {{{name}}}          unescaped interpolation
//! {{*name}}           compact JSON
//! {{#items}}..{{/}}   section: once per element, or once in a nested scope
//! {{?flag}}..{{/}}    rendered if truthy
//! {{^flag}}..{{/}}    rendered if falsy or absent
//! {{+partial(k:v) /}} partial inclusion
//! {{- comment -}}
//! {{!name reason}}    assertion
//! ```

mod context;
pub mod error;
pub mod identifier;
mod node;
mod parser;
pub mod processor;
pub mod render;
mod template;
mod token;
pub mod value;
mod whitespace;

pub use error::{Location, ParseError};
pub use identifier::Identifier;
pub use motemplate_template_core::RenderOutput;
pub use processor::{CompiledMotemplate, MotemplateParser};
pub use render::IncludeFrame;
pub use template::Motemplate;
pub use value::{Context, FnContext, Partial, Value};
