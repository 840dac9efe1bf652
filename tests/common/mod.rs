#![allow(dead_code)]

use motemplate::{Motemplate, RenderOutput, Value};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Renders `source` against a single JSON context.
pub fn render(source: &str, data: serde_json::Value) -> Result<RenderOutput, Box<dyn std::error::Error>> {
    let template = Motemplate::new(source, None)?;
    Ok(template.render([Value::from(data)]))
}

/// Builds the context layer that exposes named partials.
pub fn partials(sources: &[(&str, &str)]) -> Result<Value, Box<dyn std::error::Error>> {
    let mut entries = Vec::new();
    for &(name, source) in sources {
        entries.push((name.to_string(), Value::from(Motemplate::new(source, Some(name))?)));
    }
    Ok(Value::map(entries))
}

/// Renders `source` with `data` first and the given partials behind it.
pub fn render_with_partials(
    source: &str,
    data: serde_json::Value,
    sources: &[(&str, &str)],
) -> Result<RenderOutput, Box<dyn std::error::Error>> {
    let template = Motemplate::new(source, None)?;
    Ok(template.render([Value::from(data), partials(sources)?]))
}
