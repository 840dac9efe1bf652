// Processor that implements the TemplateParser trait for Motemplate sources
use crate::identifier::is_valid_segment;
use crate::node::Node;
use crate::template::Motemplate;
use crate::value::Value;
use itertools::Itertools;
use motemplate_template_core::{
    CompiledTemplate, ExecutionConfig, RenderOutput, TemplateError, TemplateFlags, TemplateParser,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Motemplate parser. Partials registered here are visible to every template
/// it compiles.
#[derive(Default)]
pub struct MotemplateParser {
    partials: BTreeMap<String, Value>,
    features: TemplateFlags,
}

impl MotemplateParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `source` and registers it under `name`, so templates can
    /// include it with `{{+name}}`.
    pub fn with_partial(mut self, name: &str, source: &str) -> Result<Self, TemplateError> {
        if !is_valid_segment(name) {
            return Err(TemplateError::ConfigError(format!(
                "Invalid partial name '{}'",
                name
            )));
        }
        let template = Motemplate::new(source, Some(name))?;
        self.features = self.features.union(detect_features(template.root()));
        self.partials.insert(name.to_string(), Value::from(template));
        Ok(self)
    }

    pub fn partial_names(&self) -> impl Iterator<Item = &str> {
        self.partials.keys().map(String::as_str)
    }
}

/// Compiled Motemplate together with the partials it was compiled with.
pub struct CompiledMotemplate {
    template: Arc<Motemplate>,
    partials: Value,
    features: TemplateFlags,
}

impl CompiledMotemplate {
    pub fn template(&self) -> &Motemplate {
        &self.template
    }

    /// Renders with `data` as the first context and the partials behind it.
    pub fn render(&self, data: Value) -> RenderOutput {
        self.template.render([data, self.partials.clone()])
    }
}

impl CompiledTemplate for CompiledMotemplate {
    fn execute(
        &self,
        data_source: &str,
        config: ExecutionConfig,
    ) -> Result<RenderOutput, TemplateError> {
        let data: serde_json::Value = serde_json::from_str(data_source)
            .map_err(|e| TemplateError::ParseError(format!("JSON parse error: {}", e)))?;

        let output = self.render(Value::from(data));
        if config.strict && !output.is_clean() {
            return Err(TemplateError::ExecutionError(output.errors.iter().join("\n")));
        }
        Ok(output)
    }

    fn name(&self) -> Option<&str> {
        self.template.name()
    }

    fn features(&self) -> TemplateFlags {
        self.features
    }
}

impl TemplateParser for MotemplateParser {
    fn parse(
        &self,
        template_source: &str,
        name: Option<&str>,
    ) -> Result<Arc<dyn CompiledTemplate>, TemplateError> {
        let template = Motemplate::new(template_source, name)?;

        // Detect features from the parsed tree
        let features = detect_features(template.root()).union(self.features);

        Ok(Arc::new(CompiledMotemplate {
            template: Arc::new(template),
            partials: Value::Map(Arc::new(self.partials.clone())),
            features,
        }))
    }
}

/// Detect template features by scanning the node tree
fn detect_features(root: &Node) -> TemplateFlags {
    let mut flags = TemplateFlags::default();
    scan_nodes_for_features(root, &mut flags);
    flags
}

/// Recursively scan nodes to detect features
fn scan_nodes_for_features(node: &Node, flags: &mut TemplateFlags) {
    match node {
        Node::Assertion { .. } => {
            flags.has_assertions = true;
        }
        Node::Json(_) => {
            flags.emits_json = true;
        }
        Node::Partial(partial) => {
            flags.includes_partials = true;
            if let Some(content) = &partial.content {
                scan_nodes_for_features(content, flags);
            }
        }
        // Recursively scan decorated content
        Node::Section(section) | Node::VertedSection(section) | Node::InvertedSection(section) => {
            scan_nodes_for_features(&section.content, flags);
        }
        Node::Inline(content) | Node::Block(content) | Node::Indented { content, .. } => {
            scan_nodes_for_features(content, flags);
        }
        Node::Collection(nodes) => {
            for node in nodes {
                scan_nodes_for_features(node, flags);
            }
        }
        _ => {}
    }
}
