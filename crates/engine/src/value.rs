//! The values templates are rendered against.
//!
//! Anything that can answer `get(key)` can act as a context: JSON-like maps,
//! custom [`Context`] implementations (lazy or struct-backed), and the
//! built-in layer every render starts with.
use crate::context::ContextStack;
use crate::node::Node;
use crate::template::Motemplate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// A source of named values.
pub trait Context: Send + Sync {
    /// Returns the value for `key`, or `None` if this context doesn't have one.
    fn get(&self, key: &str) -> Option<Value>;
}

#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Arc<Vec<Value>>),
    Map(Arc<BTreeMap<String, Value>>),
    /// A custom context, consulted through [`Context::get`].
    Object(Arc<dyn Context>),
    Partial(Partial),
}

/// Something `{{+id}}` can include.
#[derive(Clone)]
pub enum Partial {
    Template(Arc<Motemplate>),
    /// A content block handed to a partial by the template that included it.
    Content(Arc<ContentBlock>),
    /// A partial with its arguments already resolved, passed as an argument
    /// to another partial.
    Applied {
        target: Box<Partial>,
        args: Arc<BTreeMap<String, Value>>,
    },
}

/// A content block together with the scope it was written in.
pub struct ContentBlock {
    pub(crate) node: Arc<Node>,
    pub(crate) scope: ContextStack,
}

impl Partial {
    /// The name of the underlying template, if it has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Partial::Template(template) => template.name(),
            Partial::Content(_) => None,
            Partial::Applied { target, .. } => target.name(),
        }
    }
}

impl Value {
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Value
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(Arc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ))
    }

    pub fn list<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Value {
        Value::List(Arc::new(items.into_iter().map(Into::into).collect()))
    }

    pub fn object(context: impl Context + 'static) -> Value {
        Value::Object(Arc::new(context))
    }

    /// Converts any serializable value (typically a struct) into a context.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Value, serde_json::Error> {
        serde_json::to_value(value).map(Value::from)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// True if the value can answer key lookups.
    pub fn supports_lookup(&self) -> bool {
        matches!(self, Value::Map(_) | Value::Object(_))
    }

    /// Looks up `key`. Null entries count as absent.
    pub fn lookup(&self, key: &str) -> Option<Value> {
        let found = match self {
            Value::Map(map) => map.get(key).cloned(),
            Value::Object(context) => context.get(key),
            _ => None,
        };
        found.filter(|value| !value.is_null())
    }

    /// Whether a verted section over this value renders its content.
    pub fn should_render(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::List(items) => !items.is_empty(),
            _ => true,
        }
    }

    /// The text interpolated by `{{id}}`; `None` for values without one.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => Some(String::new()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::List(_) | Value::Map(_) => self.to_json().map(|json| json.to_string()),
            Value::Object(_) | Value::Partial(_) => None,
        }
    }

    /// The JSON form dumped by `{{*id}}`; `None` if any part of the value
    /// isn't plain data.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        Some(match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::Array(
                items.iter().map(Value::to_json).collect::<Option<Vec<_>>>()?,
            ),
            Value::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| v.to_json().map(|json| (k.clone(), json)))
                    .collect::<Option<serde_json::Map<_, _>>>()?,
            ),
            Value::Object(_) | Value::Partial(_) => return None,
        })
    }
}

impl Context for Value {
    fn get(&self, key: &str) -> Option<Value> {
        self.lookup(key)
    }
}

impl Context for BTreeMap<String, Value> {
    fn get(&self, key: &str) -> Option<Value> {
        BTreeMap::get(self, key).cloned()
    }
}

impl Context for HashMap<String, Value> {
    fn get(&self, key: &str) -> Option<Value> {
        HashMap::get(self, key).cloned()
    }
}

/// A context computed on demand by a function.
pub struct FnContext<F>(pub F);

impl<F> Context for FnContext<F>
where
    F: Fn(&str) -> Option<Value> + Send + Sync,
{
    fn get(&self, key: &str) -> Option<Value> {
        (self.0)(key)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Number(n) => write!(f, "Number({})", n),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::List(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Map(map) => f.debug_map().entries(map.iter()).finish(),
            Value::Object(_) => f.write_str("Object(..)"),
            Value::Partial(partial) => write!(f, "Partial({:?})", partial.name()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::list(items),
            serde_json::Value::Object(map) => Value::map(map),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(Arc::new(items))
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(Arc::new(map))
    }
}

impl From<Motemplate> for Value {
    fn from(template: Motemplate) -> Self {
        Value::Partial(Partial::Template(Arc::new(template)))
    }
}

impl From<Arc<Motemplate>> for Value {
    fn from(template: Arc<Motemplate>) -> Self {
        Value::Partial(Partial::Template(template))
    }
}
