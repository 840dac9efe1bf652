//! The layered scope identifiers are resolved against during a render.
//!
//! The bottom layers are global (the built-in layer and the contexts passed
//! to `render`); sections and partial arguments push local layers on top.
//! Lookups of a key remember which layers were already checked, so resolving
//! the same key repeatedly only scans layers pushed since the last lookup.
use crate::identifier::CURRENT_CONTEXT;
use crate::value::{Context, Value};
use std::collections::{HashMap, HashSet};

#[derive(Clone)]
pub(crate) enum Scope {
    Context(Value),
    /// The built-in layer (`true`, `false`, `_`), answered by the render state.
    Builtins,
}

impl Scope {
    fn get(&self, key: &str, builtins: &dyn Context) -> Option<Value> {
        match self {
            Scope::Context(value) => value.lookup(key),
            Scope::Builtins => builtins.get(key).filter(|value| !value.is_null()),
        }
    }
}

#[derive(Clone)]
struct Layer {
    id: u64,
    scope: Scope,
    /// Keys this layer answered, so popping it can forget them.
    found_keys: Vec<String>,
}

#[derive(Default)]
struct KeyLookup {
    /// Indices of the layers that answered the key, bottom to top.
    found_in: Vec<usize>,
    checked: HashSet<u64>,
}

pub(crate) struct ContextStack {
    layers: Vec<Layer>,
    first_local: usize,
    lookups: HashMap<String, KeyLookup>,
    next_id: u64,
}

impl ContextStack {
    /// Builds a stack from the global contexts, most important first. The
    /// built-in layer is consulted after all of them.
    pub(crate) fn with_globals(contexts: impl IntoIterator<Item = Value>) -> Self {
        let mut scopes = vec![Scope::Builtins];
        let mut contexts: Vec<Scope> = contexts.into_iter().map(Scope::Context).collect();
        contexts.reverse();
        scopes.extend(contexts);
        Self::from_scopes(scopes)
    }

    fn from_scopes(scopes: Vec<Scope>) -> Self {
        let layers: Vec<Layer> = scopes
            .into_iter()
            .enumerate()
            .map(|(id, scope)| Layer { id: id as u64, scope, found_keys: Vec::new() })
            .collect();
        Self {
            first_local: layers.len(),
            next_id: layers.len() as u64,
            layers,
            lookups: HashMap::new(),
        }
    }

    /// A new stack holding only this stack's global layers.
    pub(crate) fn from_globals(&self) -> Self {
        let globals = self.layers[..self.first_local]
            .iter()
            .map(|layer| layer.scope.clone())
            .collect();
        Self::from_scopes(globals)
    }

    /// A copy of every layer, locals included, with a fresh lookup cache.
    /// Locals of the copy stay local.
    pub(crate) fn snapshot(&self) -> Self {
        let mut copy = Self::from_scopes(self.layers.iter().map(|l| l.scope.clone()).collect());
        copy.first_local = self.first_local;
        copy
    }

    pub(crate) fn push(&mut self, context: Value) {
        let id = self.next_id;
        self.next_id += 1;
        self.layers.push(Layer { id, scope: Scope::Context(context), found_keys: Vec::new() });
    }

    pub(crate) fn pop(&mut self) {
        if self.layers.len() <= self.first_local {
            log::warn!("Attempted to pop a global context layer");
            return;
        }
        let Some(layer) = self.layers.pop() else {
            return;
        };
        let index = self.layers.len();
        for key in layer.found_keys {
            if let Some(lookup) = self.lookups.get_mut(&key) {
                if lookup.found_in.last() == Some(&index) {
                    lookup.found_in.pop();
                }
            }
        }
    }

    /// The innermost local context, if anything has been pushed.
    pub(crate) fn first_local(&self) -> Option<Value> {
        if self.layers.len() == self.first_local {
            return None;
        }
        match &self.layers.last()?.scope {
            Scope::Context(value) => Some(value.clone()),
            Scope::Builtins => None,
        }
    }

    /// Resolves a dotted path: the first segment against the layers, the
    /// rest by descending into the value found.
    pub(crate) fn resolve(&mut self, path: &str, builtins: &dyn Context) -> Option<Value> {
        if path == CURRENT_CONTEXT {
            return self.first_local();
        }
        let (key, tail) = match path.split_once('.') {
            Some((key, tail)) => (key, Some(tail)),
            None => (path, None),
        };
        let mut found = self.find(key, builtins)?;
        if let Some(tail) = tail {
            for part in tail.split('.') {
                found = found.lookup(part)?;
            }
        }
        Some(found).filter(|value| !value.is_null())
    }

    fn find(&mut self, key: &str, builtins: &dyn Context) -> Option<Value> {
        let lookup = self.lookups.entry(key.to_string()).or_default();

        let mut newly_found = Vec::new();
        for (index, layer) in self.layers.iter_mut().enumerate().rev() {
            if lookup.checked.contains(&layer.id) {
                break;
            }
            if layer.scope.get(key, builtins).is_some() {
                newly_found.push(index);
                layer.found_keys.push(key.to_string());
            }
            lookup.checked.insert(layer.id);
        }
        // Found top-down; stored bottom-up so the freshest layer is last.
        lookup.found_in.extend(newly_found.into_iter().rev());

        let index = *lookup.found_in.last()?;
        self.layers[index].scope.get(key, builtins)
    }
}
