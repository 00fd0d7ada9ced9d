//! Deduplicated collection of generated function definitions.
use indexmap::IndexMap;
use log::error;
use smol_str::SmolStr;

/// Generated function definitions keyed by function name.
///
/// Nodes sharing a static function or the same instance provide identical
/// definitions, so each function is only emitted once.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct FunctionRegistry {
    functions: IndexMap<SmolStr, String>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the `definition` for `name` if not already present.
    /// Returns `true` if the definition was added.
    pub fn provide(&mut self, name: &str, definition: String) -> bool {
        match self.functions.get(name) {
            Some(existing) => {
                if existing != &definition {
                    error!("function {name:?} already provided with a different definition");
                }
                false
            }
            None => {
                self.functions.insert(name.into(), definition);
                true
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// All definitions in the order they were first provided.
    pub fn build(&self) -> String {
        self.functions
            .values()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
