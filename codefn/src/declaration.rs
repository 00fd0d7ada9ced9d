//! Explicit function declarations describing the signature of a code function node.
//!
//! Declarations can be built in code or deserialized from JSON like
//! ```json
//! {
//!   "name": "Unity_Add",
//!   "is_static": true,
//!   "parameters": [
//!     { "name": "A", "ty": "DynamicDimensionVector", "slot": { "id": 0 } },
//!     { "name": "B", "ty": "DynamicDimensionVector", "slot": { "id": 1 } },
//!     { "name": "Out", "ty": "DynamicDimensionVector", "qualifier": "Out", "slot": { "id": 2 } }
//!   ],
//!   "body": "{ Out = A + B; }"
//! }
//! ```
use std::path::Path;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::{
    binding::Binding,
    slot::{ColorMode, Direction, StageCapability},
};

/// A function signature and the literal shader code for its body.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: SmolStr,
    /// The type produced by the declaration itself, which must be shader code text.
    #[serde(default = "default_return_type")]
    pub return_type: SmolStr,
    /// Static functions are shared by all nodes instead of generated per instance.
    #[serde(default)]
    pub is_static: bool,
    pub parameters: Vec<Parameter>,
    /// Shader code with optional `{slot<id>dimension}` placeholders.
    #[serde(default)]
    pub body: String,
}

fn default_return_type() -> SmolStr {
    "string".into()
}

impl FunctionDeclaration {
    /// Loads and deserializes the JSON data from `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::from)
    }

    /// Slot ids in declared parameter order for matching call arguments
    /// or `None` for parameters without an annotation.
    pub fn parameter_order(&self) -> Vec<Option<u32>> {
        self.parameters
            .iter()
            .map(|p| p.slot.as_ref().map(|s| s.id))
            .collect()
    }
}

/// A single function parameter.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// The source name used for generated identifiers and display labels.
    pub name: SmolStr,
    /// The declared type name like `Vector3` or `Texture2D`.
    pub ty: SmolStr,
    #[serde(default)]
    pub qualifier: Qualifier,
    pub slot: Option<SlotAnnotation>,
}

impl Parameter {
    pub fn direction(&self) -> Direction {
        match self.qualifier {
            Qualifier::In => Direction::Input,
            Qualifier::Ref | Qualifier::Out => Direction::Output,
        }
    }
}

/// How the parameter is passed to the function.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Qualifier {
    #[default]
    In,
    Ref,
    Out,
}

/// Slot metadata attached to each parameter.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct SlotAnnotation {
    pub id: u32,
    #[serde(default)]
    pub binding: Option<Binding>,
    #[serde(default)]
    pub hidden: bool,
    /// Up to 4 default components with missing components set to zero.
    #[serde(default)]
    pub default_value: Option<Vec<f32>>,
    #[serde(default)]
    pub stage: StageCapability,
    #[serde(default)]
    pub color_mode: ColorMode,
}

impl SlotAnnotation {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn with_binding(id: u32, binding: Binding) -> Self {
        Self {
            id,
            binding: Some(binding),
            ..Default::default()
        }
    }

    pub fn with_default(id: u32, default_value: &[f32]) -> Self {
        Self {
            id,
            default_value: Some(default_value.to_vec()),
            ..Default::default()
        }
    }

    /// The default as 4 components padded with zeros.
    pub fn default_vector(&self) -> [f32; 4] {
        let mut value = [0.0; 4];
        if let Some(default) = &self.default_value {
            for (v, d) in value.iter_mut().zip(default) {
                *v = *d;
            }
        }
        value
    }
}
