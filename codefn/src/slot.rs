//! Typed parameter positions on a code function node.
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use strum::{Display, EnumIter};

use crate::{
    binding::{Binding, BoundSource},
    dynamic::DynamicWidths,
};

/// The generic precision token replaced with `half` or `float` by the host.
pub const PRECISION_TOKEN: &str = "$precision";

/// The semantic kind of a slot derived from the declared parameter type.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Display, EnumIter, Serialize, Deserialize)]
pub enum SlotKind {
    Boolean,
    Scalar,
    Vector2,
    Vector3,
    Vector4,
    Matrix2,
    Matrix3,
    Matrix4,
    /// A vector with a width resolved later from connected inputs.
    DynamicVector,
    /// A matrix with a width resolved later from connected inputs.
    DynamicMatrix,
    Texture2D,
    Texture2DArray,
    Texture3D,
    Cubemap,
    Gradient,
    SamplerState,
    /// An opaque value passed through without any shader representation of its own.
    OpaqueState,
}

impl SlotKind {
    /// The concrete value type after applying the resolved dynamic `widths`.
    pub fn concrete_type(self, widths: DynamicWidths) -> ConcreteType {
        match self {
            SlotKind::Boolean => ConcreteType::Boolean,
            SlotKind::Scalar => ConcreteType::Vector1,
            SlotKind::Vector2 => ConcreteType::Vector2,
            SlotKind::Vector3 => ConcreteType::Vector3,
            SlotKind::Vector4 => ConcreteType::Vector4,
            SlotKind::Matrix2 => ConcreteType::Matrix2,
            SlotKind::Matrix3 => ConcreteType::Matrix3,
            SlotKind::Matrix4 => ConcreteType::Matrix4,
            SlotKind::DynamicVector => widths.vector,
            SlotKind::DynamicMatrix => widths.matrix,
            SlotKind::Texture2D => ConcreteType::Texture2D,
            SlotKind::Texture2DArray => ConcreteType::Texture2DArray,
            SlotKind::Texture3D => ConcreteType::Texture3D,
            SlotKind::Cubemap => ConcreteType::Cubemap,
            SlotKind::Gradient => ConcreteType::Gradient,
            SlotKind::SamplerState => ConcreteType::SamplerState,
            SlotKind::OpaqueState => ConcreteType::OpaqueState,
        }
    }

    pub fn is_dynamic(self) -> bool {
        matches!(self, SlotKind::DynamicVector | SlotKind::DynamicMatrix)
    }
}

/// The shader value type of a slot once dynamic widths and bindings are known.
#[derive(
    Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Display, EnumIter, Serialize, Deserialize,
)]
pub enum ConcreteType {
    Boolean,
    Vector1,
    Vector2,
    Vector3,
    Vector4,
    Matrix2,
    Matrix3,
    Matrix4,
    Texture2D,
    Texture2DArray,
    Texture3D,
    Cubemap,
    Gradient,
    SamplerState,
    OpaqueState,
}

impl ConcreteType {
    /// The parameter type in generated code using [PRECISION_TOKEN] for float types.
    pub fn shader_type(self) -> String {
        match self {
            ConcreteType::Boolean | ConcreteType::Vector1 => PRECISION_TOKEN.to_string(),
            ConcreteType::Vector2 => format!("{PRECISION_TOKEN}2"),
            ConcreteType::Vector3 => format!("{PRECISION_TOKEN}3"),
            ConcreteType::Vector4 => format!("{PRECISION_TOKEN}4"),
            ConcreteType::Matrix2 => format!("{PRECISION_TOKEN}2x2"),
            ConcreteType::Matrix3 => format!("{PRECISION_TOKEN}3x3"),
            ConcreteType::Matrix4 => format!("{PRECISION_TOKEN}4x4"),
            ConcreteType::Texture2D => "UnityTexture2D".to_string(),
            ConcreteType::Texture2DArray => "UnityTexture2DArray".to_string(),
            ConcreteType::Texture3D => "UnityTexture3D".to_string(),
            ConcreteType::Cubemap => "UnityTextureCube".to_string(),
            ConcreteType::Gradient => "Gradient".to_string(),
            ConcreteType::SamplerState => "UnitySamplerState".to_string(),
            ConcreteType::OpaqueState => "bool".to_string(),
        }
    }

    /// The number of vector components or matrix rows for numeric types.
    pub fn width(self) -> Option<usize> {
        match self {
            ConcreteType::Vector1 => Some(1),
            ConcreteType::Vector2 | ConcreteType::Matrix2 => Some(2),
            ConcreteType::Vector3 | ConcreteType::Matrix3 => Some(3),
            ConcreteType::Vector4 | ConcreteType::Matrix4 => Some(4),
            _ => None,
        }
    }

    /// The text substituted for `{slot<id>dimension}` placeholders in function bodies.
    pub fn dimension(self) -> Option<&'static str> {
        match self.width()? {
            1 => Some("1"),
            2 => Some("2"),
            3 => Some("3"),
            _ => Some("4"),
        }
    }

    pub fn is_vector(self) -> bool {
        matches!(
            self,
            ConcreteType::Vector1
                | ConcreteType::Vector2
                | ConcreteType::Vector3
                | ConcreteType::Vector4
        )
    }

    pub fn is_matrix(self) -> bool {
        matches!(
            self,
            ConcreteType::Matrix2 | ConcreteType::Matrix3 | ConcreteType::Matrix4
        )
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Display, Serialize, Deserialize)]
pub enum Direction {
    Input,
    Output,
}

/// A single programmable pipeline stage.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Display, EnumIter, Serialize, Deserialize)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// The pipeline stages where a slot is legal.
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy, Display, Serialize, Deserialize)]
pub enum StageCapability {
    Vertex,
    Fragment,
    #[default]
    All,
}

impl StageCapability {
    pub fn supports(self, stage: ShaderStage) -> bool {
        match self {
            StageCapability::Vertex => stage == ShaderStage::Vertex,
            StageCapability::Fragment => stage == ShaderStage::Fragment,
            StageCapability::All => true,
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy, Display, Serialize, Deserialize)]
pub enum ColorMode {
    #[default]
    Default,
    #[serde(alias = "HDR")]
    Hdr,
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum ColorComponents {
    Rgba,
    Rgb,
}

/// How the value of a slot is constructed.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum SlotSource {
    /// A type mapped value with a default used when an input is not connected.
    Value { default: [f32; 4] },
    /// A color input that keeps its component count and color mode.
    Color {
        default: [f32; 4],
        components: ColorComponents,
        mode: ColorMode,
    },
    /// An implicit source like a world space normal that is not user editable.
    Bound(BoundSource),
}

/// A typed and directed parameter of a generated function.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: u32,
    pub kind: SlotKind,
    pub direction: Direction,
    /// The label shown to users like `Uv Offset`.
    pub display_name: SmolStr,
    /// The identifier used in generated code like `uvOffset`.
    pub shader_output_name: SmolStr,
    pub hidden: bool,
    pub stage: StageCapability,
    pub source: SlotSource,
}

/// The parameter derived fields shared by every slot constructor.
#[derive(Debug, PartialEq, Clone)]
pub struct SlotDesc {
    pub id: u32,
    pub display_name: SmolStr,
    pub shader_output_name: SmolStr,
    pub stage: StageCapability,
    pub hidden: bool,
}

impl SlotDesc {
    /// Finish the slot with the given constructor specific fields.
    pub fn into_slot(self, kind: SlotKind, direction: Direction, source: SlotSource) -> Slot {
        Slot {
            id: self.id,
            kind,
            direction,
            display_name: self.display_name,
            shader_output_name: self.shader_output_name,
            hidden: self.hidden,
            stage: self.stage,
            source,
        }
    }
}

impl Slot {
    pub fn is_input(&self) -> bool {
        self.direction == Direction::Input
    }

    pub fn is_output(&self) -> bool {
        self.direction == Direction::Output
    }

    /// The default used for unconnected inputs or `None` for outputs and bound inputs.
    pub fn default_value(&self) -> Option<[f32; 4]> {
        match (&self.source, self.direction) {
            (SlotSource::Value { default }, Direction::Input) => Some(*default),
            (SlotSource::Color { default, .. }, Direction::Input) => Some(*default),
            _ => None,
        }
    }

    pub fn binding(&self) -> Option<Binding> {
        match &self.source {
            SlotSource::Bound(b) => Some(b.binding),
            _ => None,
        }
    }

    /// Dynamic slots with a width resolved from connections.
    /// Bound inputs use the width of their binding instead.
    pub fn is_dynamic(&self) -> bool {
        self.kind.is_dynamic() && matches!(self.source, SlotSource::Value { .. })
    }

    /// Bound inputs are driven by their implicit source unless connected.
    pub fn is_user_editable(&self) -> bool {
        self.is_input() && !matches!(self.source, SlotSource::Bound(_))
    }

    pub fn concrete_type(&self, widths: DynamicWidths) -> ConcreteType {
        match &self.source {
            SlotSource::Bound(bound) => bound.concrete_type(),
            SlotSource::Color {
                components: ColorComponents::Rgba,
                ..
            } => ConcreteType::Vector4,
            SlotSource::Color {
                components: ColorComponents::Rgb,
                ..
            } => ConcreteType::Vector3,
            SlotSource::Value { .. } => self.kind.concrete_type(widths),
        }
    }
}
