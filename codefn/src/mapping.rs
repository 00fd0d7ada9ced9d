//! Mapping from declared parameter types to slot kinds.
use std::str::FromStr;

use strum::{Display, EnumIter, EnumString};

use crate::{
    error::IntrospectError,
    slot::{ColorComponents, ColorMode, Direction, Slot, SlotDesc, SlotKind, SlotSource},
};

/// The closed set of parameter types recognized in declarations.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Display, EnumIter, EnumString)]
pub enum DeclaredType {
    Boolean,
    Vector1,
    Vector2,
    Vector3,
    Vector4,
    Color,
    #[strum(serialize = "ColorRGBA")]
    ColorRgba,
    #[strum(serialize = "ColorRGB")]
    ColorRgb,
    Texture2D,
    Texture2DArray,
    Texture3D,
    Cubemap,
    Gradient,
    SamplerState,
    DynamicDimensionVector,
    Matrix4x4,
    Matrix3x3,
    Matrix2x2,
    DynamicDimensionMatrix,
    PropertyConnectionState,
}

impl DeclaredType {
    pub fn from_name(name: &str) -> Result<Self, IntrospectError> {
        DeclaredType::from_str(name).map_err(|_| IntrospectError::UnsupportedType(name.into()))
    }

    pub fn slot_kind(self) -> SlotKind {
        match self {
            DeclaredType::Boolean => SlotKind::Boolean,
            DeclaredType::Vector1 => SlotKind::Scalar,
            DeclaredType::Vector2 => SlotKind::Vector2,
            DeclaredType::Vector3 | DeclaredType::ColorRgb => SlotKind::Vector3,
            DeclaredType::Vector4 | DeclaredType::Color | DeclaredType::ColorRgba => {
                SlotKind::Vector4
            }
            DeclaredType::Texture2D => SlotKind::Texture2D,
            DeclaredType::Texture2DArray => SlotKind::Texture2DArray,
            DeclaredType::Texture3D => SlotKind::Texture3D,
            DeclaredType::Cubemap => SlotKind::Cubemap,
            DeclaredType::Gradient => SlotKind::Gradient,
            DeclaredType::SamplerState => SlotKind::SamplerState,
            DeclaredType::DynamicDimensionVector => SlotKind::DynamicVector,
            DeclaredType::Matrix4x4 => SlotKind::Matrix4,
            DeclaredType::Matrix3x3 => SlotKind::Matrix3,
            DeclaredType::Matrix2x2 => SlotKind::Matrix2,
            DeclaredType::DynamicDimensionMatrix => SlotKind::DynamicMatrix,
            DeclaredType::PropertyConnectionState => SlotKind::OpaqueState,
        }
    }

    /// The component layout for types with a dedicated color constructor.
    pub fn color_components(self) -> Option<ColorComponents> {
        match self {
            DeclaredType::Color | DeclaredType::ColorRgba => Some(ColorComponents::Rgba),
            DeclaredType::ColorRgb => Some(ColorComponents::Rgb),
            _ => None,
        }
    }
}

/// Map a declared type name like `"Vector3"` to its slot kind.
pub fn map_type(declared: &str) -> Result<SlotKind, IntrospectError> {
    DeclaredType::from_name(declared).map(DeclaredType::slot_kind)
}

/// Create a slot with the generic type mapped constructor.
pub fn type_mapped_slot(
    declared: DeclaredType,
    direction: Direction,
    default: [f32; 4],
    desc: SlotDesc,
) -> Slot {
    desc.into_slot(
        declared.slot_kind(),
        direction,
        SlotSource::Value { default },
    )
}

/// Create a color input slot or `None` if `declared` is not a color type.
///
/// RGB colors ignore the alpha component of the default.
pub fn color_slot(
    declared: DeclaredType,
    default: [f32; 4],
    mode: ColorMode,
    desc: SlotDesc,
) -> Option<Slot> {
    let components = declared.color_components()?;
    let default = match components {
        ColorComponents::Rgba => default,
        ColorComponents::Rgb => [default[0], default[1], default[2], 0.0],
    };
    Some(desc.into_slot(
        declared.slot_kind(),
        Direction::Input,
        SlotSource::Color {
            default,
            components,
            mode,
        },
    ))
}
