//! Implicit sources for input slots that are not exposed as free user inputs.
//!
//! A bound input like a world space normal reads from the interpolated
//! fragment or vertex inputs unless something is connected to it.
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
    error::IntrospectError,
    slot::{ConcreteType, Direction, Slot, SlotDesc, SlotKind, SlotSource},
};

/// The binding tag attached to a parameter annotation.
#[derive(
    Debug,
    PartialEq,
    Eq,
    Hash,
    Clone,
    Copy,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Binding {
    ObjectSpaceNormal,
    ObjectSpaceTangent,
    ObjectSpaceBitangent,
    ObjectSpacePosition,
    ViewSpaceNormal,
    ViewSpaceTangent,
    ViewSpaceBitangent,
    ViewSpacePosition,
    WorldSpaceNormal,
    WorldSpaceTangent,
    WorldSpaceBitangent,
    WorldSpacePosition,
    TangentSpaceNormal,
    TangentSpaceTangent,
    TangentSpaceBitangent,
    TangentSpacePosition,
    AbsoluteWorldSpacePosition,
    #[strum(serialize = "MeshUV0")]
    MeshUv0,
    #[strum(serialize = "MeshUV1")]
    MeshUv1,
    #[strum(serialize = "MeshUV2")]
    MeshUv2,
    #[strum(serialize = "MeshUV3")]
    MeshUv3,
    #[strum(serialize = "MeshUV4")]
    MeshUv4,
    #[strum(serialize = "MeshUV5")]
    MeshUv5,
    #[strum(serialize = "MeshUV6")]
    MeshUv6,
    #[strum(serialize = "MeshUV7")]
    MeshUv7,
    ScreenPosition,
    ObjectSpaceViewDirection,
    ViewSpaceViewDirection,
    WorldSpaceViewDirection,
    TangentSpaceViewDirection,
    VertexColor,
}

impl Binding {
    /// Parse a binding tag like `"WorldSpaceNormal"` or `"MeshUV0"`.
    pub fn from_tag(tag: &str) -> Result<Self, IntrospectError> {
        Binding::from_str(tag).map_err(|_| IntrospectError::UnknownBinding(tag.into()))
    }
}

impl TryFrom<String> for Binding {
    type Error = IntrospectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_tag(&value)
    }
}

#[derive(
    Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Display, Serialize, Deserialize,
)]
pub enum CoordinateSpace {
    Object,
    View,
    World,
    Tangent,
    AbsoluteWorld,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct UvChannel(pub u8);

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum ScreenSpaceType {
    Default,
    Raw,
    Center,
    Tiled,
}

/// The concrete attribute read by a bound slot.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum BoundAttribute {
    Normal(CoordinateSpace),
    Tangent(CoordinateSpace),
    Bitangent(CoordinateSpace),
    Position(CoordinateSpace),
    Uv(UvChannel),
    ScreenPosition(ScreenSpaceType),
    ViewDirection(CoordinateSpace),
    VertexColor,
}

/// A resolved binding with the auxiliary parameter selected by its tag.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct BoundSource {
    pub binding: Binding,
    pub attribute: BoundAttribute,
}

impl BoundSource {
    pub fn concrete_type(&self) -> ConcreteType {
        match self.attribute {
            BoundAttribute::Normal(_)
            | BoundAttribute::Tangent(_)
            | BoundAttribute::Bitangent(_)
            | BoundAttribute::Position(_)
            | BoundAttribute::ViewDirection(_) => ConcreteType::Vector3,
            BoundAttribute::Uv(_)
            | BoundAttribute::ScreenPosition(_)
            | BoundAttribute::VertexColor => ConcreteType::Vector4,
        }
    }

    /// The interpolator field read when the slot is not connected.
    pub fn expression(&self) -> SmolStr {
        match self.attribute {
            BoundAttribute::Normal(space) => format!("IN.{space}SpaceNormal").into(),
            BoundAttribute::Tangent(space) => format!("IN.{space}SpaceTangent").into(),
            BoundAttribute::Bitangent(space) => format!("IN.{space}SpaceBiTangent").into(),
            BoundAttribute::Position(space) => format!("IN.{space}SpacePosition").into(),
            BoundAttribute::Uv(UvChannel(i)) => format!("IN.uv{i}").into(),
            BoundAttribute::ScreenPosition(ty) => match ty {
                ScreenSpaceType::Default => {
                    "float4(IN.ScreenPosition.xy / IN.ScreenPosition.w, 0, 0)".into()
                }
                ScreenSpaceType::Raw => "IN.ScreenPosition".into(),
                ScreenSpaceType::Center => {
                    "float4(IN.ScreenPosition.xy / IN.ScreenPosition.w * 2 - 1, 0, 0)".into()
                }
                ScreenSpaceType::Tiled => {
                    "frac(float4((IN.ScreenPosition.x / IN.ScreenPosition.w * 2 - 1) * _ScreenParams.x / _ScreenParams.y, IN.ScreenPosition.y / IN.ScreenPosition.w * 2 - 1, 0, 0))".into()
                }
            },
            BoundAttribute::ViewDirection(space) => {
                format!("IN.{space}SpaceViewDirection").into()
            }
            BoundAttribute::VertexColor => "IN.VertexColor".into(),
        }
    }
}

/// Select the attribute and auxiliary parameter for `binding`.
pub fn resolve_binding(binding: Binding) -> BoundSource {
    use CoordinateSpace::*;

    let attribute = match binding {
        Binding::ObjectSpaceNormal => BoundAttribute::Normal(Object),
        Binding::ObjectSpaceTangent => BoundAttribute::Tangent(Object),
        Binding::ObjectSpaceBitangent => BoundAttribute::Bitangent(Object),
        Binding::ObjectSpacePosition => BoundAttribute::Position(Object),
        Binding::ViewSpaceNormal => BoundAttribute::Normal(View),
        Binding::ViewSpaceTangent => BoundAttribute::Tangent(View),
        Binding::ViewSpaceBitangent => BoundAttribute::Bitangent(View),
        Binding::ViewSpacePosition => BoundAttribute::Position(View),
        Binding::WorldSpaceNormal => BoundAttribute::Normal(World),
        Binding::WorldSpaceTangent => BoundAttribute::Tangent(World),
        Binding::WorldSpaceBitangent => BoundAttribute::Bitangent(World),
        Binding::WorldSpacePosition => BoundAttribute::Position(World),
        Binding::TangentSpaceNormal => BoundAttribute::Normal(Tangent),
        Binding::TangentSpaceTangent => BoundAttribute::Tangent(Tangent),
        Binding::TangentSpaceBitangent => BoundAttribute::Bitangent(Tangent),
        Binding::TangentSpacePosition => BoundAttribute::Position(Tangent),
        Binding::AbsoluteWorldSpacePosition => BoundAttribute::Position(AbsoluteWorld),
        Binding::MeshUv0 => BoundAttribute::Uv(UvChannel(0)),
        Binding::MeshUv1 => BoundAttribute::Uv(UvChannel(1)),
        Binding::MeshUv2 => BoundAttribute::Uv(UvChannel(2)),
        Binding::MeshUv3 => BoundAttribute::Uv(UvChannel(3)),
        Binding::MeshUv4 => BoundAttribute::Uv(UvChannel(4)),
        Binding::MeshUv5 => BoundAttribute::Uv(UvChannel(5)),
        Binding::MeshUv6 => BoundAttribute::Uv(UvChannel(6)),
        Binding::MeshUv7 => BoundAttribute::Uv(UvChannel(7)),
        Binding::ScreenPosition => BoundAttribute::ScreenPosition(ScreenSpaceType::Default),
        Binding::ObjectSpaceViewDirection => BoundAttribute::ViewDirection(Object),
        Binding::ViewSpaceViewDirection => BoundAttribute::ViewDirection(View),
        Binding::WorldSpaceViewDirection => BoundAttribute::ViewDirection(World),
        Binding::TangentSpaceViewDirection => BoundAttribute::ViewDirection(Tangent),
        Binding::VertexColor => BoundAttribute::VertexColor,
    };

    BoundSource { binding, attribute }
}

/// Create a bound input slot.
/// The declared `kind` is kept for the slot while the binding determines the concrete type.
pub fn bound_slot(binding: Binding, kind: SlotKind, desc: SlotDesc) -> Slot {
    desc.into_slot(
        kind,
        Direction::Input,
        SlotSource::Bound(resolve_binding(binding)),
    )
}
