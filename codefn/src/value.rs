//! Shader expressions for the values passed to input slots.
use log::warn;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::{
    dynamic::DynamicWidths,
    slot::{ColorComponents, ConcreteType, Slot, SlotSource, PRECISION_TOKEN},
};

/// An upstream value connected to an input slot.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// The upstream variable or expression like `_Add_1_Out_2`.
    pub expr: SmolStr,
    pub ty: ConcreteType,
}

/// State for a slot owned by the graph rather than the declaration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct SlotState {
    pub connection: Option<Connection>,
    /// A user set value overriding the declared default.
    pub value: Option<[f32; 4]>,
}

/// The expression passed for the input `slot` in the function call.
///
/// Connections take priority over bindings, and bindings take priority over values.
/// Resource types like textures use `variable` as their property name.
pub fn input_expression(
    slot: &Slot,
    state: Option<&SlotState>,
    widths: DynamicWidths,
    variable: &str,
) -> String {
    let ty = slot.concrete_type(widths);

    if let Some(connection) = state.and_then(|s| s.connection.as_ref()) {
        return adapt(&connection.expr, connection.ty, ty);
    }

    match &slot.source {
        SlotSource::Bound(bound) => bound.expression().to_string(),
        SlotSource::Color {
            default,
            components,
            ..
        } => {
            let value = state.and_then(|s| s.value).unwrap_or(*default);
            match components {
                ColorComponents::Rgba => vector_literal(&value),
                ColorComponents::Rgb => vector_literal(&value[..3]),
            }
        }
        SlotSource::Value { default } => {
            let value = state.and_then(|s| s.value).unwrap_or(*default);
            value_literal(ty, value, variable)
        }
    }
}

/// The literal for an unconnected value of type `ty`.
pub fn value_literal(ty: ConcreteType, value: [f32; 4], variable: &str) -> String {
    match ty {
        ConcreteType::Boolean => (if value[0] != 0.0 { "1" } else { "0" }).to_string(),
        ConcreteType::Vector1 => float_literal(value[0]),
        ConcreteType::Vector2 => vector_literal(&value[..2]),
        ConcreteType::Vector3 => vector_literal(&value[..3]),
        ConcreteType::Vector4 => vector_literal(&value),
        ConcreteType::Matrix2 | ConcreteType::Matrix3 | ConcreteType::Matrix4 => {
            identity_literal(ty)
        }
        ConcreteType::Texture2D => format!("UnityBuildTexture2DStructNoScale({variable})"),
        ConcreteType::Texture2DArray => format!("UnityBuildTexture2DArrayStruct({variable})"),
        ConcreteType::Texture3D => format!("UnityBuildTexture3DStruct({variable})"),
        ConcreteType::Cubemap => format!("UnityBuildTextureCubeStruct({variable})"),
        ConcreteType::SamplerState => {
            "UnityBuildSamplerStateStruct(SamplerState_Linear_Repeat)".to_string()
        }
        ConcreteType::Gradient => default_gradient(),
        ConcreteType::OpaqueState => "false".to_string(),
    }
}

/// Format a float as the shortest literal that parses back to the same value.
///
/// Very large or small magnitudes use exponent form so they are never read as integers.
pub fn float_literal(value: f32) -> String {
    if value.is_finite() {
        let magnitude = value.abs();
        if magnitude >= 1e7 || (magnitude != 0.0 && magnitude < 1e-4) {
            format!("{value:e}")
        } else {
            value.to_string()
        }
    } else {
        warn!("replacing non finite value {value} with 0");
        "0".to_string()
    }
}

/// A vector constructor like `$precision3 (1, 0.5, 0)` or a scalar for a single component.
pub fn vector_literal(values: &[f32]) -> String {
    let components: Vec<_> = values.iter().map(|v| float_literal(*v)).collect();
    match components.len() {
        1 => components[0].clone(),
        n => format!("{PRECISION_TOKEN}{n} ({})", components.join(", ")),
    }
}

fn identity_literal(ty: ConcreteType) -> String {
    let n = ty.width().unwrap_or(4);
    let components: Vec<_> = (0..n * n)
        .map(|i| if i / n == i % n { "1" } else { "0" })
        .collect();
    format!("{} ({})", ty.shader_type(), components.join(", "))
}

fn default_gradient() -> String {
    // Black to white with the remaining keys unused.
    let zero4 = format!("{PRECISION_TOKEN}4(0, 0, 0, 0)");
    let zero2 = format!("{PRECISION_TOKEN}2(0, 0)");
    let mut args = vec![
        "0".to_string(),
        "2".to_string(),
        "2".to_string(),
        zero4.clone(),
        format!("{PRECISION_TOKEN}4(1, 1, 1, 1)"),
    ];
    args.extend(std::iter::repeat(zero4).take(6));
    args.push(format!("{PRECISION_TOKEN}2(1, 0)"));
    args.push(format!("{PRECISION_TOKEN}2(1, 1)"));
    args.extend(std::iter::repeat(zero2).take(6));
    format!("NewGradient({})", args.join(", "))
}

/// Convert `expr` of type `from` to the slot type `to`.
///
/// Scalars broadcast, wider vectors truncate, and narrower vectors pad with zeros.
pub fn adapt(expr: &str, from: ConcreteType, to: ConcreteType) -> String {
    if from == to {
        return expr.to_string();
    }

    match (from.width(), to.width()) {
        (Some(f), Some(t)) if from.is_vector() && to.is_vector() => {
            if f == 1 {
                format!("({expr}.{})", &"xxxx"[..t])
            } else if f > t {
                format!("({expr}.{})", &"xyzw"[..t])
            } else {
                let padding = vec!["0"; t - f].join(", ");
                format!("({PRECISION_TOKEN}{t}({expr}, {padding}))")
            }
        }
        (Some(f), Some(t)) if from.is_matrix() && to.is_matrix() && f > t => {
            format!("(({}){expr})", to.shader_type())
        }
        _ => {
            warn!("no conversion from {from} to {to} for {expr:?}");
            expr.to_string()
        }
    }
}
