//! Conversion of function declarations into ordered slot lists.
use std::collections::BTreeSet;

use log::{debug, warn};
use smol_str::SmolStr;

use crate::{
    binding::bound_slot,
    declaration::{FunctionDeclaration, Parameter, SlotAnnotation},
    error::IntrospectError,
    mapping::{color_slot, type_mapped_slot, DeclaredType},
    slot::{Direction, Slot, SlotDesc},
};

const TEXT_RETURN_TYPES: &[&str] = &["string", "String", "str", "&str"];

/// Validate `declaration` and create its slots sorted by ascending id.
///
/// Any error rejects the entire declaration, so no partial slot list is returned.
pub fn introspect(declaration: &FunctionDeclaration) -> Result<Vec<Slot>, IntrospectError> {
    if !TEXT_RETURN_TYPES.contains(&declaration.return_type.as_str()) {
        return Err(IntrospectError::InvalidReturnType {
            function: declaration.name.clone(),
            return_type: declaration.return_type.clone(),
        });
    }

    let annotated = annotated_parameters(declaration)?;

    let mut slots = annotated
        .into_iter()
        .map(|(parameter, annotation)| create_slot(&declaration.name, parameter, annotation))
        .collect::<Result<Vec<_>, _>>()?;

    // Generated code uses id order regardless of the declared parameter order.
    slots.sort_by_key(|s| s.id);

    debug!(
        "introspected {} slots for function {:?}",
        slots.len(),
        declaration.name
    );
    Ok(slots)
}

fn annotated_parameters(
    declaration: &FunctionDeclaration,
) -> Result<Vec<(&Parameter, &SlotAnnotation)>, IntrospectError> {
    let mut ids = BTreeSet::new();
    declaration
        .parameters
        .iter()
        .map(|p| {
            let annotation =
                p.slot
                    .as_ref()
                    .ok_or_else(|| IntrospectError::MissingSlotAnnotation {
                        function: declaration.name.clone(),
                        parameter: p.name.clone(),
                    })?;
            if !ids.insert(annotation.id) {
                return Err(IntrospectError::DuplicateSlotId {
                    function: declaration.name.clone(),
                    id: annotation.id,
                });
            }
            Ok((p, annotation))
        })
        .collect()
}

fn create_slot(
    function: &str,
    parameter: &Parameter,
    annotation: &SlotAnnotation,
) -> Result<Slot, IntrospectError> {
    let declared = DeclaredType::from_name(&parameter.ty)?;
    let direction = parameter.direction();
    let desc = SlotDesc {
        id: annotation.id,
        display_name: display_name(&parameter.name),
        shader_output_name: parameter.name.clone(),
        stage: annotation.stage,
        hidden: annotation.hidden,
    };
    let default = annotation.default_vector();

    match (annotation.binding, direction) {
        (None, Direction::Input) => {
            match color_slot(declared, default, annotation.color_mode, desc.clone()) {
                Some(slot) => Ok(slot),
                None => Ok(type_mapped_slot(declared, direction, default, desc)),
            }
        }
        (Some(binding), Direction::Output) => {
            warn!(
                "ignoring binding {binding} on output {:?} of function {function:?}",
                parameter.name
            );
            Ok(type_mapped_slot(declared, direction, default, desc))
        }
        (None, Direction::Output) => Ok(type_mapped_slot(declared, direction, default, desc)),
        (Some(binding), Direction::Input) => Ok(bound_slot(binding, declared.slot_kind(), desc)),
    }
}

/// Convert a parameter name like `uvOffset` to a display label like `Uv Offset`.
pub fn display_name(name: &str) -> SmolStr {
    let name = name.strip_prefix("m_").unwrap_or(name);
    let chars: Vec<char> = name.trim_start_matches('_').chars().collect();

    let mut label = String::new();
    for (i, c) in chars.iter().copied().enumerate() {
        if c == '_' {
            if !label.ends_with(' ') {
                label.push(' ');
            }
            continue;
        }

        if i == 0 {
            label.extend(c.to_uppercase());
            continue;
        }

        let prev = chars[i - 1];
        let next = chars.get(i + 1).copied();
        let boundary = (c.is_uppercase() && (prev.is_lowercase() || prev.is_ascii_digit()))
            || (c.is_uppercase() && prev.is_uppercase() && next.is_some_and(|n| n.is_lowercase()))
            || (c.is_ascii_digit() && prev.is_alphabetic());
        if boundary && !label.ends_with(' ') {
            label.push(' ');
        }
        label.push(c);
    }

    label.trim_end().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::{
        binding::Binding,
        declaration::Qualifier,
        dynamic::DynamicWidths,
        slot::{ColorComponents, ConcreteType, SlotKind, SlotSource},
    };

    fn param(name: &str, ty: &str, qualifier: Qualifier, slot: Option<SlotAnnotation>) -> Parameter {
        Parameter {
            name: name.into(),
            ty: ty.into(),
            qualifier,
            slot,
        }
    }

    fn declaration(parameters: Vec<Parameter>) -> FunctionDeclaration {
        FunctionDeclaration {
            name: "Unity_Test".into(),
            return_type: "string".into(),
            is_static: true,
            parameters,
            body: String::new(),
        }
    }

    #[test]
    fn slots_sorted_by_id() {
        let declaration = declaration(vec![
            param("Out", "Vector4", Qualifier::Out, Some(SlotAnnotation::new(2))),
            param("B", "Vector1", Qualifier::In, Some(SlotAnnotation::new(1))),
            param("A", "Vector2", Qualifier::In, Some(SlotAnnotation::new(0))),
        ]);
        let slots = introspect(&declaration).unwrap();

        assert_eq!(
            vec![0, 1, 2],
            slots.iter().map(|s| s.id).collect::<Vec<_>>()
        );
        assert_eq!(
            vec![SlotKind::Vector2, SlotKind::Scalar, SlotKind::Vector4],
            slots.iter().map(|s| s.kind).collect::<Vec<_>>()
        );
        assert_eq!(vec![Some(2), Some(1), Some(0)], declaration.parameter_order());

        let mut sorted = slots.clone();
        sorted.sort_by_key(|s| s.id);
        assert_eq!(slots, sorted);
    }

    #[test]
    fn invalid_return_type() {
        let mut declaration = declaration(Vec::new());
        declaration.return_type = "void".into();
        assert_eq!(
            Err(IntrospectError::InvalidReturnType {
                function: "Unity_Test".into(),
                return_type: "void".into()
            }),
            introspect(&declaration)
        );
    }

    #[test]
    fn missing_slot_annotation() {
        let declaration = declaration(vec![
            param("A", "Vector1", Qualifier::In, Some(SlotAnnotation::new(0))),
            param("B", "Vector1", Qualifier::In, None),
        ]);
        assert_eq!(
            Err(IntrospectError::MissingSlotAnnotation {
                function: "Unity_Test".into(),
                parameter: "B".into()
            }),
            introspect(&declaration)
        );
    }

    #[test]
    fn duplicate_slot_id() {
        let declaration = declaration(vec![
            param("A", "Vector1", Qualifier::In, Some(SlotAnnotation::new(3))),
            param("Out", "Vector1", Qualifier::Out, Some(SlotAnnotation::new(3))),
        ]);
        assert_eq!(
            Err(IntrospectError::DuplicateSlotId {
                function: "Unity_Test".into(),
                id: 3
            }),
            introspect(&declaration)
        );
    }

    #[test]
    fn unsupported_type() {
        let declaration = declaration(vec![param(
            "A",
            "Quaternion",
            Qualifier::In,
            Some(SlotAnnotation::new(0)),
        )]);
        assert_eq!(
            Err(IntrospectError::UnsupportedType("Quaternion".into())),
            introspect(&declaration)
        );
    }

    #[test]
    fn output_ignores_binding() {
        let declaration = declaration(vec![param(
            "Out",
            "Vector3",
            Qualifier::Out,
            Some(SlotAnnotation::with_binding(0, Binding::WorldSpaceNormal)),
        )]);
        let slots = introspect(&declaration).unwrap();
        assert_eq!(None, slots[0].binding());
        assert_eq!(SlotSource::Value { default: [0.0; 4] }, slots[0].source);
    }

    #[test]
    fn bound_input() {
        let mut annotation = SlotAnnotation::with_binding(0, Binding::MeshUv1);
        annotation.hidden = true;
        let declaration = declaration(vec![param("UV", "Vector4", Qualifier::In, Some(annotation))]);
        let slots = introspect(&declaration).unwrap();

        assert_eq!(Some(Binding::MeshUv1), slots[0].binding());
        assert_eq!(None, slots[0].default_value());
        assert!(slots[0].hidden);
        assert!(!slots[0].is_user_editable());
    }

    #[test]
    fn color_without_default() {
        let declaration = declaration(vec![param(
            "Color",
            "Color",
            Qualifier::In,
            Some(SlotAnnotation::new(0)),
        )]);
        let slots = introspect(&declaration).unwrap();

        assert_eq!(Some([0.0; 4]), slots[0].default_value());
        assert!(matches!(
            slots[0].source,
            SlotSource::Color {
                components: ColorComponents::Rgba,
                ..
            }
        ));
        assert_eq!(
            ConcreteType::Vector4,
            slots[0].concrete_type(DynamicWidths::default())
        );
    }

    #[test]
    fn color_output_uses_generic_constructor() {
        let declaration = declaration(vec![param(
            "Out",
            "ColorRGB",
            Qualifier::Out,
            Some(SlotAnnotation::new(0)),
        )]);
        let slots = introspect(&declaration).unwrap();
        assert_eq!(SlotSource::Value { default: [0.0; 4] }, slots[0].source);
        assert_eq!(SlotKind::Vector3, slots[0].kind);
    }

    #[test]
    fn display_names() {
        assert_eq!("Uv Offset", display_name("uvOffset"));
        assert_eq!("Out", display_name("Out"));
        assert_eq!("HDR Color", display_name("HDRColor"));
        assert_eq!("World Space Normal", display_name("worldSpaceNormal"));
        assert_eq!("Strength", display_name("m_Strength"));
        assert_eq!("UV 0", display_name("UV0"));
        assert_eq!("Tile and Offset", display_name("_tile_and_Offset"));
        assert_eq!("", display_name(""));
    }
}
