//! Width resolution for dynamic dimension slots.
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::slot::{ConcreteType, Slot, SlotKind};

/// The concrete widths shared by all dynamic slots of a node.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct DynamicWidths {
    pub vector: ConcreteType,
    pub matrix: ConcreteType,
}

impl Default for DynamicWidths {
    fn default() -> Self {
        Self {
            vector: ConcreteType::Vector1,
            matrix: ConcreteType::Matrix2,
        }
    }
}

/// Resolve dynamic widths from the concrete types `connected` to input slots by id.
///
/// Scalars promote to any width, so the smallest non scalar width wins for vectors.
/// Matrices always resolve to the smallest connected matrix.
pub fn resolve_dynamic_widths(
    slots: &[Slot],
    connected: &BTreeMap<u32, ConcreteType>,
) -> DynamicWidths {
    let connected_types = |kind: SlotKind| -> BTreeSet<ConcreteType> {
        slots
            .iter()
            .filter(|s| s.is_input() && s.is_dynamic() && s.kind == kind)
            .filter_map(|s| connected.get(&s.id).copied())
            .collect()
    };

    let vectors: BTreeSet<_> = connected_types(SlotKind::DynamicVector)
        .into_iter()
        .filter(|t| t.is_vector())
        .collect();
    let matrices: BTreeSet<_> = connected_types(SlotKind::DynamicMatrix)
        .into_iter()
        .filter(|t| t.is_matrix())
        .collect();

    let defaults = DynamicWidths::default();
    DynamicWidths {
        vector: resolve_vector(&vectors).unwrap_or(defaults.vector),
        matrix: matrices.first().copied().unwrap_or(defaults.matrix),
    }
}

fn resolve_vector(types: &BTreeSet<ConcreteType>) -> Option<ConcreteType> {
    if types.len() == 1 {
        types.first().copied()
    } else {
        // The set is ordered by width.
        types
            .iter()
            .copied()
            .find(|t| *t != ConcreteType::Vector1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{
        binding::{bound_slot, Binding},
        slot::{Direction, SlotDesc, SlotSource, StageCapability},
    };

    fn slot(id: u32, kind: SlotKind, direction: Direction) -> Slot {
        SlotDesc {
            id,
            display_name: "A".into(),
            shader_output_name: "A".into(),
            stage: StageCapability::All,
            hidden: false,
        }
        .into_slot(kind, direction, SlotSource::Value { default: [0.0; 4] })
    }

    fn slots() -> Vec<Slot> {
        vec![
            slot(0, SlotKind::DynamicVector, Direction::Input),
            slot(1, SlotKind::DynamicVector, Direction::Input),
            slot(2, SlotKind::DynamicMatrix, Direction::Input),
            slot(3, SlotKind::DynamicMatrix, Direction::Input),
            slot(4, SlotKind::DynamicVector, Direction::Output),
        ]
    }

    #[test]
    fn unconnected_defaults() {
        assert_eq!(
            DynamicWidths::default(),
            resolve_dynamic_widths(&slots(), &BTreeMap::new())
        );
    }

    #[test]
    fn single_connection() {
        let connected = BTreeMap::from([(1, ConcreteType::Vector3)]);
        assert_eq!(
            ConcreteType::Vector3,
            resolve_dynamic_widths(&slots(), &connected).vector
        );
    }

    #[test]
    fn scalar_promotes() {
        let connected = BTreeMap::from([(0, ConcreteType::Vector1), (1, ConcreteType::Vector4)]);
        assert_eq!(
            ConcreteType::Vector4,
            resolve_dynamic_widths(&slots(), &connected).vector
        );
    }

    #[test]
    fn smallest_vector_wins() {
        let connected = BTreeMap::from([(0, ConcreteType::Vector4), (1, ConcreteType::Vector2)]);
        assert_eq!(
            ConcreteType::Vector2,
            resolve_dynamic_widths(&slots(), &connected).vector
        );
    }

    #[test]
    fn only_scalars() {
        let connected = BTreeMap::from([(0, ConcreteType::Vector1), (1, ConcreteType::Vector1)]);
        assert_eq!(
            ConcreteType::Vector1,
            resolve_dynamic_widths(&slots(), &connected).vector
        );
    }

    #[test]
    fn smallest_matrix_wins() {
        let connected = BTreeMap::from([(2, ConcreteType::Matrix4), (3, ConcreteType::Matrix3)]);
        let widths = resolve_dynamic_widths(&slots(), &connected);
        assert_eq!(ConcreteType::Matrix3, widths.matrix);
        assert_eq!(ConcreteType::Vector1, widths.vector);
    }

    #[test]
    fn output_connections_ignored() {
        let connected = BTreeMap::from([(4, ConcreteType::Vector3)]);
        assert_eq!(
            ConcreteType::Vector1,
            resolve_dynamic_widths(&slots(), &connected).vector
        );
    }

    #[test]
    fn wrong_family_ignored() {
        let connected = BTreeMap::from([(2, ConcreteType::Vector3), (0, ConcreteType::Matrix4)]);
        assert_eq!(
            DynamicWidths::default(),
            resolve_dynamic_widths(&slots(), &connected)
        );
    }

    #[test]
    fn bound_connections_ignored() {
        let mut slots = slots();
        slots.push(bound_slot(
            Binding::MeshUv0,
            SlotKind::DynamicVector,
            SlotDesc {
                id: 5,
                display_name: "UV".into(),
                shader_output_name: "UV".into(),
                stage: StageCapability::All,
                hidden: false,
            },
        ));

        let connected = BTreeMap::from([(5, ConcreteType::Vector2), (0, ConcreteType::Vector3)]);
        assert_eq!(
            ConcreteType::Vector3,
            resolve_dynamic_widths(&slots, &connected).vector
        );
    }
}
