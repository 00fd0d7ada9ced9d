//! A graph node generated from a function declaration.
//!
//! The node owns the declaration and its introspected slots
//! as well as the per slot state set by the graph like connections.
use std::collections::{BTreeMap, BTreeSet};

use log::error;
use smol_str::SmolStr;

use crate::{
    binding::{BoundAttribute, CoordinateSpace, UvChannel},
    declaration::FunctionDeclaration,
    dynamic::{resolve_dynamic_widths, DynamicWidths},
    error::NodeError,
    introspect::introspect,
    slot::{ConcreteType, ShaderStage, Slot, SlotSource},
    synthesis::Synthesizer,
    value::{Connection, SlotState},
};

/// A code function node instance.
#[derive(Debug, PartialEq, Clone)]
pub struct CodeFunctionNode {
    instance: SmolStr,
    declaration: FunctionDeclaration,
    slots: Vec<Slot>,
    states: BTreeMap<u32, SlotState>,
}

/// Interpolated values a node may read from the vertex or fragment inputs.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum RequirementKind {
    Normal,
    Tangent,
    Bitangent,
    Position,
    ViewDirection,
    MeshUv(UvChannel),
    ScreenPosition,
    VertexColor,
}

/// The result of a [CodeFunctionNode::requirement] query.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Requirement {
    /// The coordinate spaces needed for a spatial attribute.
    Spaces(BTreeSet<CoordinateSpace>),
    Flag(bool),
}

impl Requirement {
    pub fn is_required(&self) -> bool {
        match self {
            Requirement::Spaces(spaces) => !spaces.is_empty(),
            Requirement::Flag(required) => *required,
        }
    }
}

impl CodeFunctionNode {
    /// Create a node for `declaration` with a unique `instance` identifier.
    pub fn new(
        instance: impl Into<SmolStr>,
        declaration: FunctionDeclaration,
    ) -> Result<Self, NodeError> {
        let instance = instance.into();
        let slots = introspect(&declaration).inspect_err(|e| {
            error!("error creating node {instance:?}: {e}");
        })?;
        Ok(Self {
            instance,
            declaration,
            slots,
            states: BTreeMap::new(),
        })
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn declaration(&self) -> &FunctionDeclaration {
        &self.declaration
    }

    /// The slots in ascending id order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, id: u32) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id == id)
    }

    pub fn state(&self, id: u32) -> Option<&SlotState> {
        self.states.get(&id)
    }

    /// Replace the declaration and refresh the slots.
    ///
    /// The node is unchanged if the new declaration is invalid.
    pub fn set_declaration(&mut self, declaration: FunctionDeclaration) -> Result<(), NodeError> {
        let slots = introspect(&declaration).inspect_err(|e| {
            error!("error updating node {:?}: {e}", self.instance);
        })?;
        self.declaration = declaration;
        self.replace_slots(slots);
        Ok(())
    }

    /// Introspect the current declaration again and replace the slot list.
    pub fn refresh(&mut self) -> Result<(), NodeError> {
        let slots = introspect(&self.declaration).inspect_err(|e| {
            error!("error refreshing node {:?}: {e}", self.instance);
        })?;
        self.replace_slots(slots);
        Ok(())
    }

    fn replace_slots(&mut self, slots: Vec<Slot>) {
        // State is kept for slots with the same id and dropped for stale slots.
        self.states.retain(|id, state| match slots.iter().find(|s| s.id == *id) {
            Some(slot) if slot.is_input() => {
                if !slot.is_user_editable() {
                    state.value = None;
                }
                state != &SlotState::default()
            }
            _ => false,
        });
        self.slots = slots;
    }

    fn input_state(&mut self, id: u32) -> Result<&mut SlotState, NodeError> {
        let slot = self.slot(id).ok_or(NodeError::UnknownSlot(id))?;
        if !slot.is_input() {
            return Err(NodeError::NotAnInput(id));
        }
        Ok(self.states.entry(id).or_default())
    }

    /// Connect an upstream value to the input slot with the given `id`.
    pub fn connect(&mut self, id: u32, connection: Connection) -> Result<(), NodeError> {
        self.input_state(id)?.connection = Some(connection);
        Ok(())
    }

    /// Remove the connection for the input slot with the given `id` if present.
    pub fn disconnect(&mut self, id: u32) -> Result<Option<Connection>, NodeError> {
        let state = self.input_state(id)?;
        let connection = state.connection.take();
        if self.states.get(&id) == Some(&SlotState::default()) {
            self.states.remove(&id);
        }
        Ok(connection)
    }

    /// Set the user value for an unbound input slot.
    pub fn set_value(&mut self, id: u32, value: [f32; 4]) -> Result<(), NodeError> {
        let slot = self.slot(id).ok_or(NodeError::UnknownSlot(id))?;
        if slot.is_input() && !slot.is_user_editable() {
            return Err(NodeError::BoundInput(id));
        }
        self.input_state(id)?.value = Some(value);
        Ok(())
    }

    /// The concrete types connected to each input slot by id.
    pub fn connected_types(&self) -> BTreeMap<u32, ConcreteType> {
        self.states
            .iter()
            .filter_map(|(id, s)| s.connection.as_ref().map(|c| (*id, c.ty)))
            .collect()
    }

    pub fn dynamic_widths(&self) -> DynamicWidths {
        resolve_dynamic_widths(&self.slots, &self.connected_types())
    }

    pub fn synthesizer(&self) -> Synthesizer<'_> {
        Synthesizer::new(
            &self.declaration,
            &self.instance,
            &self.slots,
            self.dynamic_widths(),
        )
    }

    pub fn function_name(&self) -> String {
        self.synthesizer().function_name()
    }

    pub fn function_header(&self) -> String {
        self.synthesizer().function_header()
    }

    pub fn function_call(&self) -> String {
        self.synthesizer().function_call(&self.states)
    }

    pub fn function_body(&self) -> String {
        self.synthesizer().function_body()
    }

    pub fn function_definition(&self) -> String {
        self.synthesizer().function_definition()
    }

    /// Output variable declarations and the call statement for this node.
    pub fn generate_code(&self) -> String {
        self.synthesizer().node_code(&self.states)
    }

    /// Find what this node reads from the interpolated inputs for `stage`.
    ///
    /// Only unconnected bound inputs legal in `stage` contribute.
    pub fn requirement(&self, kind: RequirementKind, stage: ShaderStage) -> Requirement {
        let attributes = self
            .slots
            .iter()
            .filter(|s| s.is_input() && s.stage.supports(stage))
            .filter(|s| {
                self.states
                    .get(&s.id)
                    .is_none_or(|state| state.connection.is_none())
            })
            .filter_map(|s| match &s.source {
                SlotSource::Bound(bound) => Some(bound.attribute),
                _ => None,
            });

        match kind {
            RequirementKind::Normal => spaces(attributes, |a| match a {
                BoundAttribute::Normal(space) => Some(space),
                _ => None,
            }),
            RequirementKind::Tangent => spaces(attributes, |a| match a {
                BoundAttribute::Tangent(space) => Some(space),
                _ => None,
            }),
            RequirementKind::Bitangent => spaces(attributes, |a| match a {
                BoundAttribute::Bitangent(space) => Some(space),
                _ => None,
            }),
            RequirementKind::Position => spaces(attributes, |a| match a {
                BoundAttribute::Position(space) => Some(space),
                _ => None,
            }),
            RequirementKind::ViewDirection => spaces(attributes, |a| match a {
                BoundAttribute::ViewDirection(space) => Some(space),
                _ => None,
            }),
            RequirementKind::MeshUv(channel) => Requirement::Flag(
                attributes
                    .into_iter()
                    .any(|a| a == BoundAttribute::Uv(channel)),
            ),
            RequirementKind::ScreenPosition => Requirement::Flag(
                attributes
                    .into_iter()
                    .any(|a| matches!(a, BoundAttribute::ScreenPosition(_))),
            ),
            RequirementKind::VertexColor => Requirement::Flag(
                attributes
                    .into_iter()
                    .any(|a| a == BoundAttribute::VertexColor),
            ),
        }
    }
}

fn spaces(
    attributes: impl Iterator<Item = BoundAttribute>,
    space: impl Fn(BoundAttribute) -> Option<CoordinateSpace>,
) -> Requirement {
    Requirement::Spaces(attributes.filter_map(space).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::{
        binding::Binding,
        declaration::{Parameter, Qualifier, SlotAnnotation},
        error::IntrospectError,
        slot::StageCapability,
    };

    fn param(name: &str, ty: &str, qualifier: Qualifier, slot: SlotAnnotation) -> Parameter {
        Parameter {
            name: name.into(),
            ty: ty.into(),
            qualifier,
            slot: Some(slot),
        }
    }

    fn normal_strength() -> FunctionDeclaration {
        let mut uv = SlotAnnotation::with_binding(2, Binding::MeshUv1);
        uv.stage = StageCapability::Fragment;
        FunctionDeclaration {
            name: "Unity_NormalStrength".into(),
            return_type: "string".into(),
            is_static: false,
            parameters: vec![
                param(
                    "In",
                    "DynamicDimensionVector",
                    Qualifier::In,
                    SlotAnnotation::new(0),
                ),
                param(
                    "Normal",
                    "Vector3",
                    Qualifier::In,
                    SlotAnnotation::with_binding(1, Binding::WorldSpaceNormal),
                ),
                param("UV", "Vector4", Qualifier::In, uv),
                param(
                    "Strength",
                    "Vector1",
                    Qualifier::In,
                    SlotAnnotation::with_default(3, &[1.0]),
                ),
                param(
                    "Out",
                    "DynamicDimensionVector",
                    Qualifier::Out,
                    SlotAnnotation::new(4),
                ),
            ],
            body: "{ Out = In * Strength; }".to_string(),
        }
    }

    fn connection(expr: &str, ty: ConcreteType) -> Connection {
        Connection {
            expr: expr.into(),
            ty,
        }
    }

    #[test]
    fn invalid_declaration() {
        let mut declaration = normal_strength();
        declaration.parameters[3].slot = Some(SlotAnnotation::new(0));
        assert_eq!(
            Err(NodeError::Introspect(IntrospectError::DuplicateSlotId {
                function: "Unity_NormalStrength".into(),
                id: 0
            })),
            CodeFunctionNode::new("1", declaration)
        );
    }

    #[test]
    fn connect_resolves_dynamic_width() {
        let mut node = CodeFunctionNode::new("1", normal_strength()).unwrap();
        node.connect(0, connection("_Split_2_RGB_5", ConcreteType::Vector3))
            .unwrap();

        assert_eq!(ConcreteType::Vector3, node.dynamic_widths().vector);
        assert_eq!("Unity_NormalStrength_1_$precision3", node.function_name());
        assert_eq!(
            "Unity_NormalStrength_1_$precision3(_Split_2_RGB_5, IN.WorldSpaceNormal, IN.uv1, 1, _Unity_NormalStrength_1_Out_4)",
            node.function_call()
        );
    }

    #[test]
    fn connection_errors() {
        let mut node = CodeFunctionNode::new("1", normal_strength()).unwrap();
        assert_eq!(
            Err(NodeError::UnknownSlot(9)),
            node.connect(9, connection("x", ConcreteType::Vector1))
        );
        assert_eq!(
            Err(NodeError::NotAnInput(4)),
            node.connect(4, connection("x", ConcreteType::Vector1))
        );
        assert_eq!(Err(NodeError::BoundInput(1)), node.set_value(1, [0.0; 4]));
        assert_eq!(Err(NodeError::NotAnInput(4)), node.set_value(4, [0.0; 4]));
    }

    #[test]
    fn disconnect_returns_connection() {
        let mut node = CodeFunctionNode::new("1", normal_strength()).unwrap();
        node.connect(0, connection("x", ConcreteType::Vector2)).unwrap();
        assert_eq!(
            Ok(Some(connection("x", ConcreteType::Vector2))),
            node.disconnect(0)
        );
        assert_eq!(None, node.state(0));
        assert_eq!(Ok(None), node.disconnect(0));
    }

    #[test]
    fn refresh_merges_state_by_id() {
        let mut node = CodeFunctionNode::new("1", normal_strength()).unwrap();
        node.connect(0, connection("x", ConcreteType::Vector2)).unwrap();
        node.set_value(3, [0.5, 0.0, 0.0, 0.0]).unwrap();

        // Remove the strength parameter and bind the first input.
        let mut declaration = normal_strength();
        declaration.parameters.remove(3);
        declaration.parameters[0].slot =
            Some(SlotAnnotation::with_binding(0, Binding::ObjectSpacePosition));
        declaration.parameters[0].ty = "Vector3".into();
        node.set_declaration(declaration).unwrap();

        assert_eq!(vec![0, 1, 2, 4], node.slots().iter().map(|s| s.id).collect::<Vec<_>>());
        assert_eq!(
            Some(&SlotState {
                connection: Some(connection("x", ConcreteType::Vector2)),
                value: None
            }),
            node.state(0)
        );
        assert_eq!(None, node.state(3));
    }

    #[test]
    fn refresh_keeps_user_values() {
        let mut node = CodeFunctionNode::new("1", normal_strength()).unwrap();
        node.set_value(3, [0.5, 0.0, 0.0, 0.0]).unwrap();
        node.refresh().unwrap();
        assert_eq!(Some([0.5, 0.0, 0.0, 0.0]), node.state(3).and_then(|s| s.value));
        assert!(node.function_call().contains(", 0.5, "));
    }

    #[test]
    fn invalid_update_keeps_node() {
        let mut node = CodeFunctionNode::new("1", normal_strength()).unwrap();
        let before = node.clone();

        let mut declaration = normal_strength();
        declaration.parameters[1].slot = None;
        assert!(matches!(
            node.set_declaration(declaration),
            Err(NodeError::Introspect(
                IntrospectError::MissingSlotAnnotation { .. }
            ))
        ));
        assert_eq!(before, node);
    }

    #[test]
    fn requirements() {
        let mut node = CodeFunctionNode::new("1", normal_strength()).unwrap();

        assert_eq!(
            Requirement::Spaces(BTreeSet::from([CoordinateSpace::World])),
            node.requirement(RequirementKind::Normal, ShaderStage::Fragment)
        );
        assert!(!node
            .requirement(RequirementKind::Tangent, ShaderStage::Fragment)
            .is_required());
        assert_eq!(
            Requirement::Flag(true),
            node.requirement(RequirementKind::MeshUv(UvChannel(1)), ShaderStage::Fragment)
        );
        assert_eq!(
            Requirement::Flag(false),
            node.requirement(RequirementKind::MeshUv(UvChannel(0)), ShaderStage::Fragment)
        );

        // The UV slot is only legal in the fragment stage.
        assert_eq!(
            Requirement::Flag(false),
            node.requirement(RequirementKind::MeshUv(UvChannel(1)), ShaderStage::Vertex)
        );

        // Connected bound inputs no longer read the implicit source.
        node.connect(1, connection("n", ConcreteType::Vector3)).unwrap();
        assert!(!node
            .requirement(RequirementKind::Normal, ShaderStage::Fragment)
            .is_required());
    }
}
