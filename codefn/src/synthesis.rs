//! Generation of shader function text from an ordered slot list.
//!
//! The synthesized function for a declaration `Unity_Add` with dynamic vector slots looks like
//! ```hlsl
//! void Unity_Add_$precision3($precision3 A, $precision3 B, out $precision3 Out)
//! {
//!     Out = A + B;
//! }
//! ```
//! with a call like `Unity_Add_$precision3(_A_0, $precision3 (0, 0, 0), _Add_1_Out_2)`.
use std::collections::BTreeMap;

use log::{debug, warn};

use crate::{
    declaration::FunctionDeclaration,
    dynamic::DynamicWidths,
    slot::{Slot, SlotKind, PRECISION_TOKEN},
    value::{input_expression, SlotState},
};

/// Derives generated code for one declaration instance.
///
/// Slots are always visited in ascending id order.
/// None of the methods modify the slots.
#[derive(Debug)]
pub struct Synthesizer<'a> {
    declaration: &'a FunctionDeclaration,
    instance: &'a str,
    slots: Vec<&'a Slot>,
    widths: DynamicWidths,
}

impl<'a> Synthesizer<'a> {
    pub fn new(
        declaration: &'a FunctionDeclaration,
        instance: &'a str,
        slots: &'a [Slot],
        widths: DynamicWidths,
    ) -> Self {
        let mut slots: Vec<_> = slots.iter().collect();
        slots.sort_by_key(|s| s.id);
        Self {
            declaration,
            instance,
            slots,
            widths,
        }
    }

    /// The generated function name like `Unity_Add_$precision3`.
    ///
    /// Non static declarations include the instance to avoid collisions between nodes.
    pub fn function_name(&self) -> String {
        let mut name = self.declaration.name.to_string();
        if !self.declaration.is_static {
            name.push('_');
            name.push_str(&instance_suffix(self.instance));
        }
        name.push('_');
        name.push_str(PRECISION_TOKEN);

        for kind in [SlotKind::DynamicVector, SlotKind::DynamicMatrix] {
            if let Some(dimension) = self
                .slots
                .iter()
                .find(|s| s.kind == kind && s.is_dynamic())
                .and_then(|s| s.concrete_type(self.widths).dimension())
            {
                name.push_str(dimension);
            }
        }
        name
    }

    /// The function signature like `void Name($precision A, out $precision3 Out)`.
    pub fn function_header(&self) -> String {
        let parameters: Vec<_> = self
            .slots
            .iter()
            .map(|s| {
                let out = if s.is_output() { "out " } else { "" };
                format!(
                    "{out}{} {}",
                    s.concrete_type(self.widths).shader_type(),
                    s.shader_output_name
                )
            })
            .collect();
        format!("void {}({})", self.function_name(), parameters.join(", "))
    }

    /// The call expression without a trailing semicolon.
    ///
    /// Inputs pass their connected, bound, or default values.
    /// Outputs pass the variables declared by the owning node.
    pub fn function_call(&self, states: &BTreeMap<u32, SlotState>) -> String {
        let node = self.node_variable_name();
        let arguments: Vec<_> = self
            .slots
            .iter()
            .map(|s| {
                let variable = slot_variable_name(&node, s);
                if s.is_input() {
                    input_expression(s, states.get(&s.id), self.widths, &variable)
                } else {
                    variable
                }
            })
            .collect();
        format!("{}({})", self.function_name(), arguments.join(", "))
    }

    /// The body text with `{slot<id>dimension}` placeholders replaced.
    ///
    /// Placeholders for unknown slots are left unchanged.
    pub fn function_body(&self) -> String {
        let mut body = self.declaration.body.replace("\r\n", "\n").replace('\r', "\n");

        for slot in &self.slots {
            let placeholder = format!("{{slot{}dimension}}", slot.id);
            if !body.contains(&placeholder) {
                continue;
            }
            match slot.concrete_type(self.widths).dimension() {
                Some(dimension) => body = body.replace(&placeholder, dimension),
                None => warn!(
                    "slot {} of function {:?} has no dimension for {placeholder}",
                    slot.id, self.declaration.name
                ),
            }
        }

        for placeholder in unresolved_placeholders(&body) {
            debug!(
                "leaving placeholder {placeholder} in function {:?}",
                self.declaration.name
            );
        }

        body.trim().to_string()
    }

    /// The complete function definition with the header followed by the body.
    pub fn function_definition(&self) -> String {
        format!("{}\n{}", self.function_header(), self.function_body())
    }

    /// The identifier for this node instance used as a prefix for slot variables.
    pub fn node_variable_name(&self) -> String {
        format!(
            "{}_{}",
            hlsl_safe_name(&self.declaration.name),
            instance_suffix(self.instance)
        )
    }

    /// The variable written by the output slot with the given `id`.
    pub fn output_variable_name(&self, id: u32) -> Option<String> {
        let node = self.node_variable_name();
        self.slots
            .iter()
            .find(|s| s.id == id && s.is_output())
            .map(|s| slot_variable_name(&node, s))
    }

    /// Declarations for each output variable followed by the function call statement.
    pub fn node_code(&self, states: &BTreeMap<u32, SlotState>) -> String {
        let node = self.node_variable_name();
        let mut code = String::new();
        for slot in self.slots.iter().filter(|s| s.is_output()) {
            code.push_str(&format!(
                "{} {};\n",
                slot.concrete_type(self.widths).shader_type(),
                slot_variable_name(&node, slot)
            ));
        }
        code.push_str(&self.function_call(states));
        code.push(';');
        code
    }
}

/// The generated variable for a slot like `_Add_1_Out_2`.
pub fn slot_variable_name(node: &str, slot: &Slot) -> String {
    format!(
        "_{node}_{}_{}",
        hlsl_safe_name(&slot.shader_output_name),
        slot.id
    )
}

/// Replace characters that are not valid in shader identifiers.
pub fn hlsl_safe_name(name: &str) -> String {
    let mut safe: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if safe.is_empty() || safe.starts_with(|c: char| c.is_ascii_digit()) {
        safe.insert(0, '_');
    }
    safe
}

/// Encode an instance id for use after an identifier prefix.
///
/// ASCII alphanumerics are kept and every other character is written as `_<hex>_`,
/// so distinct instances never share a suffix.
pub fn instance_suffix(instance: &str) -> String {
    let mut suffix = String::new();
    for c in instance.chars() {
        if c.is_ascii_alphanumeric() {
            suffix.push(c);
        } else {
            suffix.push_str(&format!("_{:x}_", c as u32));
        }
    }
    suffix
}

fn unresolved_placeholders(body: &str) -> Vec<&str> {
    let mut placeholders = Vec::new();
    let mut rest = body;
    while let Some(start) = rest.find("{slot") {
        let candidate = &rest[start..];
        match candidate.find('}') {
            Some(end) => {
                let inner = &candidate[5..end];
                if let Some(id) = inner.strip_suffix("dimension") {
                    if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
                        placeholders.push(&candidate[..=end]);
                    }
                }
                rest = &candidate[end + 1..];
            }
            None => break,
        }
    }
    placeholders
}
