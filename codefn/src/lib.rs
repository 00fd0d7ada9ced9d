//! # codefn
//! codefn compiles typed shader function declarations into shader graph nodes.
//!
//! A [FunctionDeclaration](declaration::FunctionDeclaration) lists the parameters
//! of a function along with the slot annotation for each parameter
//! and the literal shader code for the body.
//! [introspect](introspect::introspect) validates the declaration
//! and creates the typed input and output [Slot](slot::Slot) list for the node.
//! The [Synthesizer](synthesis::Synthesizer) generates the function header, body, and call
//! used by the host when assembling the final shader.
//!
//! Most applications should use [CodeFunctionNode](node::CodeFunctionNode),
//! which also tracks connections and resolves dynamic dimensions.
//!
//! ```rust
//! use codefn::declaration::{FunctionDeclaration, Parameter, Qualifier, SlotAnnotation};
//! use codefn::node::CodeFunctionNode;
//!
//! let declaration = FunctionDeclaration {
//!     name: "Unity_OneMinus".into(),
//!     return_type: "string".into(),
//!     is_static: true,
//!     parameters: vec![
//!         Parameter {
//!             name: "In".into(),
//!             ty: "Vector1".into(),
//!             qualifier: Qualifier::In,
//!             slot: Some(SlotAnnotation::with_default(0, &[0.25])),
//!         },
//!         Parameter {
//!             name: "Out".into(),
//!             ty: "Vector1".into(),
//!             qualifier: Qualifier::Out,
//!             slot: Some(SlotAnnotation::new(1)),
//!         },
//!     ],
//!     body: "{ Out = 1 - In; }".to_string(),
//! };
//!
//! let node = CodeFunctionNode::new("1", declaration).unwrap();
//! assert_eq!(
//!     "void Unity_OneMinus_$precision($precision In, out $precision Out)",
//!     node.function_header()
//! );
//! assert_eq!(
//!     "Unity_OneMinus_$precision(0.25, _Unity_OneMinus_1_Out_1)",
//!     node.function_call()
//! );
//! ```

pub mod binding;
pub mod declaration;
pub mod dynamic;
pub mod error;
pub mod introspect;
pub mod mapping;
pub mod node;
pub mod registry;
pub mod slot;
pub mod synthesis;
pub mod value;
