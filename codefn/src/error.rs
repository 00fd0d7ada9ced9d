use smol_str::SmolStr;
use thiserror::Error;

/// Errors in the authored [FunctionDeclaration](crate::declaration::FunctionDeclaration).
///
/// These are structural and deterministic, so the declaration cannot produce
/// any slots or generated code until the author fixes it.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum IntrospectError {
    #[error("parameter type {0:?} has no slot mapping")]
    UnsupportedType(SmolStr),

    #[error("parameter {parameter:?} of function {function:?} is missing a slot annotation")]
    MissingSlotAnnotation {
        function: SmolStr,
        parameter: SmolStr,
    },

    #[error("slot id {id} is used by more than one parameter of function {function:?}")]
    DuplicateSlotId { function: SmolStr, id: u32 },

    #[error("binding {0:?} is not a recognized slot binding")]
    UnknownBinding(SmolStr),

    #[error("function {function:?} returns {return_type:?} instead of shader code text")]
    InvalidReturnType {
        function: SmolStr,
        return_type: SmolStr,
    },
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum NodeError {
    #[error("error introspecting function declaration")]
    Introspect(#[from] IntrospectError),

    #[error("node has no slot with id {0}")]
    UnknownSlot(u32),

    #[error("slot {0} is an output and cannot take an input value")]
    NotAnInput(u32),

    #[error("slot {0} is bound to an implicit source and has no user value")]
    BoundInput(u32),
}
