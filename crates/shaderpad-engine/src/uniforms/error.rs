use thiserror::Error;

/// Errors raised while declaring or binding a uniform tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UniformError {
    /// The flattened tree packs to zero elements; wgpu rejects zero-sized uniform bindings.
    #[error("uniform tree is empty; zero-sized uniform buffers cannot be bound")]
    EmptyUniformTree,

    /// A value was assigned to a cell of a different element count.
    #[error("uniform kind mismatch: cell holds {expected} elements, value has {found}")]
    KindMismatch { expected: usize, found: usize },

    /// A cell was assigned an alias of itself.
    #[error("a uniform cannot alias itself")]
    SelfAlias,

    /// The same cell appears at more than one path of a tree.
    #[error("uniform cell at `{0}` already appears earlier in the tree")]
    AliasedCell(String),

    /// A field name is not a valid shader identifier.
    #[error("invalid uniform name `{0}`: expected a shader identifier")]
    InvalidName(String),

    /// A field name appears twice in the same group.
    #[error("duplicate uniform name `{0}`")]
    DuplicateName(String),
}
