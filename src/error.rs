/// Why `KeyedSet::try_add` did not store a value. The silent `add` ignores
/// these; they exist for callers that want to know.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddError {
    #[error("value is outside the key policy's domain")]
    Unsupported,
    #[error("derived key was rejected by the key policy")]
    Rejected,
    #[error("a member with the same key is already present")]
    Duplicate,
}
