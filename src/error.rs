use crate::models::TaskId;

/// A store operation referenced a row that does not exist. Under correct UI
/// wiring this never happens; the store guards anyway so a stale index can
/// not corrupt the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    IndexOutOfBounds { index: usize, len: usize },
    UnknownTask(TaskId),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for list of {len}")
            }
            StoreError::UnknownTask(id) => write!(f, "no task with id {id}"),
        }
    }
}

impl std::error::Error for StoreError {}
