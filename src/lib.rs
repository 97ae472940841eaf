//! Persistence-and-reorder core for a client-resident task list.
//!
//! The host event layer translates platform events (clicks, drag events)
//! into calls on [`SyncController`]; the controller keeps the in-memory
//! list, the persisted state, and the rendered view in step after every
//! mutation.

mod error;
pub mod logging;
mod models;
mod reorder;
mod storage;
mod store;
mod sync;

pub use error::StoreError;
pub use models::{Task, TaskId, TaskRecord, ThemePreference};
pub use reorder::{insertion_index, DragGesture, ItemBox};
pub use storage::{Storage, StorageError};
pub use store::TaskStore;
pub use sync::{SyncController, ViewCtx};
