use crate::error::StoreError;
use crate::models::{Task, TaskId, TaskRecord};

/// Owns the ordered task collection. Every mutation either fully applies or
/// leaves the list untouched; bounds are checked before anything moves.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    next_id: u64,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the list from persisted records, assigning fresh ids in
    /// display order.
    pub fn from_records(records: Vec<TaskRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            let id = store.fresh_id();
            store.tasks.push(Task {
                id,
                text: record.text,
                completed: record.completed,
            });
        }
        store
    }

    /// Projects the list into its persisted shape, in display order.
    pub fn records(&self) -> Vec<TaskRecord> {
        self.tasks.iter().map(TaskRecord::from).collect()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Translates a display index into a stable id. This is the only place a
    /// row index is interpreted against the list.
    pub fn id_at(&self, index: usize) -> Result<TaskId, StoreError> {
        self.tasks
            .get(index)
            .map(|task| task.id)
            .ok_or(StoreError::IndexOutOfBounds {
                index,
                len: self.tasks.len(),
            })
    }

    pub fn index_of(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Appends a task with the trimmed text. Blank input is an explicit
    /// silent no-op, not an error; callers learn nothing was added from the
    /// `None`.
    pub fn add(&mut self, text: &str) -> Option<TaskId> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let id = self.fresh_id();
        self.tasks.push(Task {
            id,
            text: trimmed.to_string(),
            completed: false,
        });
        Some(id)
    }

    /// Flips the completion flag on that task only.
    pub fn toggle(&mut self, id: TaskId) -> Result<(), StoreError> {
        let task = self.get_mut(id)?;
        task.completed = !task.completed;
        Ok(())
    }

    /// Replaces the task text with the trimmed input. A blank replacement
    /// retains the existing text; `Ok(false)` reports that nothing changed.
    pub fn edit(&mut self, id: TaskId, new_text: &str) -> Result<bool, StoreError> {
        let task = self.get_mut(id)?;
        let trimmed = new_text.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }
        task.text = trimmed.to_string();
        Ok(true)
    }

    /// Removes the task; rows after it shift down by one.
    pub fn remove(&mut self, id: TaskId) -> Result<Task, StoreError> {
        let index = self.index_of(id).ok_or(StoreError::UnknownTask(id))?;
        Ok(self.tasks.remove(index))
    }

    /// Moves the task so it lands at `to_index` counted against the list
    /// after removal (the drop resolver's contract). An index past the end
    /// clamps to the end; `Ok(false)` means the task already sat there.
    pub fn move_to(&mut self, id: TaskId, to_index: usize) -> Result<bool, StoreError> {
        let from = self.index_of(id).ok_or(StoreError::UnknownTask(id))?;
        let to = to_index.min(self.tasks.len() - 1);
        if to == from {
            return Ok(false);
        }
        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        Ok(true)
    }

    fn fresh_id(&mut self) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        id
    }

    fn get_mut(&mut self, id: TaskId) -> Result<&mut Task, StoreError> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(StoreError::UnknownTask(id))
    }
}
