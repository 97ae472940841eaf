use crate::error::StoreError;
use crate::models::{Task, ThemePreference};
use crate::reorder::{DragGesture, ItemBox};
use crate::storage::Storage;
use crate::store::TaskStore;

/// What the host view must provide. The crate never touches a UI toolkit;
/// the host renders rows, keyed by display index, and forwards row events
/// back through [`SyncController`].
pub trait ViewCtx {
    /// Replace the rendered list with the given sequence, one row per task.
    fn render(&mut self, tasks: &[Task]);
    /// Show the drop placeholder before the row at `index` (at the end when
    /// `index == len`).
    fn show_placeholder(&mut self, index: usize);
    fn clear_placeholder(&mut self);
    /// Surface a non-fatal warning; the session continues.
    fn show_warning(&mut self, message: &str);
}

/// Glue between the store, storage, and the view. Every mutation runs as one
/// unit from the caller's perspective: mutate, persist, re-render, strictly
/// in that order and never batched across actions.
pub struct SyncController<V: ViewCtx> {
    store: TaskStore,
    storage: Storage,
    gesture: DragGesture,
    view: V,
}

impl<V: ViewCtx> SyncController<V> {
    /// Loads persisted tasks and renders the initial list. Missing or
    /// malformed data degrades to an empty list; startup never fails.
    pub fn load(storage: Storage, view: V) -> Self {
        let store = match storage.load_tasks() {
            Ok(records) => TaskStore::from_records(records),
            Err(err) => {
                log::warn!("could not load tasks, starting empty: {err}");
                TaskStore::new()
            }
        };
        let mut controller = Self {
            store,
            storage,
            gesture: DragGesture::new(),
            view,
        };
        controller.view.render(controller.store.tasks());
        controller
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Appends a task. Blank input is a silent no-op: nothing is persisted
    /// or re-rendered, and `false` is returned.
    pub fn add(&mut self, text: &str) -> bool {
        match self.store.add(text) {
            Some(_) => {
                self.commit();
                true
            }
            None => false,
        }
    }

    /// Toggles completion on the row at `index`.
    pub fn toggle_at(&mut self, index: usize) -> Result<(), StoreError> {
        let id = self.resolve(index)?;
        self.store.toggle(id)?;
        self.commit();
        Ok(())
    }

    /// Replaces the text of the row at `index`. A blank replacement retains
    /// the existing text and skips the commit.
    pub fn edit_at(&mut self, index: usize, new_text: &str) -> Result<(), StoreError> {
        let id = self.resolve(index)?;
        if self.store.edit(id, new_text)? {
            self.commit();
        }
        Ok(())
    }

    /// Removes the row at `index`; later rows shift down by one.
    pub fn remove_at(&mut self, index: usize) -> Result<(), StoreError> {
        let id = self.resolve(index)?;
        self.store.remove(id)?;
        self.commit();
        Ok(())
    }

    /// Begins a drag gesture for the row at `index`. A start during an
    /// active gesture supersedes it; the superseded gesture applies nothing.
    pub fn drag_start(&mut self, index: usize) -> Result<(), StoreError> {
        let id = self.resolve(index)?;
        if self.gesture.is_active() {
            self.view.clear_placeholder();
        }
        self.gesture.start(id);
        Ok(())
    }

    /// Recomputes the placeholder for the current pointer position. `boxes`
    /// are the rendered rows in display order excluding the dragged row.
    /// Called on every drag-over event; does nothing when no gesture is
    /// active.
    pub fn drag_over(&mut self, boxes: &[ItemBox], y: f64) {
        if let Some(index) = self.gesture.over(boxes, y) {
            self.view.show_placeholder(index);
        }
    }

    /// Completes the active gesture, moving the dragged row to the resolved
    /// position. A drop with no placeholder (no drag-over ever fired) is a
    /// cancel. The placeholder is torn down on every path.
    pub fn drop_dragged(&mut self) {
        let resolved = self.gesture.take_drop();
        self.view.clear_placeholder();
        let Some((id, to_index)) = resolved else {
            return;
        };
        match self.store.move_to(id, to_index) {
            Ok(true) => self.commit(),
            Ok(false) => {}
            Err(err) => log::error!("drop could not move {id}: {err}"),
        }
    }

    /// Abandons the active gesture with no data mutation.
    pub fn drag_cancel(&mut self) {
        if self.gesture.cancel() {
            self.view.clear_placeholder();
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_active()
    }

    /// Current theme preference; unreadable or malformed storage degrades to
    /// the default.
    pub fn theme(&self) -> ThemePreference {
        self.storage.load_theme().unwrap_or_else(|err| {
            log::debug!("could not load theme, using default: {err}");
            ThemePreference::default()
        })
    }

    /// Persists the theme preference. Independent of the task list: no
    /// re-render, and a write failure only warns.
    pub fn set_theme(&mut self, theme: ThemePreference) {
        if let Err(err) = self.storage.save_theme(theme) {
            log::error!("could not persist theme: {err}");
            self.view.show_warning("Theme preference could not be saved.");
        }
    }

    // Persist then render, in that order. A failed write leaves the
    // in-memory list authoritative for the rest of the session; the user
    // keeps a working list and sees a warning.
    fn commit(&mut self) {
        if let Err(err) = self.storage.save_tasks(&self.store.records()) {
            log::error!("could not persist tasks: {err}");
            self.view
                .show_warning("Changes could not be saved; they remain available this session.");
        }
        self.view.render(self.store.tasks());
    }

    fn resolve(&self, index: usize) -> Result<crate::models::TaskId, StoreError> {
        self.store.id_at(index).inspect_err(|err| {
            log::error!("view handed a stale row index: {err}");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq)]
    enum ViewEvent {
        Rendered(Vec<(String, bool)>),
        Placeholder(usize),
        ClearPlaceholder,
        Warning(String),
    }

    #[derive(Default)]
    struct FakeView {
        events: Vec<ViewEvent>,
    }

    impl ViewCtx for FakeView {
        fn render(&mut self, tasks: &[Task]) {
            self.events.push(ViewEvent::Rendered(
                tasks
                    .iter()
                    .map(|t| (t.text.clone(), t.completed))
                    .collect(),
            ));
        }

        fn show_placeholder(&mut self, index: usize) {
            self.events.push(ViewEvent::Placeholder(index));
        }

        fn clear_placeholder(&mut self) {
            self.events.push(ViewEvent::ClearPlaceholder);
        }

        fn show_warning(&mut self, message: &str) {
            self.events.push(ViewEvent::Warning(message.to_string()));
        }
    }

    fn controller_in(dir: &std::path::Path) -> SyncController<FakeView> {
        let storage = Storage::new(dir.to_path_buf());
        storage.ensure_dirs().expect("ensure dirs");
        SyncController::load(storage, FakeView::default())
    }

    fn row_boxes(count: usize) -> Vec<ItemBox> {
        (0..count)
            .map(|i| ItemBox {
                top: i as f64 * 50.0,
                height: 50.0,
            })
            .collect()
    }

    fn last_render(view: &FakeView) -> &Vec<(String, bool)> {
        view.events
            .iter()
            .rev()
            .find_map(|event| match event {
                ViewEvent::Rendered(rows) => Some(rows),
                _ => None,
            })
            .expect("at least one render")
    }

    #[test]
    fn loads_empty_when_nothing_is_persisted_and_renders_once() {
        let dir = tempdir().expect("tempdir");
        let controller = controller_in(dir.path());
        assert!(controller.tasks().is_empty());
        assert_eq!(
            controller.view().events,
            vec![ViewEvent::Rendered(Vec::new())]
        );
    }

    #[test]
    fn loads_empty_on_malformed_data() {
        let dir = tempdir().expect("tempdir");
        std::fs::write(dir.path().join("tasks.json"), "[{\"broken\":").expect("write");
        let controller = controller_in(dir.path());
        assert!(controller.tasks().is_empty());
    }

    #[test]
    fn every_mutation_persists_then_rerenders() {
        let dir = tempdir().expect("tempdir");
        let mut controller = controller_in(dir.path());

        assert!(controller.add("Buy milk"));
        controller.toggle_at(0).expect("toggle");
        controller.edit_at(0, "Buy oat milk").expect("edit");

        assert_eq!(last_render(controller.view()), &vec![("Buy oat milk".to_string(), true)]);

        // Disk reflects the latest mutation, not a batch.
        let json = std::fs::read_to_string(dir.path().join("tasks.json")).expect("read");
        let on_disk: Vec<crate::models::TaskRecord> =
            serde_json::from_str(&json).expect("parse");
        assert_eq!(on_disk.len(), 1);
        assert_eq!(on_disk[0].text, "Buy oat milk");
        assert!(on_disk[0].completed);
    }

    #[test]
    fn blank_add_neither_persists_nor_renders() {
        let dir = tempdir().expect("tempdir");
        let mut controller = controller_in(dir.path());
        let renders_before = controller.view().events.len();

        assert!(!controller.add("   "));
        assert_eq!(controller.view().events.len(), renders_before);
        assert!(!dir.path().join("tasks.json").exists());
    }

    #[test]
    fn stale_indices_fail_loudly_without_mutating() {
        let dir = tempdir().expect("tempdir");
        let mut controller = controller_in(dir.path());
        controller.add("a");

        assert!(controller.toggle_at(5).is_err());
        assert!(controller.remove_at(1).is_err());
        assert!(controller.edit_at(9, "x").is_err());
        assert_eq!(controller.tasks().len(), 1);
        assert_eq!(controller.tasks()[0].text, "a");
    }

    #[test]
    fn drag_drop_moves_the_row_and_tears_down_the_placeholder() {
        let dir = tempdir().expect("tempdir");
        let mut controller = controller_in(dir.path());
        controller.add("a");
        controller.add("b");
        controller.add("c");

        // Drag "c" above everything. Geometry excludes the dragged row.
        controller.drag_start(2).expect("start");
        controller.drag_over(&row_boxes(2), 10.0);
        assert!(controller.is_dragging());
        controller.drop_dragged();

        assert!(!controller.is_dragging());
        let rows: Vec<&str> = controller.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(rows, vec!["c", "a", "b"]);
        assert!(controller
            .view()
            .events
            .contains(&ViewEvent::Placeholder(0)));
        assert!(controller
            .view()
            .events
            .contains(&ViewEvent::ClearPlaceholder));
    }

    #[test]
    fn cancelled_drag_mutates_nothing_and_clears_the_placeholder() {
        let dir = tempdir().expect("tempdir");
        let mut controller = controller_in(dir.path());
        controller.add("a");
        controller.add("b");
        let renders_before = controller
            .view()
            .events
            .iter()
            .filter(|e| matches!(e, ViewEvent::Rendered(_)))
            .count();

        controller.drag_start(0).expect("start");
        controller.drag_over(&row_boxes(1), 200.0);
        controller.drag_cancel();

        assert!(!controller.is_dragging());
        let rows: Vec<&str> = controller.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(rows, vec!["a", "b"]);
        assert_eq!(
            controller.view().events.last(),
            Some(&ViewEvent::ClearPlaceholder)
        );
        let renders_after = controller
            .view()
            .events
            .iter()
            .filter(|e| matches!(e, ViewEvent::Rendered(_)))
            .count();
        assert_eq!(renders_after, renders_before);
    }

    #[test]
    fn drop_onto_the_same_position_is_a_no_op() {
        let dir = tempdir().expect("tempdir");
        let mut controller = controller_in(dir.path());
        controller.add("a");
        controller.add("b");
        let renders_before = controller.view().events.len();

        // Dragging "a" to the slot it already occupies.
        controller.drag_start(0).expect("start");
        controller.drag_over(&row_boxes(1), 10.0);
        controller.drop_dragged();

        let rows: Vec<&str> = controller.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(rows, vec!["a", "b"]);
        // Placeholder traffic only, no extra render/persist.
        assert!(!controller.view().events[renders_before..]
            .iter()
            .any(|e| matches!(e, ViewEvent::Rendered(_))));
    }

    #[test]
    fn second_drag_start_supersedes_and_drops_the_old_placeholder() {
        let dir = tempdir().expect("tempdir");
        let mut controller = controller_in(dir.path());
        controller.add("a");
        controller.add("b");
        controller.add("c");

        controller.drag_start(0).expect("start");
        controller.drag_over(&row_boxes(2), 200.0);
        controller.drag_start(1).expect("supersede");
        assert!(controller.is_dragging());

        // A drop right away has no placeholder from the new gesture, so the
        // superseded gesture must not sneak its move in.
        controller.drop_dragged();
        let rows: Vec<&str> = controller.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(rows, vec!["a", "b", "c"]);
    }

    #[test]
    fn persistence_failure_warns_but_keeps_the_in_memory_list() {
        let dir = tempdir().expect("tempdir");
        // Storage root never created, so every write fails.
        let storage = Storage::new(dir.path().join("missing"));
        let mut controller = SyncController::load(storage, FakeView::default());

        assert!(controller.add("survives in memory"));

        assert_eq!(controller.tasks().len(), 1);
        assert_eq!(controller.tasks()[0].text, "survives in memory");
        let events = &controller.view().events;
        let warn_at = events
            .iter()
            .position(|e| matches!(e, ViewEvent::Warning(_)))
            .expect("warning surfaced");
        // Render still follows the failed persist; the session continues.
        assert!(events[warn_at..]
            .iter()
            .any(|e| matches!(e, ViewEvent::Rendered(rows) if rows.len() == 1)));
    }

    #[test]
    fn theme_round_trips_and_degrades_to_light() {
        let dir = tempdir().expect("tempdir");
        let mut controller = controller_in(dir.path());

        assert_eq!(controller.theme(), ThemePreference::Light);
        controller.set_theme(ThemePreference::Dark);
        assert_eq!(controller.theme(), ThemePreference::Dark);

        std::fs::write(dir.path().join("theme.json"), "\"mauve\"").expect("write");
        assert_eq!(controller.theme(), ThemePreference::Light);
    }

    #[test]
    fn end_to_end_scenario_matches_the_persisted_sequence() {
        let dir = tempdir().expect("tempdir");
        let mut controller = controller_in(dir.path());

        controller.add("Buy milk");
        controller.add("Walk dog");
        controller.toggle_at(0).expect("toggle");

        // Drag "Walk dog" (row 1) above "Buy milk".
        controller.drag_start(1).expect("start");
        controller.drag_over(&row_boxes(1), 10.0);
        controller.drop_dragged();

        let rows: Vec<(&str, bool)> = controller
            .tasks()
            .iter()
            .map(|t| (t.text.as_str(), t.completed))
            .collect();
        assert_eq!(rows, vec![("Walk dog", false), ("Buy milk", true)]);

        // A fresh controller sees exactly the same sequence from disk.
        let reloaded = controller_in(dir.path());
        let rows: Vec<(&str, bool)> = reloaded
            .tasks()
            .iter()
            .map(|t| (t.text.as_str(), t.completed))
            .collect();
        assert_eq!(rows, vec![("Walk dog", false), ("Buy milk", true)]);
    }
}
