use crate::models::TaskId;

/// Vertical extent of one rendered row, in the same coordinate space as the
/// pointer position handed to [`insertion_index`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemBox {
    pub top: f64,
    pub height: f64,
}

impl ItemBox {
    fn midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Resolves where a dragged row would land.
///
/// `boxes` are the rendered rows in display order, excluding the row being
/// dragged, so the result is an index into the list after removal — exactly
/// what [`TaskStore::move_to`](crate::TaskStore::move_to) expects. The row
/// lands before the first box whose midpoint is at or below the pointer; a
/// pointer exactly at a midpoint counts as above that row. Below every box,
/// the row lands at the end.
pub fn insertion_index(boxes: &[ItemBox], y: f64) -> usize {
    boxes
        .iter()
        .position(|item| y <= item.midpoint())
        .unwrap_or(boxes.len())
}

/// State machine for one drag gesture.
///
/// `Idle → start → Dragging → (over)* → take_drop | cancel → Idle`. The
/// placeholder index is view-only state; every path back to `Idle` clears it
/// so no stale marker can survive a finished or abandoned gesture.
#[derive(Debug, Default)]
pub struct DragGesture {
    state: State,
}

#[derive(Debug, Default, PartialEq)]
enum State {
    #[default]
    Idle,
    Dragging {
        source: TaskId,
        placeholder: Option<usize>,
    },
}

impl DragGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, State::Dragging { .. })
    }

    pub fn source(&self) -> Option<TaskId> {
        match self.state {
            State::Dragging { source, .. } => Some(source),
            State::Idle => None,
        }
    }

    pub fn placeholder(&self) -> Option<usize> {
        match self.state {
            State::Dragging { placeholder, .. } => placeholder,
            State::Idle => None,
        }
    }

    /// Begins a gesture. A start while another gesture is active supersedes
    /// it: the old placeholder is discarded and no mutation comes out of the
    /// abandoned gesture.
    pub fn start(&mut self, source: TaskId) {
        if let State::Dragging {
            source: previous, ..
        } = self.state
        {
            log::debug!("drag start for {source} supersedes active gesture for {previous}");
        }
        self.state = State::Dragging {
            source,
            placeholder: None,
        };
    }

    /// Recomputes the placeholder for the current pointer position. Called on
    /// every drag-over; idempotent, so repeated events with the same pointer
    /// position resolve to the same index. Returns the resolved index, or
    /// `None` when no gesture is active.
    pub fn over(&mut self, boxes: &[ItemBox], y: f64) -> Option<usize> {
        match &mut self.state {
            State::Dragging { placeholder, .. } => {
                let index = insertion_index(boxes, y);
                *placeholder = Some(index);
                Some(index)
            }
            State::Idle => None,
        }
    }

    /// Completes the gesture, yielding the source and the resolved insertion
    /// index. A drop before any drag-over produced a placeholder has nowhere
    /// to land and degrades to a cancel (`None`). Always returns to `Idle`.
    pub fn take_drop(&mut self) -> Option<(TaskId, usize)> {
        match std::mem::take(&mut self.state) {
            State::Dragging {
                source,
                placeholder: Some(index),
            } => Some((source, index)),
            _ => None,
        }
    }

    /// Abandons the gesture with no mutation. Safe to call when idle.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.is_active();
        self.state = State::Idle;
        was_active
    }
}
