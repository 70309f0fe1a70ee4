use std::collections::VecDeque;

use crate::domain::Steps;

/// Bounded undo/redo stacks of step snapshots.
///
/// `past` holds older snapshots with the newest at the back; `future` holds
/// undone snapshots with the most recently undone at the front.
#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<Steps>,
    future: VecDeque<Steps>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            limit,
        }
    }

    /// Record the pre-mutation steps. Starts a new branch, so redo is lost.
    pub fn checkpoint(&mut self, steps: &Steps) {
        self.past.push_back(steps.clone());
        self.trim_past();
        self.future.clear();
    }

    /// Swap `live` for the newest past snapshot.
    pub fn undo(&mut self, live: &Steps) -> Option<Steps> {
        let previous = self.past.pop_back()?;
        self.future.push_front(live.clone());
        self.future.truncate(self.limit);
        Some(previous)
    }

    /// Swap `live` for the most recently undone snapshot.
    pub fn redo(&mut self, live: &Steps) -> Option<Steps> {
        let next = self.future.pop_front()?;
        self.past.push_back(live.clone());
        self.trim_past();
        Some(next)
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    fn trim_past(&mut self) {
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
    }
}
