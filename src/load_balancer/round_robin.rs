//! Round-robin load balancing strategy.

use std::sync::{Arc, Mutex, PoisonError};

use crate::load_balancer::backend::Backend;

/// Round-robin selector.
///
/// The cursor is committed once per successful selection, to one past the
/// chosen index, so skipped dead backends do not skew the rotation among the
/// live ones. Snapshot, scan and commit happen under one short lock, so a call
/// checks each backend at most once. When none is alive the cursor is left
/// untouched.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: Mutex<u64>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cursor value.
    pub fn cursor(&self) -> u64 {
        *self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn next_server(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>> {
        self.advance(backends.len(), |index| backends[index].is_alive())
            .map(|(index, _)| backends[index].clone())
    }

    /// Pick the first live index at or after the cursor.
    ///
    /// Returns the index and the cursor value the scan started from.
    /// `is_alive` is called at most `len` times.
    fn advance(&self, len: usize, mut is_alive: impl FnMut(usize) -> bool) -> Option<(usize, u64)> {
        if len == 0 {
            return None;
        }
        let n = len as u64;

        // The section only reads liveness flags; it cannot panic mid-update.
        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        let start = *cursor;

        let (offset, index) = (0..n).find_map(|i| {
            let index = (start.wrapping_add(i) % n) as usize;
            is_alive(index).then_some((i, index))
        })?;

        *cursor = start.wrapping_add(offset + 1);
        Some((index, start))
    }
}
