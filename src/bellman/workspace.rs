//! Per-thread scratch owned by the [`crate::solver::driver::ValueIterationDriver`]
//! and reused across every iteration (§5).

use std::sync::{Mutex, MutexGuard};

use crate::scalar::Scalar;

/// Scratch for one thread's factored Bellman recursion (§4.6): two
/// ping-pong tensors sized to the full joint state volume, plus a small
/// per-axis column buffer and a sort buffer reused by [`crate::bellman::omax::omax`].
///
/// `relabel_buf` is only used by the DFA-product Bellman update
/// (§4.7): the per-`q` relabelled value vector `W(·, q)`, sized to the
/// base model's joint state count.
pub struct FactoredScratch<R> {
    pub(crate) tensor_a: Vec<R>,
    pub(crate) tensor_b: Vec<R>,
    pub(crate) column_buf: Vec<R>,
    pub(crate) sort_buf: Vec<usize>,
    pub(crate) relabel_buf: Vec<R>,
}

impl<R: Scalar> FactoredScratch<R> {
    /// Allocates scratch sized for a joint state tensor of shape
    /// `state_shape`. The ping-pong tensors are capacity-reserved to the
    /// full joint volume (the first peel only ever shrinks from there);
    /// the column buffer is sized to the largest single-variable extent.
    /// `relabel_buf` starts empty; use [`FactoredScratch::with_relabel`]
    /// when building scratch for a DFA product.
    pub fn new(state_shape: &[usize]) -> Self {
        let volume: usize = state_shape.iter().product();
        let max_extent = state_shape.iter().copied().max().unwrap_or(0);
        Self {
            tensor_a: Vec::with_capacity(volume),
            tensor_b: Vec::with_capacity(volume.max(1)),
            column_buf: Vec::with_capacity(max_extent),
            sort_buf: Vec::with_capacity(max_extent),
            relabel_buf: Vec::new(),
        }
    }

    /// As [`FactoredScratch::new`], additionally reserving `relabel_buf`
    /// for `num_base_states` entries.
    pub fn with_relabel(state_shape: &[usize], num_base_states: usize) -> Self {
        let mut scratch = Self::new(state_shape);
        scratch.relabel_buf = Vec::with_capacity(num_base_states);
        scratch
    }
}

/// Per-thread scratch owned exclusively by the driver, handed out by
/// thread index inside the parallel sweep (§5.1): rayon does not guarantee
/// a stable work-item-to-OS-thread mapping across iterations, but within
/// one `par_iter` call each index is visited by exactly one worker, so
/// scratch is indexed by `rayon::current_thread_index()` rather than kept
/// in thread-local storage. Each slot is wrapped in a `Mutex` so a shared
/// `&Workspace` can be read inside a rayon closure; the lock is never
/// contended since distinct logical indices never touch the same slot at
/// the same time.
pub struct Workspace<R: Scalar> {
    sort_buffers: Vec<Mutex<Vec<usize>>>,
    action_value_buffers: Vec<Mutex<Vec<R>>>,
    factored_scratch: Vec<Mutex<FactoredScratch<R>>>,
}

impl<R: Scalar> Workspace<R> {
    /// Allocates one slot per thread. `max_support_size` sizes the sort
    /// buffers (§4.5); `max_actions` sizes the per-state action-value
    /// buffers used by the outer max/min reduction (§4.5); `state_shape`
    /// sizes the factored recursion's scratch tensors (§4.6).
    ///
    /// `relabel_len` sizes each thread's DFA-product relabel buffer (§4.7);
    /// pass `0` when the system being solved is a plain [`crate::model::FactoredRMDP`]
    /// with no DFA product.
    pub fn new(
        threads: usize,
        max_support_size: usize,
        max_actions: usize,
        state_shape: &[usize],
        relabel_len: usize,
    ) -> Self {
        Self {
            sort_buffers: (0..threads)
                .map(|_| Mutex::new(Vec::with_capacity(max_support_size)))
                .collect(),
            action_value_buffers: (0..threads)
                .map(|_| Mutex::new(Vec::with_capacity(max_actions)))
                .collect(),
            factored_scratch: (0..threads)
                .map(|_| Mutex::new(FactoredScratch::with_relabel(state_shape, relabel_len)))
                .collect(),
        }
    }

    /// Number of thread slots this workspace was sized for.
    pub fn threads(&self) -> usize {
        self.sort_buffers.len()
    }

    pub fn sort_buffer_for(&self, tid: usize) -> MutexGuard<'_, Vec<usize>> {
        self.sort_buffers[tid].lock().expect("workspace slot poisoned")
    }

    pub fn action_value_buffer_for(&self, tid: usize) -> MutexGuard<'_, Vec<R>> {
        self.action_value_buffers[tid]
            .lock()
            .expect("workspace slot poisoned")
    }

    pub fn factored_scratch_for(&self, tid: usize) -> MutexGuard<'_, FactoredScratch<R>> {
        self.factored_scratch[tid]
            .lock()
            .expect("workspace slot poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_slot_count() {
        let ws: Workspace<f64> = Workspace::new(4, 8, 3, &[2, 3], 0);
        assert_eq!(ws.threads(), 4);
    }

    #[test]
    fn test_scratch_slots_are_independent() {
        let ws: Workspace<f64> = Workspace::new(2, 8, 3, &[2, 3], 0);
        ws.sort_buffer_for(0).push(1);
        ws.sort_buffer_for(1).push(2);
        assert_eq!(ws.sort_buffer_for(0).as_slice(), &[1]);
        assert_eq!(ws.sort_buffer_for(1).as_slice(), &[2]);
    }
}
