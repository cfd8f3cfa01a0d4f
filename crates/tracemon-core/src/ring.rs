use std::collections::VecDeque;

use serde::Deserialize;

use crate::error::EngineError;

/// Which end of the old buffer survives a resize.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeAnchor {
    /// Keep the oldest entries, left-aligned. New slots are appended on the right.
    #[default]
    Oldest,
    /// Keep the most recent entries, right-aligned. New slots are prepended on the left.
    Newest,
}

/// Rolling window of displayed heights, one entry per display column.
///
/// Oldest entry is at index 0 (leftmost column), newest at `width - 1`.
/// The length always equals the width the ring was last sized to.
#[derive(Debug, Clone)]
pub struct SampleRing {
    samples: VecDeque<i64>,
    anchor: ResizeAnchor,
}

impl SampleRing {
    /// Allocate a zero-filled ring of `width` columns.
    pub fn new(width: usize, anchor: ResizeAnchor) -> Result<Self, EngineError> {
        let mut samples = VecDeque::new();
        samples
            .try_reserve_exact(width)
            .map_err(|source| EngineError::Alloc { width, source })?;
        samples.resize(width, 0);
        Ok(Self { samples, anchor })
    }

    pub fn width(&self) -> usize {
        self.samples.len()
    }

    pub fn anchor(&self) -> ResizeAnchor {
        self.anchor
    }

    /// Append at the newest end and evict the oldest entry.
    pub fn push(&mut self, value: i64) {
        if self.samples.is_empty() {
            return;
        }
        self.samples.pop_front();
        self.samples.push_back(value);
    }

    /// Reallocate to `width` columns, carrying over `min(old, new)` entries
    /// according to the anchor. The old allocation is released only after the
    /// new one is fully built, so a failed allocation leaves `self` untouched.
    pub fn resize(&mut self, width: usize) -> Result<(), EngineError> {
        let mut next = VecDeque::new();
        next.try_reserve_exact(width)
            .map_err(|source| EngineError::Alloc { width, source })?;

        let kept = self.samples.len().min(width);
        match self.anchor {
            ResizeAnchor::Oldest => {
                next.extend(self.samples.iter().take(kept).copied());
                next.resize(width, 0);
            }
            ResizeAnchor::Newest => {
                next.resize(width - kept, 0);
                next.extend(self.samples.iter().skip(self.samples.len() - kept).copied());
            }
        }

        self.samples = next;
        Ok(())
    }

    pub fn get(&self, column: usize) -> Option<i64> {
        self.samples.get(column).copied()
    }

    /// Newest entry, if the ring has any columns.
    pub fn newest(&self) -> Option<i64> {
        self.samples.back().copied()
    }

    /// Largest buffered value, or 0 for an empty ring.
    pub fn max(&self) -> i64 {
        self.samples.iter().copied().max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = i64> + '_ {
        self.samples.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring_of(values: &[i64], anchor: ResizeAnchor) -> SampleRing {
        let mut ring = SampleRing::new(values.len(), anchor).unwrap();
        for &v in values {
            ring.push(v);
        }
        ring
    }

    fn contents(ring: &SampleRing) -> Vec<i64> {
        ring.iter().collect()
    }

    #[test]
    fn new_ring_is_zero_filled() {
        let ring = SampleRing::new(4, ResizeAnchor::Oldest).unwrap();
        assert_eq!(contents(&ring), vec![0, 0, 0, 0]);
    }

    #[test]
    fn push_evicts_oldest() {
        let mut ring = ring_of(&[1, 2, 3], ResizeAnchor::Oldest);
        ring.push(4);
        assert_eq!(contents(&ring), vec![2, 3, 4]);
        assert_eq!(ring.newest(), Some(4));
    }

    #[test]
    fn shrink_keeps_prefix() {
        let mut ring = ring_of(&[1, 2, 3, 4, 5], ResizeAnchor::Oldest);
        ring.resize(3).unwrap();
        assert_eq!(contents(&ring), vec![1, 2, 3]);
    }

    #[test]
    fn grow_zero_fills_tail() {
        let mut ring = ring_of(&[1, 2, 3, 4, 5], ResizeAnchor::Oldest);
        ring.resize(8).unwrap();
        assert_eq!(contents(&ring), vec![1, 2, 3, 4, 5, 0, 0, 0]);
    }

    #[test]
    fn newest_anchor_keeps_suffix() {
        let mut ring = ring_of(&[1, 2, 3, 4, 5], ResizeAnchor::Newest);
        ring.resize(3).unwrap();
        assert_eq!(contents(&ring), vec![3, 4, 5]);
        ring.resize(5).unwrap();
        assert_eq!(contents(&ring), vec![0, 0, 3, 4, 5]);
    }

    #[test]
    fn zero_width_ring_ignores_pushes() {
        let mut ring = SampleRing::new(0, ResizeAnchor::Oldest).unwrap();
        ring.push(7);
        assert_eq!(ring.width(), 0);
        assert_eq!(ring.newest(), None);
        assert_eq!(ring.max(), 0);
    }

    #[test]
    fn length_tracks_width_through_mixed_ops() {
        let widths = [5usize, 1, 9, 0, 3, 12, 12, 2];
        for anchor in [ResizeAnchor::Oldest, ResizeAnchor::Newest] {
            let mut ring = SampleRing::new(4, anchor).unwrap();
            for (step, &w) in widths.iter().enumerate() {
                ring.resize(w).unwrap();
                assert_eq!(ring.width(), w);
                ring.push(step as i64);
                assert_eq!(ring.width(), w);
            }
        }
    }

    #[test]
    fn oversized_allocation_fails_cleanly() {
        let mut ring = ring_of(&[1, 2], ResizeAnchor::Oldest);
        let err = ring.resize(usize::MAX).unwrap_err();
        assert!(matches!(err, EngineError::Alloc { width: usize::MAX, .. }));
        assert_eq!(contents(&ring), vec![1, 2]);
    }
}
