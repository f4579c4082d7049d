use std::collections::VecDeque;

use glam::Vec2;

pub const SNAPSHOT_CAPACITY: usize = 20;
pub const RENDER_DELAY: f32 = 0.1;

/// Spans below this are treated as degenerate to avoid dividing by a
/// near-zero interval.
const MIN_SPAN: f32 = 1e-4;

/// A point-in-time sample of both player positions, stamped with the local
/// clock at the moment the STATE record was applied. Never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub time: f32,
    pub p0: Vec2,
    pub p1: Vec2,
}

/// Bounded FIFO history of snapshots used for buffered interpolation: the
/// render clock runs a configured delay ([`RENDER_DELAY`] by default) behind
/// the capture clock so that two real samples usually bracket the requested
/// time.
#[derive(Debug)]
pub struct SnapshotBuffer {
    snapshots: VecDeque<Snapshot>,
    capacity: usize,
    render_delay: f32,
}

impl Default for SnapshotBuffer {
    fn default() -> Self {
        Self::new(SNAPSHOT_CAPACITY, RENDER_DELAY)
    }
}

impl SnapshotBuffer {
    pub fn new(capacity: usize, render_delay: f32) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(capacity + 1),
            capacity,
            render_delay,
        }
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.push_back(snapshot);
        if self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.back()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    /// Interpolated positions for the current local clock, rendered the
    /// configured delay in the past.
    pub fn sample(&self, now: f32) -> Option<(Vec2, Vec2)> {
        self.interpolate(now - self.render_delay)
    }

    /// Linear interpolation of both player positions at `render_time`.
    ///
    /// Scans consecutive pairs for the one bracketing `render_time`; if the
    /// time precedes all samples or no bracket exists, falls back to the
    /// (oldest, newest) pair with the fraction clamped to [0, 1]. Returns
    /// `None` with fewer than two snapshots.
    pub fn interpolate(&self, render_time: f32) -> Option<(Vec2, Vec2)> {
        if self.snapshots.len() < 2 {
            return None;
        }

        let mut from = &self.snapshots[0];
        let mut to = &self.snapshots[self.snapshots.len() - 1];

        for i in 0..self.snapshots.len() - 1 {
            let a = &self.snapshots[i];
            let b = &self.snapshots[i + 1];
            if a.time <= render_time && b.time >= render_time {
                from = a;
                to = b;
                break;
            }
        }

        let span = to.time - from.time;
        let t = if span > MIN_SPAN {
            ((render_time - from.time) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Some((from.p0.lerp(to.p0, t), from.p1.lerp(to.p1, t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(time: f32, x: f32) -> Snapshot {
        Snapshot {
            time,
            p0: Vec2::new(x, 0.0),
            p1: Vec2::new(0.0, x),
        }
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut buffer = SnapshotBuffer::default();
        for i in 0..30 {
            buffer.push(snap(i as f32, i as f32));
        }

        assert_eq!(buffer.len(), SNAPSHOT_CAPACITY);
        // Oldest retained entry is the 11th pushed.
        let oldest = buffer.interpolate(f32::NEG_INFINITY).unwrap();
        assert_eq!(oldest.0, Vec2::new(10.0, 0.0));
        assert_eq!(buffer.latest().unwrap().time, 29.0);
    }

    #[test]
    fn test_fewer_than_two_snapshots_is_noop() {
        let mut buffer = SnapshotBuffer::default();
        assert!(buffer.interpolate(0.0).is_none());

        buffer.push(snap(1.0, 5.0));
        assert!(buffer.interpolate(1.0).is_none());
    }

    #[test]
    fn test_exact_snapshot_time_returns_stored_positions() {
        let mut buffer = SnapshotBuffer::default();
        buffer.push(snap(1.0, 10.0));
        buffer.push(snap(2.0, 20.0));
        buffer.push(snap(3.0, 30.0));

        let (p0, p1) = buffer.interpolate(2.0).unwrap();
        assert_eq!(p0, Vec2::new(20.0, 0.0));
        assert_eq!(p1, Vec2::new(0.0, 20.0));

        let (p0, _) = buffer.interpolate(1.0).unwrap();
        assert_eq!(p0, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_midpoint_is_linear() {
        let mut buffer = SnapshotBuffer::default();
        buffer.push(snap(0.0, 0.0));
        buffer.push(snap(1.0, 10.0));

        let (p0, p1) = buffer.interpolate(0.25).unwrap();
        assert!((p0.x - 2.5).abs() < 1e-5);
        assert!((p1.y - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_before_all_samples_holds_oldest() {
        let mut buffer = SnapshotBuffer::default();
        buffer.push(snap(5.0, 50.0));
        buffer.push(snap(6.0, 60.0));

        let (p0, _) = buffer.interpolate(1.0).unwrap();
        assert_eq!(p0, Vec2::new(50.0, 0.0));
    }

    #[test]
    fn test_after_all_samples_holds_newest() {
        let mut buffer = SnapshotBuffer::default();
        buffer.push(snap(5.0, 50.0));
        buffer.push(snap(6.0, 60.0));

        let (p0, _) = buffer.interpolate(100.0).unwrap();
        assert_eq!(p0, Vec2::new(60.0, 0.0));
    }

    #[test]
    fn test_degenerate_span_holds_from() {
        let mut buffer = SnapshotBuffer::default();
        buffer.push(snap(1.0, 10.0));
        buffer.push(snap(1.0, 99.0));

        let (p0, _) = buffer.interpolate(1.0).unwrap();
        assert_eq!(p0, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_custom_render_delay_and_capacity() {
        let mut buffer = SnapshotBuffer::new(2, 0.5);
        buffer.push(snap(0.0, 0.0));
        buffer.push(snap(1.0, 10.0));
        buffer.push(snap(2.0, 20.0));

        assert_eq!(buffer.len(), 2);
        // now = 2.0 renders at 1.5.
        let (p0, _) = buffer.sample(2.0).unwrap();
        assert!((p0.x - 15.0).abs() < 1e-5);
    }

    #[test]
    fn test_sample_applies_render_delay() {
        let mut buffer = SnapshotBuffer::default();
        buffer.push(snap(0.0, 0.0));
        buffer.push(snap(1.0, 10.0));

        // now = 0.6 renders at 0.5.
        let (p0, _) = buffer.sample(0.6).unwrap();
        assert!((p0.x - 5.0).abs() < 1e-5);
    }
}
