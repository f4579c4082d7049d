use std::time::Duration;

use crate::net::input::KEEPALIVE_TICKS;
use crate::net::snapshot::{RENDER_DELAY, SNAPSHOT_CAPACITY};

/// Client-side tuning knobs. The defaults match the wire protocol's
/// assumptions and are what the binary runs with.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Main-loop ticks per second.
    pub tick_rate: u32,
    /// Seconds subtracted from the local clock before interpolation.
    pub render_delay: f32,
    /// Snapshot history retained for interpolation.
    pub snapshot_capacity: usize,
    /// An idle input sampler still sends every this many ticks.
    pub keepalive_ticks: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            render_delay: RENDER_DELAY,
            snapshot_capacity: SNAPSHOT_CAPACITY,
            keepalive_ticks: KEEPALIVE_TICKS,
        }
    }
}

impl ClientConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate.max(1) as f64)
    }
}
