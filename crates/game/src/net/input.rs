use log::info;

use super::protocol::ClientMessage;
use crate::config::ClientConfig;

/// An idle sampler still emits an INPUT record every this many ticks so the
/// server keeps seeing a liveness signal.
pub const KEEPALIVE_TICKS: u32 = 10;

/// Local control intent for one tick, each axis in {-1, 0, 1}.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Axes {
    pub x: i8,
    pub y: i8,
}

impl Axes {
    pub const ZERO: Axes = Axes { x: 0, y: 0 };

    pub fn new(x: i8, y: i8) -> Self {
        Self {
            x: x.clamp(-1, 1),
            y: y.clamp(-1, 1),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

/// Turns per-tick control intent into outbound INPUT records. Under
/// autopilot the manual axes are ignored and a deterministic oscillating
/// pattern derived from the elapsed clock is sent instead.
#[derive(Debug)]
pub struct InputSampler {
    autopilot: bool,
    tick: u32,
    keepalive_ticks: u32,
}

impl Default for InputSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSampler {
    pub fn new() -> Self {
        Self {
            autopilot: false,
            tick: 0,
            keepalive_ticks: KEEPALIVE_TICKS,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            keepalive_ticks: config.keepalive_ticks.max(1),
            ..Self::new()
        }
    }

    pub fn autopilot(&self) -> bool {
        self.autopilot
    }

    pub fn toggle_autopilot(&mut self) -> bool {
        self.autopilot = !self.autopilot;
        info!("autopilot: {}", self.autopilot);
        self.autopilot
    }

    /// Called once per tick. Returns a record when the intent is non-zero or
    /// the keep-alive cadence fires; the caller sends it fire-and-forget.
    pub fn sample(&mut self, manual: Axes, elapsed: f32) -> Option<ClientMessage> {
        self.tick = self.tick.wrapping_add(1);

        let axes = if self.autopilot {
            autopilot_axes(elapsed)
        } else {
            manual
        };

        if !axes.is_zero() || self.tick % self.keepalive_ticks == 0 {
            Some(ClientMessage::Input {
                x: axes.x,
                y: axes.y,
            })
        } else {
            None
        }
    }
}

fn autopilot_axes(elapsed: f32) -> Axes {
    let sweep = (elapsed * 3.0).sin();
    let x = if sweep > 0.2 {
        1
    } else if sweep < -0.2 {
        -1
    } else {
        0
    };

    let bob = (elapsed * 1.5).cos();
    let y = if bob > 0.8 {
        1
    } else if bob < -0.8 {
        -1
    } else {
        0
    };

    Axes { x, y }
}
