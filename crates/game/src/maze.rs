use glam::Vec2;
use log::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diamond {
    pub position: Vec2,
    pub active: bool,
}

/// Static maze geometry plus the diamond list, both fixed at SETUP time.
/// Only the per-diamond active flags change afterwards, driven by the
/// bitstring carried in every STATE record.
#[derive(Debug, Clone)]
pub struct MazeModel {
    width: usize,
    height: usize,
    walls: Vec<bool>,
    diamonds: Vec<Diamond>,
}

impl MazeModel {
    pub fn new(width: usize, height: usize, wall_grid: &str, positions: Vec<Vec2>) -> Self {
        let walls = wall_grid.chars().map(|c| c == '1').collect();
        let diamonds = positions
            .into_iter()
            .map(|position| Diamond {
                position,
                active: true,
            })
            .collect();

        Self {
            width,
            height,
            walls,
            diamonds,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major lookup; out-of-bounds cells count as open.
    pub fn is_wall(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.walls[y * self.width + x]
    }

    pub fn diamonds(&self) -> &[Diamond] {
        &self.diamonds
    }

    pub fn diamond_count(&self) -> usize {
        self.diamonds.len()
    }

    /// Applies a '1'/'0' active bitstring positionally against the diamond
    /// list and returns how many flags flipped. A string shorter than the
    /// diamond count only updates the overlapping prefix; this mirrors the
    /// server's framing and is logged as an anomaly.
    pub fn apply_active_bits(&mut self, bits: &str) -> usize {
        if bits.len() < self.diamonds.len() {
            warn!(
                "diamond bitstring covers {} of {} diamonds",
                bits.len(),
                self.diamonds.len()
            );
        }

        let mut changed = 0;
        for (diamond, bit) in self.diamonds.iter_mut().zip(bits.chars()) {
            let active = bit == '1';
            if diamond.active != active {
                diamond.active = active;
                changed += 1;
            }
        }
        changed
    }
}
