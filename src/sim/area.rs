//! Play area geometry
//!
//! The rectangle targets may spawn in, derived from the screen mode and the
//! current viewport.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::ScreenMode;

/// Board mode: fraction of the viewport and hard cap (px)
const BOARD_FRACTION: Vec2 = Vec2::new(0.9, 0.8);
const BOARD_MAX: Vec2 = Vec2::new(1200.0, 800.0);
/// Compact mode: fraction of the viewport and hard cap (px)
const COMPACT_FRACTION: Vec2 = Vec2::new(0.6, 0.6);
const COMPACT_MAX: Vec2 = Vec2::new(640.0, 480.0);

/// Axis-aligned spawn rectangle in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PlayArea {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Layout for a screen mode inside a viewport of `viewport` px
    pub fn for_screen(mode: ScreenMode, viewport: Vec2) -> Self {
        let viewport = viewport.max(Vec2::ZERO);
        let size = match mode {
            ScreenMode::Full => viewport,
            ScreenMode::Board => (viewport * BOARD_FRACTION).min(BOARD_MAX),
            ScreenMode::Compact => (viewport * COMPACT_FRACTION).min(COMPACT_MAX),
        };
        let origin = (viewport - size) / 2.0;
        Self::new(origin.x, origin.y, size.x, size.y)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Valid top-left corners for a square of side `size`
    ///
    /// When the square is larger than the area the range collapses onto the
    /// area origin.
    pub fn origin_range(&self, size: f32) -> (Vec2, Vec2) {
        let min = Vec2::new(self.x, self.y);
        let max = Vec2::new(self.right() - size, self.bottom() - size).max(min);
        (min, max)
    }
}
