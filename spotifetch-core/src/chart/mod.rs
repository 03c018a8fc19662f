//! Radial "hour of day" clock.
//!
//! [`PolarChartRenderer`] turns an hourly distribution into a scene of rings,
//! bars, ticks, labels and a center badge inside a [`ChartTarget`]. The target
//! owns the scene together with hover and tooltip state, so UIs only forward
//! pointer movement and draw what the target holds. [`svg::to_svg`] writes
//! the scene as a standalone document; the TUI maps it onto a canvas.
//!
//! Angles are radians measured clockwise from 12 o'clock; positions are
//! pixels with the origin at the top left.

mod render;
mod scale;
pub mod svg;
mod target;

pub use render::PolarChartRenderer;
pub use scale::{BandScale, LinearScale};
pub use target::{
    Anchor, Bar, BarStyle, CenterBadge, ChartTarget, Element, Label, Ring, Tick, Tooltip,
    ANIMATION_DURATION_MS, ANIMATION_STAGGER_MS, HOVER_OPACITY, HOVER_STROKE_WIDTH,
    STEADY_OPACITY, TOOLTIP_HEIGHT, TOOLTIP_WIDTH,
};

use std::f64::consts::TAU;
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// A position in chart pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The point `radius` away from `self` at clock angle `angle`.
    pub fn polar(&self, radius: f64, angle: f64) -> Self {
        Self {
            x: self.x + radius * angle.sin(),
            y: self.y - radius * angle.cos(),
        }
    }

    /// Distance and clock angle (in `[0, 2π)`) of `other` as seen from `self`.
    pub fn to_polar(&self, other: Point) -> (f64, f64) {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let angle = dx.atan2(-dy).rem_euclid(TAU);
        (dx.hypot(dy), angle)
    }
}

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::Config(format!(
                "invalid color {:?}, expected #rrggbb",
                s
            )));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| Error::Config(format!("invalid color {:?}: {}", s, e)))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Linear interpolation towards `other`; `t` is clamped to `[0, 1]`.
    pub fn lerp(&self, other: Rgb, t: f64) -> Rgb {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
