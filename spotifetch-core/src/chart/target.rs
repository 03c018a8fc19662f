//! Scene elements and the interactive drawing target.

use serde::Serialize;

use super::{BandScale, Point, Rgb};
use crate::format::hour_label;

/// Opacity of a bar once its entry animation has finished.
pub const STEADY_OPACITY: f64 = 0.85;
/// Opacity of the hovered bar.
pub const HOVER_OPACITY: f64 = 1.0;
/// Outline width of the hovered bar.
pub const HOVER_STROKE_WIDTH: f64 = 2.0;
/// Delay between consecutive bars starting to fade in.
pub const ANIMATION_STAGGER_MS: u64 = 30;
/// Fade-in duration of a single bar.
pub const ANIMATION_DURATION_MS: u64 = 400;

pub const TOOLTIP_WIDTH: f64 = 96.0;
pub const TOOLTIP_HEIGHT: f64 = 40.0;
const TOOLTIP_OFFSET: (f64, f64) = (12.0, -12.0);

/// Horizontal text alignment relative to a label's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

/// Concentric guide circle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ring {
    pub radius: f64,
    pub dashed: bool,
}

/// One hour's annular sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub hour: u8,
    pub count: u32,
    pub start_angle: f64,
    pub end_angle: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub corner_radius: f64,
    pub fill: Rgb,
    /// SVG path data for the rounded sector
    pub path: String,
}

impl Bar {
    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }

    fn contains(&self, radius: f64, angle: f64) -> bool {
        radius >= self.inner_radius
            && radius <= self.outer_radius
            && angle >= self.start_angle
            && angle <= self.end_angle
    }
}

/// Short radial line marking a minor hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub position: Point,
    pub text: String,
    pub anchor: Anchor,
}

/// Summary text in the middle of the clock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CenterBadge {
    pub center: Point,
    /// "Peak Hour" or "No Activity"
    pub title: String,
    /// Peak hour label and play count, absent when there is no activity
    pub detail: Option<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Ring(Ring),
    Bar(Bar),
    Tick(Tick),
    Label(Label),
    Badge(CenterBadge),
}

impl Element {
    pub fn as_bar(&self) -> Option<&Bar> {
        match self {
            Element::Bar(bar) => Some(bar),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    /// Top-left corner
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub title: String,
    pub detail: String,
}

/// Visual state of a bar at rest or under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarStyle {
    pub opacity: f64,
    pub stroke_width: f64,
}

/// The drawing surface: the rendered scene plus hover and tooltip state.
#[derive(Debug, Clone, Default)]
pub struct ChartTarget {
    pub(super) width: f64,
    pub(super) height: f64,
    pub(super) center: Point,
    pub(super) inner_radius: f64,
    pub(super) outer_radius: f64,
    pub(super) elements: Vec<Element>,
    pub(super) hovered: Option<usize>,
    pub(super) tooltip: Option<Tooltip>,
    pub(super) bands: Option<BandScale>,
}

impl ChartTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the scene and any hover state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn inner_radius(&self) -> f64 {
        self.inner_radius
    }

    pub fn outer_radius(&self) -> f64 {
        self.outer_radius
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn bars(&self) -> impl Iterator<Item = &Bar> {
        self.elements.iter().filter_map(Element::as_bar)
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Element index of the hovered bar.
    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Hour of the hovered bar.
    pub fn hovered_hour(&self) -> Option<u8> {
        self.hovered.and_then(|i| self.bar_index(i)).map(|i| i as u8)
    }

    /// Position of element `element_index` among the bar elements.
    fn bar_index(&self, element_index: usize) -> Option<usize> {
        self.elements.get(element_index)?.as_bar()?;
        Some(
            self.elements[..element_index]
                .iter()
                .filter(|e| e.as_bar().is_some())
                .count(),
        )
    }

    /// Element index of the bar under `(x, y)`, if any.
    pub fn bar_at(&self, x: f64, y: f64) -> Option<usize> {
        let (radius, angle) = self.center.to_polar(Point::new(x, y));
        if radius < self.inner_radius || radius > self.outer_radius {
            return None;
        }
        // Narrow to the angular step first, then confirm against the bar itself.
        let step = self.bands.and_then(|b| b.step_at(angle));
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_bar().map(|bar| (i, bar)))
            .find(|(_, bar)| {
                step.map_or(true, |s| s == bar.hour as usize) && bar.contains(radius, angle)
            })
            .map(|(i, _)| i)
    }

    /// Emphasize the bar at `element_index` and show its tooltip near `pointer`.
    ///
    /// Non-bar elements clear any existing hover instead.
    pub fn hover(&mut self, element_index: usize, pointer: Point) {
        let Some(hour) = self.bar_index(element_index) else {
            self.leave();
            return;
        };
        let count = self.elements[element_index]
            .as_bar()
            .map_or(0, |bar| bar.count);

        let max_x = (self.width - TOOLTIP_WIDTH).max(0.0);
        let max_y = (self.height - TOOLTIP_HEIGHT).max(0.0);
        let position = Point::new(
            (pointer.x + TOOLTIP_OFFSET.0).min(max_x).max(0.0),
            (pointer.y + TOOLTIP_OFFSET.1).min(max_y).max(0.0),
        );

        self.hovered = Some(element_index);
        self.tooltip = Some(Tooltip {
            position,
            width: TOOLTIP_WIDTH,
            height: TOOLTIP_HEIGHT,
            title: hour_label(hour as u8),
            detail: format!("{} play{}", count, if count == 1 { "" } else { "s" }),
        });
    }

    /// Hover whatever bar is under the pointer, or clear the hover.
    pub fn pointer_moved(&mut self, pointer: Point) {
        match self.bar_at(pointer.x, pointer.y) {
            Some(i) => self.hover(i, pointer),
            None => self.leave(),
        }
    }

    /// Revert emphasis and hide the tooltip.
    pub fn leave(&mut self) {
        self.hovered = None;
        self.tooltip = None;
    }

    /// Style of the `bar_index`-th bar, ignoring the entry animation.
    pub fn bar_style(&self, bar_index: usize) -> BarStyle {
        if self.hovered_hour().map(usize::from) == Some(bar_index) {
            BarStyle {
                opacity: HOVER_OPACITY,
                stroke_width: HOVER_STROKE_WIDTH,
            }
        } else {
            BarStyle {
                opacity: STEADY_OPACITY,
                stroke_width: 0.0,
            }
        }
    }

    /// Opacity of the `bar_index`-th bar `elapsed_ms` after rendering.
    ///
    /// Bar `i` starts fading in at `i × 30 ms` and reaches the steady opacity
    /// 400 ms later. A hovered bar is fully opaque regardless.
    pub fn bar_opacity(&self, bar_index: usize, elapsed_ms: u64) -> f64 {
        let style = self.bar_style(bar_index);
        if style.opacity >= HOVER_OPACITY {
            return style.opacity;
        }
        let start = bar_index as u64 * ANIMATION_STAGGER_MS;
        if elapsed_ms <= start {
            return 0.0;
        }
        let progress = ((elapsed_ms - start) as f64 / ANIMATION_DURATION_MS as f64).min(1.0);
        style.opacity * progress
    }

    /// Time until every bar has finished fading in.
    pub fn animation_end_ms(&self) -> u64 {
        let bars = self.bars().count() as u64;
        bars.saturating_sub(1) * ANIMATION_STAGGER_MS + ANIMATION_DURATION_MS
    }
}
