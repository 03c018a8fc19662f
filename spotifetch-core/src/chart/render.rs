//! Scene construction for the radial clock.

use std::f64::consts::TAU;

use super::target::{Anchor, Bar, CenterBadge, ChartTarget, Element, Label, Ring, Tick};
use super::{BandScale, LinearScale, Point, Rgb};
use crate::analytics::{HourlyDistribution, HOURS};
use crate::config::ChartConfig;
use crate::error::Result;
use crate::format::{hour_label, hour_label_short};

const MIN_MARGIN: f64 = 24.0;
const MARGIN_FRACTION: f64 = 0.08;
const INNER_FRACTION_OF_OUTER: f64 = 0.42;
const INNER_FRACTION_OF_SIZE: f64 = 0.12;
const MAX_CORNER_RADIUS: f64 = 3.0;
const RING_FRACTIONS: [f64; 4] = [0.25, 0.5, 0.75, 1.0];
const LABEL_OFFSET: f64 = 14.0;
const TICK_START: f64 = 3.0;
const TICK_END: f64 = 8.0;
/// Labels this close to the vertical axis are centered.
const VERTICAL_AXIS_TOLERANCE: f64 = 0.2;

/// Draws an hourly distribution as a radial clock into a [`ChartTarget`].
#[derive(Debug, Clone)]
pub struct PolarChartRenderer {
    low_color: Rgb,
    high_color: Rgb,
    major_hours: Vec<u8>,
    band_padding: f64,
}

impl Default for PolarChartRenderer {
    fn default() -> Self {
        Self {
            low_color: Rgb::new(0x1e, 0x3a, 0x8a),
            high_color: Rgb::new(0x60, 0xa5, 0xfa),
            major_hours: vec![0, 6, 12, 18],
            band_padding: 0.08,
        }
    }
}

impl PolarChartRenderer {
    pub fn from_config(config: &ChartConfig) -> Result<Self> {
        let (low_color, high_color) = config.colors()?;
        Ok(Self {
            low_color,
            high_color,
            major_hours: config.major_hours.clone(),
            band_padding: config.band_padding,
        })
    }

    /// Color for `count` on a scale topping out at `max`.
    pub fn color_for(&self, count: u32, max: u32) -> Rgb {
        let max = max.max(1);
        self.low_color
            .lerp(self.high_color, f64::from(count) / f64::from(max))
    }

    /// Clear `target` and draw `counts` (zero-padded to 24 hours) at `width × height`.
    pub fn render(&self, target: &mut ChartTarget, counts: &[u32], width: f64, height: f64) {
        target.clear();

        let distribution = HourlyDistribution::from_counts(counts);
        let width = width.max(0.0);
        let height = height.max(0.0);
        let size = width.min(height);
        let margin = MIN_MARGIN.max(MARGIN_FRACTION * size);
        let outer = (size / 2.0 - margin).max(1.0);
        let inner = (INNER_FRACTION_OF_OUTER * outer)
            .max(INNER_FRACTION_OF_SIZE * size)
            .min(outer);
        let center = Point::new(width / 2.0, height / 2.0);

        let bands = BandScale::new(0.0, TAU, HOURS, self.band_padding);
        let max = distribution.max().max(1);
        let radius = LinearScale::new((0.0, f64::from(max)), (inner, outer));

        target.width = width;
        target.height = height;
        target.center = center;
        target.inner_radius = inner;
        target.outer_radius = outer;
        target.bands = Some(bands);

        for fraction in RING_FRACTIONS {
            target.elements.push(Element::Ring(Ring {
                radius: inner + (outer - inner) * fraction,
                dashed: true,
            }));
        }

        for (hour, &count) in distribution.buckets().iter().enumerate() {
            let start_angle = bands.position(hour);
            let end_angle = start_angle + bands.bandwidth();
            let outer_radius = radius.map(f64::from(count));
            let corner_radius = MAX_CORNER_RADIUS
                .min((outer_radius - inner) / 2.0)
                .min(bands.bandwidth() * inner / 2.0)
                .max(0.0);
            target.elements.push(Element::Bar(Bar {
                hour: hour as u8,
                count,
                start_angle,
                end_angle,
                inner_radius: inner,
                outer_radius,
                corner_radius,
                fill: self.color_for(count, max),
                path: sector_path(center, inner, outer_radius, start_angle, end_angle, corner_radius),
            }));
        }

        for hour in 0..HOURS {
            let angle = bands.center(hour);
            if self.major_hours.contains(&(hour as u8)) {
                target.elements.push(Element::Label(Label {
                    position: center.polar(outer + LABEL_OFFSET, angle),
                    text: hour_label_short(hour as u8),
                    anchor: anchor_for(angle),
                }));
            } else {
                target.elements.push(Element::Tick(Tick {
                    from: center.polar(outer + TICK_START, angle),
                    to: center.polar(outer + TICK_END, angle),
                }));
            }
        }

        let total = distribution.total();
        let badge = match distribution.peak_hour() {
            Some(peak) => {
                let plays = distribution.get(peak as usize);
                CenterBadge {
                    center,
                    title: "Peak Hour".to_string(),
                    detail: Some((
                        hour_label(peak),
                        format!("{} play{}", plays, if plays == 1 { "" } else { "s" }),
                    )),
                }
            }
            None => CenterBadge {
                center,
                title: "No Activity".to_string(),
                detail: None,
            },
        };
        target.elements.push(Element::Badge(badge));

        tracing::debug!(
            width,
            height,
            total,
            elements = target.elements.len(),
            "Rendered radial clock"
        );
    }
}

/// Text anchor keeping a label outside the circle.
fn anchor_for(angle: f64) -> Anchor {
    let side = angle.sin();
    if side.abs() < VERTICAL_AXIS_TOLERANCE {
        Anchor::Middle
    } else if side > 0.0 {
        Anchor::Start
    } else {
        Anchor::End
    }
}

/// SVG path for an annular sector with rounded corners.
///
/// Each corner is a quadratic curve through the sharp corner point; a zero
/// `corner` degenerates to straight joins.
fn sector_path(center: Point, inner: f64, outer: f64, start: f64, end: f64, corner: f64) -> String {
    let outer_trim = if outer > 0.0 { corner / outer } else { 0.0 };
    let inner_trim = if inner > 0.0 { corner / inner } else { 0.0 };
    let large_arc = u8::from(end - start > std::f64::consts::PI);

    let p = |r: f64, a: f64| {
        let pt = center.polar(r, a);
        format!("{:.2},{:.2}", pt.x, pt.y)
    };

    format!(
        "M{} Q{} {} A{outer:.2},{outer:.2} 0 {large_arc} 1 {} Q{} {} L{} Q{} {} A{inner:.2},{inner:.2} 0 {large_arc} 0 {} Q{} {} Z",
        p(outer - corner, start),
        p(outer, start),
        p(outer, start + outer_trim),
        p(outer, end - outer_trim),
        p(outer, end),
        p(outer - corner, end),
        p(inner + corner, end),
        p(inner, end),
        p(inner, end - inner_trim),
        p(inner, start + inner_trim),
        p(inner, start),
        p(inner + corner, start),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{STEADY_OPACITY, TOOLTIP_HEIGHT, TOOLTIP_WIDTH};

    fn sample_counts() -> Vec<u32> {
        let mut counts = vec![0; 24];
        counts[3] = 2;
        counts[9] = 10;
        counts[21] = 10;
        counts
    }

    fn rendered(counts: &[u32]) -> ChartTarget {
        let mut target = ChartTarget::new();
        PolarChartRenderer::default().render(&mut target, counts, 300.0, 300.0);
        target
    }

    #[test]
    fn test_geometry() {
        let target = rendered(&sample_counts());
        // margin = max(24, 24), outer = 150 - 24, inner = max(0.42 * 126, 36)
        assert_eq!(target.outer_radius(), 126.0);
        assert!((target.inner_radius() - 52.92).abs() < 1e-9);
        assert_eq!(target.center(), Point::new(150.0, 150.0));

        let bars: Vec<_> = target.bars().collect();
        assert_eq!(bars.len(), 24);
        assert!((bars[9].outer_radius - 126.0).abs() < 1e-9);
        assert_eq!(bars[0].outer_radius, bars[0].inner_radius);
        assert!(bars.iter().all(|b| b.corner_radius <= 3.0));

        let rings = target
            .elements()
            .iter()
            .filter(|e| matches!(e, Element::Ring(r) if r.dashed))
            .count();
        assert_eq!(rings, 4);
    }

    #[test]
    fn test_bars_leave_padding_between_hours() {
        let target = rendered(&sample_counts());
        let bars: Vec<_> = target.bars().collect();
        let step = TAU / 24.0;
        for pair in bars.windows(2) {
            let gap = pair[1].start_angle - pair[0].end_angle;
            assert!((gap - 0.08 * step).abs() < 1e-9);
        }
        assert!(bars[0].start_angle > 0.0);
        assert!(bars[23].end_angle < TAU);
    }

    #[test]
    fn test_colors_follow_counts() {
        let target = rendered(&sample_counts());
        let bars: Vec<_> = target.bars().collect();
        assert_eq!(bars[0].fill, Rgb::new(0x1e, 0x3a, 0x8a));
        assert_eq!(bars[9].fill, Rgb::new(0x60, 0xa5, 0xfa));
        assert_eq!(bars[3].fill, Rgb::new(0x1e, 0x3a, 0x8a).lerp(Rgb::new(0x60, 0xa5, 0xfa), 0.2));
    }

    #[test]
    fn test_labels_and_ticks() {
        let target = rendered(&sample_counts());
        let labels: Vec<&Label> = target
            .elements()
            .iter()
            .filter_map(|e| match e {
                Element::Label(l) => Some(l),
                _ => None,
            })
            .collect();
        let texts: Vec<_> = labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["12AM", "6AM", "12PM", "6PM"]);
        assert_eq!(labels[0].anchor, Anchor::Middle);
        assert_eq!(labels[1].anchor, Anchor::Start);
        assert_eq!(labels[2].anchor, Anchor::Middle);
        assert_eq!(labels[3].anchor, Anchor::End);

        let ticks = target
            .elements()
            .iter()
            .filter(|e| matches!(e, Element::Tick(_)))
            .count();
        assert_eq!(ticks, 20);
    }

    #[test]
    fn test_center_badge() {
        let target = rendered(&sample_counts());
        let Some(Element::Badge(badge)) = target.elements().last() else {
            panic!("badge should be drawn last");
        };
        assert_eq!(badge.title, "Peak Hour");
        // 9 and 21 tie; the first maximum wins
        assert_eq!(
            badge.detail,
            Some(("9 AM".to_string(), "10 plays".to_string()))
        );
    }

    #[test]
    fn test_all_zero_input() {
        let target = rendered(&[0; 24]);
        let Some(Element::Badge(badge)) = target.elements().last() else {
            panic!("badge should be drawn last");
        };
        assert_eq!(badge.title, "No Activity");
        assert_eq!(badge.detail, None);
        assert!(target
            .bars()
            .all(|b| b.outer_radius == target.inner_radius() && b.corner_radius == 0.0));
        assert!(target.bars().all(|b| b.path.ends_with('Z')));
    }

    #[test]
    fn test_short_and_long_input() {
        let short = rendered(&[4]);
        assert_eq!(short.bars().count(), 24);
        assert_eq!(short.bars().map(|b| b.count).sum::<u32>(), 4);

        let long = rendered(&[1; 30]);
        assert_eq!(long.bars().count(), 24);
        assert_eq!(long.bars().map(|b| b.count).sum::<u32>(), 24);
    }

    #[test]
    fn test_rerender_leaves_no_residue() {
        let renderer = PolarChartRenderer::default();
        let mut target = ChartTarget::new();
        renderer.render(&mut target, &sample_counts(), 300.0, 300.0);
        let first_len = target.elements().len();

        let bar9 = target.bars().nth(9).unwrap().clone();
        let pointer = target.center().polar(90.0, bar9.mid_angle());
        let hit = target.bar_at(pointer.x, pointer.y).unwrap();
        target.hover(hit, pointer);
        assert!(target.tooltip().is_some());

        renderer.render(&mut target, &[1; 24], 200.0, 200.0);
        assert_eq!(target.elements().len(), first_len);
        assert!(target.tooltip().is_none());
        assert!(target.hovered().is_none());
        assert!(target.bars().all(|b| b.count == 1));

        let mut fresh = ChartTarget::new();
        renderer.render(&mut fresh, &[1; 24], 200.0, 200.0);
        assert_eq!(fresh.elements(), target.elements());
    }

    #[test]
    fn test_hit_testing() {
        let target = rendered(&sample_counts());
        // 3 o'clock falls between hours 5 and 6, neither of which has plays
        assert_eq!(target.bar_at(150.0 + 100.0, 150.0), None);

        // Hour 9 is the tallest bar: aim at its band center at mid-radius
        let bar9 = target.bars().nth(9).unwrap().clone();
        let pointer = target.center().polar(90.0, bar9.mid_angle());
        let hit = target.bar_at(pointer.x, pointer.y).unwrap();
        assert_eq!(target.elements()[hit].as_bar().unwrap().hour, 9);

        // Inside the hole and outside the circle
        assert_eq!(target.bar_at(150.0, 150.0), None);
        assert_eq!(target.bar_at(0.0, 0.0), None);
    }

    #[test]
    fn test_hover_and_leave() {
        let mut target = rendered(&sample_counts());
        let bar21 = target.bars().nth(21).unwrap().clone();
        let pointer = target.center().polar(90.0, bar21.mid_angle());
        let hit = target.bar_at(pointer.x, pointer.y).unwrap();

        target.hover(hit, pointer);
        assert_eq!(target.hovered_hour(), Some(21));
        let tooltip = target.tooltip().unwrap();
        assert_eq!(tooltip.title, "9 PM");
        assert_eq!(tooltip.detail, "10 plays");
        assert_eq!(tooltip.position, Point::new(pointer.x + 12.0, pointer.y - 12.0));

        let style = target.bar_style(21);
        assert_eq!(style.opacity, 1.0);
        assert_eq!(style.stroke_width, 2.0);
        assert_eq!(target.bar_style(3).opacity, STEADY_OPACITY);

        target.leave();
        assert!(target.tooltip().is_none());
        assert_eq!(target.bar_style(21).opacity, STEADY_OPACITY);
    }

    #[test]
    fn test_hover_non_bar_is_ignored() {
        let mut target = rendered(&sample_counts());
        // Element 0 is a ring
        target.hover(0, Point::new(10.0, 10.0));
        assert!(target.hovered().is_none());
        assert!(target.tooltip().is_none());
    }

    #[test]
    fn test_tooltip_is_clamped() {
        let mut target = rendered(&sample_counts());
        let hit = target.elements().iter().position(|e| e.as_bar().is_some()).unwrap();

        target.hover(hit, Point::new(299.0, 2.0));
        let tooltip = target.tooltip().unwrap();
        assert_eq!(tooltip.position, Point::new(300.0 - TOOLTIP_WIDTH, 0.0));

        target.hover(hit, Point::new(-50.0, 299.0));
        let tooltip = target.tooltip().unwrap();
        assert_eq!(tooltip.position, Point::new(0.0, 300.0 - TOOLTIP_HEIGHT));
    }

    #[test]
    fn test_staggered_animation() {
        let mut target = rendered(&sample_counts());
        assert_eq!(target.bar_opacity(0, 0), 0.0);
        assert!((target.bar_opacity(0, 200) - STEADY_OPACITY / 2.0).abs() < 1e-9);
        assert_eq!(target.bar_opacity(0, 400), STEADY_OPACITY);
        // bar 10 starts at 300 ms
        assert_eq!(target.bar_opacity(10, 300), 0.0);
        assert_eq!(target.bar_opacity(10, 700), STEADY_OPACITY);
        assert_eq!(target.animation_end_ms(), 23 * 30 + 400);

        // Hover wins before the animation is done
        let hit = target
            .elements()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.as_bar().is_some())
            .nth(10)
            .map(|(i, _)| i)
            .unwrap();
        target.hover(hit, Point::new(10.0, 10.0));
        assert_eq!(target.bar_opacity(10, 0), 1.0);
    }

    #[test]
    fn test_tiny_canvas() {
        let target = rendered(&[5; 24]);
        let mut tiny = ChartTarget::new();
        PolarChartRenderer::default().render(&mut tiny, &[5; 24], 10.0, 10.0);
        assert_eq!(tiny.outer_radius(), 1.0);
        assert!(tiny.inner_radius() <= tiny.outer_radius());
        assert_eq!(tiny.bars().count(), target.bars().count());
    }
}
