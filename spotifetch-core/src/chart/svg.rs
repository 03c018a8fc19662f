//! Standalone SVG output for a rendered [`ChartTarget`].

use std::fmt::Write as _;

use super::target::{Element, ANIMATION_DURATION_MS, ANIMATION_STAGGER_MS};
use super::ChartTarget;

const BACKGROUND: &str = "#0f172a";
const GRID: &str = "#334155";
const TEXT: &str = "#cbd5e1";
const TEXT_MUTED: &str = "#94a3b8";
const HOVER_STROKE: &str = "#f8fafc";

/// Escape text for use inside SVG text nodes and attributes.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Write the whole scene, including hover emphasis and tooltip, as an SVG
/// document. Bars fade in with the same staggered timing as the UI.
pub fn to_svg(target: &ChartTarget) -> String {
    let width = target.width();
    let height = target.height();
    let mut out = String::new();

    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
        w = width,
        h = height
    );
    let _ = writeln!(
        out,
        r#"  <rect width="{}" height="{}" fill="{}"/>"#,
        width, height, BACKGROUND
    );

    let center = target.center();
    let mut bar_index = 0usize;
    for element in target.elements() {
        match element {
            Element::Ring(ring) => {
                let dash = if ring.dashed {
                    r#" stroke-dasharray="2,3""#
                } else {
                    ""
                };
                let _ = writeln!(
                    out,
                    r#"  <circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="none" stroke="{}" stroke-width="1"{}/>"#,
                    center.x, center.y, ring.radius, GRID, dash
                );
            }
            Element::Bar(bar) => {
                let style = target.bar_style(bar_index);
                let begin = bar_index as u64 * ANIMATION_STAGGER_MS;
                let _ = write!(
                    out,
                    r#"  <path d="{}" fill="{}" opacity="{}" data-hour="{}" data-plays="{}""#,
                    bar.path, bar.fill, style.opacity, bar.hour, bar.count
                );
                if style.stroke_width > 0.0 {
                    let _ = write!(
                        out,
                        r#" stroke="{}" stroke-width="{}""#,
                        HOVER_STROKE, style.stroke_width
                    );
                }
                let _ = writeln!(
                    out,
                    r#"><animate attributeName="opacity" from="0" to="{}" begin="{}ms" dur="{}ms" fill="freeze"/></path>"#,
                    style.opacity, begin, ANIMATION_DURATION_MS
                );
                bar_index += 1;
            }
            Element::Tick(tick) => {
                let _ = writeln!(
                    out,
                    r#"  <line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="1"/>"#,
                    tick.from.x, tick.from.y, tick.to.x, tick.to.y, GRID
                );
            }
            Element::Label(label) => {
                let _ = writeln!(
                    out,
                    r#"  <text x="{:.2}" y="{:.2}" text-anchor="{}" dominant-baseline="middle" font-size="11" fill="{}">{}</text>"#,
                    label.position.x,
                    label.position.y,
                    label.anchor.as_str(),
                    TEXT_MUTED,
                    escape(&label.text)
                );
            }
            Element::Badge(badge) => match &badge.detail {
                Some((hour, plays)) => {
                    let _ = writeln!(
                        out,
                        r#"  <text x="{x:.2}" y="{:.2}" text-anchor="middle" font-size="10" fill="{}">{}</text>"#,
                        badge.center.y - 16.0,
                        TEXT_MUTED,
                        escape(&badge.title),
                        x = badge.center.x
                    );
                    let _ = writeln!(
                        out,
                        r#"  <text x="{x:.2}" y="{:.2}" text-anchor="middle" font-size="16" font-weight="600" fill="{}">{}</text>"#,
                        badge.center.y + 2.0,
                        TEXT,
                        escape(hour),
                        x = badge.center.x
                    );
                    let _ = writeln!(
                        out,
                        r#"  <text x="{x:.2}" y="{:.2}" text-anchor="middle" font-size="10" fill="{}">{}</text>"#,
                        badge.center.y + 18.0,
                        TEXT_MUTED,
                        escape(plays),
                        x = badge.center.x
                    );
                }
                None => {
                    let _ = writeln!(
                        out,
                        r#"  <text x="{:.2}" y="{:.2}" text-anchor="middle" dominant-baseline="middle" font-size="12" fill="{}">{}</text>"#,
                        badge.center.x,
                        badge.center.y,
                        TEXT_MUTED,
                        escape(&badge.title)
                    );
                }
            },
        }
    }

    if let Some(tooltip) = target.tooltip() {
        let _ = writeln!(
            out,
            r#"  <g class="tooltip" transform="translate({:.2},{:.2})">"#,
            tooltip.position.x, tooltip.position.y
        );
        let _ = writeln!(
            out,
            r#"    <rect width="{}" height="{}" rx="4" fill="{}" stroke="{}"/>"#,
            tooltip.width, tooltip.height, BACKGROUND, GRID
        );
        let _ = writeln!(
            out,
            r#"    <text x="8" y="16" font-size="11" font-weight="600" fill="{}">{}</text>"#,
            TEXT,
            escape(&tooltip.title)
        );
        let _ = writeln!(
            out,
            r#"    <text x="8" y="31" font-size="11" fill="{}">{}</text>"#,
            TEXT_MUTED,
            escape(&tooltip.detail)
        );
        out.push_str("  </g>\n");
    }

    out.push_str("</svg>\n");
    out
}
