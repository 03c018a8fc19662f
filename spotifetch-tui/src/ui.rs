//! UI rendering for the TUI.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine, Points},
        Block, BorderType, Borders, Clear, Paragraph, Tabs,
    },
    Frame,
};
use spotifetch_core::analytics::{ListeningReport, RankedEntity, TimeRange};
use spotifetch_core::chart::{Anchor, Bar, ChartTarget, Element, Rgb, STEADY_OPACITY};
use spotifetch_core::format::{format_change, hour_label};

use crate::app::{App, UNITS_PER_COL, UNITS_PER_ROW};

/// Accent for titles and the selected range
const ACCENT: Color = Color::Rgb(96, 165, 250);
/// Grid rings and ticks
const GRID: Color = Color::Rgb(51, 65, 85);
/// Secondary text
const DIM: Color = Color::Rgb(148, 163, 184);
/// Positive change
const UP: Color = Color::Rgb(50, 205, 50);
/// Negative change
const DOWN: Color = Color::Rgb(255, 127, 80);
/// Border color for the side panels
const BORDER_PANEL: Color = Color::Rgb(80, 100, 140);

const BACKGROUND: Rgb = Rgb::new(0, 0, 0);
const HIGHLIGHT: Rgb = Rgb::new(255, 255, 255);
const DAY_NAMES: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

/// Render the application UI.
pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Range tabs
        Constraint::Min(10),   // Chart and panels
        Constraint::Length(1), // Footer
    ])
    .split(frame.area());

    render_tabs(frame, app.range, chunks[0]);

    let body = Layout::horizontal([Constraint::Min(30), Constraint::Length(44)]).split(chunks[1]);

    let block = Block::default()
        .title(" Listening Clock ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT))
        .title_style(Style::default().fg(ACCENT).bold());
    let chart_area = block.inner(body[0]);
    frame.render_widget(block, body[0]);

    app.prepare_chart(chart_area);
    render_chart(frame, app, chart_area);

    // Cached after the first frame for this range and week
    render_panels(frame, app.report(), body[1]);

    render_footer(frame, app, chunks[2]);
}

/// Render the range selector.
fn render_tabs(frame: &mut Frame, active: TimeRange, area: Rect) {
    let titles = TimeRange::ALL
        .iter()
        .enumerate()
        .map(|(i, range)| Line::from(format!(" {} {} ", i + 1, range.label())));
    let selected = TimeRange::ALL.iter().position(|range| *range == active);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(DIM))
        .highlight_style(Style::default().fg(ACCENT).bold())
        .block(
            Block::default()
                .title(" spotifetch ")
                .borders(Borders::BOTTOM)
                .title_style(Style::default().fg(ACCENT).bold()),
        );
    frame.render_widget(tabs, area);
}

/// Chart units to canvas coordinates (the canvas y axis points up).
fn to_canvas(target: &ChartTarget, x: f64, y: f64) -> (f64, f64) {
    (x, target.height() - y)
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

/// Draw the radial clock onto a braille canvas.
fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let target = &app.chart;
    let elapsed = app.animation_elapsed_ms();

    let canvas = Canvas::default()
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, target.width()])
        .y_bounds([0.0, target.height()])
        .paint(|ctx| {
            // Grid and bars first, text on a later layer so it stays readable
            let mut bar_index = 0usize;
            for element in target.elements() {
                match element {
                    Element::Ring(ring) => draw_ring(ctx, target, ring.radius),
                    Element::Bar(bar) => {
                        draw_bar(ctx, target, bar, bar_index, elapsed);
                        bar_index += 1;
                    }
                    Element::Tick(tick) => {
                        let (x1, y1) = to_canvas(target, tick.from.x, tick.from.y);
                        let (x2, y2) = to_canvas(target, tick.to.x, tick.to.y);
                        ctx.draw(&CanvasLine::new(x1, y1, x2, y2, GRID));
                    }
                    Element::Label(_) | Element::Badge(_) => {}
                }
            }
            ctx.layer();

            for element in target.elements() {
                match element {
                    Element::Label(label) => {
                        print_text(
                            ctx,
                            target,
                            label.position.x,
                            label.position.y,
                            &label.text,
                            label.anchor,
                            Style::default().fg(DIM),
                        );
                    }
                    Element::Badge(badge) => {
                        let (x, y) = (badge.center.x, badge.center.y);
                        match &badge.detail {
                            Some((hour, plays)) => {
                                let dim = Style::default().fg(DIM);
                                let row = UNITS_PER_ROW;
                                print_text(ctx, target, x, y - row, &badge.title, Anchor::Middle, dim);
                                print_text(
                                    ctx,
                                    target,
                                    x,
                                    y,
                                    hour,
                                    Anchor::Middle,
                                    Style::default().fg(Color::White).bold(),
                                );
                                print_text(ctx, target, x, y + row, plays, Anchor::Middle, dim);
                            }
                            None => print_text(
                                ctx,
                                target,
                                x,
                                y,
                                &badge.title,
                                Anchor::Middle,
                                Style::default().fg(DIM),
                            ),
                        }
                    }
                    _ => {}
                }
            }
        });
    frame.render_widget(canvas, area);

    render_tooltip(frame, target, area);
}

fn draw_ring(ctx: &mut Context, target: &ChartTarget, radius: f64) {
    let center = target.center();
    // One dot every few units along the circumference reads as dashed
    let dots = ((radius * std::f64::consts::TAU) / 4.0).ceil().max(8.0) as usize;
    let coords: Vec<(f64, f64)> = (0..dots)
        .map(|i| {
            let p = center.polar(radius, std::f64::consts::TAU * i as f64 / dots as f64);
            to_canvas(target, p.x, p.y)
        })
        .collect();
    ctx.draw(&Points {
        coords: &coords,
        color: GRID,
    });
}

/// Fill one annular sector with dots, grown to its current animation height.
fn draw_bar(
    ctx: &mut Context,
    target: &ChartTarget,
    bar: &Bar,
    bar_index: usize,
    elapsed_ms: u64,
) {
    let style = target.bar_style(bar_index);
    let opacity = target.bar_opacity(bar_index, elapsed_ms);
    if opacity <= 0.0 || bar.outer_radius <= bar.inner_radius {
        return;
    }

    let progress = (opacity / style.opacity).min(1.0);
    let outer = bar.inner_radius + (bar.outer_radius - bar.inner_radius) * progress;
    let fill = if style.opacity > STEADY_OPACITY {
        bar.fill.lerp(HIGHLIGHT, 0.35)
    } else {
        bar.fill.lerp(BACKGROUND, 1.0 - STEADY_OPACITY)
    };

    let center = target.center();
    let sweep = bar.end_angle - bar.start_angle;
    let mut coords = Vec::new();
    let mut radius = bar.inner_radius;
    while radius <= outer {
        let steps = (sweep * radius).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let angle = bar.start_angle + sweep * i as f64 / steps as f64;
            let p = center.polar(radius, angle);
            coords.push(to_canvas(target, p.x, p.y));
        }
        radius += 1.0;
    }
    ctx.draw(&Points {
        coords: &coords,
        color: color(fill),
    });
}

/// Print text anchored at a chart point. Each cell is `UNITS_PER_COL` wide.
fn print_text(
    ctx: &mut Context,
    target: &ChartTarget,
    x: f64,
    y: f64,
    text: &str,
    anchor: Anchor,
    style: Style,
) {
    let width = text.chars().count() as f64 * UNITS_PER_COL;
    let x = match anchor {
        Anchor::Start => x,
        Anchor::Middle => x - width / 2.0,
        Anchor::End => x - width,
    };
    let (cx, cy) = to_canvas(target, x.max(0.0), y);
    ctx.print(cx, cy, Line::styled(text.to_string(), style));
}

/// Tooltip popup next to the pointer, kept inside the chart area.
fn render_tooltip(frame: &mut Frame, target: &ChartTarget, area: Rect) {
    let Some(tooltip) = target.tooltip() else {
        return;
    };

    let width = (tooltip.title.len().max(tooltip.detail.len()) as u16 + 4).min(area.width);
    let height = 4u16.min(area.height);
    let col = (tooltip.position.x / UNITS_PER_COL) as u16;
    let row = (tooltip.position.y / UNITS_PER_ROW) as u16;
    let x = area.x + col.min(area.width.saturating_sub(width));
    let y = area.y + row.min(area.height.saturating_sub(height));
    let popup = Rect::new(x, y, width, height);

    let text = vec![
        Line::from(Span::styled(
            tooltip.title.clone(),
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(Span::styled(tooltip.detail.clone(), Style::default().fg(DIM))),
    ];
    let paragraph = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(ACCENT)),
    );
    frame.render_widget(Clear, popup);
    frame.render_widget(paragraph, popup);
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_PANEL))
        .title_style(Style::default().fg(ACCENT).bold())
}

fn change_span(pct: i64) -> Span<'static> {
    let color = if pct > 0 {
        UP
    } else if pct < 0 {
        DOWN
    } else {
        DIM
    };
    Span::styled(format_change(pct), Style::default().fg(color))
}

/// Render the numbers, fingerprint, week and top lists.
fn render_panels(frame: &mut Frame, report: &ListeningReport, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(7), // Numbers
        Constraint::Length(7), // Fingerprint
        Constraint::Length(5), // This week
        Constraint::Min(4),    // Top lists
    ])
    .split(area);

    let ratio = &report.ratio;
    let label = Style::default().fg(DIM);
    let numbers = vec![
        Line::from(vec![
            Span::styled("Plays    ", label),
            Span::raw(report.total_plays.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Tracks   ", label),
            Span::raw(format!("{:<7}", ratio.current_tracks)),
            change_span(ratio.tracks_change_pct()),
        ]),
        Line::from(vec![
            Span::styled("Albums   ", label),
            Span::raw(format!("{:<7}", ratio.current_albums)),
            change_span(ratio.albums_change_pct()),
        ]),
        Line::from(vec![
            Span::styled("Artists  ", label),
            Span::raw(format!("{:<7}", ratio.current_artists)),
            change_span(ratio.artists_change_pct()),
        ]),
        Line::from(match report.hourly.peak_hour() {
            Some(peak) => vec![
                Span::styled("Peak     ", label),
                Span::raw(hour_label(peak)),
            ],
            None => vec![Span::styled("No plays in this period", label)],
        }),
    ];
    frame.render_widget(
        Paragraph::new(numbers).block(panel("The Numbers")),
        chunks[0],
    );

    let fingerprint: Vec<Line> = report
        .fingerprint
        .metrics()
        .iter()
        .map(|(name, value)| {
            let filled = usize::from(*value) / 5;
            Line::from(vec![
                Span::styled(format!("{:<15}", name), label),
                Span::styled("█".repeat(filled), Style::default().fg(ACCENT)),
                Span::styled("░".repeat(20 - filled.min(20)), Style::default().fg(GRID)),
                Span::raw(format!(" {:>3}", value)),
            ])
        })
        .collect();
    frame.render_widget(
        Paragraph::new(fingerprint).block(panel("Fingerprint · 30 days")),
        chunks[1],
    );

    let weekly = &report.weekly;
    let days: Vec<Span> = DAY_NAMES
        .iter()
        .zip(weekly.daily.iter())
        .map(|(day, count)| Span::raw(format!("{} {:<3} ", day, count)))
        .collect();
    let week = vec![
        Line::from(days),
        Line::from(vec![
            Span::raw(format!("{} vs {} the week before  ", weekly.total, weekly.previous_total)),
            change_span(weekly.change_pct()),
        ]),
    ];
    let title = if report.week_offset == 0 {
        "This Week".to_string()
    } else {
        let monday = weekly.week.from().with_timezone(&Local);
        format!("Week of {}", monday.format("%b %-d"))
    };
    frame.render_widget(Paragraph::new(week).block(panel(&title)), chunks[2]);

    let mut top = Vec::new();
    push_ranking(&mut top, "Artists", &report.top_artists);
    push_ranking(&mut top, "Tracks", &report.top_tracks);
    push_ranking(&mut top, "Albums", &report.top_albums);
    frame.render_widget(Paragraph::new(top).block(panel("Top")), chunks[3]);
}

fn push_ranking(lines: &mut Vec<Line<'static>>, title: &str, entries: &[RankedEntity]) {
    if entries.is_empty() {
        return;
    }
    lines.push(Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(ACCENT).bold(),
    )));
    for (i, entry) in entries.iter().enumerate() {
        let name: String = entry.name.chars().take(30).collect();
        lines.push(Line::from(vec![
            Span::styled(format!("{:>2}. ", i + 1), Style::default().fg(DIM)),
            Span::raw(format!("{:<31}", name)),
            Span::raw(format!("{:>5}", entry.plays)),
        ]));
    }
}

/// Render the footer with key help and the status message.
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled("Tab/1-4", Style::default().fg(Color::Yellow)),
        Span::raw(" range  "),
        Span::styled("[/]", Style::default().fg(Color::Yellow)),
        Span::raw(" week  "),
        Span::styled("mouse", Style::default().fg(Color::Yellow)),
        Span::raw(" inspect hour  "),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" refresh  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" quit"),
    ];
    if let Some(status) = &app.status {
        spans.push(Span::raw("  │ "));
        spans.push(Span::raw(status.clone()));
    }
    let footer = Paragraph::new(Line::from(spans)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use ratatui::{backend::TestBackend, Terminal};
    use spotifetch_core::chart::PolarChartRenderer;
    use spotifetch_core::history::StopReason;
    use spotifetch_core::PlayEvent;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_render_lays_out_chart_and_panels() {
        let now = Utc::now();
        let events = (0..12)
            .map(|i| {
                PlayEvent::new(
                    Some("t1"),
                    Some("Aurora Lane"),
                    Some("album"),
                    now - Duration::hours(i + 1),
                )
            })
            .collect();
        let mut app = App::new(PolarChartRenderer::default(), TimeRange::Week, 3);
        app.set_history(events, StopReason::ShortPage);

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        let area = app.chart_area();
        assert!(area.width > 0 && area.height > 0);
        assert_eq!(app.chart.bars().count(), 24);

        let text = screen_text(&terminal);
        assert!(text.contains("Last 7 days"));
        assert!(text.contains("The Numbers"));
        assert!(text.contains("Aurora Lane"));
        assert!(text.contains("This Week"));

        // Panels read the cached report; stepping back a week recomputes it
        assert!(app.current_report().is_some());
        app.set_week_offset(1);
        terminal.draw(|frame| render(frame, &mut app)).unwrap();
        assert_eq!(app.current_report().map(|r| r.week_offset), Some(1));
        assert!(screen_text(&terminal).contains("Week of"));
    }
}
