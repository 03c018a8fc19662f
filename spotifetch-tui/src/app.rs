//! Application state for the TUI.

use std::time::Instant;

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use spotifetch_core::analytics::{AnalyticsEngine, ListeningReport, ReportCache, TimeRange};
use spotifetch_core::chart::{ChartTarget, Point, PolarChartRenderer};
use spotifetch_core::format::format_played_time;
use spotifetch_core::history::StopReason;
use spotifetch_core::PlayEvent;

/// Chart units per terminal cell. Braille markers give 2×4 dots per cell,
/// which also keeps the clock round on typical cell proportions.
pub const UNITS_PER_COL: f64 = 2.0;
pub const UNITS_PER_ROW: f64 = 4.0;

/// Main application state.
pub struct App {
    /// Range being shown
    pub range: TimeRange,
    /// Calendar weeks back from the current one in the weekly panel
    pub week_offset: u32,
    /// Events from the last fetch, newest first
    events: Vec<PlayEvent>,
    /// Why the last fetch stopped paging
    pub stop: Option<StopReason>,
    /// Reports per range, dropped on every refetch
    cache: ReportCache,
    engine: AnalyticsEngine,
    renderer: PolarChartRenderer,
    /// Radial clock scene with hover state
    pub chart: ChartTarget,
    /// Canvas area the chart was last laid out for
    chart_area: Rect,
    /// Range and canvas size the scene was rendered for
    chart_key: Option<(TimeRange, u16, u16)>,
    /// When the scene was last rendered (drives the entry animation)
    rendered_at: Instant,
    top_count: usize,
    /// One-line status message for the footer
    pub status: Option<String>,
    refresh_requested: bool,
    /// Whether the app should quit
    pub should_quit: bool,
}

impl App {
    pub fn new(renderer: PolarChartRenderer, range: TimeRange, top_count: usize) -> Self {
        Self {
            range,
            week_offset: 0,
            events: Vec::new(),
            stop: None,
            cache: ReportCache::new(),
            engine: AnalyticsEngine::local(),
            renderer,
            chart: ChartTarget::new(),
            chart_area: Rect::default(),
            chart_key: None,
            rendered_at: Instant::now(),
            top_count,
            status: None,
            refresh_requested: false,
            should_quit: false,
        }
    }

    /// Replace the history with a fresh fetch and drop every cached report.
    pub fn set_history(&mut self, events: Vec<PlayEvent>, stop: StopReason) {
        tracing::info!(events = events.len(), stop = stop.as_str(), "History loaded");
        let mut status = format!("Loaded {} events", events.len());
        if let Some(newest) = events.first() {
            status.push_str(&format!(", newest {}", format_played_time(newest.played_at)));
        }
        if stop == StopReason::CapReached {
            status.push_str(" (cap reached, older plays omitted)");
        }
        self.status = Some(status);
        self.events = events;
        self.stop = Some(stop);
        self.cache.invalidate();
        self.chart_key = None;
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Ask the main loop to refetch history before the next frame.
    pub fn request_refresh(&mut self) {
        self.refresh_requested = true;
        self.status = Some("Refreshing...".to_string());
    }

    /// Consume a pending refresh request.
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }

    pub fn set_range(&mut self, range: TimeRange) {
        if self.range != range {
            self.range = range;
            self.chart.leave();
        }
    }

    /// Show the week `week_offset` weeks back. Cached reports carry the old
    /// week, so they are dropped; the chart does not depend on it.
    pub fn set_week_offset(&mut self, week_offset: u32) {
        if self.week_offset != week_offset {
            self.week_offset = week_offset;
            self.cache.invalidate();
        }
    }

    /// The report for the current range, computing it on first use.
    pub fn report(&mut self) -> &ListeningReport {
        let range = self.range;
        self.cache.get_or_compute(range, || {
            self.engine.report(
                &self.events,
                range,
                Utc::now(),
                self.top_count,
                self.week_offset,
            )
        })
    }

    /// Cached report for the current range, if already computed.
    pub fn current_report(&self) -> Option<&ListeningReport> {
        self.cache.get(self.range)
    }

    /// Lay the chart out for `area`, re-rendering only when the range or
    /// canvas size changed.
    pub fn prepare_chart(&mut self, area: Rect) {
        self.chart_area = area;
        let key = (self.range, area.width, area.height);
        if self.chart_key == Some(key) {
            return;
        }

        let buckets = *self.report().hourly.buckets();
        self.renderer.render(
            &mut self.chart,
            &buckets,
            f64::from(area.width) * UNITS_PER_COL,
            f64::from(area.height) * UNITS_PER_ROW,
        );
        self.chart_key = Some(key);
        self.rendered_at = Instant::now();
    }

    /// Milliseconds since the chart was last rendered.
    pub fn animation_elapsed_ms(&self) -> u64 {
        self.rendered_at.elapsed().as_millis() as u64
    }

    pub fn is_animating(&self) -> bool {
        self.animation_elapsed_ms() < self.chart.animation_end_ms()
    }

    pub fn chart_area(&self) -> Rect {
        self.chart_area
    }

    /// Chart coordinates of the center of terminal cell `(column, row)`.
    pub fn cell_to_chart(&self, column: u16, row: u16) -> Option<Point> {
        if !point_in_rect(column, row, self.chart_area) {
            return None;
        }
        Some(Point::new(
            (f64::from(column - self.chart_area.x) + 0.5) * UNITS_PER_COL,
            (f64::from(row - self.chart_area.y) + 0.5) * UNITS_PER_ROW,
        ))
    }

    /// Handle keyboard input.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => self.set_range(self.range.next()),
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                // previous = next applied three times on a four-way cycle
                let prev = self.range.next().next().next();
                self.set_range(prev);
            }
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                self.set_range(TimeRange::ALL[index]);
            }
            KeyCode::Char('[') => self.set_week_offset(self.week_offset.saturating_add(1)),
            KeyCode::Char(']') => self.set_week_offset(self.week_offset.saturating_sub(1)),
            KeyCode::Char('r') => self.request_refresh(),
            _ => {}
        }
    }

    /// Forward pointer movement to the chart's hover handling.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                match self.cell_to_chart(mouse.column, mouse.row) {
                    Some(point) => self.chart.pointer_moved(point),
                    None => self.chart.leave(),
                }
            }
            _ => {}
        }
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }
    x >= rect.x
        && x < rect.x.saturating_add(rect.width)
        && y >= rect.y
        && y < rect.y.saturating_add(rect.height)
}
