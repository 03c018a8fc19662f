//! spotifetch-report - Listening report CLI
//!
//! Fetch a user's listening history and print a summary for one time range,
//! optionally writing the radial hour clock as an SVG file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::Parser;
use spotifetch_core::analytics::{
    AnalyticsEngine, ListeningReport, RankedEntity, TimeRange, WeeklyComparison,
};
use spotifetch_core::chart::{svg, ChartTarget, PolarChartRenderer};
use spotifetch_core::config::SourceConfig;
use spotifetch_core::format::{format_change, hour_label};
use spotifetch_core::history::{
    EventSource, HistoryAggregator, HttpEventSource, JsonFileSource, StopReason,
};
use spotifetch_core::{Config, PlayEvent};

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const SPARK: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

#[derive(Parser, Debug)]
#[command(name = "spotifetch-report")]
#[command(about = "Listening report for a time range")]
#[command(version)]
struct Args {
    /// User whose history is fetched (default: source.user_id from config)
    #[arg(long)]
    user: Option<String>,

    /// Time range: week, month, quarter or year (default: analytics.default_range)
    #[arg(long)]
    range: Option<TimeRange>,

    /// Read history from a JSON export instead of the history service
    #[arg(long)]
    input: Option<PathBuf>,

    /// Report as of this RFC 3339 timestamp instead of the current time
    #[arg(long)]
    now: Option<String>,

    /// Show the calendar week this many weeks before the current one
    #[arg(long, default_value_t = 0)]
    week_offset: u32,

    /// Export format (md = markdown, json = JSON)
    #[arg(long)]
    export: Option<String>,

    /// Write the radial hour clock to this SVG file
    #[arg(long)]
    svg: Option<PathBuf>,

    /// SVG width in pixels (default: chart.width)
    #[arg(long)]
    width: Option<u32>,

    /// SVG height in pixels (default: chart.height)
    #[arg(long)]
    height: Option<u32>,

    /// Stop fetching after this many events (default: source.max_events)
    #[arg(long)]
    cap: Option<usize>,

    /// Events requested per page, 1-200 (default: source.page_size)
    #[arg(long)]
    page_size: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load().context("failed to load configuration")?;
    let _log_guard = spotifetch_core::logging::init(&config.logging).ok();

    if let Some(page_size) = args.page_size {
        config.source.page_size = page_size;
    }
    if let Some(cap) = args.cap {
        config.source.max_events = cap;
    }

    let now = match &args.now {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("invalid --now timestamp: {}", raw))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };
    let range = args.range.unwrap_or(config.analytics.default_range);

    // Exactly one suspension point per page; a current-thread runtime is enough
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let (events, stop) = runtime.block_on(fetch_history(&args, &config.source))?;

    if stop == StopReason::CapReached {
        eprintln!(
            "note: stopped after {} events (cap {}); older history is not included",
            events.len(),
            config.source.max_events
        );
    }

    let engine = AnalyticsEngine::local();
    let report = engine.report(
        &events,
        range,
        now,
        config.analytics.top_count,
        args.week_offset,
    );

    if let Some(path) = &args.svg {
        let renderer =
            PolarChartRenderer::from_config(&config.chart).context("invalid chart colors")?;
        let width = args.width.unwrap_or(config.chart.width);
        let height = args.height.unwrap_or(config.chart.height);

        let mut target = ChartTarget::new();
        renderer.render(
            &mut target,
            report.hourly.buckets(),
            f64::from(width),
            f64::from(height),
        );
        std::fs::write(path, svg::to_svg(&target))
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), width, height, "Wrote radial clock");
    }

    match args.export.as_deref() {
        Some("json") => print_json(&report)?,
        Some("md") => print_markdown(&report),
        Some(other) => anyhow::bail!("Unknown export format: {}. Use 'md' or 'json'", other),
        None => print_terminal(&report),
    }

    Ok(())
}

/// Collect history from the export file or the history service.
async fn fetch_history(
    args: &Args,
    source_config: &SourceConfig,
) -> Result<(Vec<PlayEvent>, StopReason)> {
    let (source, user): (Box<dyn EventSource>, String) = match &args.input {
        Some(path) => {
            let source = JsonFileSource::open(path)
                .with_context(|| format!("failed to read history export {}", path.display()))?;
            let user = args.user.clone().unwrap_or_else(|| "local".to_string());
            (Box::new(source), user)
        }
        None => {
            let user = args
                .user
                .clone()
                .or_else(|| source_config.user_id.clone())
                .context("no user given; pass --user or set source.user_id in the config")?;
            let source =
                HttpEventSource::new(source_config).context("invalid [source] configuration")?;
            (Box::new(source), user)
        }
    };

    let aggregator =
        HistoryAggregator::from_config(source, source_config).context("invalid paging options")?;
    let history = aggregator
        .collect(&user)
        .await
        .with_context(|| format!("failed to fetch history for {}", user))?;

    Ok((history.events, history.stop))
}

fn plural(n: u32, word: &str) -> String {
    format!("{} {}{}", n, word, if n == 1 { "" } else { "s" })
}

/// One-line block graph of the 24 hourly buckets.
fn sparkline(buckets: &[u32]) -> String {
    let max = buckets.iter().copied().max().unwrap_or(0);
    buckets
        .iter()
        .map(|&count| {
            if max == 0 || count == 0 {
                ' '
            } else {
                let level = (count as usize * (SPARK.len() - 1)) / max as usize;
                SPARK[level]
            }
        })
        .collect()
}

fn meter(value: u8) -> String {
    let filled = (usize::from(value) / 5).min(20);
    format!("{}{}", "█".repeat(filled), "░".repeat(20 - filled))
}

/// Heading for the weekly section: "This Week" or "Week of May 6, 2024".
fn week_title(weekly: &WeeklyComparison, week_offset: u32) -> String {
    if week_offset == 0 {
        "This Week".to_string()
    } else {
        let monday = weekly.week.from().with_timezone(&Local);
        format!("Week of {}", monday.format("%b %-d, %Y"))
    }
}

/// How the shown week and the one before it are referred to.
fn week_words(week_offset: u32) -> (&'static str, &'static str) {
    if week_offset == 0 {
        ("this week", "last week")
    } else {
        ("that week", "the week before")
    }
}

fn print_ranking(title: &str, entries: &[RankedEntity]) {
    if entries.is_empty() {
        return;
    }
    println!("{}", title);
    for (i, entry) in entries.iter().enumerate() {
        println!("   {}. {:<32} {:>6}", i + 1, entry.name, entry.plays);
    }
    println!();
}

fn print_terminal(report: &ListeningReport) {
    let title = format!("LISTENING REPORT: {}", report.range.label().to_uppercase());

    println!();
    println!("╭{}╮", "─".repeat(60));
    println!("│{:^60}│", title);
    println!("╰{}╯", "─".repeat(60));
    println!();

    if report.total_plays == 0 {
        println!("  No listening activity found for this period.");
        println!();
    }

    let ratio = &report.ratio;
    println!("THE NUMBERS");
    println!("   Plays:    {}", report.total_plays);
    println!(
        "   Tracks:   {:<8} {} vs previous period",
        ratio.current_tracks,
        format_change(ratio.tracks_change_pct())
    );
    println!(
        "   Albums:   {:<8} {} vs previous period",
        ratio.current_albums,
        format_change(ratio.albums_change_pct())
    );
    println!(
        "   Artists:  {:<8} {} vs previous period",
        ratio.current_artists,
        format_change(ratio.artists_change_pct())
    );
    println!();

    println!("LISTENING FINGERPRINT (last 30 days)");
    for (name, value) in report.fingerprint.metrics() {
        println!("   {:<15} {} {:>3}", name, meter(value), value);
    }
    println!();

    if let Some(peak) = report.hourly.peak_hour() {
        println!("LISTENING CLOCK");
        println!(
            "   Peak hour:  {} ({})",
            hour_label(peak),
            plural(report.hourly.get(peak as usize), "play")
        );
        println!("   │{}│", sparkline(report.hourly.buckets()));
        println!("    12AM        12PM        ");
        println!();
    }

    let weekly = &report.weekly;
    let (shown, before) = week_words(report.week_offset);
    println!("{}", week_title(weekly, report.week_offset).to_uppercase());
    let days: Vec<String> = DAY_NAMES
        .iter()
        .zip(weekly.daily.iter())
        .map(|(day, count)| format!("{} {}", day, count))
        .collect();
    println!("   {}", days.join("  "));
    println!(
        "   {} {}, {} {} ({})",
        plural(weekly.total, "play"),
        shown,
        plural(weekly.previous_total, "play"),
        before,
        format_change(weekly.change_pct())
    );
    println!();

    print_ranking("TOP ARTISTS", &report.top_artists);
    print_ranking("TOP ALBUMS", &report.top_albums);
    print_ranking("TOP TRACKS", &report.top_tracks);
}

fn print_markdown(report: &ListeningReport) {
    println!("# Listening Report: {}", report.range.label());
    println!();

    if report.total_plays == 0 {
        println!("*No listening activity found for this period.*");
        println!();
    }

    let ratio = &report.ratio;
    println!("## Summary");
    println!();
    println!("| Metric | Value | Change |");
    println!("|--------|-------|--------|");
    println!("| Plays | {} | |", report.total_plays);
    println!(
        "| Unique Tracks | {} | {} |",
        ratio.current_tracks,
        format_change(ratio.tracks_change_pct())
    );
    println!(
        "| Unique Albums | {} | {} |",
        ratio.current_albums,
        format_change(ratio.albums_change_pct())
    );
    println!(
        "| Unique Artists | {} | {} |",
        ratio.current_artists,
        format_change(ratio.artists_change_pct())
    );
    println!();

    println!("## Listening Fingerprint");
    println!();
    for (name, value) in report.fingerprint.metrics() {
        println!("- **{}:** {}", name, value);
    }
    println!();

    println!("## Listening Clock");
    println!();
    match report.hourly.peak_hour() {
        Some(peak) => println!(
            "- **Peak hour:** {} ({})",
            hour_label(peak),
            plural(report.hourly.get(peak as usize), "play")
        ),
        None => println!("- **Peak hour:** none"),
    }
    println!();

    let weekly = &report.weekly;
    let (shown, before) = week_words(report.week_offset);
    println!("## {}", week_title(weekly, report.week_offset));
    println!();
    println!("| {} |", DAY_NAMES.join(" | "));
    println!("|{}", "-----|".repeat(7));
    let counts: Vec<String> = weekly.daily.iter().map(|c| c.to_string()).collect();
    println!("| {} |", counts.join(" | "));
    println!();
    println!(
        "{} {} vs {} {} ({})",
        plural(weekly.total, "play"),
        shown,
        plural(weekly.previous_total, "play"),
        before,
        format_change(weekly.change_pct())
    );
    println!();

    for (title, entries) in [
        ("Top Artists", &report.top_artists),
        ("Top Albums", &report.top_albums),
        ("Top Tracks", &report.top_tracks),
    ] {
        if entries.is_empty() {
            continue;
        }
        println!("## {}", title);
        println!();
        for (i, entry) in entries.iter().enumerate() {
            println!("{}. **{}** - {}", i + 1, entry.name, plural(entry.plays, "play"));
        }
        println!();
    }

    println!("---");
    println!("*Generated by spotifetch-report*");
}

fn print_json(report: &ListeningReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
