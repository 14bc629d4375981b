use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workout_tracker_data_management::{
    DEFAULT_API_URL, ReplaySummary, RunStore, config::ApiConfig, gpx_util::read_gpx_file, replay,
};
use workout_tracker_lib::{
    FilterConfig, SessionMeta,
    format::{fmt_km, fmt_pace, fmt_seconds},
    services::MemorySessionStore,
};

/// Replays a recorded GPX track through the live session engine.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// GPX file to replay
    gpx: PathBuf,

    /// key = value file overriding the default filter thresholds
    #[arg(long)]
    filter_config: Option<PathBuf>,

    /// send the finished session to the runs endpoint instead of keeping it in memory
    #[arg(long)]
    upload: bool,

    #[arg(long, env = "WORKOUT_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    #[arg(long, env = "WORKOUT_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long, default_value_t = 0)]
    user_id: i64,

    #[arg(long, default_value_t = 1)]
    season: u32,

    #[arg(long, default_value_t = 1)]
    week: u32,

    #[arg(long, default_value_t = 1)]
    session: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}=info,workout_tracker_lib=info,workout_tracker_data_management=info",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = FilterConfig::default();
    if let Some(path) = &cli.filter_config {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read filter config {}", path.display()))?;
        config.apply(FilterConfig::parse(&text)?)?;
    }
    tracing::debug!("Filter config: {:?}", config);

    let track = read_gpx_file(&cli.gpx)?;
    tracing::info!("Replaying {:?}: {} fixes", track.title, track.samples.len());

    let meta = SessionMeta {
        user_id: cli.user_id,
        season_order: cli.season,
        week_number: cli.week,
        session_number: cli.session,
    };

    let summary = if cli.upload {
        let store = RunStore::new(ApiConfig::new(cli.api_url, cli.token))?;
        replay(&track.samples, config, meta, store).await?
    } else {
        replay(&track.samples, config, meta, MemorySessionStore::new()).await?
    };

    print_summary(&track.title, &summary, track.skipped);
    Ok(())
}

fn print_summary(title: &str, summary: &ReplaySummary, skipped: usize) {
    let record = &summary.saved.record;
    println!("{title}");
    println!("  saved as      #{}", summary.saved.id.id);
    println!("  duration      {}", fmt_seconds(record.duration_seconds as f64));
    println!("  distance      {}", fmt_km(record.distance_meters as f64, 2));
    println!("  avg pace      {} /km", fmt_pace(record.average_pace_sec_per_km));
    println!("  final pace    {} /km", fmt_pace(summary.inst_pace_at_end));
    println!(
        "  fixes         {} kept, {} rejected, {} without time",
        record.trajectory.len(),
        summary.rejected,
        skipped
    );
}
