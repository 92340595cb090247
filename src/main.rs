use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use hero_reel::config;
use hero_reel::constants::FRAME_TIME;
use hero_reel::simulation::{self, SimOptions, Simulation};
use hero_reel::{SlideTrack, Timing};

#[derive(Parser)]
#[command(name = "hero-reel", version, about = "Hero video carousel sequencer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a slide config and list its slides
    Check { config: PathBuf },
    /// Run the carousel headless against simulated media and print the timeline
    Simulate(SimArgs),
    /// Open a preview window driven by simulated media
    #[cfg(feature = "preview")]
    Preview(SimArgs),
}

#[derive(Args)]
struct SimArgs {
    /// Slide config (TOML)
    config: PathBuf,
    /// Full passes over the slide track before stopping
    #[arg(long, default_value_t = 1)]
    cycles: usize,
    /// RNG seed; random when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Irregular progress event cadence
    #[arg(long)]
    jitter: bool,
    /// Probability of duplicated progress/end events
    #[arg(long, default_value_t = 0.0, value_parser = probability)]
    duplicates: f64,
    /// Probability that a play request is rejected
    #[arg(long, default_value_t = 0.0, value_parser = probability)]
    flaky: f64,
    /// Duration of clips that are not probed (seconds)
    #[arg(long, default_value_t = 6.0, value_parser = positive_secs)]
    clip_secs: f64,
    /// Read clip durations with ffprobe from files under --media-root
    #[arg(long, requires = "media_root")]
    probe: bool,
    /// Directory that site-absolute clip URIs resolve against
    #[arg(long)]
    media_root: Option<PathBuf>,
    /// Clip URI that never finishes loading (repeatable)
    #[arg(long)]
    stall: Vec<String>,
    /// Give up after this much virtual time (seconds)
    #[arg(long, default_value_t = 600.0, value_parser = positive_secs)]
    max_secs: f64,
    /// Print the timeline as JSON lines
    #[arg(long)]
    json: bool,
}

fn probability(value: &str) -> Result<f64, String> {
    let rate: f64 = value.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(format!("{rate} is not between 0 and 1"))
    }
}

fn positive_secs(value: &str) -> Result<f64, String> {
    let secs: f64 = value.parse().map_err(|e| format!("{e}"))?;
    if secs > 0.0 && Duration::try_from_secs_f64(secs).is_ok() {
        Ok(secs)
    } else {
        Err(format!("{secs} is not a positive number of seconds"))
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Check { config } => check(&config),
        Command::Simulate(args) => simulate(&args),
        #[cfg(feature = "preview")]
        Command::Preview(args) => {
            let mut simulation = build_simulation(&args)?;
            hero_reel::preview::run(&mut simulation);
            Ok(())
        }
    }
}

fn load_track(path: &Path) -> Result<(SlideTrack, Timing)> {
    let config = config::load_from_path(path)?;
    let parts = config
        .into_parts()
        .with_context(|| format!("Invalid slide config {}", path.display()))?;
    Ok(parts)
}

fn check(path: &Path) -> Result<()> {
    let (track, timing) = load_track(path)?;
    println!("{}: {} slides", path.display(), track.len());
    for (index, slide) in track.iter().enumerate() {
        println!("  [{}] #{} {} ({} clips)", index, slide.id, slide.title, slide.clips.len());
        for clip in &slide.clips {
            println!("        {}", clip);
        }
        if !slide.cta_label.is_empty() {
            println!("        cta: {} -> {}", slide.cta_label, slide.cta_target);
        }
    }
    println!(
        "timing: lead {:.1}s (short clips {:.1}s below {:.1}s), guards {}ms/{}ms, crossfade {:.1}s",
        timing.near_end_lead_secs,
        timing.short_clip_lead_secs,
        timing.short_clip_cutoff_secs,
        timing.near_end_guard_ms,
        timing.ended_guard_ms,
        timing.crossfade_secs,
    );
    Ok(())
}

fn build_simulation(args: &SimArgs) -> Result<Simulation> {
    let (track, timing) = load_track(&args.config)?;

    let durations = match (&args.media_root, args.probe) {
        (Some(root), true) => simulation::probe_track(&track, root),
        _ => Default::default(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, "simulation seed");

    let options = SimOptions {
        default_duration: args.clip_secs,
        durations,
        jitter: args.jitter,
        duplicate_rate: args.duplicates,
        reject_rate: args.flaky,
        never_loads: args.stall.iter().cloned().collect::<HashSet<_>>(),
        seed,
        ..SimOptions::default()
    };
    Ok(Simulation::new(track, timing, options))
}

fn simulate(args: &SimArgs) -> Result<()> {
    let mut simulation = build_simulation(args)?;
    let limit = Duration::try_from_secs_f64(args.max_secs).context("--max-secs out of range")?;
    let completed = simulation.run_cycles(args.cycles, limit, FRAME_TIME);

    for entry in simulation.timeline() {
        if args.json {
            println!("{}", serde_json::to_string(entry)?);
        } else {
            println!("{:>8.2}s  slide {}  clip {}  ({:?})", entry.at_secs, entry.slide, entry.clip, entry.cause);
        }
    }

    if !completed {
        let snapshot = simulation.snapshot();
        warn!(slide = snapshot.slide, clip = snapshot.clip, ready = snapshot.ready, "carousel stalled");
        bail!(
            "Carousel did not complete {} cycle(s) within {:.0}s (stuck on slide {}, clip {})",
            args.cycles,
            args.max_secs,
            snapshot.slide,
            snapshot.clip
        );
    }
    Ok(())
}
