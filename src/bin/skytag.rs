use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use skytag::{
    Coordinator, CueSource, ExifToolTagger, FfmpegExtractor, FfmpegInspector, FfmpegLogLevel,
    JpegQuality, MediaInspector, PipelineOptions, ProgressCallback, ProgressInfo, SrtFile,
    TelemetryTrack,
};

const CLI_AFTER_HELP: &str = "Examples:\n  skytag run --input-dir flights --output-dir frames --progress\n  skytag run --input-dir flights --sample-rate 1 --quality 3\n  skytag probe DJI_0042.mp4 --json\n  skytag telemetry DJI_0042.srt\n  skytag completions zsh > _skytag";

#[derive(Debug, Parser)]
#[command(
    name = "skytag",
    version,
    about = "Extract geotagged still frames from drone video with embedded telemetry subtitles",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// Show a progress bar where supported.
    #[arg(long)]
    progress: bool,

    /// FFmpeg console log level (quiet, panic, fatal, error, warning, info,
    /// verbose, debug, trace).
    #[arg(long)]
    ffmpeg_log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract and geotag frames for every video/subtitle pair in a
    /// directory.
    #[command(
        about = "Extract geotagged frames from matched video/SRT pairs",
        after_help = "Examples:\n  skytag run --input-dir flights --output-dir frames\n  skytag run --start 0:10 --end 1:30 --sample-rate 2 --progress"
    )]
    Run {
        /// Directory with video & SRT files.
        #[arg(long, default_value = ".")]
        input_dir: PathBuf,
        /// Directory for output frames (one subdirectory per clip).
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
        /// JPEG quality, 1 (best) to 31 (worst).
        #[arg(long, default_value_t = 2)]
        quality: u8,
        /// Optional start time (seconds or mm:ss / hh:mm:ss).
        #[arg(long)]
        start: Option<String>,
        /// Optional end time (seconds or mm:ss / hh:mm:ss).
        #[arg(long)]
        end: Option<String>,
        /// Frame sampling rate in fps (default: every native frame).
        #[arg(long)]
        sample_rate: Option<f64>,
        /// Path to the exiftool executable.
        #[arg(long, default_value = "exiftool")]
        exiftool: PathBuf,
        /// Print the run report as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print a clip's duration and native frame rate.
    #[command(
        about = "Probe clip duration and frame rate",
        visible_alias = "info",
        after_help = "Examples:\n  skytag probe DJI_0042.mp4\n  skytag probe DJI_0042.mp4 --json"
    )]
    Probe {
        /// Input video path.
        input: PathBuf,

        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Parse a telemetry subtitle file and summarize its track.
    #[command(
        about = "Inspect a telemetry subtitle file",
        after_help = "Examples:\n  skytag telemetry DJI_0042.srt\n  skytag telemetry DJI_0042.srt --json"
    )]
    Telemetry {
        /// Input subtitle path.
        input: PathBuf,

        /// Output every sample as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_timecode(value: &str) -> Result<Duration, Box<dyn std::error::Error>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("time value cannot be empty".into());
    }

    if let Ok(seconds) = trimmed.parse::<f64>() {
        return Ok(Duration::from_secs_f64(seconds.max(0.0)));
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(format!("invalid time format: {trimmed}").into());
    }

    let (hours, minutes, seconds_str) = if parts.len() == 3 {
        (parts[0].parse::<u64>()?, parts[1].parse::<u64>()?, parts[2])
    } else {
        (0_u64, parts[0].parse::<u64>()?, parts[1])
    };

    let seconds = seconds_str.parse::<f64>()?;
    let total_seconds = (hours as f64 * 3600.0) + (minutes as f64 * 60.0) + seconds;
    Ok(Duration::from_secs_f64(total_seconds.max(0.0)))
}

fn parse_ffmpeg_log_level(value: &str) -> Option<FfmpegLogLevel> {
    match value.to_ascii_lowercase().as_str() {
        "quiet" => Some(FfmpegLogLevel::Quiet),
        "panic" => Some(FfmpegLogLevel::Panic),
        "fatal" => Some(FfmpegLogLevel::Fatal),
        "error" => Some(FfmpegLogLevel::Error),
        "warning" | "warn" => Some(FfmpegLogLevel::Warning),
        "info" => Some(FfmpegLogLevel::Info),
        "verbose" => Some(FfmpegLogLevel::Verbose),
        "debug" => Some(FfmpegLogLevel::Debug),
        "trace" => Some(FfmpegLogLevel::Trace),
        _ => None,
    }
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let filter = if global.verbose { "skytag=debug" } else { "skytag=warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    // The decoder is chatty by default; keep only its errors unless asked.
    let level = match &global.ffmpeg_log_level {
        Some(value) => parse_ffmpeg_log_level(value)
            .ok_or(format!("unsupported --ffmpeg-log-level: {value}"))?,
        None => FfmpegLogLevel::Error,
    };
    skytag::set_ffmpeg_log_level(level);

    Ok(())
}

/// Drives an indicatif bar from pipeline progress callbacks.
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::no_length();
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for BarProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(total) = info.total
            && self.bar.length() != Some(total)
        {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
        if let Some(timestamp) = info.current_timestamp {
            self.bar.set_message(format!("{:.2}s", timestamp.as_secs_f64()));
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Run {
            input_dir,
            output_dir,
            quality,
            start,
            end,
            sample_rate,
            exiftool,
            json,
        } => {
            let mut options = PipelineOptions::new().with_quality(JpegQuality::new(quality)?);
            if let Some(start) = start {
                options = options.with_start(parse_timecode(&start)?);
            }
            if let Some(end) = end {
                options = options.with_end(parse_timecode(&end)?);
            }
            if let Some(rate) = sample_rate {
                options = options.with_sample_rate(rate);
            }

            let bar = if cli.global.progress {
                let bar = BarProgress::new()?;
                let handle = bar.bar.clone();
                options = options.with_progress(Arc::new(bar));
                Some(handle)
            } else {
                None
            };

            // Fail fast on a missing tagger rather than on the first frame.
            let tagger = ExifToolTagger::new(&exiftool);
            tagger.verify()?;

            let mut coordinator = Coordinator::new(
                Box::new(FfmpegInspector),
                Box::new(SrtFile::new()),
                Box::new(FfmpegExtractor::new()),
                Box::new(tagger),
                options,
            );

            let report = coordinator.run(&input_dir, &output_dir)?;

            if let Some(bar) = bar {
                bar.finish_with_message("done");
            }

            if json {
                let payload = json!({
                    "pairs": report.pairs.iter().map(|pair| json!({
                        "stem": &pair.stem,
                        "planned": pair.planned,
                        "written": pair.written,
                        "tagged": pair.tagged,
                        "untagged": pair.untagged,
                        "failed": pair.failed,
                    })).collect::<Vec<_>>(),
                    "failures": report.failures.iter().map(|failure| json!({
                        "stem": &failure.stem,
                        "error": &failure.error,
                    })).collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
                return Ok(());
            }

            for pair in &report.pairs {
                println!(
                    "{} {}",
                    "success:".green().bold(),
                    format!(
                        "{}: {} frame(s) written, {} tagged, {} untagged, {} failed",
                        pair.stem, pair.written, pair.tagged, pair.untagged, pair.failed
                    )
                    .green()
                );
            }
            for failure in &report.failures {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!("{}: {}", failure.stem, failure.error).yellow()
                );
            }
            if report.pairs.is_empty() && report.failures.is_empty() {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!("no video/SRT pairs found in {}", input_dir.display()).yellow()
                );
            }
        }
        Commands::Probe { input, json } => {
            let clip = FfmpegInspector.probe(&input)?;
            if json {
                let payload = json!({
                    "duration_seconds": clip.duration.as_secs_f64(),
                    "frame_rate": clip.frame_rate,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Duration: {:.3}s", clip.duration.as_secs_f64());
                println!("Frame rate: {:.3} fps", clip.frame_rate);
            }
        }
        Commands::Telemetry { input, json } => {
            let cues = SrtFile::new().parse(&input)?;
            let track = TelemetryTrack::build(&cues)?;

            if json {
                let payload: Vec<_> = track
                    .samples()
                    .iter()
                    .map(|sample| {
                        json!({
                            "start_seconds": sample.start_time.as_secs_f64(),
                            "end_seconds": sample.end_time.as_secs_f64(),
                            "latitude": sample.latitude,
                            "longitude": sample.longitude,
                            "altitude": sample.altitude,
                            "extra": &sample.extra,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                let (first, last) = track.coverage();
                println!("Samples: {} (from {} cues)", track.len(), cues.len());
                println!(
                    "Coverage: {:.3}s – {:.3}s",
                    first.as_secs_f64(),
                    last.as_secs_f64()
                );
                if let Some(sample) = track.samples().first() {
                    println!(
                        "First fix: {}, {}{}",
                        sample.latitude,
                        sample.longitude,
                        sample
                            .altitude
                            .map(|altitude| format!(" @ {altitude}m"))
                            .unwrap_or_default()
                    );
                }
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "skytag", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
