//! # CLI Module
//!
//! Command-line interface for the image optimizer.
//!
//! ## Usage
//! ```bash
//! # Optimize a folder into ./optimized
//! img-squeeze optimize ~/Desktop/shoot
//!
//! # Use a preset, override the quality
//! img-squeeze optimize a.jpg b.png --preset social-media --quality 70
//!
//! # JSON output
//! img-squeeze optimize ~/Desktop/shoot --output json
//!
//! # What would the settings save on 25 photos?
//! img-squeeze estimate --count 25 --format avif
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use image_squeeze::core::config::AppConfig;
use image_squeeze::core::coordinator::{Coordinator, SavingsSummary};
use image_squeeze::core::estimate::{estimate_explanation, estimate_optimization, resize_impact};
use image_squeeze::core::intake::{collect_candidates, IntakeConfig};
use image_squeeze::core::optimizer::{OptimizeOptions, OptimizeResult, Optimizer, OutputFormat};
use image_squeeze::core::presets::{find_preset, presets};
use image_squeeze::core::validation::{format_bytes, validate_with_events, Limits, ValidationOutcome, MIB};
use image_squeeze::error::{ImageSqueezeError, Result};
use image_squeeze::events::{null_sender, Event, EventChannel, ProcessEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

/// Image Squeeze - shrink photos for the web
#[derive(Parser, Debug)]
#[command(name = "img-squeeze")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate and optimize images
    Optimize {
        /// Files or directories to optimize
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Directory the optimized files are written to
        #[arg(short = 'd', long, default_value = "optimized")]
        out_dir: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,

        #[command(flatten)]
        limits: LimitArgs,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Include hidden files
        #[arg(long)]
        include_hidden: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputMode,
    },

    /// Estimate savings for the current settings without reading any image
    Estimate {
        /// Number of images to estimate for
        #[arg(short, long, default_value = "1")]
        count: usize,

        #[command(flatten)]
        settings: SettingsArgs,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputMode,
    },

    /// List the predefined presets
    Presets {
        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputMode,
    },
}

/// Optimization settings; flags beat the preset, which beats the config file
#[derive(Args, Debug)]
struct SettingsArgs {
    /// Config file (defaults to the per-user config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Preset id (see `img-squeeze presets`)
    #[arg(short, long)]
    preset: Option<String>,

    /// Widest allowed output, in pixels
    #[arg(short = 'w', long)]
    max_width: Option<u32>,

    /// Output image format
    #[arg(short, long)]
    format: Option<Format>,

    /// Encoder quality (1-100)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,
}

/// Intake limit overrides
#[derive(Args, Debug)]
struct LimitArgs {
    /// Largest accepted file, in MB
    #[arg(long)]
    max_file_size_mb: Option<u64>,

    /// Largest accepted batch, in files
    #[arg(long)]
    max_files: Option<usize>,

    /// Largest accepted batch, in MB
    #[arg(long)]
    max_total_size_mb: Option<u64>,

    /// Reject the whole batch when it has too many files instead of truncating
    #[arg(long)]
    no_auto_filter: bool,

    /// Hide per-file warnings
    #[arg(long)]
    quiet_warnings: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// WebP - fast, supported everywhere (default)
    Webp,
    /// AVIF - smaller files, slower to encode
    Avif,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Webp => OutputFormat::Webp,
            Format::Avif => OutputFormat::Avif,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputMode {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Optimize {
            paths,
            out_dir,
            settings,
            limits,
            recursive,
            include_hidden,
            output,
        } => {
            let intake = IntakeConfig {
                recursive,
                include_hidden,
                follow_symlinks: false,
            };
            run_optimize(&paths, &out_dir, &settings, &limits, intake, output)
        }
        Commands::Estimate {
            count,
            settings,
            output,
        } => run_estimate(count, &settings, output),
        Commands::Presets { output } => {
            run_presets(output);
            Ok(())
        }
    }
}

fn resolve_settings(settings: &SettingsArgs) -> Result<(AppConfig, OptimizeOptions)> {
    let config = AppConfig::load(settings.config.as_deref())?;
    let mut options = config.options.clone();

    if let Some(id) = &settings.preset {
        options = find_preset(id)?.apply(&options);
    }
    if let Some(max_width) = settings.max_width {
        options.max_width = max_width;
    }
    if let Some(format) = settings.format {
        options.format = format.into();
    }
    if let Some(quality) = settings.quality {
        options.quality = quality;
    }

    options.validate()?;
    Ok((config, options))
}

fn resolve_limits(base: &Limits, args: &LimitArgs) -> Limits {
    let mut limits = base.clone();
    if let Some(mb) = args.max_file_size_mb {
        limits.max_file_size = mb.saturating_mul(MIB);
    }
    if let Some(files) = args.max_files {
        limits.max_files = files;
    }
    if let Some(mb) = args.max_total_size_mb {
        limits.max_total_size = mb.saturating_mul(MIB);
    }
    if args.no_auto_filter {
        limits.auto_filter = false;
    }
    if args.quiet_warnings {
        limits.show_warnings = false;
    }
    limits
}

fn run_optimize(
    paths: &[PathBuf],
    out_dir: &Path,
    settings: &SettingsArgs,
    limit_args: &LimitArgs,
    intake_config: IntakeConfig,
    output: OutputMode,
) -> Result<()> {
    let term = Term::stderr();
    let pretty = matches!(output, OutputMode::Pretty);

    let (config, options) = resolve_settings(settings)?;
    let limits = resolve_limits(&config.limits, limit_args);

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("Image Squeeze").bold().cyan(),
            style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line(&format!(
            "  {} px max, {} at quality {}",
            options.max_width, options.format, options.quality
        ))
        .ok();
        term.write_line("").ok();
    }

    let intake = collect_candidates(paths, &intake_config);
    for error in &intake.errors {
        if pretty {
            term.write_line(&format!("  {} {}", style("!").yellow(), error)).ok();
        }
    }

    let outcome = validate_with_events(&intake.candidates, &limits, &null_sender());
    if pretty {
        print_validation(&term, &outcome);
    }

    if outcome.is_fatal() {
        if !pretty {
            print_json_failure(&outcome, None);
        }
        return Err(ImageSqueezeError::Rejected(outcome.errors.join(" ")));
    }

    // Progress bar for pretty output
    let progress = if pretty {
        let pb = ProgressBar::new(outcome.accepted.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .map(|s| s.progress_chars("█▓░"))
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(pb)
    } else {
        None
    };

    let coordinator = Coordinator::spawn(Optimizer::default())?;
    let (sender, receiver) = EventChannel::new();

    let progress_clone = progress.clone();
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::Process(ProcessEvent::FileStarted { name, .. }) => pb.set_message(name),
                Event::Process(ProcessEvent::Progress(entry)) if entry.progress >= 100 => pb.inc(1),
                Event::Process(
                    ProcessEvent::Completed { .. }
                    | ProcessEvent::FileFailed { .. }
                    | ProcessEvent::Cancelled,
                ) => pb.finish_and_clear(),
                _ => {}
            }
        }
    });

    let batch = coordinator.submit(outcome.accepted.clone(), options, sender).wait();

    // The worker drops the batch's sender once the batch is done
    drop(coordinator);
    event_thread.join().ok();

    let results = match batch {
        Ok(results) => results,
        Err(e) => {
            if let Some(pb) = &progress {
                pb.finish_and_clear();
            }
            if !pretty {
                print_json_failure(&outcome, Some(&e.to_string()));
            }
            return Err(e.into());
        }
    };

    let written = write_results(out_dir, &results)?;
    let summary = SavingsSummary::from_results(&results);

    match output {
        OutputMode::Pretty => print_pretty_results(&term, &results, &written, &summary, out_dir),
        OutputMode::Json => print_json_results(&outcome, &results, &written, &summary),
    }

    Ok(())
}

/// Write every output blob under its output name.
///
/// Inputs that share an output name (`a.jpg`, `a.png`) get a numbered
/// suffix instead of overwriting each other.
fn write_results(out_dir: &Path, results: &[OptimizeResult]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir).map_err(|e| ImageSqueezeError::Io {
        path: out_dir.to_path_buf(),
        source: e,
    })?;

    let mut taken = HashSet::new();
    let mut written = Vec::with_capacity(results.len());

    for result in results {
        let name = unique_name(&result.name, &taken);
        if name != result.name {
            tracing::warn!(original = %result.original_name, name = %name, "output name already used");
            Term::stderr()
                .write_line(&format!(
                    "  {} {} also maps to {}, written as {}",
                    style("!").yellow(),
                    result.original_name,
                    result.name,
                    name
                ))
                .ok();
        }

        let path = out_dir.join(&name);
        fs::write(&path, &result.data).map_err(|e| ImageSqueezeError::Io {
            path: path.clone(),
            source: e,
        })?;
        taken.insert(name);
        written.push(path);
    }

    Ok(written)
}

fn unique_name(name: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(name) {
        return name.to_string();
    }

    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, extension)) => (stem, format!(".{}", extension)),
        None => (name, String::new()),
    };
    (1..)
        .map(|n| format!("{}-{}{}", stem, n, extension))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}

fn print_validation(term: &Term, outcome: &ValidationOutcome) {
    term.write_line(&format!("  {}", outcome.summary())).ok();

    for rejected in &outcome.rejected {
        term.write_line(&format!(
            "    {} {} {}",
            style("✗").red(),
            rejected.candidate.name(),
            style(format!("({}) {}", rejected.reason, rejected.message)).dim()
        ))
        .ok();
    }

    for warning in &outcome.warnings {
        term.write_line(&format!("  {} {}", style("!").yellow(), warning)).ok();
    }

    for error in &outcome.errors {
        term.write_line(&format!("  {} {}", style("✗").red().bold(), error)).ok();
    }

    term.write_line("").ok();
}

fn print_pretty_results(
    term: &Term,
    results: &[OptimizeResult],
    written: &[PathBuf],
    summary: &SavingsSummary,
    out_dir: &Path,
) {
    term.write_line(&format!(
        "{} Optimization Complete",
        style("✓").green().bold()
    ))
    .ok();
    term.write_line("").ok();

    for (result, path) in results.iter().zip(written) {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| result.name.clone());
        term.write_line(&format!(
            "  {} {} → {}  {}x{}  {}",
            style(name).bold(),
            format_bytes(result.original_size),
            format_bytes(result.optimized_size),
            result.width,
            result.height,
            style(format!("{:.0}%", result.savings_percent())).green()
        ))
        .ok();
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "  {} files, {} → {}",
        style(summary.file_count).cyan(),
        format_bytes(summary.original_bytes),
        format_bytes(summary.optimized_bytes)
    ))
    .ok();

    let saved = if summary.saved_bytes >= 0 {
        style(format!(
            "{} saved ({:.1}%)",
            format_bytes(summary.saved_bytes as u64),
            summary.savings_percent
        ))
        .yellow()
    } else {
        style(format!(
            "{} larger than the originals",
            format_bytes(summary.saved_bytes.unsigned_abs())
        ))
        .red()
    };
    term.write_line(&format!("  {}", saved)).ok();

    term.write_line(&format!(
        "  {} {}",
        style("Written to").dim(),
        out_dir.display()
    ))
    .ok();
}

fn rejected_json(outcome: &ValidationOutcome) -> Vec<serde_json::Value> {
    outcome
        .rejected
        .iter()
        .map(|r| {
            serde_json::json!({
                "name": r.candidate.name(),
                "size": r.candidate.size(),
                "reason": r.reason,
                "message": r.message,
            })
        })
        .collect()
}

fn print_json_failure(outcome: &ValidationOutcome, error: Option<&str>) {
    let output = serde_json::json!({
        "stats": outcome.stats,
        "rejected": rejected_json(outcome),
        "warnings": outcome.warnings,
        "errors": outcome.errors,
        "processError": error,
    });
    println!("{:#}", output);
}

fn print_json_results(
    outcome: &ValidationOutcome,
    results: &[OptimizeResult],
    written: &[PathBuf],
    summary: &SavingsSummary,
) {
    let output = serde_json::json!({
        "stats": outcome.stats,
        "rejected": rejected_json(outcome),
        "warnings": outcome.warnings,
        "results": results.iter().zip(written).map(|(result, path)| {
            let mut value = serde_json::json!(result);
            value["path"] = serde_json::json!(path);
            value
        }).collect::<Vec<_>>(),
        "summary": summary,
    });
    println!("{:#}", output);
}

fn run_estimate(count: usize, settings: &SettingsArgs, output: OutputMode) -> Result<()> {
    let (_, options) = resolve_settings(settings)?;
    let estimate = estimate_optimization(&options, count);
    let impact = resize_impact(options.max_width);

    match output {
        OutputMode::Pretty => {
            let term = Term::stdout();
            term.write_line(&format!(
                "{} {} px, {} at quality {}",
                style("Estimate for").bold(),
                options.max_width,
                options.format,
                options.quality
            ))
            .ok();
            term.write_line(&format!("  {}", estimate_explanation(&estimate, count)))
                .ok();
            term.write_line(&format!(
                "  {} {}% of a typical {} px image's area ({} px → {} px)",
                style("Resize removes").dim(),
                impact.area_reduction,
                impact.original_width,
                impact.original_width,
                impact.new_width
            ))
            .ok();
            term.write_line(&format!(
                "  {} {:.2}x",
                style("Compression ratio").dim(),
                estimate.compression_ratio
            ))
            .ok();
        }
        OutputMode::Json => {
            let output = serde_json::json!({
                "count": count,
                "options": options,
                "estimate": estimate,
                "resizeImpact": impact,
            });
            println!("{:#}", output);
        }
    }

    Ok(())
}

fn run_presets(output: OutputMode) {
    match output {
        OutputMode::Pretty => {
            let term = Term::stdout();
            for preset in presets() {
                term.write_line(&format!(
                    "  {:<16} {:>5} px  {:<4}  q{:<3}  {}",
                    style(preset.id).bold(),
                    preset.max_width,
                    preset.format.extension(),
                    preset.quality,
                    style(preset.description).dim()
                ))
                .ok();
            }
        }
        OutputMode::Json => {
            println!("{:#}", serde_json::json!(presets()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SettingsArgs {
        SettingsArgs {
            config: None,
            preset: None,
            max_width: None,
            format: None,
            quality: None,
        }
    }

    #[test]
    fn cli_parses_optimize() {
        let cli = Cli::try_parse_from([
            "img-squeeze",
            "optimize",
            "a.jpg",
            "b.png",
            "--format",
            "avif",
            "--quality",
            "65",
            "--max-files",
            "3",
        ])
        .unwrap();

        match cli.command {
            Commands::Optimize {
                paths,
                settings,
                limits,
                ..
            } => {
                assert_eq!(paths.len(), 2);
                assert!(matches!(settings.format, Some(Format::Avif)));
                assert_eq!(settings.quality, Some(65));
                assert_eq!(limits.max_files, Some(3));
            }
            _ => panic!("expected optimize"),
        }
    }

    #[test]
    fn quality_out_of_range_is_rejected() {
        let parsed = Cli::try_parse_from(["img-squeeze", "optimize", "a.jpg", "--quality", "0"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn flags_override_preset() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("config.json");
        fs::write(&config, "{}").unwrap();

        let args = SettingsArgs {
            config: Some(config),
            preset: Some("modern-format".to_string()),
            quality: Some(40),
            ..settings()
        };
        let (_, options) = resolve_settings(&args).unwrap();

        assert_eq!(options.format, OutputFormat::Avif);
        assert_eq!(options.max_width, 1920);
        assert_eq!(options.quality, 40);
    }

    #[test]
    fn unknown_preset_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("config.json");
        fs::write(&config, "{}").unwrap();

        let args = SettingsArgs {
            config: Some(config),
            preset: Some("nope".to_string()),
            ..settings()
        };
        assert!(matches!(
            resolve_settings(&args),
            Err(ImageSqueezeError::Config(_))
        ));
    }

    #[test]
    fn limit_overrides_apply_in_mebibytes() {
        let args = LimitArgs {
            max_file_size_mb: Some(2),
            max_files: None,
            max_total_size_mb: Some(5),
            no_auto_filter: true,
            quiet_warnings: false,
        };
        let limits = resolve_limits(&Limits::default(), &args);

        assert_eq!(limits.max_file_size, 2 * MIB);
        assert_eq!(limits.max_total_size, 5 * MIB);
        assert_eq!(limits.max_files, 10);
        assert!(!limits.auto_filter);
        assert!(limits.show_warnings);
    }

    #[test]
    fn huge_limit_overrides_saturate() {
        let args = LimitArgs {
            max_file_size_mb: Some(u64::MAX),
            max_files: None,
            max_total_size_mb: Some(u64::MAX / 2),
            no_auto_filter: false,
            quiet_warnings: false,
        };
        let limits = resolve_limits(&Limits::default(), &args);

        assert_eq!(limits.max_file_size, u64::MAX);
        assert_eq!(limits.max_total_size, u64::MAX);
    }

    fn result(name: &str, original_name: &str, data: Vec<u8>) -> OptimizeResult {
        OptimizeResult {
            name: name.to_string(),
            original_name: original_name.to_string(),
            original_size: 10,
            optimized_size: data.len() as u64,
            data,
            width: 1,
            height: 1,
            original_width: 1,
            original_height: 1,
            exif_orientation: None,
            processing_time_ms: 0,
            format: OutputFormat::Webp,
        }
    }

    #[test]
    fn write_results_creates_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("nested").join("out");

        let written = write_results(&out, &[result("a.webp", "a.jpg", vec![1, 2, 3])]).unwrap();
        assert_eq!(written, vec![out.join("a.webp")]);
        assert_eq!(fs::read(&written[0]).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn shared_output_names_are_numbered() {
        let dir = tempfile::TempDir::new().unwrap();
        let results = [
            result("a.webp", "a.jpg", vec![1]),
            result("a.webp", "a.png", vec![2]),
            result("a.webp", "a.gif", vec![3]),
        ];

        let written = write_results(dir.path(), &results).unwrap();

        assert_eq!(
            written,
            vec![
                dir.path().join("a.webp"),
                dir.path().join("a-1.webp"),
                dir.path().join("a-2.webp"),
            ]
        );
        assert_eq!(fs::read(&written[0]).unwrap(), vec![1]);
        assert_eq!(fs::read(&written[1]).unwrap(), vec![2]);
        assert_eq!(fs::read(&written[2]).unwrap(), vec![3]);
    }

    #[test]
    fn numbered_name_skips_taken_suffixes() {
        let taken: HashSet<String> = ["a.webp", "a-1.webp"].iter().map(|s| s.to_string()).collect();
        assert_eq!(unique_name("a.webp", &taken), "a-2.webp");
        assert_eq!(unique_name("b.webp", &taken), "b.webp");
    }
}
