//! Command definitions and handlers

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use osu_score_core::{
    apply_mods, Beatmap, BeatmapStats, Beatmapset, Config, EstimationProviders, HttpSimulationDao,
    Ruleset, ScoreSimEstimationProvider, Song,
};

use crate::mod_arg::parse_mods;
use crate::score_file::ScoreFile;

#[derive(Debug, Parser)]
#[command(name = "osu-score")]
#[command(about = "Apply osu! mods and estimate star rating and pp", version)]
pub struct Args {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show how mods change a beatmap's difficulty settings
    Apply {
        /// Ruleset name or id (osu, taiko, fruits, mania)
        #[arg(short, long, default_value = "osu")]
        ruleset: Ruleset,

        #[arg(long)]
        ar: f64,

        #[arg(long)]
        cs: f64,

        #[arg(long)]
        od: f64,

        #[arg(long)]
        hp: f64,

        /// Known nomod star rating
        #[arg(long)]
        stars: Option<f64>,

        /// Mods, e.g. `HD`, `HT:0.8`, `DA:cs=5,ar=10`
        mods: Vec<String>,
    },

    /// Estimate star rating and pp of an osu!standard score file
    Estimate {
        /// JSON score record
        score_file: PathBuf,

        /// Derive hit statistics from accuracy instead of the raw counts
        #[arg(long)]
        accuracy_mode: bool,
    },

    /// Show the effective configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

/// CLI options
#[derive(Debug, Clone, Copy, Default)]
pub struct CliOptions {
    pub json: bool,
}

/// Run CLI command
pub async fn run(args: Args) -> anyhow::Result<()> {
    let options = CliOptions { json: args.json };

    match args.command {
        Command::Apply {
            ruleset,
            ar,
            cs,
            od,
            hp,
            stars,
            mods,
        } => run_apply(
            ruleset,
            BeatmapStats::new(ar, cs, od, hp),
            stars,
            &mods,
            options,
        ),
        Command::Estimate {
            score_file,
            accuracy_mode,
        } => {
            let config = load_config(args.config.as_deref())?;
            run_estimate(&config, &score_file, accuracy_mode, options).await
        }
        Command::Config { init } => run_config(args.config.as_deref(), init, options),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::load()),
    }
}

/// Beatmap built from command-line stats; metadata is left empty
fn adhoc_beatmap(ruleset: Ruleset, stats: BeatmapStats, stars: Option<f64>) -> Beatmap {
    Beatmap {
        id: 0,
        ruleset,
        difficulty_name: String::new(),
        stats,
        star_rating: stars,
        length_seconds: 0.0,
        max_combo: None,
        beatmapset: Beatmapset::default(),
        song: Song::default(),
    }
}

fn run_apply(
    ruleset: Ruleset,
    stats: BeatmapStats,
    stars: Option<f64>,
    mod_args: &[String],
    options: CliOptions,
) -> anyhow::Result<()> {
    let mods = parse_mods(ruleset, mod_args)?;
    let beatmap = adhoc_beatmap(ruleset, stats, stars);
    let modded = apply_mods(ruleset, &beatmap, &mods);

    tracing::debug!("Applied {} mod(s) on {}", mods.len(), ruleset);

    let acronyms: Vec<&str> = mods.iter().map(|m| m.acronym()).collect();

    if options.json {
        println!(
            "{}",
            serde_json::json!({
                "ruleset": ruleset,
                "mods": acronyms,
                "stats": modded.stats,
                "star_rating": modded.star_rating,
            })
        );
    } else {
        let mods_label = if acronyms.is_empty() {
            "NM".to_string()
        } else {
            acronyms.join("")
        };
        println!("{} +{}", ruleset, mods_label);
        println!();
        println!("AR: {:>6.2} -> {:.2}", stats.ar, modded.stats.ar);
        println!("CS: {:>6.2} -> {:.2}", stats.cs, modded.stats.cs);
        println!("OD: {:>6.2} -> {:.2}", stats.od, modded.stats.od);
        println!("HP: {:>6.2} -> {:.2}", stats.hp, modded.stats.hp);
        println!("Stars: {}", format_estimate(modded.star_rating, 2));
    }

    Ok(())
}

async fn run_estimate(
    config: &Config,
    path: &Path,
    accuracy_mode: bool,
    options: CliOptions,
) -> anyhow::Result<()> {
    let file = ScoreFile::load(path)?;

    let mut estimation = config.estimation.clone();
    estimation.use_accuracy |= accuracy_mode;

    let dao = HttpSimulationDao::new(&config.simulation)
        .context("Failed to create simulation client")?;
    let provider = Arc::new(ScoreSimEstimationProvider::from_config(
        Arc::new(dao),
        &estimation,
    ));
    tracing::info!(
        "Estimating with {:?} simulation via {}",
        provider.mode(),
        config.simulation.base_url
    );

    let score = file.into_score(EstimationProviders::from_shared(provider))?;
    let (star_rating, pp) = tokio::join!(
        score.get_estimated_star_rating(),
        score.get_estimated_pp()
    );

    let beatmap = score.modded_beatmap();
    let acronyms: Vec<&str> = score.mods().iter().map(|m| m.acronym()).collect();

    if options.json {
        println!(
            "{}",
            serde_json::json!({
                "score": score.handle().value(),
                "beatmap_id": beatmap.id,
                "mods": acronyms,
                "accuracy": score.accuracy(),
                "rank": score.info().rank.code(),
                "stats": beatmap.stats,
                "star_rating": star_rating,
                "pp": pp,
            })
        );
    } else {
        println!(
            "Beatmap {} [{}] +{}",
            beatmap.id,
            beatmap.difficulty_name,
            if acronyms.is_empty() {
                "NM".to_string()
            } else {
                acronyms.join("")
            }
        );
        println!(
            "{:.2}% {} x{}",
            score.accuracy(),
            score.info().rank,
            score.max_combo()
        );
        println!();
        println!("Stars: {}", format_estimate(star_rating, 2));
        println!("PP:    {}", format_estimate(pp, 1));
    }

    Ok(())
}

fn run_config(path: Option<&Path>, init: bool, options: CliOptions) -> anyhow::Result<()> {
    if init {
        let config = Config::default();
        let written = match path {
            Some(path) => {
                config.save_to(path)?;
                path.to_path_buf()
            }
            None => {
                config.save()?;
                Config::config_path()
                    .ok_or_else(|| anyhow::anyhow!("No config directory on this system"))?
            }
        };
        tracing::info!("Wrote default config to {}", written.display());
        return Ok(());
    }

    let config = load_config(path)?;
    if options.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        let location = path
            .map(Path::to_path_buf)
            .or_else(Config::config_path)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string());
        println!("Config file: {}", location);
        println!();
        println!("Simulation service: {}", config.simulation.base_url);
        println!("  timeout:     {}s", config.simulation.timeout_secs);
        println!(
            "  retries:     {} (every {}ms)",
            config.simulation.max_retries, config.simulation.retry_delay_ms
        );
        println!(
            "Simulation cache:   {} scores, evicting {} at a time",
            config.estimation.cache_capacity, config.estimation.eviction_batch
        );
        println!("Accuracy mode:      {}", config.estimation.use_accuracy);
    }

    Ok(())
}

fn format_estimate(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(value) => format!("{:.*}", precision, value),
        None => "unknown".to_string(),
    }
}
