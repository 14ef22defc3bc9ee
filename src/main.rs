// TuneSift - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading (platform config dir or --config)
// 3. Logging initialisation (debug mode support)
// 4. Dispatch to the pipeline stage named by the subcommand

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tunesift::app::pipeline;
use tunesift::app::profile_store::{JsonProfileStore, ProfileStore};
use tunesift::app::provider;
use tunesift::core::model::{Label, MergeStatus};
use tunesift::platform::config::{self, AppConfig, PlatformPaths};
use tunesift::util::constants;
use tunesift::util::error::{ConfigError, Result, TuneSiftError};
use tunesift::util::logging;

/// TuneSift - find the music videos in a viewing history.
///
/// Mines a profile from a reference set of known music videos, classifies
/// candidate videos against it, and merges manual review decisions into a
/// final music database.
#[derive(Parser, Debug)]
#[command(name = "tunesift", version, about)]
struct Cli {
    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    /// Config file to use instead of the platform default.
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract distinct watched videos and the covered date span from a
    /// Takeout watch-history.json.
    History {
        /// Path to watch-history.json.
        history: PathBuf,

        /// Write the watched videos to this CSV.
        #[arg(short = 'o', long = "out")]
        out: Option<PathBuf>,
    },

    /// Mine a profile from reference tables of known music videos.
    BuildProfile {
        /// Reference tables (paths or glob patterns).
        #[arg(long = "corpus", required = true, num_args = 1..)]
        corpus: Vec<String>,

        /// Where to store the profile (default: platform data directory).
        #[arg(long = "profile")]
        profile: Option<PathBuf>,

        #[arg(long = "k-categories")]
        k_categories: Option<usize>,

        #[arg(long = "k-tags")]
        k_tags: Option<usize>,

        #[arg(long = "k-desc-words")]
        k_desc_words: Option<usize>,
    },

    /// Print a summary of a stored profile.
    ShowProfile {
        #[arg(long = "profile")]
        profile: Option<PathBuf>,

        /// Entries shown per list.
        #[arg(long = "limit", default_value_t = 20)]
        limit: usize,
    },

    /// Classify videos from a details table against a stored profile.
    Classify {
        /// Details table (one row per video).
        #[arg(long = "details")]
        details: PathBuf,

        /// Table whose VideoID column selects the videos to classify
        /// (default: every row of the details table).
        #[arg(long = "ids")]
        ids: Option<PathBuf>,

        #[arg(long = "profile")]
        profile: Option<PathBuf>,

        /// Directory receiving classified.csv, music.csv, review.csv and
        /// results.json.
        #[arg(long = "out-dir")]
        out_dir: PathBuf,
    },

    /// Merge auto-detected music with reviewed Maybe items.
    Merge {
        /// music.csv from `classify`.
        #[arg(long = "music")]
        music: PathBuf,

        /// review.csv from `classify`.
        #[arg(long = "maybe")]
        maybe: PathBuf,

        /// Reviewed sheet with the Is_Music_Manual column filled in.
        #[arg(long = "decisions")]
        decisions: Option<PathBuf>,

        #[arg(short = 'o', long = "out")]
        out: PathBuf,
    },
}

/// Resolve the config file: an explicit `--config` must exist, the platform
/// default may be absent.
fn load_app_config(
    explicit: Option<&Path>,
    paths: &PlatformPaths,
) -> Result<(AppConfig, Vec<String>)> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "config file does not exist",
                    ),
                }
                .into());
            }
            Ok(config::load_config_file(path))
        }
        None => Ok(config::load_config(&paths.config_dir)),
    }
}

/// Apply a CLI override for a mining limit after checking its range.
fn override_limit(
    value: Option<usize>,
    max: usize,
    field: &str,
    target: &mut usize,
) -> Result<()> {
    if let Some(v) = value {
        if !(1..=max).contains(&v) {
            return Err(ConfigError::ValueOutOfRange {
                field: field.to_string(),
                value: v.to_string(),
                expected: format!("1-{max}"),
            }
            .into());
        }
        *target = v;
    }
    Ok(())
}

fn run(command: Command, mut config: AppConfig, paths: &PlatformPaths) -> Result<()> {
    let profile_path = |explicit: Option<PathBuf>| -> PathBuf {
        explicit.unwrap_or_else(|| paths.default_profile_path())
    };

    match command {
        Command::History { history, out } => {
            let (videos, span) = pipeline::extract_history(&history, out.as_deref())?;
            println!("{} distinct videos watched", videos.len());
            if let Some(span) = span {
                println!(
                    "{} to {} ({} days, about {} months)",
                    span.earliest.format("%Y-%m-%d"),
                    span.latest.format("%Y-%m-%d"),
                    span.days(),
                    span.approx_months()
                );
            }
        }

        Command::BuildProfile {
            corpus,
            profile,
            k_categories,
            k_tags,
            k_desc_words,
        } => {
            override_limit(
                k_categories,
                constants::ABSOLUTE_MAX_K_CATEGORIES,
                "--k-categories",
                &mut config.profile.k_categories,
            )?;
            override_limit(
                k_tags,
                constants::ABSOLUTE_MAX_K_TERMS,
                "--k-tags",
                &mut config.profile.k_tags,
            )?;
            override_limit(
                k_desc_words,
                constants::ABSOLUTE_MAX_K_TERMS,
                "--k-desc-words",
                &mut config.profile.k_desc_words,
            )?;

            let stopwords = pipeline::load_stopwords(&config)?;
            let mut store = JsonProfileStore::new(profile_path(profile));
            let (profile, report) =
                pipeline::mine_profile(&corpus, &config.profile, &stopwords, &mut store)?;

            println!(
                "Profile written to {} ({} records used, {} skipped)",
                store.path().display(),
                report.records_used,
                report.records_skipped
            );
            println!(
                "Kept {} categories, {} tags, {} description words; top categories cover {:.1}% of the corpus",
                profile.categories.len(),
                profile.tags.len(),
                profile.desc_words.len(),
                report.category_coverage_pct
            );
        }

        Command::ShowProfile { profile, limit } => {
            let store = JsonProfileStore::new(profile_path(profile));
            let stored = store.load_stored()?;
            println!(
                "Profile {} (schema v{}, mined {})",
                store.path().display(),
                stored.version,
                stored.created_at.to_rfc3339()
            );
            print!("{}", stored.profile.describe(limit));
        }

        Command::Classify {
            details,
            ids,
            profile,
            out_dir,
        } => {
            let store = JsonProfileStore::new(profile_path(profile));
            let corpus_profile = store.load()?;
            let stopwords = pipeline::load_stopwords(&config)?;
            let ids = ids
                .as_deref()
                .map(provider::read_id_list)
                .transpose()?;

            let (run, outputs) = pipeline::classify_from_details(
                &details,
                ids.as_deref(),
                &corpus_profile,
                &config,
                stopwords,
                &out_dir,
            )?;

            for label in Label::all() {
                println!("{:>16}: {}", label.label(), run.buckets.count(*label));
            }
            println!("Review sheet: {}", outputs.review.display());
        }

        Command::Merge {
            music,
            maybe,
            decisions,
            out,
        } => {
            let database = pipeline::finalize(&music, &maybe, decisions.as_deref(), &out)?;
            let status = match database.status {
                MergeStatus::Final => "final",
                MergeStatus::Pending => "pending review",
            };
            println!(
                "{} music videos written to {} ({status})",
                database.len(),
                out.display()
            );
        }
    }
    Ok(())
}

/// Print an error with its full cause chain.
fn report(error: &TuneSiftError) {
    eprintln!("Error: {error}");
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}

fn main() {
    let cli = Cli::parse();

    let platform_paths = PlatformPaths::resolve();
    let (config, warnings) = match load_app_config(cli.config.as_deref(), &platform_paths) {
        Ok(loaded) => loaded,
        Err(e) => {
            logging::init(cli.debug, None, None);
            tracing::error!(error = %e, "Configuration could not be loaded");
            report(&e);
            std::process::exit(1);
        }
    };

    logging::init(
        cli.debug,
        config.log_level.as_deref(),
        config.log_file.as_deref(),
    );

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "{} starting",
        constants::APP_NAME
    );
    for warning in &warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    if let Err(e) = run(cli.command, config, &platform_paths) {
        tracing::error!(error = %e, "Command failed");
        report(&e);
        std::process::exit(1);
    }
}
