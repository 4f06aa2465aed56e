//! community-assess - age-friendly community assessment tool
//!
//! A CLI for scoring a community against the fixed indicator rubric,
//! computing weighted totals, and keeping the results in a local store.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (invalid input, unknown code, store failure, etc.)

mod analysis;
mod catalog;
mod cli;
mod config;
mod draft;
mod error;
mod listing;
mod location;
mod models;
mod report;
mod store;

use anyhow::{bail, Context, Result};
use chrono::Local;
use cli::{Args, Command, OutputFormat};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use listing::Listing;
use location::{apply_location, AmapClient, LocationUpdate};
use models::Location;
use std::path::Path;
use std::time::Duration;
use store::{AssessmentRepository, FileStore, KeyValueStore};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if matches!(args.command, Command::InitConfig) {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    debug!("community-assess v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Command failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle init-config: generate a default .community-assess.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE);
    println!("   Edit it to set the store directory, draft file and AMap key.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            debug!("Loaded default config from {}", config::CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

/// Dispatch a subcommand.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let draft_path = config.general.draft.clone();
    let mut repo = AssessmentRepository::new(FileStore::new(config.store.dir.clone()));

    match args.command {
        Command::New {
            name,
            province,
            city,
            district,
            address,
            assessor,
            notes,
            date,
            force,
        } => {
            ensure_no_draft(&draft_path, force)?;

            let date = date.unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string());
            let location = Location {
                province,
                city,
                district,
                address,
                coordinates: None,
            };

            let mut assessment = analysis::new_draft(&name, location, &date);
            assessment.assessor = assessor;
            assessment.notes = notes;

            draft::write_draft(&draft_path, &assessment)?;
            println!("📝 Started draft \"{}\" in {}", name, draft_path.display());
        }

        Command::Set {
            category,
            indicator,
            value,
        } => {
            let current = draft::load_draft(&draft_path)?;
            let updated = analysis::set_indicator_value(&current, &category, &indicator, value.0)?;
            draft::write_draft(&draft_path, &updated)?;

            let score = updated
                .category(&category)
                .map(analysis::category_score)
                .transpose()?
                .unwrap_or(0.0);
            println!(
                "✅ {} = {} | {} score: {:.1} | total: {:.1}",
                indicator,
                value
                    .0
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "unset".to_string()),
                category,
                score,
                analysis::total_score(&updated)?
            );
        }

        Command::Show { category, format } => {
            let current = draft::load_draft(&draft_path)?;
            print_assessment(&current, category.as_deref(), format, &config)?;
        }

        Command::Locate {
            search,
            pick,
            lng,
            lat,
            address,
        } => {
            let current = draft::load_draft(&draft_path)?;
            let client = AmapClient::new(&config.amap)?;

            let update = match (search, lng, lat) {
                (Some(keyword), _, _) => {
                    match pick_community(&client, &keyword, pick).await? {
                        Some(update) => update,
                        None => return Ok(()),
                    }
                }
                (None, Some(lng), Some(lat)) => {
                    let address = match address {
                        Some(address) => address,
                        None => client.reverse_geocode(lng, lat).await?,
                    };
                    LocationUpdate { lng, lat, address }
                }
                _ => bail!("Use either --search or --lng/--lat"),
            };

            let located = apply_location(&current, &update);
            draft::write_draft(&draft_path, &located)?;
            println!(
                "📍 Location set to {} ({:.6}, {:.6})",
                update.address, update.lng, update.lat
            );
        }

        Command::Save { discard_draft } => {
            let saved = save_draft(&mut repo, &draft_path, discard_draft)?;

            println!("✅ Assessment saved!");
            println!("   ID: {}", saved.id);
            println!("   Total score: {:.1}", saved.total_score.unwrap_or(0.0));
        }

        Command::List {
            search,
            sort,
            format,
        } => {
            let listing = Listing::load(&repo)?;
            if listing.is_empty() {
                debug!("No saved assessments in {}", repo.store().root().display());
            }
            let results = listing.query(&search, sort);

            match format {
                OutputFormat::Markdown => {
                    print!(
                        "{}",
                        report::generate_listing_markdown(&results, &listing.stats())
                    );
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
            }
        }

        Command::View { id, format } => {
            let saved = repo
                .load(&id)
                .with_context(|| format!("Failed to load assessment {}", id))?;
            print_assessment(&saved, None, format, &config)?;
        }

        Command::Edit { id, force } => {
            ensure_no_draft(&draft_path, force)?;

            let saved = repo
                .load(&id)
                .with_context(|| format!("Failed to load assessment {}", id))?;
            let reopened = analysis::draft_from_saved(&saved);

            draft::write_draft(&draft_path, &reopened)?;
            println!(
                "📝 Draft \"{}\" created from {} in {}",
                reopened.name,
                id,
                draft_path.display()
            );
        }

        Command::Delete { id, yes } => {
            let mut listing = Listing::load(&repo)?;

            if !yes {
                let confirmed = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Delete assessment {}? This cannot be undone",
                        id
                    ))
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            if listing.delete(&mut repo, &id)? {
                println!("🗑️  Deleted assessment {}", id);
            } else {
                bail!("Assessment not found: {}", id);
            }
            debug!("{} assessments remain", listing.len());
        }

        Command::Catalog => {
            for category in catalog::catalog() {
                println!(
                    "{} - {} (weight {:.3})",
                    category.code, category.name, category.weight
                );
                for indicator in &category.indicators {
                    println!(
                        "   {}  {} [{}]",
                        indicator.code,
                        indicator.name,
                        indicator.unit.as_deref().unwrap_or("")
                    );
                }
            }
        }

        Command::InitConfig => return handle_init_config(),
    }

    Ok(())
}

/// Finalize the draft and put it in the store.
///
/// The draft file is only touched after the store write succeeded.
fn save_draft<S: KeyValueStore>(
    repo: &mut AssessmentRepository<S>,
    draft_path: &Path,
    discard_draft: bool,
) -> Result<models::Assessment> {
    let current = draft::load_draft(draft_path)?;
    let saved = analysis::finalize(&current)?;

    repo.save(&saved).with_context(|| {
        format!(
            "Could not save assessment; your draft is still in {}",
            draft_path.display()
        )
    })?;

    if discard_draft {
        std::fs::remove_file(draft_path)
            .with_context(|| format!("Failed to remove {}", draft_path.display()))?;
    }

    Ok(saved)
}

/// Refuse to replace an existing draft unless forced.
fn ensure_no_draft(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "A draft already exists at {}. Save it first or pass --force",
            path.display()
        );
    }
    Ok(())
}

/// Print an assessment, or one of its categories.
fn print_assessment(
    assessment: &models::Assessment,
    category: Option<&str>,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    match (category, format) {
        (Some(code), OutputFormat::Markdown) => {
            let category = assessment
                .category(code)
                .ok_or_else(|| error::ScoringError::UnknownCategory {
                    code: code.to_string(),
                })?;
            print!("{}", report::generate_category_section(category)?);
        }
        (Some(code), OutputFormat::Json) => {
            let category = assessment
                .category(code)
                .ok_or_else(|| error::ScoringError::UnknownCategory {
                    code: code.to_string(),
                })?;
            println!("{}", serde_json::to_string_pretty(category)?);
        }
        (None, OutputFormat::Markdown) => {
            print!(
                "{}",
                report::generate_markdown_summary(assessment, config.report.include_indicators)?
            );
        }
        (None, OutputFormat::Json) => println!("{}", report::generate_json_report(assessment)?),
    }
    Ok(())
}

/// Search for communities and turn the chosen one into a location update.
///
/// Without `pick`, the results are printed and `None` is returned.
async fn pick_community(
    client: &AmapClient,
    keyword: &str,
    pick: Option<usize>,
) -> Result<Option<LocationUpdate>> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Searching for {}...", keyword));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let results = client.search_communities(keyword).await;
    spinner.finish_and_clear();
    let results = results?;

    if results.is_empty() {
        println!("No communities found for \"{}\".", keyword);
        return Ok(None);
    }

    let Some(n) = pick else {
        println!("Found {} communities:\n", results.len());
        for (i, poi) in results.iter().enumerate() {
            println!("  {}. {} - {}", i + 1, poi.name, poi.address);
        }
        println!("\nRe-run with --pick N to use one of them.");
        return Ok(None);
    };

    let poi = results
        .get(n - 1)
        .with_context(|| format!("Only {} results; cannot pick {}", results.len(), n))?;

    Ok(Some(poi.to_location_update()))
}
