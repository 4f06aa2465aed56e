//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::MAX_INDICATOR_VALUE;
use crate::listing::SortBy;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

/// community-assess - score communities against the age-friendly rubric
///
/// Start a draft, fill indicator values one at a time, review the
/// category and total scores, then save the result to the local store.
///
/// Examples:
///   community-assess new --name "阳光花园" --province 浙江省 --city 杭州市 --district 西湖区
///   community-assess set A A11 80
///   community-assess set A A12 unset
///   community-assess show
///   community-assess locate --search 阳光花园 --pick 1
///   community-assess save
///   community-assess list --search 杭州 --sort score
///   community-assess delete <ID>
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for .community-assess.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding saved assessments
    #[arg(long, global = true, value_name = "DIR", env = "COMMUNITY_ASSESS_STORE")]
    pub store_dir: Option<PathBuf>,

    /// Draft working file
    #[arg(long, global = true, value_name = "FILE")]
    pub draft: Option<PathBuf>,

    /// AMap web service key
    #[arg(long, global = true, env = "AMAP_KEY", hide_env_values = true)]
    pub amap_key: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start a new draft from the indicator catalog
    New {
        /// Community name
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        province: String,
        #[arg(long, default_value = "")]
        city: String,
        #[arg(long, default_value = "")]
        district: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        assessor: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Assessment date (YYYY-MM-DD), defaults to today
        #[arg(long, value_name = "DATE")]
        date: Option<String>,
        /// Overwrite an existing draft
        #[arg(long)]
        force: bool,
    },

    /// Set or clear one indicator value in the draft
    Set {
        /// Category code (A-H)
        category: String,
        /// Indicator code (e.g. A11)
        indicator: String,
        /// Numeric value, or "unset" to clear it
        #[arg(allow_hyphen_values = true)]
        value: IndicatorValue,
    },

    /// Show scores for the draft
    Show {
        /// Only show one category
        #[arg(long, value_name = "CODE")]
        category: Option<String>,
        #[arg(long, default_value = "markdown", value_name = "FORMAT")]
        format: OutputFormat,
    },

    /// Set the draft location from a community search or coordinates
    Locate {
        /// Community name to search for
        #[arg(long, conflicts_with_all = ["lng", "lat"])]
        search: Option<String>,
        /// Pick the Nth search result (1-based) instead of listing them
        #[arg(long, requires = "search", value_name = "N")]
        pick: Option<usize>,
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Address for the coordinates; looked up when omitted
        #[arg(long, requires = "lng")]
        address: Option<String>,
    },

    /// Finalize the draft and save it to the store
    Save {
        /// Remove the draft file after a successful save
        #[arg(long)]
        discard_draft: bool,
    },

    /// List saved assessments
    List {
        /// Substring to match against name, city or district
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "date")]
        sort: SortBy,
        #[arg(long, default_value = "markdown", value_name = "FORMAT")]
        format: OutputFormat,
    },

    /// Show a saved assessment
    View {
        id: String,
        #[arg(long, default_value = "markdown", value_name = "FORMAT")]
        format: OutputFormat,
    },

    /// Start a new draft from a saved assessment
    Edit {
        id: String,
        /// Overwrite an existing draft
        #[arg(long)]
        force: bool,
    },

    /// Delete a saved assessment
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the indicator catalog
    Catalog,

    /// Generate a default .community-assess.toml configuration file
    InitConfig,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Indicator value given on the command line; `unset` clears it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorValue(pub Option<f64>);

impl FromStr for IndicatorValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unset" | "null" | "none" | "-" => Ok(IndicatorValue(None)),
            other => {
                let value: f64 = other
                    .parse()
                    .map_err(|_| format!("'{}' is not a number or 'unset'", s))?;
                if !value.is_finite() {
                    return Err(format!("'{}' is not a finite number", s));
                }
                if value.abs() > MAX_INDICATOR_VALUE {
                    return Err(format!(
                        "'{}' is out of range (at most {} in magnitude)",
                        s, MAX_INDICATOR_VALUE
                    ));
                }
                Ok(IndicatorValue(Some(value)))
            }
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        match &self.command {
            Command::New { name, date, .. } => {
                if name.trim().is_empty() {
                    return Err("Community name must not be empty".to_string());
                }
                if let Some(date) = date {
                    NaiveDate::parse_from_str(date, "%Y-%m-%d")
                        .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", date))?;
                }
            }
            Command::Locate {
                search, lng, pick, ..
            } => {
                if search.is_none() && lng.is_none() {
                    return Err("Use either --search or --lng/--lat".to_string());
                }
                if *pick == Some(0) {
                    return Err("--pick is 1-based".to_string());
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
