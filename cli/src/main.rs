mod browser;
mod order;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mealflow_core::{can_open_new_tabs, FileStore, MealflowConfig, Preferences, RecipeFilters};
use tracing_subscriber::EnvFilter;

use crate::browser::SystemBrowser;

#[derive(Parser)]
#[command(name = "mealflow")]
#[command(about = "Order recipe ingredients from a partner store", long_about = None)]
struct Cli {
    /// Preferences file (default: ~/.mealflow/storage.json)
    #[arg(long, global = true, env = "MEALFLOW_STORAGE")]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an order link for a recipe and open it
    Order {
        /// Recipe JSON file, or a JSON array of ingredients
        #[arg(long)]
        recipe: PathBuf,
        /// Print the link without opening it
        #[arg(long)]
        no_open: bool,
        /// Do not fall back to printing the link when the browser cannot be opened
        #[arg(long)]
        no_fallback: bool,
    },
    /// Open the last order link again
    Open {
        #[arg(long)]
        no_fallback: bool,
        /// Show a warning with manual-copy instructions first
        #[arg(long)]
        warn: bool,
    },
    /// Copy the last order link
    Copy,
    /// Manage favorite recipes
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Show or edit the search history
    SearchHistory {
        /// Record a search
        #[arg(long)]
        add: Option<String>,
        /// Forget all searches
        #[arg(long)]
        clear: bool,
    },
    /// Show or update the saved recipe filters
    Filters {
        #[arg(long)]
        cuisine: Option<String>,
        #[arg(long)]
        difficulty: Option<String>,
        /// Maximum cooking time in minutes
        #[arg(long)]
        max_time: Option<u32>,
        /// Replace the tag filter (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        search: Option<String>,
        /// Forget all saved filters
        #[arg(long)]
        clear: bool,
    },
    /// Show or set the ingredient mapping language
    Language { value: Option<String> },
    /// Check whether links can be opened automatically
    Probe,
}

#[derive(Subcommand)]
enum FavoritesAction {
    List,
    Add { recipe_id: String },
    Remove { recipe_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let storage_path = cli
        .storage
        .unwrap_or_else(MealflowConfig::storage_path_from_env);
    let prefs = Preferences::new(FileStore::open(&storage_path)?);

    match cli.command {
        Commands::Order {
            recipe,
            no_open,
            no_fallback,
        } => {
            let mut config = MealflowConfig::from_env()?;
            if std::env::var("MEALFLOW_LANGUAGE").is_err() {
                config.language = prefs.language();
            }
            order::order(&config, &prefs, &recipe, !no_open, !no_fallback).await?;
        }
        Commands::Open { no_fallback, warn } => {
            order::open_last(&prefs, !no_fallback, warn)?;
        }
        Commands::Copy => {
            order::copy_last(&prefs)?;
        }
        Commands::Favorites { action } => match action {
            FavoritesAction::List => {
                for id in prefs.favorites() {
                    println!("{}", id);
                }
            }
            FavoritesAction::Add { recipe_id } => prefs.add_favorite(&recipe_id),
            FavoritesAction::Remove { recipe_id } => prefs.remove_favorite(&recipe_id),
        },
        Commands::SearchHistory { add, clear } => {
            if clear {
                prefs.clear_search_history();
            }
            if let Some(search) = add {
                prefs.add_search_to_history(&search);
                prefs.add_recent_search(&search);
            }
            for search in prefs.search_history() {
                println!("{}", search);
            }
        }
        Commands::Filters {
            cuisine,
            difficulty,
            max_time,
            tags,
            search,
            clear,
        } => {
            let mut filters = if clear {
                RecipeFilters::default()
            } else {
                prefs.filters()
            };
            filters.cuisine = cuisine.or(filters.cuisine);
            filters.difficulty = difficulty.or(filters.difficulty);
            filters.max_time = max_time.or(filters.max_time);
            filters.search = search.or(filters.search);
            if !tags.is_empty() {
                filters.tags = tags;
            }
            prefs.set_filters(&filters);
            println!("{}", serde_json::to_string_pretty(&filters)?);
        }
        Commands::Language { value } => match value {
            Some(language) => prefs.set_language(&language),
            None => println!("{}", prefs.language()),
        },
        Commands::Probe => {
            let supported = can_open_new_tabs(&SystemBrowser);
            println!(
                "{}",
                if supported {
                    "new tabs: supported"
                } else {
                    "new tabs: blocked"
                }
            );
        }
    }

    Ok(())
}
