//! Database maintenance for the food manager.
//!
//! ```bash
//! # drop and recreate every table
//! cargo run --bin food-manager-admin -- init-db
//!
//! # fill an empty database with the demo catalog
//! cargo run --bin food-manager-admin -- sample-data
//! ```

use clap::{Parser, Subcommand};

use food_manager::config::Config;
use food_manager::db;
use food_manager::errors::StoreError;
use food_manager::sample;

#[derive(Parser)]
#[command(
    name = "food-manager-admin",
    about = "Food manager database maintenance",
    long_about = "Create, clear and seed the food manager SQLite database"
)]
struct AdminArgs {
    /// Database URL override (defaults to DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Drop all tables and create them again
    InitDb,
    /// Delete every row while keeping the tables
    ClearDb,
    /// Add the sample foods, ingredients, categories and recipes
    SampleData,
}

#[derive(Debug, thiserror::Error)]
enum AdminError {
    #[error(transparent)]
    Config(#[from] food_manager::config::ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
}

fn run(args: AdminArgs) -> Result<(), AdminError> {
    let config = Config::from_env()?;
    let database_url = args.database_url.unwrap_or(config.database_url);
    let pool = db::establish_pool(&database_url, 1)?;
    let mut conn = pool.get()?;

    match args.command {
        Command::InitDb => {
            db::reset(&mut conn)?;
            println!("Initialized the database.");
        }
        Command::ClearDb => {
            db::clear(&mut conn)?;
            println!("Cleared all data from the database.");
        }
        Command::SampleData => {
            db::run_migrations(&mut conn)?;
            let summary = sample::populate(&mut conn)?;
            println!(
                "Added sample data to the database: {} foods, {} ingredients, {} categories, {} recipes.",
                summary.foods, summary.ingredients, summary.categories, summary.recipes
            );
        }
    }
    Ok(())
}

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));

    let args = AdminArgs::parse();
    if let Err(err) = run(args) {
        log::error!("admin command failed: {}", err);
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
