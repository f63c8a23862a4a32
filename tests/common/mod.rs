#![allow(dead_code)]

use std::path::Path;

use diesel::SqliteConnection;

use food_manager::db::{self, DbPool};
use food_manager::models::{Food, NewFood, NewRecipe, Recipe};
use food_manager::query;

/// A fresh in-memory database. One connection keeps the database alive for
/// the lifetime of the pool.
pub fn test_pool() -> DbPool {
    let pool = db::establish_pool(":memory:", 1).expect("in-memory pool");
    db::run_migrations(&mut pool.get().expect("connection")).expect("migrations");
    pool
}

/// A database file under `dir`, shared by `size` pooled connections.
pub fn file_pool(dir: &Path, size: u32) -> DbPool {
    let path = dir.join("catalog.db");
    let url = path.to_str().expect("utf-8 path");
    let pool = db::establish_pool(url, size).expect("file pool");
    db::run_migrations(&mut pool.get().expect("connection")).expect("migrations");
    pool
}

pub fn pizza(conn: &mut SqliteConnection) -> Food {
    query::create_food(conn, &NewFood::named("Pizza")).expect("create food")
}

pub fn bake(conn: &mut SqliteConnection, food_id: i32) -> Recipe {
    query::create_recipe(
        conn,
        &NewRecipe {
            food_id,
            instruction: "Bake".to_string(),
            prep_time: 10,
            cook_time: 20,
            servings: 2,
        },
    )
    .expect("create recipe")
}
