//! Food catalog service: foods, recipes, ingredients, categories and
//! nutritional info stored in SQLite and served as Mason hypermedia.

pub mod config;
pub mod db;
pub mod errors;
pub mod mason;
pub mod models;
pub mod query;
pub mod routes;
pub mod sample;
pub mod schema;
