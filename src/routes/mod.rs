//! HTTP handlers. Every storage call goes through [`Store::run`] on the
//! blocking pool and every success body is a Mason envelope.

use actix_web::http::{header, StatusCode};
use actix_web::{get, web, HttpRequest, HttpResponse};
use diesel::SqliteConnection;
use serde::Serialize;
use serde_json::Value;

use crate::db::Store;
use crate::errors::{ApiError, StoreError};
use crate::mason::{
    MasonBuilder, CATEGORIES_URL, FOODS_URL, INGREDIENTS_URL, LINK_RELATIONS_URL, MASON, NAMESPACE,
    NUTRITION_URL, RECIPES_URL, RECIPE_SEARCH_URL,
};

mod category;
mod food;
mod ingredient;
mod links;
mod nutrition;
mod recipe;
mod search;

/// Registers extractor error handlers, every route under `/api` and a
/// Mason 404 for requests no route accepts.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default().error_handler(|err, _req| ApiError::from(err).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, req| ApiError::from_path(err, req.path()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::InvalidInput(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            .service(entry_point)
            .configure(food::configure)
            // search before the recipe item route, which would claim "search" as an id
            .configure(search::configure)
            .configure(recipe::configure)
            .configure(links::configure)
            .configure(ingredient::configure)
            .configure(category::configure)
            .configure(nutrition::configure),
    )
    .default_service(web::to(no_route));
}

async fn no_route(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    Err(ApiError::InvalidPath(format!("{} {}", req.method(), req.path())))
}

#[get("/")]
async fn entry_point() -> HttpResponse {
    let mut body = MasonBuilder::new();
    body.add_namespace(NAMESPACE, LINK_RELATIONS_URL);
    body.add_control_get("foods-all", "All foods", FOODS_URL);
    body.add_control_get("recipes-all", "All recipes", RECIPES_URL);
    body.add_control_get("ingredients-all", "All ingredients", INGREDIENTS_URL);
    body.add_control_get("categories-all", "All categories", CATEGORIES_URL);
    body.add_control_get("nutritional-info-all", "All nutritional info", NUTRITION_URL);
    body.add_control_get("recipes-search", "Search recipes", RECIPE_SEARCH_URL);
    mason(StatusCode::OK, &body)
}

/// Runs `f` with a pooled connection on the blocking thread pool.
pub(crate) async fn with_store<F, T>(store: web::Data<Store>, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&mut SqliteConnection) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let result = web::block(move || store.run(f)).await?;
    Ok(result?)
}

pub(crate) fn envelope<T: Serialize>(data: &T) -> Result<MasonBuilder, ApiError> {
    MasonBuilder::from_data(data).map_err(|err| ApiError::Internal(err.to_string()))
}

/// Builds a collection envelope: `{"items": [...]}` plus the namespace.
pub(crate) fn collection(items: Vec<MasonBuilder>) -> MasonBuilder {
    let mut body = MasonBuilder::new();
    body.insert(
        "items",
        Value::Array(items.iter().map(MasonBuilder::to_value).collect()),
    );
    body.add_namespace(NAMESPACE, LINK_RELATIONS_URL);
    body
}

pub(crate) fn mason(status: StatusCode, body: &MasonBuilder) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header((header::CONTENT_TYPE, MASON))
        .body(body.to_string())
}

pub(crate) fn created(location: String, body: &MasonBuilder) -> HttpResponse {
    HttpResponse::Created()
        .insert_header((header::CONTENT_TYPE, MASON))
        .insert_header((header::LOCATION, location))
        .body(body.to_string())
}
