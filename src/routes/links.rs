//! Recipe-ingredient and recipe-category link management. Write endpoints
//! answer with the full recipe document after the change.

use actix_web::http::StatusCode;
use actix_web::{delete, get, post, put, web, HttpResponse};
use serde_json::{json, Value};

use crate::db::Store;
use crate::errors::ApiError;
use crate::mason::{
    category_link_schema, ingredient_link_schema, ingredient_url, recipe_categories_url,
    recipe_ingredients_url, recipe_url, Control, MasonBuilder, INGREDIENT_PROFILE, NAMESPACE,
};
use crate::models::{CategoryRef, IngredientEntry, IngredientLink, IngredientLinkChanges, IngredientRef};
use crate::query;
use crate::routes::category::category_item;
use crate::routes::recipe::recipe_document;
use crate::routes::{collection, created, envelope, mason, with_store};

pub(super) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_recipe_ingredients)
        .service(post_recipe_ingredient)
        .service(put_recipe_ingredient)
        .service(delete_recipe_ingredient)
        .service(get_recipe_categories)
        .service(post_recipe_category)
        .service(delete_recipe_category);
}

fn ingredient_entry_item(entry: &IngredientEntry) -> Result<MasonBuilder, ApiError> {
    let mut item = envelope(entry)?;
    item.add_control("self", ingredient_url(entry.ingredient.ingredient_id));
    item.add_control("profile", INGREDIENT_PROFILE);
    Ok(item)
}

fn removal_control(title: &str, href: String, schema: Value) -> Control {
    Control::link(href)
        .method("DELETE")
        .title(title)
        .json_schema(schema)
}

fn ingredient_ref_schema() -> Value {
    json!({
        "type": "object",
        "required": ["ingredient_id"],
        "properties": {
            "ingredient_id": {"description": "Ingredient to unlink", "type": "integer"}
        }
    })
}

#[get("/recipes/{recipe_id}/ingredients/")]
async fn get_recipe_ingredients(
    store: web::Data<Store>,
    recipe_id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = recipe_id.into_inner();
    let entries = with_store(store, move |conn| query::recipe_ingredients(conn, recipe_id)).await?;
    let items = entries
        .iter()
        .map(ingredient_entry_item)
        .collect::<Result<Vec<_>, _>>()?;

    let href = recipe_ingredients_url(recipe_id);
    let mut body = collection(items);
    body.insert("recipe_id", json!(recipe_id));
    body.add_control("self", href.clone());
    body.add_control("up", recipe_url(recipe_id));
    body.add_control_post(
        "add-ingredient",
        "Add ingredient to recipe",
        href.clone(),
        ingredient_link_schema(),
    );
    body.add_control_put("Edit ingredient of recipe", href.clone(), ingredient_link_schema());
    body.add_control_with(
        &format!("{}:remove-ingredient", NAMESPACE),
        removal_control("Remove ingredient from recipe", href, ingredient_ref_schema()),
    );
    Ok(mason(StatusCode::OK, &body))
}

#[post("/recipes/{recipe_id}/ingredients/")]
async fn post_recipe_ingredient(
    store: web::Data<Store>,
    recipe_id: web::Path<i32>,
    payload: web::Json<IngredientLink>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = recipe_id.into_inner();
    let link = payload.into_inner();
    let details = with_store(store, move |conn| {
        query::get_recipe(conn, recipe_id)?;
        query::add_ingredient_to_recipe(conn, recipe_id, &link)?;
        query::recipe_details(conn, recipe_id)
    })
    .await?;
    let body = recipe_document(&details)?;
    Ok(created(recipe_ingredients_url(recipe_id), &body))
}

#[put("/recipes/{recipe_id}/ingredients/")]
async fn put_recipe_ingredient(
    store: web::Data<Store>,
    recipe_id: web::Path<i32>,
    payload: web::Json<IngredientLinkChanges>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = recipe_id.into_inner();
    let changes = payload.into_inner();
    let details = with_store(store, move |conn| {
        query::get_recipe(conn, recipe_id)?;
        query::update_recipe_ingredient(conn, recipe_id, &changes)?;
        query::recipe_details(conn, recipe_id)
    })
    .await?;
    Ok(mason(StatusCode::OK, &recipe_document(&details)?))
}

#[delete("/recipes/{recipe_id}/ingredients/")]
async fn delete_recipe_ingredient(
    store: web::Data<Store>,
    recipe_id: web::Path<i32>,
    payload: web::Json<IngredientRef>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = recipe_id.into_inner();
    let ingredient_id = payload.ingredient_id;
    let details = with_store(store, move |conn| {
        query::get_recipe(conn, recipe_id)?;
        query::remove_ingredient_from_recipe(conn, recipe_id, ingredient_id)?;
        query::recipe_details(conn, recipe_id)
    })
    .await?;
    Ok(mason(StatusCode::OK, &recipe_document(&details)?))
}

#[get("/recipes/{recipe_id}/categories/")]
async fn get_recipe_categories(
    store: web::Data<Store>,
    recipe_id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = recipe_id.into_inner();
    let categories = with_store(store, move |conn| query::recipe_categories(conn, recipe_id)).await?;
    let items = categories
        .iter()
        .map(category_item)
        .collect::<Result<Vec<_>, _>>()?;

    let href = recipe_categories_url(recipe_id);
    let mut body = collection(items);
    body.insert("recipe_id", json!(recipe_id));
    body.add_control("self", href.clone());
    body.add_control("up", recipe_url(recipe_id));
    body.add_control_post(
        "add-category",
        "Add category to recipe",
        href.clone(),
        category_link_schema(),
    );
    body.add_control_with(
        &format!("{}:remove-category", NAMESPACE),
        removal_control("Remove category from recipe", href, category_link_schema()),
    );
    Ok(mason(StatusCode::OK, &body))
}

#[post("/recipes/{recipe_id}/categories/")]
async fn post_recipe_category(
    store: web::Data<Store>,
    recipe_id: web::Path<i32>,
    payload: web::Json<CategoryRef>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = recipe_id.into_inner();
    let category_id = payload.category_id;
    let details = with_store(store, move |conn| {
        query::get_recipe(conn, recipe_id)?;
        query::add_category_to_recipe(conn, recipe_id, category_id)?;
        query::recipe_details(conn, recipe_id)
    })
    .await?;
    let body = recipe_document(&details)?;
    Ok(created(recipe_categories_url(recipe_id), &body))
}

#[delete("/recipes/{recipe_id}/categories/")]
async fn delete_recipe_category(
    store: web::Data<Store>,
    recipe_id: web::Path<i32>,
    payload: web::Json<CategoryRef>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = recipe_id.into_inner();
    let category_id = payload.category_id;
    let details = with_store(store, move |conn| {
        query::get_recipe(conn, recipe_id)?;
        query::remove_category_from_recipe(conn, recipe_id, category_id)?;
        query::recipe_details(conn, recipe_id)
    })
    .await?;
    Ok(mason(StatusCode::OK, &recipe_document(&details)?))
}
