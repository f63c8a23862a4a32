use actix_web::http::StatusCode;
use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::db::Store;
use crate::errors::ApiError;
use crate::mason::{
    ingredient_schema, ingredient_url, MasonBuilder, INGREDIENTS_URL, INGREDIENT_PROFILE,
    LINK_RELATIONS_URL, NAMESPACE,
};
use crate::models::{Ingredient, IngredientChanges, NewIngredient};
use crate::query;
use crate::routes::{collection, created, envelope, mason, with_store};

pub(super) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_ingredients)
        .service(post_ingredient)
        .service(get_ingredient)
        .service(put_ingredient)
        .service(delete_ingredient);
}

pub(crate) fn ingredient_item(ingredient: &Ingredient) -> Result<MasonBuilder, ApiError> {
    let mut item = envelope(ingredient)?;
    item.add_control("self", ingredient_url(ingredient.ingredient_id));
    item.add_control("profile", INGREDIENT_PROFILE);
    Ok(item)
}

fn ingredient_document(ingredient: &Ingredient) -> Result<MasonBuilder, ApiError> {
    let mut body = ingredient_item(ingredient)?;
    let href = ingredient_url(ingredient.ingredient_id);
    body.add_namespace(NAMESPACE, LINK_RELATIONS_URL);
    body.add_control("collection", INGREDIENTS_URL);
    body.add_control_put("Edit Ingredient", href.clone(), ingredient_schema());
    body.add_control_delete("Delete Ingredient", href);
    Ok(body)
}

#[get("/ingredients/")]
async fn get_ingredients(store: web::Data<Store>) -> Result<HttpResponse, ApiError> {
    let ingredients = with_store(store, query::list_ingredients).await?;
    let items = ingredients
        .iter()
        .map(ingredient_item)
        .collect::<Result<Vec<_>, _>>()?;

    let mut body = collection(items);
    body.add_control("self", INGREDIENTS_URL);
    body.add_control("profile", INGREDIENT_PROFILE);
    body.add_control_post(
        "add-ingredient",
        "Add New Ingredient",
        INGREDIENTS_URL,
        ingredient_schema(),
    );
    Ok(mason(StatusCode::OK, &body))
}

#[post("/ingredients/")]
async fn post_ingredient(
    store: web::Data<Store>,
    payload: web::Json<NewIngredient>,
) -> Result<HttpResponse, ApiError> {
    let new_ingredient = payload.into_inner();
    let ingredient =
        with_store(store, move |conn| query::create_ingredient(conn, &new_ingredient)).await?;
    let body = ingredient_document(&ingredient)?;
    Ok(created(ingredient_url(ingredient.ingredient_id), &body))
}

#[get("/ingredients/{ingredient_id}/")]
async fn get_ingredient(
    store: web::Data<Store>,
    ingredient_id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let ingredient_id = ingredient_id.into_inner();
    let ingredient = with_store(store, move |conn| query::get_ingredient(conn, ingredient_id)).await?;
    Ok(mason(StatusCode::OK, &ingredient_document(&ingredient)?))
}

#[put("/ingredients/{ingredient_id}/")]
async fn put_ingredient(
    store: web::Data<Store>,
    ingredient_id: web::Path<i32>,
    payload: web::Json<IngredientChanges>,
) -> Result<HttpResponse, ApiError> {
    let ingredient_id = ingredient_id.into_inner();
    let changes = payload.into_inner();
    let ingredient = with_store(store, move |conn| {
        query::update_ingredient(conn, ingredient_id, &changes)
    })
    .await?;
    Ok(mason(StatusCode::OK, &ingredient_document(&ingredient)?))
}

#[delete("/ingredients/{ingredient_id}/")]
async fn delete_ingredient(
    store: web::Data<Store>,
    ingredient_id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let ingredient_id = ingredient_id.into_inner();
    with_store(store, move |conn| query::delete_ingredient(conn, ingredient_id)).await?;
    Ok(HttpResponse::NoContent().finish())
}
