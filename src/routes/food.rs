use actix_web::http::StatusCode;
use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::db::Store;
use crate::errors::ApiError;
use crate::mason::{
    food_schema, food_url, recipe_schema, MasonBuilder, FOODS_URL, FOOD_PROFILE,
    LINK_RELATIONS_URL, NAMESPACE, RECIPES_URL,
};
use crate::models::{Food, FoodChanges, NewFood};
use crate::query;
use crate::routes::{collection, created, envelope, mason, with_store};

pub(super) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_foods)
        .service(post_food)
        .service(get_food)
        .service(put_food)
        .service(delete_food);
}

fn food_item(food: &Food) -> Result<MasonBuilder, ApiError> {
    let mut item = envelope(food)?;
    item.add_control("self", food_url(food.food_id));
    item.add_control("profile", FOOD_PROFILE);
    Ok(item)
}

fn food_document(food: &Food) -> Result<MasonBuilder, ApiError> {
    let mut body = food_item(food)?;
    let href = food_url(food.food_id);
    body.add_namespace(NAMESPACE, LINK_RELATIONS_URL);
    body.add_control("collection", FOODS_URL);
    body.add_control_put("Edit Food", href.clone(), food_schema());
    body.add_control_delete("Delete Food", href);
    body.add_control_post(
        "add-recipe",
        "Add New Recipe",
        RECIPES_URL,
        recipe_schema(Some(food.food_id)),
    );
    Ok(body)
}

#[get("/foods/")]
async fn get_foods(store: web::Data<Store>) -> Result<HttpResponse, ApiError> {
    let foods = with_store(store, query::list_foods).await?;
    let items = foods.iter().map(food_item).collect::<Result<Vec<_>, _>>()?;

    let mut body = collection(items);
    body.add_control("self", FOODS_URL);
    body.add_control("profile", FOOD_PROFILE);
    body.add_control_post("add-food", "Add New Food", FOODS_URL, food_schema());
    Ok(mason(StatusCode::OK, &body))
}

#[post("/foods/")]
async fn post_food(
    store: web::Data<Store>,
    payload: web::Json<NewFood>,
) -> Result<HttpResponse, ApiError> {
    let new_food = payload.into_inner();
    let food = with_store(store, move |conn| query::create_food(conn, &new_food)).await?;
    let body = food_document(&food)?;
    Ok(created(food_url(food.food_id), &body))
}

#[get("/foods/{food_id}/")]
async fn get_food(store: web::Data<Store>, food_id: web::Path<i32>) -> Result<HttpResponse, ApiError> {
    let food_id = food_id.into_inner();
    let food = with_store(store, move |conn| query::get_food(conn, food_id)).await?;
    Ok(mason(StatusCode::OK, &food_document(&food)?))
}

#[put("/foods/{food_id}/")]
async fn put_food(
    store: web::Data<Store>,
    food_id: web::Path<i32>,
    payload: web::Json<FoodChanges>,
) -> Result<HttpResponse, ApiError> {
    let food_id = food_id.into_inner();
    let changes = payload.into_inner();
    let food = with_store(store, move |conn| query::update_food(conn, food_id, &changes)).await?;
    Ok(mason(StatusCode::OK, &food_document(&food)?))
}

#[delete("/foods/{food_id}/")]
async fn delete_food(
    store: web::Data<Store>,
    food_id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let food_id = food_id.into_inner();
    with_store(store, move |conn| query::delete_food(conn, food_id)).await?;
    Ok(HttpResponse::NoContent().finish())
}
