use actix_web::http::StatusCode;
use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::db::Store;
use crate::errors::ApiError;
use crate::mason::{
    nutritional_info_schema, nutritional_info_url, recipe_url, MasonBuilder, LINK_RELATIONS_URL,
    NAMESPACE, NUTRITION_PROFILE, NUTRITION_URL,
};
use crate::models::{NewNutritionalInfo, NutritionalInfo, NutritionalInfoChanges};
use crate::query;
use crate::routes::{collection, created, envelope, mason, with_store};

pub(super) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_all_nutritional_info)
        .service(post_nutritional_info)
        .service(get_recipe_nutritional_info)
        .service(get_nutritional_info)
        .service(put_nutritional_info)
        .service(delete_nutritional_info);
}

fn nutrition_item(info: &NutritionalInfo) -> Result<MasonBuilder, ApiError> {
    let mut item = envelope(info)?;
    item.add_control("self", nutritional_info_url(info.nutritional_info_id));
    item.add_control("profile", NUTRITION_PROFILE);
    Ok(item)
}

fn nutrition_document(info: &NutritionalInfo) -> Result<MasonBuilder, ApiError> {
    let mut body = nutrition_item(info)?;
    let href = nutritional_info_url(info.nutritional_info_id);
    body.add_namespace(NAMESPACE, LINK_RELATIONS_URL);
    body.add_control("collection", NUTRITION_URL);
    body.add_control_get("recipe", "Recipe described", recipe_url(info.recipe_id));
    body.add_control_put(
        "Edit Nutritional info",
        href.clone(),
        nutritional_info_schema(Some(info.recipe_id)),
    );
    body.add_control_delete("Delete Nutritional info", href);
    Ok(body)
}

#[get("/nutritional-info/")]
async fn get_all_nutritional_info(store: web::Data<Store>) -> Result<HttpResponse, ApiError> {
    let all_info = with_store(store, query::list_nutritional_info).await?;
    let items = all_info
        .iter()
        .map(nutrition_item)
        .collect::<Result<Vec<_>, _>>()?;

    let mut body = collection(items);
    body.add_control("self", NUTRITION_URL);
    body.add_control("profile", NUTRITION_PROFILE);
    body.add_control_post(
        "add-nutritional-info",
        "Add New Nutritional Info",
        NUTRITION_URL,
        nutritional_info_schema(None),
    );
    Ok(mason(StatusCode::OK, &body))
}

#[post("/nutritional-info/")]
async fn post_nutritional_info(
    store: web::Data<Store>,
    payload: web::Json<NewNutritionalInfo>,
) -> Result<HttpResponse, ApiError> {
    let new_info = payload.into_inner();
    let info = with_store(store, move |conn| query::create_nutritional_info(conn, &new_info)).await?;
    let body = nutrition_document(&info)?;
    Ok(created(nutritional_info_url(info.nutritional_info_id), &body))
}

#[get("/recipes/{recipe_id}/nutritional-info/")]
async fn get_recipe_nutritional_info(
    store: web::Data<Store>,
    recipe_id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = recipe_id.into_inner();
    let info = with_store(store, move |conn| {
        query::get_recipe_nutritional_info(conn, recipe_id)
    })
    .await?;
    Ok(mason(StatusCode::OK, &nutrition_document(&info)?))
}

#[get("/nutritional-info/{nutritional_info_id}/")]
async fn get_nutritional_info(
    store: web::Data<Store>,
    nutritional_info_id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let nutritional_info_id = nutritional_info_id.into_inner();
    let info = with_store(store, move |conn| {
        query::get_nutritional_info(conn, nutritional_info_id)
    })
    .await?;
    Ok(mason(StatusCode::OK, &nutrition_document(&info)?))
}

#[put("/nutritional-info/{nutritional_info_id}/")]
async fn put_nutritional_info(
    store: web::Data<Store>,
    nutritional_info_id: web::Path<i32>,
    payload: web::Json<NutritionalInfoChanges>,
) -> Result<HttpResponse, ApiError> {
    let nutritional_info_id = nutritional_info_id.into_inner();
    let changes = payload.into_inner();
    let info = with_store(store, move |conn| {
        query::update_nutritional_info(conn, nutritional_info_id, &changes)
    })
    .await?;
    Ok(mason(StatusCode::OK, &nutrition_document(&info)?))
}

#[delete("/nutritional-info/{nutritional_info_id}/")]
async fn delete_nutritional_info(
    store: web::Data<Store>,
    nutritional_info_id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let nutritional_info_id = nutritional_info_id.into_inner();
    with_store(store, move |conn| {
        query::delete_nutritional_info(conn, nutritional_info_id)
    })
    .await?;
    Ok(HttpResponse::NoContent().finish())
}
