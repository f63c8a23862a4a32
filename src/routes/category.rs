use actix_web::http::StatusCode;
use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::db::Store;
use crate::errors::ApiError;
use crate::mason::{
    category_schema, category_url, MasonBuilder, CATEGORIES_URL, CATEGORY_PROFILE,
    LINK_RELATIONS_URL, NAMESPACE,
};
use crate::models::{Category, CategoryChanges, NewCategory};
use crate::query;
use crate::routes::{collection, created, envelope, mason, with_store};

pub(super) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_categories)
        .service(post_category)
        .service(get_category)
        .service(put_category)
        .service(delete_category);
}

pub(crate) fn category_item(category: &Category) -> Result<MasonBuilder, ApiError> {
    let mut item = envelope(category)?;
    item.add_control("self", category_url(category.category_id));
    item.add_control("profile", CATEGORY_PROFILE);
    Ok(item)
}

fn category_document(category: &Category) -> Result<MasonBuilder, ApiError> {
    let mut body = category_item(category)?;
    let href = category_url(category.category_id);
    body.add_namespace(NAMESPACE, LINK_RELATIONS_URL);
    body.add_control("collection", CATEGORIES_URL);
    body.add_control_put("Edit Category", href.clone(), category_schema());
    body.add_control_delete("Delete Category", href);
    Ok(body)
}

#[get("/categories/")]
async fn get_categories(store: web::Data<Store>) -> Result<HttpResponse, ApiError> {
    let categories = with_store(store, query::list_categories).await?;
    let items = categories
        .iter()
        .map(category_item)
        .collect::<Result<Vec<_>, _>>()?;

    let mut body = collection(items);
    body.add_control("self", CATEGORIES_URL);
    body.add_control("profile", CATEGORY_PROFILE);
    body.add_control_post(
        "add-category",
        "Add New Category",
        CATEGORIES_URL,
        category_schema(),
    );
    Ok(mason(StatusCode::OK, &body))
}

#[post("/categories/")]
async fn post_category(
    store: web::Data<Store>,
    payload: web::Json<NewCategory>,
) -> Result<HttpResponse, ApiError> {
    let new_category = payload.into_inner();
    let category = with_store(store, move |conn| query::create_category(conn, &new_category)).await?;
    let body = category_document(&category)?;
    Ok(created(category_url(category.category_id), &body))
}

#[get("/categories/{category_id}/")]
async fn get_category(
    store: web::Data<Store>,
    category_id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let category_id = category_id.into_inner();
    let category = with_store(store, move |conn| query::get_category(conn, category_id)).await?;
    Ok(mason(StatusCode::OK, &category_document(&category)?))
}

#[put("/categories/{category_id}/")]
async fn put_category(
    store: web::Data<Store>,
    category_id: web::Path<i32>,
    payload: web::Json<CategoryChanges>,
) -> Result<HttpResponse, ApiError> {
    let category_id = category_id.into_inner();
    let changes = payload.into_inner();
    let category =
        with_store(store, move |conn| query::update_category(conn, category_id, &changes)).await?;
    Ok(mason(StatusCode::OK, &category_document(&category)?))
}

#[delete("/categories/{category_id}/")]
async fn delete_category(
    store: web::Data<Store>,
    category_id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let category_id = category_id.into_inner();
    with_store(store, move |conn| query::delete_category(conn, category_id)).await?;
    Ok(HttpResponse::NoContent().finish())
}
