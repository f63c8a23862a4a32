use actix_web::http::StatusCode;
use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::db::Store;
use crate::errors::ApiError;
use crate::mason::{
    food_url, nutritional_info_schema, nutritional_info_url, recipe_categories_url,
    recipe_ingredients_url, recipe_schema, recipe_url, MasonBuilder, LINK_RELATIONS_URL,
    NAMESPACE, NUTRITION_URL, RECIPES_URL, RECIPE_PROFILE, RECIPE_SEARCH_URL,
};
use crate::models::{NewRecipe, Recipe, RecipeChanges, RecipeDetails};
use crate::query;
use crate::routes::{collection, created, envelope, mason, with_store};

pub(super) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_recipes)
        .service(post_recipe)
        .service(get_recipe)
        .service(put_recipe)
        .service(delete_recipe);
}

/// A flat recipe with its `self` and `profile` controls.
pub(crate) fn recipe_item(recipe: &Recipe) -> Result<MasonBuilder, ApiError> {
    let mut item = envelope(recipe)?;
    item.add_control("self", recipe_url(recipe.recipe_id));
    item.add_control("profile", RECIPE_PROFILE);
    Ok(item)
}

fn recipe_details_item(details: &RecipeDetails) -> Result<MasonBuilder, ApiError> {
    let mut item = envelope(details)?;
    item.add_control("self", recipe_url(details.recipe.recipe_id));
    item.add_control("profile", RECIPE_PROFILE);
    Ok(item)
}

/// Full recipe document with nested relations and every follow-up action.
pub(crate) fn recipe_document(details: &RecipeDetails) -> Result<MasonBuilder, ApiError> {
    let recipe = &details.recipe;
    let href = recipe_url(recipe.recipe_id);

    let mut body = recipe_details_item(details)?;
    body.add_namespace(NAMESPACE, LINK_RELATIONS_URL);
    body.add_control("collection", RECIPES_URL);
    body.add_control_get("food", "Food of this recipe", food_url(recipe.food_id));
    body.add_control_get(
        "ingredients",
        "Ingredients of this recipe",
        recipe_ingredients_url(recipe.recipe_id),
    );
    body.add_control_get(
        "categories",
        "Categories of this recipe",
        recipe_categories_url(recipe.recipe_id),
    );
    match &details.nutritional_info {
        Some(info) => body.add_control_get(
            "nutritional-info",
            "Nutritional info of this recipe",
            nutritional_info_url(info.nutritional_info_id),
        ),
        None => body.add_control_post(
            "add-nutritional-info",
            "Add New Nutritional Info",
            NUTRITION_URL,
            nutritional_info_schema(Some(recipe.recipe_id)),
        ),
    }
    body.add_control_put("Edit Recipe", href.clone(), recipe_schema(Some(recipe.food_id)));
    body.add_control_delete("Delete Recipe", href);
    Ok(body)
}

#[get("/recipes/")]
async fn get_recipes(store: web::Data<Store>) -> Result<HttpResponse, ApiError> {
    let recipes = with_store(store, query::list_recipe_details).await?;
    let items = recipes
        .iter()
        .map(recipe_details_item)
        .collect::<Result<Vec<_>, _>>()?;

    let mut body = collection(items);
    body.add_control("self", RECIPES_URL);
    body.add_control("profile", RECIPE_PROFILE);
    body.add_control_get("recipes-search", "Search recipes", RECIPE_SEARCH_URL);
    body.add_control_post("add-recipe", "Add New Recipe", RECIPES_URL, recipe_schema(None));
    Ok(mason(StatusCode::OK, &body))
}

#[post("/recipes/")]
async fn post_recipe(
    store: web::Data<Store>,
    payload: web::Json<NewRecipe>,
) -> Result<HttpResponse, ApiError> {
    let new_recipe = payload.into_inner();
    let details = with_store(store, move |conn| {
        let recipe = query::create_recipe(conn, &new_recipe)?;
        query::recipe_details(conn, recipe.recipe_id)
    })
    .await?;
    let body = recipe_document(&details)?;
    Ok(created(recipe_url(details.recipe.recipe_id), &body))
}

#[get("/recipes/{recipe_id}/")]
async fn get_recipe(
    store: web::Data<Store>,
    recipe_id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = recipe_id.into_inner();
    let details = with_store(store, move |conn| query::recipe_details(conn, recipe_id)).await?;
    Ok(mason(StatusCode::OK, &recipe_document(&details)?))
}

#[put("/recipes/{recipe_id}/")]
async fn put_recipe(
    store: web::Data<Store>,
    recipe_id: web::Path<i32>,
    payload: web::Json<RecipeChanges>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = recipe_id.into_inner();
    let changes = payload.into_inner();
    let details = with_store(store, move |conn| {
        query::update_recipe(conn, recipe_id, &changes)?;
        query::recipe_details(conn, recipe_id)
    })
    .await?;
    Ok(mason(StatusCode::OK, &recipe_document(&details)?))
}

#[delete("/recipes/{recipe_id}/")]
async fn delete_recipe(
    store: web::Data<Store>,
    recipe_id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let recipe_id = recipe_id.into_inner();
    with_store(store, move |conn| query::delete_recipe(conn, recipe_id)).await?;
    Ok(HttpResponse::NoContent().finish())
}
