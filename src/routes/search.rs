use actix_web::http::StatusCode;
use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::db::Store;
use crate::errors::{ApiError, StoreError};
use crate::mason::{RECIPES_URL, RECIPE_PROFILE, RECIPE_SEARCH_URL};
use crate::models::Recipe;
use crate::query;
use crate::routes::recipe::recipe_item;
use crate::routes::{collection, mason, with_store};

pub(super) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(search_recipes);
}

#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    ingredient: Option<String>,
    category: Option<String>,
    food_id: Option<i32>,
    max_time: Option<i32>,
    servings: Option<i32>,
    max_calories: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
enum RecipeFilter {
    Ingredient(String),
    Category(String),
    Food(i32),
    MaxTime(i32),
    Servings(i32),
    MaxCalories(i32),
}

impl RecipeFilter {
    /// Picks the first filter supplied, in declaration order of the query
    /// parameters.
    fn from_params(params: SearchParams) -> Option<Self> {
        params
            .ingredient
            .map(RecipeFilter::Ingredient)
            .or(params.category.map(RecipeFilter::Category))
            .or(params.food_id.map(RecipeFilter::Food))
            .or(params.max_time.map(RecipeFilter::MaxTime))
            .or(params.servings.map(RecipeFilter::Servings))
            .or(params.max_calories.map(RecipeFilter::MaxCalories))
    }

    fn apply(&self, conn: &mut diesel::SqliteConnection) -> Result<Vec<Recipe>, StoreError> {
        match self {
            RecipeFilter::Ingredient(needle) => query::search_recipes_by_ingredient(conn, needle),
            RecipeFilter::Category(needle) => query::search_recipes_by_category(conn, needle),
            RecipeFilter::Food(food_id) => query::recipes_by_food(conn, *food_id),
            RecipeFilter::MaxTime(minutes) => query::recipes_by_cooking_time_at_most(conn, *minutes),
            RecipeFilter::Servings(servings) => query::recipes_by_servings(conn, *servings),
            RecipeFilter::MaxCalories(calories) => {
                query::recipes_with_calories_at_most(conn, *calories)
            }
        }
    }
}

#[get("/recipes/search/")]
async fn search_recipes(
    store: web::Data<Store>,
    params: web::Query<SearchParams>,
) -> Result<HttpResponse, ApiError> {
    let filter = RecipeFilter::from_params(params.into_inner()).ok_or_else(|| {
        ApiError::InvalidInput(
            "Supply one of ingredient, category, food_id, max_time, servings or max_calories."
                .to_string(),
        )
    })?;
    log::debug!("searching recipes by {:?}", filter);
    let recipes = with_store(store, move |conn| filter.apply(conn)).await?;
    let items = recipes
        .iter()
        .map(recipe_item)
        .collect::<Result<Vec<_>, _>>()?;

    let mut body = collection(items);
    body.insert("count", json!(recipes.len()));
    body.add_control("self", RECIPE_SEARCH_URL);
    body.add_control("profile", RECIPE_PROFILE);
    body.add_control("collection", RECIPES_URL);
    Ok(mason(StatusCode::OK, &body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_supplied_filter_wins() {
        let params = SearchParams {
            category: Some("Ital".to_string()),
            max_time: Some(30),
            ..Default::default()
        };
        assert_eq!(
            RecipeFilter::from_params(params),
            Some(RecipeFilter::Category("Ital".to_string()))
        );
    }

    #[test]
    fn no_filter_is_none() {
        assert_eq!(RecipeFilter::from_params(SearchParams::default()), None);
    }

    #[test]
    fn numeric_filters_parse_from_query_string() {
        let params: SearchParams = parse_query("max_calories=500");
        assert_eq!(
            RecipeFilter::from_params(params),
            Some(RecipeFilter::MaxCalories(500))
        );
    }

    fn parse_query(query: &str) -> SearchParams {
        web::Query::<SearchParams>::from_query(query).unwrap().into_inner()
    }
}
