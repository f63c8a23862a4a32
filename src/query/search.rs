use diesel::prelude::*;

use crate::errors::StoreError;
use crate::models::Recipe;
use crate::query::contains_pattern;
use crate::schema::{
    category, ingredient, nutritional_info, recipe, recipe_category, recipe_ingredient,
};

/// Recipes using an ingredient whose name contains `needle`, ignoring case.
pub fn search_recipes_by_ingredient(
    conn: &mut SqliteConnection,
    needle: &str,
) -> Result<Vec<Recipe>, StoreError> {
    let found = recipe::table
        .inner_join(recipe_ingredient::table.inner_join(ingredient::table))
        .filter(ingredient::name.like(contains_pattern(needle)).escape('\\'))
        .select(Recipe::as_select())
        .distinct()
        .order(recipe::recipe_id)
        .load(conn)?;
    Ok(found)
}

/// Recipes in a category whose name contains `needle`, ignoring case.
pub fn search_recipes_by_category(
    conn: &mut SqliteConnection,
    needle: &str,
) -> Result<Vec<Recipe>, StoreError> {
    let found = recipe::table
        .inner_join(recipe_category::table.inner_join(category::table))
        .filter(category::name.like(contains_pattern(needle)).escape('\\'))
        .select(Recipe::as_select())
        .distinct()
        .order(recipe::recipe_id)
        .load(conn)?;
    Ok(found)
}

pub fn recipes_by_food(conn: &mut SqliteConnection, food_id: i32) -> Result<Vec<Recipe>, StoreError> {
    let found = recipe::table
        .filter(recipe::food_id.eq(food_id))
        .order(recipe::recipe_id)
        .select(Recipe::as_select())
        .load(conn)?;
    Ok(found)
}

/// Recipes whose prep time plus cook time is at most `max_minutes`.
pub fn recipes_by_cooking_time_at_most(
    conn: &mut SqliteConnection,
    max_minutes: i32,
) -> Result<Vec<Recipe>, StoreError> {
    let found = recipe::table
        .filter((recipe::prep_time + recipe::cook_time).le(max_minutes))
        .order(recipe::recipe_id)
        .select(Recipe::as_select())
        .load(conn)?;
    Ok(found)
}

pub fn recipes_by_servings(conn: &mut SqliteConnection, servings: i32) -> Result<Vec<Recipe>, StoreError> {
    let found = recipe::table
        .filter(recipe::servings.eq(servings))
        .order(recipe::recipe_id)
        .select(Recipe::as_select())
        .load(conn)?;
    Ok(found)
}

/// Recipes with nutritional info reporting at most `max_calories`. Recipes
/// without nutritional info never match.
pub fn recipes_with_calories_at_most(
    conn: &mut SqliteConnection,
    max_calories: i32,
) -> Result<Vec<Recipe>, StoreError> {
    let found = recipe::table
        .inner_join(nutritional_info::table)
        .filter(nutritional_info::calories.le(max_calories))
        .order(recipe::recipe_id)
        .select(Recipe::as_select())
        .load(conn)?;
    Ok(found)
}
