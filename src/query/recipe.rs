use std::collections::HashMap;

use diesel::prelude::*;

use crate::db::write_transaction;
use crate::errors::{Resource, StoreError};
use crate::models::{
    Category, Food, Ingredient, IngredientEntry, NewRecipe, NutritionalInfo, Recipe,
    RecipeChanges, RecipeDetails, RecipeIngredient,
};
use crate::schema::{
    category, food, ingredient, nutritional_info, recipe, recipe_category, recipe_ingredient,
};

fn ensure_food_exists(conn: &mut SqliteConnection, food_id: i32) -> Result<(), StoreError> {
    let found = food::table
        .find(food_id)
        .select(food::food_id)
        .first::<i32>(conn)
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(StoreError::MissingReference {
            resource: Resource::Food,
            id: food_id,
        }),
    }
}

pub fn create_recipe(conn: &mut SqliteConnection, new_recipe: &NewRecipe) -> Result<Recipe, StoreError> {
    new_recipe.validate()?;
    write_transaction(conn, |conn| {
        ensure_food_exists(conn, new_recipe.food_id)?;
        let created = diesel::insert_into(recipe::table)
            .values(new_recipe)
            .returning(Recipe::as_returning())
            .get_result(conn)?;
        log::debug!("created recipe {:?}", created);
        Ok(created)
    })
}

pub fn get_recipe(conn: &mut SqliteConnection, recipe_id: i32) -> Result<Recipe, StoreError> {
    recipe::table
        .find(recipe_id)
        .select(Recipe::as_select())
        .first(conn)
        .optional()?
        .ok_or(StoreError::NotFound {
            resource: Resource::Recipe,
            id: recipe_id,
        })
}

pub fn list_recipes(conn: &mut SqliteConnection) -> Result<Vec<Recipe>, StoreError> {
    let all_recipes = recipe::table
        .order(recipe::recipe_id)
        .select(Recipe::as_select())
        .load(conn)?;
    Ok(all_recipes)
}

pub fn update_recipe(
    conn: &mut SqliteConnection,
    recipe_id: i32,
    changes: &RecipeChanges,
) -> Result<Recipe, StoreError> {
    changes.validate()?;
    write_transaction(conn, |conn| {
        let current = get_recipe(conn, recipe_id)?;
        if changes.is_empty() {
            return Ok(current);
        }
        if let Some(food_id) = changes.food_id {
            ensure_food_exists(conn, food_id)?;
        }
        let updated = diesel::update(recipe::table.find(recipe_id))
            .set(changes)
            .returning(Recipe::as_returning())
            .get_result(conn)?;
        log::debug!("updated recipe {:?}", updated);
        Ok(updated)
    })
}

/// Deletes the recipe together with its nutritional info and every
/// ingredient and category link.
pub fn delete_recipe(conn: &mut SqliteConnection, recipe_id: i32) -> Result<(), StoreError> {
    write_transaction(conn, |conn| {
        get_recipe(conn, recipe_id)?;
        diesel::delete(recipe::table.find(recipe_id)).execute(conn)?;
        log::debug!("deleted recipe {}", recipe_id);
        Ok(())
    })
}

pub fn recipe_details(conn: &mut SqliteConnection, recipe_id: i32) -> Result<RecipeDetails, StoreError> {
    let found = get_recipe(conn, recipe_id)?;
    let mut details = attach_details(conn, vec![found])?;
    details.pop().ok_or(StoreError::NotFound {
        resource: Resource::Recipe,
        id: recipe_id,
    })
}

pub fn list_recipe_details(conn: &mut SqliteConnection) -> Result<Vec<RecipeDetails>, StoreError> {
    let recipes = list_recipes(conn)?;
    attach_details(conn, recipes)
}

/// Resolves food, nutrition, ingredient links and categories for a batch of
/// recipes with one query per relation. Order of `recipes` is preserved.
pub fn attach_details(
    conn: &mut SqliteConnection,
    recipes: Vec<Recipe>,
) -> Result<Vec<RecipeDetails>, StoreError> {
    if recipes.is_empty() {
        return Ok(Vec::new());
    }
    let recipe_ids: Vec<i32> = recipes.iter().map(|r| r.recipe_id).collect();
    let food_ids: Vec<i32> = recipes.iter().map(|r| r.food_id).collect();

    let foods: HashMap<i32, Food> = food::table
        .filter(food::food_id.eq_any(&food_ids))
        .select(Food::as_select())
        .load(conn)?
        .into_iter()
        .map(|f| (f.food_id, f))
        .collect();

    let mut nutrition: HashMap<i32, NutritionalInfo> = nutritional_info::table
        .filter(nutritional_info::recipe_id.eq_any(&recipe_ids))
        .select(NutritionalInfo::as_select())
        .load(conn)?
        .into_iter()
        .map(|n| (n.recipe_id, n))
        .collect();

    let mut entries: HashMap<i32, Vec<IngredientEntry>> = HashMap::new();
    let links = recipe_ingredient::table
        .inner_join(ingredient::table)
        .filter(recipe_ingredient::recipe_id.eq_any(&recipe_ids))
        .order(ingredient::ingredient_id)
        .select((RecipeIngredient::as_select(), Ingredient::as_select()))
        .load::<(RecipeIngredient, Ingredient)>(conn)?;
    for (link, item) in links {
        entries.entry(link.recipe_id).or_default().push(IngredientEntry {
            ingredient: item,
            quantity: link.quantity,
            unit: link.unit,
        });
    }

    let mut categories: HashMap<i32, Vec<Category>> = HashMap::new();
    let rows = recipe_category::table
        .inner_join(category::table)
        .filter(recipe_category::recipe_id.eq_any(&recipe_ids))
        .order(category::category_id)
        .select((recipe_category::recipe_id, Category::as_select()))
        .load::<(i32, Category)>(conn)?;
    for (recipe_id, cat) in rows {
        categories.entry(recipe_id).or_default().push(cat);
    }

    recipes
        .into_iter()
        .map(|r| {
            // Foods are shared between recipes, so clone rather than remove.
            let owner = foods.get(&r.food_id).cloned().ok_or(StoreError::MissingReference {
                resource: Resource::Food,
                id: r.food_id,
            })?;
            Ok(RecipeDetails {
                food: owner,
                nutritional_info: nutrition.remove(&r.recipe_id),
                ingredients: entries.remove(&r.recipe_id).unwrap_or_default(),
                categories: categories.remove(&r.recipe_id).unwrap_or_default(),
                recipe: r,
            })
        })
        .collect()
}
