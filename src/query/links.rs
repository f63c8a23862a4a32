use diesel::prelude::*;

use crate::db::write_transaction;
use crate::errors::{Resource, StoreError};
use crate::models::{
    Category, Ingredient, IngredientEntry, IngredientLink, IngredientLinkChanges, Recipe,
    RecipeCategory, RecipeIngredient,
};
use crate::query::get_recipe;
use crate::schema::{category, ingredient, recipe, recipe_category, recipe_ingredient};

fn referenced_recipe(conn: &mut SqliteConnection, recipe_id: i32) -> Result<Recipe, StoreError> {
    recipe::table
        .find(recipe_id)
        .select(Recipe::as_select())
        .first(conn)
        .optional()?
        .ok_or(StoreError::MissingReference {
            resource: Resource::Recipe,
            id: recipe_id,
        })
}

fn find_ingredient_link(
    conn: &mut SqliteConnection,
    recipe_id: i32,
    ingredient_id: i32,
) -> Result<Option<RecipeIngredient>, StoreError> {
    let link = recipe_ingredient::table
        .find((recipe_id, ingredient_id))
        .select(RecipeIngredient::as_select())
        .first(conn)
        .optional()?;
    Ok(link)
}

/// Links an ingredient to a recipe. Linking a pair that is already linked
/// overwrites its quantity and unit instead of adding a second row.
pub fn add_ingredient_to_recipe(
    conn: &mut SqliteConnection,
    recipe_id: i32,
    link: &IngredientLink,
) -> Result<Recipe, StoreError> {
    link.validate()?;
    write_transaction(conn, |conn| {
        let owner = referenced_recipe(conn, recipe_id)?;
        let ingredient_exists = ingredient::table
            .find(link.ingredient_id)
            .select(ingredient::ingredient_id)
            .first::<i32>(conn)
            .optional()?
            .is_some();
        if !ingredient_exists {
            return Err(StoreError::MissingReference {
                resource: Resource::Ingredient,
                id: link.ingredient_id,
            });
        }

        match find_ingredient_link(conn, recipe_id, link.ingredient_id)? {
            Some(_) => {
                diesel::update(recipe_ingredient::table.find((recipe_id, link.ingredient_id)))
                    .set((
                        recipe_ingredient::quantity.eq(link.quantity),
                        recipe_ingredient::unit.eq(&link.unit),
                    ))
                    .execute(conn)?;
                log::debug!(
                    "updated ingredient {} on recipe {}",
                    link.ingredient_id,
                    recipe_id
                );
            }
            None => {
                diesel::insert_into(recipe_ingredient::table)
                    .values(RecipeIngredient {
                        recipe_id,
                        ingredient_id: link.ingredient_id,
                        quantity: link.quantity,
                        unit: link.unit.clone(),
                    })
                    .execute(conn)?;
                log::debug!("added ingredient {} to recipe {}", link.ingredient_id, recipe_id);
            }
        }
        Ok(owner)
    })
}

/// Patches quantity and/or unit of an existing link.
pub fn update_recipe_ingredient(
    conn: &mut SqliteConnection,
    recipe_id: i32,
    changes: &IngredientLinkChanges,
) -> Result<RecipeIngredient, StoreError> {
    changes.validate()?;
    write_transaction(conn, |conn| {
        let mut link = find_ingredient_link(conn, recipe_id, changes.ingredient_id)?.ok_or(
            StoreError::LinkNotFound {
                recipe_id,
                resource: Resource::Ingredient,
                id: changes.ingredient_id,
            },
        )?;
        if let Some(quantity) = changes.quantity {
            link.quantity = quantity;
        }
        if let Some(unit) = &changes.unit {
            link.unit = unit.clone();
        }
        diesel::update(recipe_ingredient::table.find((recipe_id, changes.ingredient_id)))
            .set((
                recipe_ingredient::quantity.eq(link.quantity),
                recipe_ingredient::unit.eq(&link.unit),
            ))
            .execute(conn)?;
        Ok(link)
    })
}

pub fn remove_ingredient_from_recipe(
    conn: &mut SqliteConnection,
    recipe_id: i32,
    ingredient_id: i32,
) -> Result<(), StoreError> {
    write_transaction(conn, |conn| {
        let removed =
            diesel::delete(recipe_ingredient::table.find((recipe_id, ingredient_id))).execute(conn)?;
        if removed == 0 {
            return Err(StoreError::LinkNotFound {
                recipe_id,
                resource: Resource::Ingredient,
                id: ingredient_id,
            });
        }
        log::debug!("removed ingredient {} from recipe {}", ingredient_id, recipe_id);
        Ok(())
    })
}

/// Links a category to a recipe; linking an already linked category is a
/// no-op.
pub fn add_category_to_recipe(
    conn: &mut SqliteConnection,
    recipe_id: i32,
    category_id: i32,
) -> Result<Recipe, StoreError> {
    write_transaction(conn, |conn| {
        let owner = referenced_recipe(conn, recipe_id)?;
        let category_exists = category::table
            .find(category_id)
            .select(category::category_id)
            .first::<i32>(conn)
            .optional()?
            .is_some();
        if !category_exists {
            return Err(StoreError::MissingReference {
                resource: Resource::Category,
                id: category_id,
            });
        }

        let linked = recipe_category::table
            .find((recipe_id, category_id))
            .select(RecipeCategory::as_select())
            .first(conn)
            .optional()?
            .is_some();
        if !linked {
            diesel::insert_into(recipe_category::table)
                .values(RecipeCategory {
                    recipe_id,
                    category_id,
                })
                .execute(conn)?;
            log::debug!("added category {} to recipe {}", category_id, recipe_id);
        }
        Ok(owner)
    })
}

pub fn remove_category_from_recipe(
    conn: &mut SqliteConnection,
    recipe_id: i32,
    category_id: i32,
) -> Result<(), StoreError> {
    write_transaction(conn, |conn| {
        let removed =
            diesel::delete(recipe_category::table.find((recipe_id, category_id))).execute(conn)?;
        if removed == 0 {
            return Err(StoreError::LinkNotFound {
                recipe_id,
                resource: Resource::Category,
                id: category_id,
            });
        }
        log::debug!("removed category {} from recipe {}", category_id, recipe_id);
        Ok(())
    })
}

/// Current ingredient links of a recipe, in ingredient id order.
pub fn recipe_ingredients(
    conn: &mut SqliteConnection,
    recipe_id: i32,
) -> Result<Vec<IngredientEntry>, StoreError> {
    get_recipe(conn, recipe_id)?;
    let entries = recipe_ingredient::table
        .inner_join(ingredient::table)
        .filter(recipe_ingredient::recipe_id.eq(recipe_id))
        .order(ingredient::ingredient_id)
        .select((RecipeIngredient::as_select(), Ingredient::as_select()))
        .load::<(RecipeIngredient, Ingredient)>(conn)?
        .into_iter()
        .map(|(link, item)| IngredientEntry {
            ingredient: item,
            quantity: link.quantity,
            unit: link.unit,
        })
        .collect();
    Ok(entries)
}

/// Categories linked to a recipe, in category id order.
pub fn recipe_categories(
    conn: &mut SqliteConnection,
    recipe_id: i32,
) -> Result<Vec<Category>, StoreError> {
    get_recipe(conn, recipe_id)?;
    let linked = recipe_category::table
        .inner_join(category::table)
        .filter(recipe_category::recipe_id.eq(recipe_id))
        .order(category::category_id)
        .select(Category::as_select())
        .load(conn)?;
    Ok(linked)
}
