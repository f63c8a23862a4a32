use diesel::prelude::*;

use crate::db::write_transaction;
use crate::errors::{Resource, StoreError};
use crate::models::{Ingredient, IngredientChanges, NewIngredient};
use crate::schema::ingredient;

fn ensure_unique_name(
    conn: &mut SqliteConnection,
    name: &str,
    except: Option<i32>,
) -> Result<(), StoreError> {
    let existing = ingredient::table
        .filter(ingredient::name.eq(name))
        .select(ingredient::ingredient_id)
        .first::<i32>(conn)
        .optional()?;
    match existing {
        Some(id) if Some(id) != except => Err(StoreError::Duplicate {
            resource: Resource::Ingredient,
            name: name.to_string(),
        }),
        _ => Ok(()),
    }
}

pub fn create_ingredient(
    conn: &mut SqliteConnection,
    new_ingredient: &NewIngredient,
) -> Result<Ingredient, StoreError> {
    new_ingredient.validate()?;
    write_transaction(conn, |conn| {
        ensure_unique_name(conn, &new_ingredient.name, None)?;
        let created = diesel::insert_into(ingredient::table)
            .values(new_ingredient)
            .returning(Ingredient::as_returning())
            .get_result(conn)?;
        log::debug!("created ingredient {:?}", created);
        Ok(created)
    })
}

pub fn get_ingredient(
    conn: &mut SqliteConnection,
    ingredient_id: i32,
) -> Result<Ingredient, StoreError> {
    ingredient::table
        .find(ingredient_id)
        .select(Ingredient::as_select())
        .first(conn)
        .optional()?
        .ok_or(StoreError::NotFound {
            resource: Resource::Ingredient,
            id: ingredient_id,
        })
}

pub fn list_ingredients(conn: &mut SqliteConnection) -> Result<Vec<Ingredient>, StoreError> {
    let all_ingredients = ingredient::table
        .order(ingredient::ingredient_id)
        .select(Ingredient::as_select())
        .load(conn)?;
    Ok(all_ingredients)
}

pub fn update_ingredient(
    conn: &mut SqliteConnection,
    ingredient_id: i32,
    changes: &IngredientChanges,
) -> Result<Ingredient, StoreError> {
    changes.validate()?;
    write_transaction(conn, |conn| {
        let current = get_ingredient(conn, ingredient_id)?;
        if let Some(name) = changes.name.as_deref() {
            if name != current.name {
                ensure_unique_name(conn, name, Some(ingredient_id))?;
            }
        }
        if changes.is_empty() {
            return Ok(current);
        }
        let updated = diesel::update(ingredient::table.find(ingredient_id))
            .set(changes)
            .returning(Ingredient::as_returning())
            .get_result(conn)?;
        log::debug!("updated ingredient {:?}", updated);
        Ok(updated)
    })
}

/// Deletes the ingredient and every recipe link that used it. The recipes
/// themselves stay.
pub fn delete_ingredient(conn: &mut SqliteConnection, ingredient_id: i32) -> Result<(), StoreError> {
    write_transaction(conn, |conn| {
        get_ingredient(conn, ingredient_id)?;
        diesel::delete(ingredient::table.find(ingredient_id)).execute(conn)?;
        log::debug!("deleted ingredient {}", ingredient_id);
        Ok(())
    })
}
