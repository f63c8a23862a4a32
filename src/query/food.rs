use diesel::prelude::*;

use crate::db::write_transaction;
use crate::errors::{Resource, StoreError};
use crate::models::{Food, FoodChanges, NewFood};
use crate::schema::food;

fn ensure_unique_name(
    conn: &mut SqliteConnection,
    name: &str,
    except: Option<i32>,
) -> Result<(), StoreError> {
    let existing = food::table
        .filter(food::name.eq(name))
        .select(food::food_id)
        .first::<i32>(conn)
        .optional()?;
    match existing {
        Some(id) if Some(id) != except => Err(StoreError::Duplicate {
            resource: Resource::Food,
            name: name.to_string(),
        }),
        _ => Ok(()),
    }
}

pub fn create_food(conn: &mut SqliteConnection, new_food: &NewFood) -> Result<Food, StoreError> {
    new_food.validate()?;
    write_transaction(conn, |conn| {
        ensure_unique_name(conn, &new_food.name, None)?;
        let created = diesel::insert_into(food::table)
            .values(new_food)
            .returning(Food::as_returning())
            .get_result(conn)?;
        log::debug!("created food {:?}", created);
        Ok(created)
    })
}

pub fn get_food(conn: &mut SqliteConnection, food_id: i32) -> Result<Food, StoreError> {
    food::table
        .find(food_id)
        .select(Food::as_select())
        .first(conn)
        .optional()?
        .ok_or(StoreError::NotFound {
            resource: Resource::Food,
            id: food_id,
        })
}

pub fn list_foods(conn: &mut SqliteConnection) -> Result<Vec<Food>, StoreError> {
    let all_foods = food::table
        .order(food::food_id)
        .select(Food::as_select())
        .load(conn)?;
    Ok(all_foods)
}

pub fn update_food(
    conn: &mut SqliteConnection,
    food_id: i32,
    changes: &FoodChanges,
) -> Result<Food, StoreError> {
    changes.validate()?;
    write_transaction(conn, |conn| {
        let current = get_food(conn, food_id)?;
        if let Some(name) = changes.name.as_deref() {
            if name != current.name {
                ensure_unique_name(conn, name, Some(food_id))?;
            }
        }
        if changes.is_empty() {
            return Ok(current);
        }
        let updated = diesel::update(food::table.find(food_id))
            .set(changes)
            .returning(Food::as_returning())
            .get_result(conn)?;
        log::debug!("updated food {:?}", updated);
        Ok(updated)
    })
}

/// Deletes the food; its recipes go with it, and with them their
/// nutritional info and association rows.
pub fn delete_food(conn: &mut SqliteConnection, food_id: i32) -> Result<(), StoreError> {
    write_transaction(conn, |conn| {
        get_food(conn, food_id)?;
        diesel::delete(food::table.find(food_id)).execute(conn)?;
        log::debug!("deleted food {}", food_id);
        Ok(())
    })
}
