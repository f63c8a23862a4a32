use diesel::prelude::*;

use crate::db::write_transaction;
use crate::errors::{Resource, StoreError};
use crate::models::{NewNutritionalInfo, NutritionalInfo, NutritionalInfoChanges};
use crate::query::get_recipe;
use crate::schema::{nutritional_info, recipe};

/// Creates the nutrition record of a recipe. A recipe has at most one.
pub fn create_nutritional_info(
    conn: &mut SqliteConnection,
    new_info: &NewNutritionalInfo,
) -> Result<NutritionalInfo, StoreError> {
    new_info.validate()?;
    write_transaction(conn, |conn| {
        let recipe_exists = recipe::table
            .find(new_info.recipe_id)
            .select(recipe::recipe_id)
            .first::<i32>(conn)
            .optional()?
            .is_some();
        if !recipe_exists {
            return Err(StoreError::MissingReference {
                resource: Resource::Recipe,
                id: new_info.recipe_id,
            });
        }
        let existing = nutritional_info::table
            .filter(nutritional_info::recipe_id.eq(new_info.recipe_id))
            .select(nutritional_info::nutritional_info_id)
            .first::<i32>(conn)
            .optional()?;
        if existing.is_some() {
            return Err(StoreError::DuplicateNutritionalInfo(new_info.recipe_id));
        }
        let created = diesel::insert_into(nutritional_info::table)
            .values(new_info)
            .returning(NutritionalInfo::as_returning())
            .get_result(conn)?;
        log::debug!("created nutritional info {:?}", created);
        Ok(created)
    })
}

pub fn get_nutritional_info(
    conn: &mut SqliteConnection,
    nutritional_info_id: i32,
) -> Result<NutritionalInfo, StoreError> {
    nutritional_info::table
        .find(nutritional_info_id)
        .select(NutritionalInfo::as_select())
        .first(conn)
        .optional()?
        .ok_or(StoreError::NotFound {
            resource: Resource::NutritionalInfo,
            id: nutritional_info_id,
        })
}

pub fn list_nutritional_info(conn: &mut SqliteConnection) -> Result<Vec<NutritionalInfo>, StoreError> {
    let all_info = nutritional_info::table
        .order(nutritional_info::nutritional_info_id)
        .select(NutritionalInfo::as_select())
        .load(conn)?;
    Ok(all_info)
}

pub fn get_recipe_nutritional_info(
    conn: &mut SqliteConnection,
    recipe_id: i32,
) -> Result<NutritionalInfo, StoreError> {
    let owner = get_recipe(conn, recipe_id)?;
    NutritionalInfo::belonging_to(&owner)
        .select(NutritionalInfo::as_select())
        .first(conn)
        .optional()?
        .ok_or(StoreError::NoNutritionalInfo(recipe_id))
}

pub fn update_nutritional_info(
    conn: &mut SqliteConnection,
    nutritional_info_id: i32,
    changes: &NutritionalInfoChanges,
) -> Result<NutritionalInfo, StoreError> {
    changes.validate()?;
    write_transaction(conn, |conn| {
        let current = get_nutritional_info(conn, nutritional_info_id)?;
        if changes.is_empty() {
            return Ok(current);
        }
        let updated = diesel::update(nutritional_info::table.find(nutritional_info_id))
            .set(changes)
            .returning(NutritionalInfo::as_returning())
            .get_result(conn)?;
        log::debug!("updated nutritional info {:?}", updated);
        Ok(updated)
    })
}

pub fn delete_nutritional_info(
    conn: &mut SqliteConnection,
    nutritional_info_id: i32,
) -> Result<(), StoreError> {
    write_transaction(conn, |conn| {
        get_nutritional_info(conn, nutritional_info_id)?;
        diesel::delete(nutritional_info::table.find(nutritional_info_id)).execute(conn)?;
        log::debug!("deleted nutritional info {}", nutritional_info_id);
        Ok(())
    })
}
