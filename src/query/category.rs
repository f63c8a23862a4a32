use diesel::prelude::*;

use crate::db::write_transaction;
use crate::errors::{Resource, StoreError};
use crate::models::{Category, CategoryChanges, NewCategory};
use crate::schema::category;

fn ensure_unique_name(
    conn: &mut SqliteConnection,
    name: &str,
    except: Option<i32>,
) -> Result<(), StoreError> {
    let existing = category::table
        .filter(category::name.eq(name))
        .select(category::category_id)
        .first::<i32>(conn)
        .optional()?;
    match existing {
        Some(id) if Some(id) != except => Err(StoreError::Duplicate {
            resource: Resource::Category,
            name: name.to_string(),
        }),
        _ => Ok(()),
    }
}

pub fn create_category(
    conn: &mut SqliteConnection,
    new_category: &NewCategory,
) -> Result<Category, StoreError> {
    new_category.validate()?;
    write_transaction(conn, |conn| {
        ensure_unique_name(conn, &new_category.name, None)?;
        let created = diesel::insert_into(category::table)
            .values(new_category)
            .returning(Category::as_returning())
            .get_result(conn)?;
        log::debug!("created category {:?}", created);
        Ok(created)
    })
}

pub fn get_category(conn: &mut SqliteConnection, category_id: i32) -> Result<Category, StoreError> {
    category::table
        .find(category_id)
        .select(Category::as_select())
        .first(conn)
        .optional()?
        .ok_or(StoreError::NotFound {
            resource: Resource::Category,
            id: category_id,
        })
}

pub fn list_categories(conn: &mut SqliteConnection) -> Result<Vec<Category>, StoreError> {
    let all_categories = category::table
        .order(category::category_id)
        .select(Category::as_select())
        .load(conn)?;
    Ok(all_categories)
}

pub fn update_category(
    conn: &mut SqliteConnection,
    category_id: i32,
    changes: &CategoryChanges,
) -> Result<Category, StoreError> {
    changes.validate()?;
    write_transaction(conn, |conn| {
        let current = get_category(conn, category_id)?;
        if let Some(name) = changes.name.as_deref() {
            if name != current.name {
                ensure_unique_name(conn, name, Some(category_id))?;
            }
        }
        if changes.is_empty() {
            return Ok(current);
        }
        let updated = diesel::update(category::table.find(category_id))
            .set(changes)
            .returning(Category::as_returning())
            .get_result(conn)?;
        log::debug!("updated category {:?}", updated);
        Ok(updated)
    })
}

pub fn delete_category(conn: &mut SqliteConnection, category_id: i32) -> Result<(), StoreError> {
    write_transaction(conn, |conn| {
        get_category(conn, category_id)?;
        diesel::delete(category::table.find(category_id)).execute(conn)?;
        log::debug!("deleted category {}", category_id);
        Ok(())
    })
}
