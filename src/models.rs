use diesel::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::StoreError;
use crate::schema::{
    category, food, ingredient, nutritional_info, recipe, recipe_category, recipe_ingredient,
};

pub const DEFAULT_UNIT: &str = "piece";

const NAME_MAX_LEN: usize = 64;
const TEXT_MAX_LEN: usize = 255;

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

// Distinguishes an absent field (None) from an explicit null (Some(None)).
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn check_name(name: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::validation("name must not be empty"));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(StoreError::validation(format!(
            "name must be at most {} characters",
            NAME_MAX_LEN
        )));
    }
    Ok(())
}

fn check_text(field: &str, value: Option<&str>) -> Result<(), StoreError> {
    match value {
        Some(text) if text.chars().count() > TEXT_MAX_LEN => Err(StoreError::validation(format!(
            "{} must be at most {} characters",
            field, TEXT_MAX_LEN
        ))),
        _ => Ok(()),
    }
}

fn check_non_negative_int(field: &str, value: i32) -> Result<(), StoreError> {
    if value < 0 {
        return Err(StoreError::validation(format!("{} must be >= 0", field)));
    }
    Ok(())
}

fn check_non_negative(field: &str, value: f64) -> Result<(), StoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(StoreError::validation(format!("{} must be >= 0", field)));
    }
    Ok(())
}

fn check_servings(value: i32) -> Result<(), StoreError> {
    if value <= 0 {
        return Err(StoreError::validation("servings must be > 0"));
    }
    Ok(())
}

fn check_quantity(value: f64) -> Result<(), StoreError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(StoreError::validation("quantity must be > 0"));
    }
    Ok(())
}

fn check_unit(unit: &str) -> Result<(), StoreError> {
    if unit.trim().is_empty() {
        return Err(StoreError::validation("unit must not be empty"));
    }
    if unit.chars().count() > NAME_MAX_LEN {
        return Err(StoreError::validation(format!(
            "unit must be at most {} characters",
            NAME_MAX_LEN
        )));
    }
    Ok(())
}

// Food

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = food, primary_key(food_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Food {
    pub food_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Insertable, Deserialize)]
#[diesel(table_name = food)]
pub struct NewFood {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewFood {
    pub fn named(name: impl Into<String>) -> Self {
        NewFood {
            name: name.into(),
            description: None,
            image_url: None,
        }
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        check_name(&self.name)?;
        check_text("description", self.description.as_deref())?;
        check_text("image_url", self.image_url.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, AsChangeset, Deserialize)]
#[diesel(table_name = food)]
pub struct FoodChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub image_url: Option<Option<String>>,
}

impl FoodChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.image_url.is_none()
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if let Some(name) = &self.name {
            check_name(name)?;
        }
        check_text("description", self.description.clone().flatten().as_deref())?;
        check_text("image_url", self.image_url.clone().flatten().as_deref())
    }
}

// Recipe

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = recipe, primary_key(recipe_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Recipe {
    pub recipe_id: i32,
    pub food_id: i32,
    pub instruction: String,
    pub prep_time: i32,
    pub cook_time: i32,
    pub servings: i32,
}

#[derive(Debug, Clone, PartialEq, Insertable, Deserialize)]
#[diesel(table_name = recipe)]
pub struct NewRecipe {
    pub food_id: i32,
    pub instruction: String,
    pub prep_time: i32,
    pub cook_time: i32,
    pub servings: i32,
}

impl NewRecipe {
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.instruction.trim().is_empty() {
            return Err(StoreError::validation("instruction must not be empty"));
        }
        check_non_negative_int("prep_time", self.prep_time)?;
        check_non_negative_int("cook_time", self.cook_time)?;
        check_servings(self.servings)
    }
}

#[derive(Debug, Clone, Default, PartialEq, AsChangeset, Deserialize)]
#[diesel(table_name = recipe)]
#[serde(default)]
pub struct RecipeChanges {
    pub food_id: Option<i32>,
    pub instruction: Option<String>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub servings: Option<i32>,
}

impl RecipeChanges {
    pub fn is_empty(&self) -> bool {
        self.food_id.is_none()
            && self.instruction.is_none()
            && self.prep_time.is_none()
            && self.cook_time.is_none()
            && self.servings.is_none()
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if let Some(instruction) = &self.instruction {
            if instruction.trim().is_empty() {
                return Err(StoreError::validation("instruction must not be empty"));
            }
        }
        if let Some(prep_time) = self.prep_time {
            check_non_negative_int("prep_time", prep_time)?;
        }
        if let Some(cook_time) = self.cook_time {
            check_non_negative_int("cook_time", cook_time)?;
        }
        if let Some(servings) = self.servings {
            check_servings(servings)?;
        }
        Ok(())
    }
}

// Ingredient

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = ingredient, primary_key(ingredient_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Ingredient {
    pub ingredient_id: i32,
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Insertable, Deserialize)]
#[diesel(table_name = ingredient)]
pub struct NewIngredient {
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewIngredient {
    pub fn named(name: impl Into<String>) -> Self {
        NewIngredient {
            name: name.into(),
            image_url: None,
        }
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        check_name(&self.name)?;
        check_text("image_url", self.image_url.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, AsChangeset, Deserialize)]
#[diesel(table_name = ingredient)]
pub struct IngredientChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub image_url: Option<Option<String>>,
}

impl IngredientChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.image_url.is_none()
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if let Some(name) = &self.name {
            check_name(name)?;
        }
        check_text("image_url", self.image_url.clone().flatten().as_deref())
    }
}

// Category

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = category, primary_key(category_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Category {
    pub category_id: i32,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Insertable, Deserialize)]
#[diesel(table_name = category)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewCategory {
    pub fn named(name: impl Into<String>) -> Self {
        NewCategory {
            name: name.into(),
            description: None,
        }
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        check_name(&self.name)?;
        check_text("description", self.description.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, AsChangeset, Deserialize)]
#[diesel(table_name = category)]
pub struct CategoryChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub description: Option<Option<String>>,
}

impl CategoryChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if let Some(name) = &self.name {
            check_name(name)?;
        }
        check_text("description", self.description.clone().flatten().as_deref())
    }
}

// Nutritional info

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations, Serialize)]
#[diesel(table_name = nutritional_info, primary_key(nutritional_info_id))]
#[diesel(belongs_to(Recipe, foreign_key = recipe_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NutritionalInfo {
    pub nutritional_info_id: i32,
    pub recipe_id: i32,
    pub calories: i32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, PartialEq, Insertable, Deserialize)]
#[diesel(table_name = nutritional_info)]
pub struct NewNutritionalInfo {
    pub recipe_id: i32,
    pub calories: i32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl NewNutritionalInfo {
    pub fn validate(&self) -> Result<(), StoreError> {
        check_non_negative_int("calories", self.calories)?;
        check_non_negative("protein", self.protein)?;
        check_non_negative("carbs", self.carbs)?;
        check_non_negative("fat", self.fat)
    }
}

#[derive(Debug, Clone, Default, PartialEq, AsChangeset, Deserialize)]
#[diesel(table_name = nutritional_info)]
#[serde(default)]
pub struct NutritionalInfoChanges {
    pub calories: Option<i32>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

impl NutritionalInfoChanges {
    pub fn is_empty(&self) -> bool {
        self.calories.is_none() && self.protein.is_none() && self.carbs.is_none() && self.fat.is_none()
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if let Some(calories) = self.calories {
            check_non_negative_int("calories", calories)?;
        }
        for (field, value) in [
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
        ] {
            if let Some(value) = value {
                check_non_negative(field, value)?;
            }
        }
        Ok(())
    }
}

// Association rows

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = recipe_ingredient)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecipeIngredient {
    pub recipe_id: i32,
    pub ingredient_id: i32,
    pub quantity: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = recipe_category)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecipeCategory {
    pub recipe_id: i32,
    pub category_id: i32,
}

/// Body of a request linking an ingredient to a recipe.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IngredientLink {
    pub ingredient_id: i32,
    pub quantity: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
}

impl IngredientLink {
    pub fn validate(&self) -> Result<(), StoreError> {
        check_quantity(self.quantity)?;
        check_unit(&self.unit)
    }
}

/// Body of a request patching an existing recipe-ingredient link.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IngredientLinkChanges {
    pub ingredient_id: i32,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl IngredientLinkChanges {
    pub fn validate(&self) -> Result<(), StoreError> {
        if let Some(quantity) = self.quantity {
            check_quantity(quantity)?;
        }
        if let Some(unit) = &self.unit {
            check_unit(unit)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct IngredientRef {
    pub ingredient_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CategoryRef {
    pub category_id: i32,
}

// Nested recipe view

/// One ingredient of a recipe together with the link attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientEntry {
    pub ingredient: Ingredient,
    pub quantity: f64,
    pub unit: String,
}

/// A recipe with its food, nutrition, ingredients and categories resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeDetails {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub food: Food,
    pub nutritional_info: Option<NutritionalInfo>,
    pub ingredients: Vec<IngredientEntry>,
    pub categories: Vec<Category>,
}
