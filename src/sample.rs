//! Demo catalog used by `food-manager-admin sample-data`.

use std::collections::HashMap;

use diesel::prelude::*;

use crate::db::write_transaction;
use crate::errors::{Resource, StoreError};
use crate::models::{IngredientLink, NewCategory, NewFood, NewIngredient, NewNutritionalInfo, NewRecipe};
use crate::query;

const FOODS: &[(&str, &str)] = &[
    ("Pizza", "Italian flatbread topped with various ingredients"),
    ("Pasta", "Italian noodles with sauce"),
    ("Salad", "Fresh mixed vegetables with dressing"),
    ("Soup", "Warm liquid food with various ingredients"),
];

const INGREDIENTS: &[(&str, &str)] = &[
    ("Flour", "flour.jpg"),
    ("Tomato", "tomato.jpg"),
    ("Cheese", "cheese.jpg"),
    ("Basil", "basil.jpg"),
    ("Olive Oil", "olive_oil.jpg"),
    ("Garlic", "garlic.jpg"),
    ("Salt", "salt.jpg"),
    ("Pepper", "pepper.jpg"),
];

const CATEGORIES: &[(&str, &str)] = &[
    ("Italian", "Traditional Italian cuisine"),
    ("Vegetarian", "Meat-free dishes"),
    ("Quick & Easy", "Ready in 30 minutes or less"),
    ("Healthy", "Nutritious and balanced meals"),
];

struct SampleRecipe {
    food: &'static str,
    instruction: &'static str,
    prep_time: i32,
    cook_time: i32,
    servings: i32,
    ingredients: &'static [(&'static str, f64, &'static str)],
    categories: &'static [&'static str],
    // calories, protein, carbs, fat
    nutrition: (i32, f64, f64, f64),
}

const RECIPES: &[SampleRecipe] = &[
    SampleRecipe {
        food: "Pizza",
        instruction: "1. Make dough with flour, water, and yeast\n\
                      2. Spread tomato sauce\n\
                      3. Add fresh mozzarella and basil\n\
                      4. Bake at 450°F for 15 minutes",
        prep_time: 30,
        cook_time: 15,
        servings: 4,
        ingredients: &[
            ("Flour", 500.0, "g"),
            ("Tomato", 200.0, "g"),
            ("Cheese", 150.0, "g"),
            ("Basil", 10.0, "leaves"),
            ("Olive Oil", 2.0, "tbsp"),
        ],
        categories: &["Italian", "Vegetarian"],
        nutrition: (266, 11.0, 33.0, 9.0),
    },
    SampleRecipe {
        food: "Pasta",
        instruction: "1. Cook pasta in salted water\n\
                      2. Sauté garlic in olive oil\n\
                      3. Toss pasta with garlic oil\n\
                      4. Add cheese and pepper",
        prep_time: 10,
        cook_time: 15,
        servings: 2,
        ingredients: &[
            ("Garlic", 4.0, "cloves"),
            ("Olive Oil", 3.0, "tbsp"),
            ("Cheese", 50.0, "g"),
            ("Salt", 1.0, "tsp"),
            ("Pepper", 0.5, "tsp"),
        ],
        categories: &["Italian", "Quick & Easy"],
        nutrition: (320, 9.0, 42.0, 14.0),
    },
];

/// Row counts written by [`populate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleSummary {
    pub foods: usize,
    pub ingredients: usize,
    pub categories: usize,
    pub recipes: usize,
}

fn lookup(ids: &HashMap<&str, i32>, resource: Resource, name: &str) -> Result<i32, StoreError> {
    ids.get(name)
        .copied()
        .ok_or_else(|| StoreError::Integrity(format!("sample {} '{}' is not defined", resource, name)))
}

/// Inserts the demo catalog in one transaction. Fails with `Duplicate` if
/// any of the sample names already exist.
pub fn populate(conn: &mut SqliteConnection) -> Result<SampleSummary, StoreError> {
    write_transaction(conn, |conn| {
        let mut foods = HashMap::new();
        for (name, description) in FOODS {
            let new_food = NewFood {
                description: Some(description.to_string()),
                ..NewFood::named(*name)
            };
            foods.insert(*name, query::create_food(conn, &new_food)?.food_id);
        }

        let mut ingredients = HashMap::new();
        for (name, image_url) in INGREDIENTS {
            let new_ingredient = NewIngredient {
                image_url: Some(image_url.to_string()),
                ..NewIngredient::named(*name)
            };
            ingredients.insert(*name, query::create_ingredient(conn, &new_ingredient)?.ingredient_id);
        }

        let mut categories = HashMap::new();
        for (name, description) in CATEGORIES {
            let new_category = NewCategory {
                description: Some(description.to_string()),
                ..NewCategory::named(*name)
            };
            categories.insert(*name, query::create_category(conn, &new_category)?.category_id);
        }

        for sample in RECIPES {
            let recipe = query::create_recipe(
                conn,
                &NewRecipe {
                    food_id: lookup(&foods, Resource::Food, sample.food)?,
                    instruction: sample.instruction.to_string(),
                    prep_time: sample.prep_time,
                    cook_time: sample.cook_time,
                    servings: sample.servings,
                },
            )?;

            for (name, quantity, unit) in sample.ingredients {
                let link = IngredientLink {
                    ingredient_id: lookup(&ingredients, Resource::Ingredient, name)?,
                    quantity: *quantity,
                    unit: unit.to_string(),
                };
                query::add_ingredient_to_recipe(conn, recipe.recipe_id, &link)?;
            }
            for name in sample.categories {
                let category_id = lookup(&categories, Resource::Category, name)?;
                query::add_category_to_recipe(conn, recipe.recipe_id, category_id)?;
            }

            let (calories, protein, carbs, fat) = sample.nutrition;
            query::create_nutritional_info(
                conn,
                &NewNutritionalInfo {
                    recipe_id: recipe.recipe_id,
                    calories,
                    protein,
                    carbs,
                    fat,
                },
            )?;
        }

        log::info!("added sample data");
        Ok(SampleSummary {
            foods: foods.len(),
            ingredients: ingredients.len(),
            categories: categories.len(),
            recipes: RECIPES.len(),
        })
    })
}
