mod common;

use food_manager::db::{self, Store};
use food_manager::errors::{Resource, StoreError};
use food_manager::models::{
    CategoryChanges, FoodChanges, IngredientLink, IngredientLinkChanges, NewCategory, NewFood,
    NewIngredient, NewNutritionalInfo, NewRecipe, NutritionalInfoChanges, RecipeChanges,
};
use food_manager::query;
use food_manager::sample;

use std::thread;

use common::{bake, file_pool, pizza, test_pool};

fn nutrition(recipe_id: i32, calories: i32) -> NewNutritionalInfo {
    NewNutritionalInfo {
        recipe_id,
        calories,
        protein: 10.0,
        carbs: 30.0,
        fat: 12.0,
    }
}

fn grams(ingredient_id: i32, quantity: f64) -> IngredientLink {
    IngredientLink {
        ingredient_id,
        quantity,
        unit: "g".to_string(),
    }
}

#[test]
fn create_assigns_ids_and_lists_in_id_order() {
    let pool = test_pool();
    let mut conn = pool.get().unwrap();

    let first = pizza(&mut conn);
    let second = query::create_food(&mut conn, &NewFood::named("Pasta")).unwrap();
    assert_eq!(first.food_id, 1);
    assert_eq!(second.food_id, 2);
    assert_eq!(first.description, None);

    let names: Vec<String> = query::list_foods(&mut conn)
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(names, vec!["Pizza", "Pasta"]);
}

#[test]
fn duplicate_names_are_rejected() {
    let pool = test_pool();
    let mut conn = pool.get().unwrap();

    pizza(&mut conn);
    let err = query::create_food(&mut conn, &NewFood::named("Pizza")).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Duplicate { resource: Resource::Food, ref name } if name == "Pizza"
    ));

    query::create_ingredient(&mut conn, &NewIngredient::named("Salt")).unwrap();
    let err = query::create_ingredient(&mut conn, &NewIngredient::named("Salt")).unwrap_err();
    assert!(err.is_integrity());

    query::create_category(&mut conn, &NewCategory::named("Italian")).unwrap();
    let err = query::create_category(&mut conn, &NewCategory::named("Italian")).unwrap_err();
    assert!(matches!(err, StoreError::Duplicate { resource: Resource::Category, .. }));

    assert_eq!(query::list_foods(&mut conn).unwrap().len(), 1);
}

#[test]
fn rename_onto_existing_name_is_a_duplicate() {
    let pool = test_pool();
    let mut conn = pool.get().unwrap();

    query::create_category(&mut conn, &NewCategory::named("Italian")).unwrap();
    let healthy = query::create_category(&mut conn, &NewCategory::named("Healthy")).unwrap();

    let changes = CategoryChanges {
        name: Some("Italian".to_string()),
        ..Default::default()
    };
    let err = query::update_category(&mut conn, healthy.category_id, &changes).unwrap_err();
    assert!(matches!(err, StoreError::Duplicate { .. }));

    // renaming to its own name is fine
    let changes = CategoryChanges {
        name: Some("Healthy".to_string()),
        ..Default::default()
    };
    query::update_category(&mut conn, healthy.category_id, &changes).unwrap();
}

#[test]
fn missing_ids_are_not_found() {
    let pool = test_pool();
    let mut conn = pool.get().unwrap();

    assert!(matches!(
        query::get_food(&mut conn, 42),
        Err(StoreError::NotFound { resource: Resource::Food, id: 42 })
    ));
    assert!(matches!(
        query::delete_recipe(&mut conn, 7),
        Err(StoreError::NotFound { resource: Resource::Recipe, id: 7 })
    ));
    assert!(matches!(
        query::update_ingredient(&mut conn, 3, &Default::default()),
        Err(StoreError::NotFound { resource: Resource::Ingredient, id: 3 })
    ));
    assert!(matches!(
        query::get_nutritional_info(&mut conn, 1),
        Err(StoreError::NotFound { resource: Resource::NutritionalInfo, .. })
    ));
}

#[test]
fn partial_update_only_touches_supplied_fields() {
    let pool = test_pool();
    let mut conn = pool.get().unwrap();

    let food = query::create_food(
        &mut conn,
        &NewFood {
            description: Some("Italian dish".to_string()),
            image_url: Some("pizza.jpg".to_string()),
            ..NewFood::named("Pizza")
        },
    )
    .unwrap();

    let renamed = query::update_food(
        &mut conn,
        food.food_id,
        &FoodChanges {
            name: Some("Calzone".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(renamed.name, "Calzone");
    assert_eq!(renamed.description.as_deref(), Some("Italian dish"));
    assert_eq!(renamed.image_url.as_deref(), Some("pizza.jpg"));

    let cleared = query::update_food(
        &mut conn,
        food.food_id,
        &FoodChanges {
            image_url: Some(None),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(cleared.image_url, None);
    assert_eq!(cleared.description.as_deref(), Some("Italian dish"));

    let untouched = query::update_food(&mut conn, food.food_id, &FoodChanges::default()).unwrap();
    assert_eq!(untouched, cleared);
}

#[test]
fn recipe_requires_existing_food() {
    let pool = test_pool();
    let mut conn = pool.get().unwrap();

    let err = query::create_recipe(
        &mut conn,
        &NewRecipe {
            food_id: 99,
            instruction: "Bake".to_string(),
            prep_time: 10,
            cook_time: 20,
            servings: 2,
        },
    )
    .unwrap_err();
    assert!(err.is_integrity());
    assert!(query::list_recipes(&mut conn).unwrap().is_empty());

    let food = pizza(&mut conn);
    let recipe = bake(&mut conn, food.food_id);
    let err = query::update_recipe(
        &mut conn,
        recipe.recipe_id,
        &RecipeChanges {
            food_id: Some(99),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, StoreError::MissingReference { resource: Resource::Food, id: 99 }));
}

#[test]
fn numeric_constraints_are_enforced() {
    let pool = test_pool();
    let mut conn = pool.get().unwrap();
    let food = pizza(&mut conn);

    let base = NewRecipe {
        food_id: food.food_id,
        instruction: "Bake".to_string(),
        prep_time: 10,
        cook_time: 20,
        servings: 2,
    };
    let no_servings = NewRecipe {
        servings: 0,
        ..base.clone()
    };
    assert!(matches!(
        query::create_recipe(&mut conn, &no_servings),
        Err(StoreError::Validation(_))
    ));
    let negative_prep = NewRecipe {
        prep_time: -1,
        ..base.clone()
    };
    assert!(matches!(
        query::create_recipe(&mut conn, &negative_prep),
        Err(StoreError::Validation(_))
    ));

    let recipe = query::create_recipe(&mut conn, &base).unwrap();
    let salt = query::create_ingredient(&mut conn, &NewIngredient::named("Salt")).unwrap();
    assert!(matches!(
        query::add_ingredient_to_recipe(&mut conn, recipe.recipe_id, &grams(salt.ingredient_id, 0.0)),
        Err(StoreError::Validation(_))
    ));

    let mut negative_fat = nutrition(recipe.recipe_id, 300);
    negative_fat.fat = -1.0;
    assert!(matches!(
        query::create_nutritional_info(&mut conn, &negative_fat),
        Err(StoreError::Validation(_))
    ));
    assert!(query::recipe_ingredients(&mut conn, recipe.recipe_id).unwrap().is_empty());
}

#[test]
fn adding_the_same_ingredient_twice_updates_in_place() {
    let pool = test_pool();
    let mut conn = pool.get().unwrap();
    let food = pizza(&mut conn);
    let recipe = bake(&mut conn, food.food_id);
    let flour = query::create_ingredient(&mut conn, &NewIngredient::named("Flour")).unwrap();

    query::add_ingredient_to_recipe(&mut conn, recipe.recipe_id, &grams(flour.ingredient_id, 500.0))
        .unwrap();
    let link = IngredientLink {
        ingredient_id: flour.ingredient_id,
        quantity: 2.0,
        unit: "cups".to_string(),
    };
    let owner = query::add_ingredient_to_recipe(&mut conn, recipe.recipe_id, &link).unwrap();
    assert_eq!(owner.recipe_id, recipe.recipe_id);

    let entries = query::recipe_ingredients(&mut conn, recipe.recipe_id).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].ingredient.name, "Flour");
    assert_eq!(entries[0].quantity, 2.0);
    assert_eq!(entries[0].unit, "cups");
    assert!(matches!(
        query::recipe_ingredients(&mut conn, 99),
        Err(StoreError::NotFound {
            resource: Resource::Recipe,
            id: 99
        })
    ));
}

#[test]
fn linking_missing_rows_is_an_integrity_error() {
    let pool = test_pool();
    let mut conn = pool.get().unwrap();

    let err = query::add_ingredient_to_recipe(&mut conn, 5, &grams(6, 1.0)).unwrap_err();
    assert!(err.is_integrity());
    assert!(matches!(err, StoreError::MissingReference { resource: Resource::Recipe, id: 5 }));

    let food = pizza(&mut conn);
    let recipe = bake(&mut conn, food.food_id);
    let err = query::add_ingredient_to_recipe(&mut conn, recipe.recipe_id, &grams(6, 1.0)).unwrap_err();
    assert!(matches!(err, StoreError::MissingReference { resource: Resource::Ingredient, id: 6 }));

    let err = query::add_category_to_recipe(&mut conn, recipe.recipe_id, 3).unwrap_err();
    assert!(matches!(err, StoreError::MissingReference { resource: Resource::Category, id: 3 }));
}

#[test]
fn ingredient_link_update_and_removal() {
    let pool = test_pool();
    let mut conn = pool.get().unwrap();
    let food = pizza(&mut conn);
    let recipe = bake(&mut conn, food.food_id);
    let basil = query::create_ingredient(&mut conn, &NewIngredient::named("Basil")).unwrap();

    let missing = IngredientLinkChanges {
        ingredient_id: basil.ingredient_id,
        quantity: Some(3.0),
        unit: None,
    };
    assert!(matches!(
        query::update_recipe_ingredient(&mut conn, recipe.recipe_id, &missing),
        Err(StoreError::LinkNotFound { .. })
    ));

    query::add_ingredient_to_recipe(
        &mut conn,
        recipe.recipe_id,
        &IngredientLink {
            ingredient_id: basil.ingredient_id,
            quantity: 10.0,
            unit: "leaves".to_string(),
        },
    )
    .unwrap();
    let updated = query::update_recipe_ingredient(&mut conn, recipe.recipe_id, &missing).unwrap();
    assert_eq!(updated.quantity, 3.0);
    assert_eq!(updated.unit, "leaves");

    query::remove_ingredient_from_recipe(&mut conn, recipe.recipe_id, basil.ingredient_id).unwrap();
    assert!(query::recipe_ingredients(&mut conn, recipe.recipe_id).unwrap().is_empty());
    assert!(matches!(
        query::remove_ingredient_from_recipe(&mut conn, recipe.recipe_id, basil.ingredient_id),
        Err(StoreError::LinkNotFound { resource: Resource::Ingredient, .. })
    ));
}

#[test]
fn category_links_are_idempotent() {
    let pool = test_pool();
    let mut conn = pool.get().unwrap();
    let food = pizza(&mut conn);
    let recipe = bake(&mut conn, food.food_id);
    let italian = query::create_category(&mut conn, &NewCategory::named("Italian")).unwrap();
    let quick = query::create_category(&mut conn, &NewCategory::named("Quick & Easy")).unwrap();

    query::add_category_to_recipe(&mut conn, recipe.recipe_id, quick.category_id).unwrap();
    query::add_category_to_recipe(&mut conn, recipe.recipe_id, italian.category_id).unwrap();
    query::add_category_to_recipe(&mut conn, recipe.recipe_id, italian.category_id).unwrap();

    let linked = query::recipe_categories(&mut conn, recipe.recipe_id).unwrap();
    assert_eq!(linked, vec![italian.clone(), quick]);

    query::remove_category_from_recipe(&mut conn, recipe.recipe_id, italian.category_id).unwrap();
    assert!(matches!(
        query::remove_category_from_recipe(&mut conn, recipe.recipe_id, italian.category_id),
        Err(StoreError::LinkNotFound { resource: Resource::Category, .. })
    ));
}

#[test]
fn one_nutritional_info_per_recipe() {
    let pool = test_pool();
    let mut conn = pool.get().unwrap();
    let food = pizza(&mut conn);
    let recipe = bake(&mut conn, food.food_id);

    assert!(matches!(
        query::get_recipe_nutritional_info(&mut conn, recipe.recipe_id),
        Err(StoreError::NoNutritionalInfo(_))
    ));
    let info = query::create_nutritional_info(&mut conn, &nutrition(recipe.recipe_id, 300)).unwrap();
    let err = query::create_nutritional_info(&mut conn, &nutrition(recipe.recipe_id, 500)).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateNutritionalInfo(id) if id == recipe.recipe_id));

    let found = query::get_recipe_nutritional_info(&mut conn, recipe.recipe_id).unwrap();
    assert_eq!(found, info);

    let updated = query::update_nutritional_info(
        &mut conn,
        info.nutritional_info_id,
        &NutritionalInfoChanges {
            calories: Some(280),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(updated.calories, 280);
    assert_eq!(updated.protein, 10.0);

    let err = query::create_nutritional_info(&mut conn, &nutrition(77, 100)).unwrap_err();
    assert!(matches!(err, StoreError::MissingReference { resource: Resource::Recipe, id: 77 }));
}

#[test]
fn deleting_a_recipe_cascades() {
    let pool = test_pool();
    let mut conn = pool.get().unwrap();
    let food = pizza(&mut conn);
    let recipe = bake(&mut conn, food.food_id);
    let cheese = query::create_ingredient(&mut conn, &NewIngredient::named("Cheese")).unwrap();
    let italian = query::create_category(&mut conn, &NewCategory::named("Italian")).unwrap();
    query::add_ingredient_to_recipe(&mut conn, recipe.recipe_id, &grams(cheese.ingredient_id, 150.0))
        .unwrap();
    query::add_category_to_recipe(&mut conn, recipe.recipe_id, italian.category_id).unwrap();
    let info = query::create_nutritional_info(&mut conn, &nutrition(recipe.recipe_id, 300)).unwrap();

    query::delete_recipe(&mut conn, recipe.recipe_id).unwrap();

    assert!(matches!(
        query::get_nutritional_info(&mut conn, info.nutritional_info_id),
        Err(StoreError::NotFound { .. })
    ));
    let changes = IngredientLinkChanges {
        ingredient_id: cheese.ingredient_id,
        quantity: Some(1.0),
        unit: None,
    };
    assert!(matches!(
        query::update_recipe_ingredient(&mut conn, recipe.recipe_id, &changes),
        Err(StoreError::LinkNotFound { .. })
    ));
    assert!(query::search_recipes_by_category(&mut conn, "Italian").unwrap().is_empty());
    // linked rows on the other side survive
    assert_eq!(query::get_ingredient(&mut conn, cheese.ingredient_id).unwrap(), cheese);
    assert_eq!(query::get_category(&mut conn, italian.category_id).unwrap(), italian);
}

#[test]
fn deleting_a_food_removes_its_recipes() {
    let pool = test_pool();
    let mut conn = pool.get().unwrap();
    let food = pizza(&mut conn);
    let recipe = bake(&mut conn, food.food_id);
    query::create_nutritional_info(&mut conn, &nutrition(recipe.recipe_id, 300)).unwrap();

    query::delete_food(&mut conn, food.food_id).unwrap();

    assert!(matches!(
        query::get_recipe(&mut conn, recipe.recipe_id),
        Err(StoreError::NotFound { resource: Resource::Recipe, .. })
    ));
    assert!(query::list_nutritional_info(&mut conn).unwrap().is_empty());
}

#[test]
fn details_resolve_every_relation() {
    let pool = test_pool();
    let mut conn = pool.get().unwrap();
    sample::populate(&mut conn).unwrap();

    let details = query::recipe_details(&mut conn, 1).unwrap();
    assert_eq!(details.food.name, "Pizza");
    assert_eq!(details.nutritional_info.as_ref().map(|n| n.calories), Some(266));
    let names: Vec<&str> = details
        .ingredients
        .iter()
        .map(|e| e.ingredient.name.as_str())
        .collect();
    assert_eq!(names, vec!["Flour", "Tomato", "Cheese", "Basil", "Olive Oil"]);
    let categories: Vec<&str> = details.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(categories, vec!["Italian", "Vegetarian"]);

    let all = query::list_recipe_details(&mut conn).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].food.name, "Pasta");
    assert_eq!(all[1].ingredients.len(), 5);
}

#[test]
fn search_helpers() {
    let pool = test_pool();
    let mut conn = pool.get().unwrap();
    sample::populate(&mut conn).unwrap();

    let ids = |recipes: Vec<food_manager::models::Recipe>| -> Vec<i32> {
        recipes.into_iter().map(|r| r.recipe_id).collect()
    };

    assert_eq!(ids(query::search_recipes_by_ingredient(&mut conn, "cheese").unwrap()), vec![1, 2]);
    assert_eq!(ids(query::search_recipes_by_ingredient(&mut conn, "GARL").unwrap()), vec![2]);
    assert_eq!(ids(query::search_recipes_by_category(&mut conn, "veget").unwrap()), vec![1]);
    assert_eq!(ids(query::search_recipes_by_category(&mut conn, "Italian").unwrap()), vec![1, 2]);
    assert!(query::search_recipes_by_category(&mut conn, "%").unwrap().is_empty());
    assert_eq!(ids(query::recipes_by_food(&mut conn, 2).unwrap()), vec![2]);
    assert!(query::recipes_by_food(&mut conn, 3).unwrap().is_empty());
    assert_eq!(ids(query::recipes_by_cooking_time_at_most(&mut conn, 25).unwrap()), vec![2]);
    assert_eq!(ids(query::recipes_by_cooking_time_at_most(&mut conn, 45).unwrap()), vec![1, 2]);
    assert_eq!(ids(query::recipes_by_servings(&mut conn, 4).unwrap()), vec![1]);
    assert_eq!(ids(query::recipes_with_calories_at_most(&mut conn, 300).unwrap()), vec![1]);
}

#[test]
fn clear_and_reset_empty_the_catalog() {
    let pool = test_pool();
    let mut conn = pool.get().unwrap();
    let summary = sample::populate(&mut conn).unwrap();
    assert_eq!(summary.foods, 4);
    assert_eq!(summary.ingredients, 8);
    assert_eq!(summary.categories, 4);
    assert_eq!(summary.recipes, 2);

    assert!(sample::populate(&mut conn).unwrap_err().is_integrity());

    db::clear(&mut conn).unwrap();
    assert!(query::list_foods(&mut conn).unwrap().is_empty());
    assert!(query::list_ingredients(&mut conn).unwrap().is_empty());

    sample::populate(&mut conn).unwrap();
    db::reset(&mut conn).unwrap();
    assert!(query::list_recipes(&mut conn).unwrap().is_empty());
    assert!(query::list_categories(&mut conn).unwrap().is_empty());
}

#[test]
fn concurrent_writers_on_a_shared_file_all_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let pool = file_pool(dir.path(), 8);
    let food = pizza(&mut pool.get().unwrap());
    let store = Store::new(pool.clone());

    let workers: Vec<_> = (0..8)
        .map(|worker| {
            let store = store.clone();
            let food_id = food.food_id;
            thread::spawn(move || {
                for round in 0..50 {
                    let changes = FoodChanges {
                        description: Some(Some(format!("worker {} round {}", worker, round))),
                        ..Default::default()
                    };
                    store
                        .run(|conn| query::update_food(conn, food_id, &changes))
                        .unwrap();
                }
                store
                    .run(|conn| {
                        query::create_ingredient(conn, &NewIngredient::named(format!("Spice {}", worker)))
                    })
                    .unwrap();
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let mut conn = pool.get().unwrap();
    let food = query::get_food(&mut conn, food.food_id).unwrap();
    assert!(food.description.unwrap().ends_with("round 49"));
    assert_eq!(query::list_ingredients(&mut conn).unwrap().len(), 8);
}
