diesel::table! {
    food (food_id) {
        food_id -> Integer,
        name -> Text,
        description -> Nullable<Text>,
        image_url -> Nullable<Text>,
    }
}

diesel::table! {
    recipe (recipe_id) {
        recipe_id -> Integer,
        food_id -> Integer,
        instruction -> Text,
        prep_time -> Integer,
        cook_time -> Integer,
        servings -> Integer,
    }
}

diesel::table! {
    ingredient (ingredient_id) {
        ingredient_id -> Integer,
        name -> Text,
        image_url -> Nullable<Text>,
    }
}

diesel::table! {
    category (category_id) {
        category_id -> Integer,
        name -> Text,
        description -> Nullable<Text>,
    }
}

diesel::table! {
    nutritional_info (nutritional_info_id) {
        nutritional_info_id -> Integer,
        recipe_id -> Integer,
        calories -> Integer,
        protein -> Double,
        carbs -> Double,
        fat -> Double,
    }
}

diesel::table! {
    recipe_ingredient (recipe_id, ingredient_id) {
        recipe_id -> Integer,
        ingredient_id -> Integer,
        quantity -> Double,
        unit -> Text,
    }
}

diesel::table! {
    recipe_category (recipe_id, category_id) {
        recipe_id -> Integer,
        category_id -> Integer,
    }
}

diesel::joinable!(recipe -> food (food_id));
diesel::joinable!(nutritional_info -> recipe (recipe_id));
diesel::joinable!(recipe_ingredient -> recipe (recipe_id));
diesel::joinable!(recipe_ingredient -> ingredient (ingredient_id));
diesel::joinable!(recipe_category -> recipe (recipe_id));
diesel::joinable!(recipe_category -> category (category_id));

diesel::allow_tables_to_appear_in_same_query!(
    food,
    recipe,
    ingredient,
    category,
    nutritional_info,
    recipe_ingredient,
    recipe_category,
);
