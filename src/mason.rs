//! Mason hypermedia envelopes.
//!
//! A [`MasonBuilder`] holds the payload fields and the `@error`,
//! `@namespaces` and `@controls` blocks as separate typed parts and only
//! merges them into one JSON object in [`MasonBuilder::to_value`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

pub const MASON: &str = "application/vnd.mason+json";
pub const NAMESPACE: &str = "foodmanager";
pub const LINK_RELATIONS_URL: &str = "/food_manager/link-relations/";

pub const FOOD_PROFILE: &str = "/profiles/food/";
pub const RECIPE_PROFILE: &str = "/profiles/recipe/";
pub const INGREDIENT_PROFILE: &str = "/profiles/ingredient/";
pub const CATEGORY_PROFILE: &str = "/profiles/category/";
pub const NUTRITION_PROFILE: &str = "/profiles/nutrition/";
pub const ERROR_PROFILE: &str = "/profiles/error/";

#[derive(Debug, Clone, PartialEq)]
pub struct MasonError {
    pub message: String,
    pub messages: Vec<String>,
}

impl MasonError {
    fn to_value(&self) -> Value {
        let mut fields = Map::new();
        fields.insert("@message".to_string(), Value::from(self.message.clone()));
        fields.insert("@messages".to_string(), Value::from(self.messages.clone()));
        Value::Object(fields)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Namespace {
    pub name: String,
}

/// A hypermedia action a client can follow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Control {
    pub href: String,
    pub method: Option<String>,
    pub encoding: Option<String>,
    pub title: Option<String>,
    pub schema: Option<Value>,
}

impl Control {
    pub fn link(href: impl Into<String>) -> Self {
        Control {
            href: href.into(),
            ..Default::default()
        }
    }

    pub fn method(mut self, method: &str) -> Self {
        self.method = Some(method.to_string());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn json_schema(mut self, schema: Value) -> Self {
        self.encoding = Some("json".to_string());
        self.schema = Some(schema);
        self
    }

    /// Unset attributes are left out.
    fn to_value(&self) -> Value {
        let mut fields = Map::new();
        fields.insert("href".to_string(), Value::from(self.href.clone()));
        let attributes = [
            ("method", &self.method),
            ("encoding", &self.encoding),
            ("title", &self.title),
        ];
        for (key, attribute) in attributes {
            if let Some(text) = attribute {
                fields.insert(key.to_string(), Value::from(text.clone()));
            }
        }
        if let Some(schema) = &self.schema {
            fields.insert("schema".to_string(), schema.clone());
        }
        Value::Object(fields)
    }
}

/// One response envelope. Build it, then serialize it once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MasonBuilder {
    data: Map<String, Value>,
    error: Option<MasonError>,
    namespaces: BTreeMap<String, Namespace>,
    controls: BTreeMap<String, Control>,
}

impl MasonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from the fields of a serializable value. Values that do not
    /// serialize to a JSON object are stored under `"value"`.
    pub fn from_data<T: Serialize>(data: &T) -> Result<Self, serde_json::Error> {
        let mut builder = Self::new();
        match serde_json::to_value(data)? {
            Value::Object(fields) => builder.data = fields,
            other => {
                builder.data.insert("value".to_string(), other);
            }
        }
        Ok(builder)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    /// Sets the single `@error` block; a second call replaces the first.
    pub fn add_error(&mut self, title: impl Into<String>, details: impl Into<String>) {
        self.error = Some(MasonError {
            message: title.into(),
            messages: vec![details.into()],
        });
    }

    pub fn add_namespace(&mut self, ns: &str, uri: &str) {
        self.namespaces.insert(
            ns.to_string(),
            Namespace {
                name: uri.to_string(),
            },
        );
    }

    pub fn add_control(&mut self, name: &str, href: impl Into<String>) {
        self.controls.insert(name.to_string(), Control::link(href));
    }

    pub fn add_control_with(&mut self, name: &str, control: Control) {
        self.controls.insert(name.to_string(), control);
    }

    pub fn add_control_get(&mut self, name: &str, title: &str, href: impl Into<String>) {
        self.add_control_with(
            &format!("{}:{}", NAMESPACE, name),
            Control::link(href).method("GET").title(title),
        );
    }

    pub fn add_control_post(&mut self, name: &str, title: &str, href: impl Into<String>, schema: Value) {
        self.add_control_with(
            &format!("{}:{}", NAMESPACE, name),
            Control::link(href).method("POST").title(title).json_schema(schema),
        );
    }

    pub fn add_control_put(&mut self, title: &str, href: impl Into<String>, schema: Value) {
        self.add_control_with(
            "edit",
            Control::link(href).method("PUT").title(title).json_schema(schema),
        );
    }

    pub fn add_control_delete(&mut self, title: &str, href: impl Into<String>) {
        self.add_control_with(
            &format!("{}:delete", NAMESPACE),
            Control::link(href).method("DELETE").title(title),
        );
    }

    pub fn error(&self) -> Option<&MasonError> {
        self.error.as_ref()
    }

    pub fn control(&self, name: &str) -> Option<&Control> {
        self.controls.get(name)
    }

    /// The envelope as one JSON object: the data fields followed by the
    /// `@error`, `@namespaces` and `@controls` blocks that are set.
    pub fn to_value(&self) -> Value {
        let mut fields = self.data.clone();
        if let Some(error) = &self.error {
            fields.insert("@error".to_string(), error.to_value());
        }
        if !self.namespaces.is_empty() {
            let namespaces = self
                .namespaces
                .iter()
                .map(|(ns, namespace)| {
                    let mut entry = Map::new();
                    entry.insert("name".to_string(), Value::from(namespace.name.clone()));
                    (ns.clone(), Value::Object(entry))
                })
                .collect();
            fields.insert("@namespaces".to_string(), Value::Object(namespaces));
        }
        if !self.controls.is_empty() {
            let controls = self
                .controls
                .iter()
                .map(|(name, control)| (name.clone(), control.to_value()))
                .collect();
            fields.insert("@controls".to_string(), Value::Object(controls));
        }
        Value::Object(fields)
    }
}

impl Serialize for MasonBuilder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl fmt::Display for MasonBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

// Resource URLs

pub const API_ROOT: &str = "/api/";
pub const FOODS_URL: &str = "/api/foods/";
pub const RECIPES_URL: &str = "/api/recipes/";
pub const RECIPE_SEARCH_URL: &str = "/api/recipes/search/";
pub const INGREDIENTS_URL: &str = "/api/ingredients/";
pub const CATEGORIES_URL: &str = "/api/categories/";
pub const NUTRITION_URL: &str = "/api/nutritional-info/";

pub fn food_url(food_id: i32) -> String {
    format!("{}{}/", FOODS_URL, food_id)
}

pub fn recipe_url(recipe_id: i32) -> String {
    format!("{}{}/", RECIPES_URL, recipe_id)
}

pub fn recipe_ingredients_url(recipe_id: i32) -> String {
    format!("{}{}/ingredients/", RECIPES_URL, recipe_id)
}

pub fn recipe_categories_url(recipe_id: i32) -> String {
    format!("{}{}/categories/", RECIPES_URL, recipe_id)
}

pub fn ingredient_url(ingredient_id: i32) -> String {
    format!("{}{}/", INGREDIENTS_URL, ingredient_id)
}

pub fn category_url(category_id: i32) -> String {
    format!("{}{}/", CATEGORIES_URL, category_id)
}

pub fn nutritional_info_url(nutritional_info_id: i32) -> String {
    format!("{}{}/", NUTRITION_URL, nutritional_info_id)
}

// Input schemas

pub fn food_schema() -> Value {
    json!({
        "type": "object",
        "required": ["name"],
        "properties": {
            "name": {"description": "Food name", "type": "string", "maxLength": 64},
            "description": {"description": "Short description", "type": "string", "maxLength": 255},
            "image_url": {"description": "Image URL", "type": "string", "maxLength": 255}
        }
    })
}

pub fn recipe_schema(default_food_id: Option<i32>) -> Value {
    let mut food_id = json!({"description": "Food this recipe makes", "type": "integer"});
    if let Some(id) = default_food_id {
        food_id["default"] = json!(id);
    }
    json!({
        "type": "object",
        "required": ["food_id", "instruction", "prep_time", "cook_time", "servings"],
        "properties": {
            "food_id": food_id,
            "instruction": {"description": "Cooking instructions", "type": "string"},
            "prep_time": {"description": "Preparation time in minutes", "type": "integer", "minimum": 0},
            "cook_time": {"description": "Cooking time in minutes", "type": "integer", "minimum": 0},
            "servings": {"description": "Number of servings", "type": "integer", "minimum": 1}
        }
    })
}

pub fn ingredient_schema() -> Value {
    json!({
        "type": "object",
        "required": ["name"],
        "properties": {
            "name": {"description": "Ingredient name", "type": "string", "maxLength": 64},
            "image_url": {"description": "Image URL", "type": "string", "maxLength": 255}
        }
    })
}

pub fn category_schema() -> Value {
    json!({
        "type": "object",
        "required": ["name"],
        "properties": {
            "name": {"description": "Category name", "type": "string", "maxLength": 64},
            "description": {"description": "Short description", "type": "string", "maxLength": 255}
        }
    })
}

pub fn nutritional_info_schema(default_recipe_id: Option<i32>) -> Value {
    let mut recipe_id = json!({"description": "Recipe described", "type": "integer"});
    if let Some(id) = default_recipe_id {
        recipe_id["default"] = json!(id);
    }
    json!({
        "type": "object",
        "required": ["recipe_id", "calories", "protein", "carbs", "fat"],
        "properties": {
            "recipe_id": recipe_id,
            "calories": {"description": "Calories per serving", "type": "integer", "minimum": 0},
            "protein": {"description": "Protein in grams", "type": "number", "minimum": 0},
            "carbs": {"description": "Carbohydrates in grams", "type": "number", "minimum": 0},
            "fat": {"description": "Fat in grams", "type": "number", "minimum": 0}
        }
    })
}

pub fn ingredient_link_schema() -> Value {
    json!({
        "type": "object",
        "required": ["ingredient_id", "quantity"],
        "properties": {
            "ingredient_id": {"description": "Ingredient to link", "type": "integer"},
            "quantity": {"description": "Amount used", "type": "number", "exclusiveMinimum": 0},
            "unit": {"description": "Unit of the amount", "type": "string", "default": "piece"}
        }
    })
}

pub fn category_link_schema() -> Value {
    json!({
        "type": "object",
        "required": ["category_id"],
        "properties": {
            "category_id": {"description": "Category to link", "type": "integer"}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_fields_merge_at_top_level() {
        let mut body = MasonBuilder::from_data(&json!({"food_id": 1, "name": "Pizza"})).unwrap();
        body.add_namespace(NAMESPACE, LINK_RELATIONS_URL);
        body.add_control("self", food_url(1));

        let value = body.to_value();
        assert_eq!(value["name"], "Pizza");
        assert_eq!(value["@namespaces"]["foodmanager"]["name"], LINK_RELATIONS_URL);
        assert_eq!(value["@controls"]["self"]["href"], "/api/foods/1/");
        assert!(value.get("@error").is_none());
    }

    #[test]
    fn add_error_overwrites_previous_error() {
        let mut body = MasonBuilder::new();
        body.add_error("Conflict", "first");
        body.add_error("Invalid input", "second");

        let value = body.to_value();
        assert_eq!(value["@error"]["@message"], "Invalid input");
        assert_eq!(value["@error"]["@messages"], json!(["second"]));
    }

    #[test]
    fn write_controls_carry_method_encoding_and_schema() {
        let mut body = MasonBuilder::new();
        body.add_control_post("add-food", "Add New Food", FOODS_URL, food_schema());
        body.add_control_put("Edit Food", food_url(2), food_schema());
        body.add_control_delete("Delete Food", food_url(2));

        let add = body.control("foodmanager:add-food").unwrap();
        assert_eq!(add.method.as_deref(), Some("POST"));
        assert_eq!(add.encoding.as_deref(), Some("json"));
        assert_eq!(add.schema.as_ref().unwrap()["required"], json!(["name"]));

        let edit = body.control("edit").unwrap();
        assert_eq!(edit.method.as_deref(), Some("PUT"));

        let delete = body.to_value()["@controls"]["foodmanager:delete"].clone();
        assert_eq!(delete["method"], "DELETE");
        assert!(delete.get("schema").is_none());
    }

    #[test]
    fn display_and_serialize_match_to_value() {
        let mut body = MasonBuilder::from_data(&json!({"name": "Salt"})).unwrap();
        body.add_error("Conflict", "taken");
        body.add_namespace(NAMESPACE, LINK_RELATIONS_URL);
        body.add_control_put("Edit Ingredient", ingredient_url(1), ingredient_schema());

        let value = body.to_value();
        assert_eq!(serde_json::to_value(&body).unwrap(), value);
        let printed: Value = serde_json::from_str(&body.to_string()).unwrap();
        assert_eq!(printed, value);
        assert_eq!(value["@controls"]["edit"]["encoding"], "json");
        assert!(value["@controls"]["edit"].get("schema").is_some());
    }

    #[test]
    fn recipe_schema_carries_default_food() {
        assert!(recipe_schema(None)["properties"]["food_id"].get("default").is_none());
        assert_eq!(recipe_schema(Some(4))["properties"]["food_id"]["default"], 4);
    }
}
