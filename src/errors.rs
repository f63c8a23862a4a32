use std::fmt;

use actix_web::error::{JsonPayloadError, PathError};
use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde_json::json;

use crate::db::StoreCallError;
use crate::mason::{MasonBuilder, ERROR_PROFILE, MASON};

/// The catalog resources that can be looked up by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Food,
    Recipe,
    Ingredient,
    Category,
    NutritionalInfo,
}

impl Resource {
    /// Capitalised name used in error titles, e.g. "Food not found".
    pub fn title(self) -> &'static str {
        match self {
            Resource::Food => "Food",
            Resource::Recipe => "Recipe",
            Resource::Ingredient => "Ingredient",
            Resource::Category => "Category",
            Resource::NutritionalInfo => "Nutritional info",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Food => "food item",
            Resource::Recipe => "recipe",
            Resource::Ingredient => "ingredient",
            Resource::Category => "category",
            Resource::NutritionalInfo => "nutritional info",
        };
        f.write_str(name)
    }
}

/// Failures raised by the repository layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("No {resource} with ID {id} exists.")]
    NotFound { resource: Resource, id: i32 },

    #[error("Recipe {recipe_id} has no linked {resource} with ID {id}.")]
    LinkNotFound {
        recipe_id: i32,
        resource: Resource,
        id: i32,
    },

    #[error("No nutritional info exists for recipe {0}.")]
    NoNutritionalInfo(i32),

    #[error("{title} with name '{name}' already exists.", title = .resource.title())]
    Duplicate { resource: Resource, name: String },

    #[error("Nutritional info for recipe {0} already exists.")]
    DuplicateNutritionalInfo(i32),

    /// A foreign key points at a row that does not exist.
    #[error("Referenced {resource} with ID {id} does not exist.")]
    MissingReference { resource: Resource, id: i32 },

    /// A constraint violation the storage engine reported without enough
    /// detail to attribute it to a specific row.
    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("{0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(DieselError),

    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
}

impl StoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation(message.into())
    }

    /// True for the integrity category: uniqueness and foreign-key violations.
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            StoreError::Duplicate { .. }
                | StoreError::DuplicateNutritionalInfo(_)
                | StoreError::MissingReference { .. }
                | StoreError::Integrity(_)
        )
    }

    /// Failures of the storage itself rather than of the request. Only these
    /// count against the circuit breaker.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, StoreError::Database(_) | StoreError::Pool(_))
    }
}

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        if let DieselError::DatabaseError(kind, info) = &err {
            let message = info.message().to_string();
            match kind {
                DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::ForeignKeyViolation => {
                    return StoreError::Integrity(message);
                }
                DatabaseErrorKind::CheckViolation | DatabaseErrorKind::NotNullViolation => {
                    return StoreError::Validation(message);
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

/// Errors surfaced by HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Request content type must be 'application/json'.")]
    UnsupportedMediaType,

    #[error("{0}")]
    InvalidInput(String),

    #[error("No resource exists at {0}.")]
    InvalidPath(String),

    #[error("storage is unavailable")]
    Unavailable,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn title(&self) -> String {
        match self {
            ApiError::Store(StoreError::NotFound { resource, .. })
            | ApiError::Store(StoreError::LinkNotFound { resource, .. }) => {
                format!("{} not found", resource.title())
            }
            ApiError::Store(StoreError::NoNutritionalInfo(_)) => {
                "Nutritional info not found".to_string()
            }
            ApiError::Store(StoreError::Duplicate { .. })
            | ApiError::Store(StoreError::DuplicateNutritionalInfo(_))
            | ApiError::Store(StoreError::Integrity(_)) => "Conflict".to_string(),
            ApiError::Store(StoreError::Validation(_))
            | ApiError::Store(StoreError::MissingReference { .. })
            | ApiError::InvalidInput(_) => "Invalid input".to_string(),
            ApiError::UnsupportedMediaType => "Unsupported Media Type".to_string(),
            ApiError::InvalidPath(_) => "Not found".to_string(),
            _ => "An unexpected error occurred.".to_string(),
        }
    }
}

impl From<JsonPayloadError> for ApiError {
    fn from(err: JsonPayloadError) -> Self {
        match err {
            JsonPayloadError::ContentType => ApiError::UnsupportedMediaType,
            other => ApiError::InvalidInput(other.to_string()),
        }
    }
}

impl From<actix_web::error::BlockingError> for ApiError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<StoreCallError> for ApiError {
    fn from(err: StoreCallError) -> Self {
        match err {
            StoreCallError::Rejected => ApiError::Unavailable,
            StoreCallError::Failed(err) => ApiError::Store(err),
        }
    }
}

impl ApiError {
    pub(crate) fn from_path(err: PathError, path: &str) -> Self {
        log::debug!("rejected path {}: {}", path, err);
        ApiError::InvalidPath(path.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Store(err) => match err {
                StoreError::NotFound { .. }
                | StoreError::LinkNotFound { .. }
                | StoreError::NoNutritionalInfo(_) => StatusCode::NOT_FOUND,
                StoreError::Duplicate { .. }
                | StoreError::DuplicateNutritionalInfo(_)
                | StoreError::Integrity(_) => StatusCode::CONFLICT,
                StoreError::Validation(_) | StoreError::MissingReference { .. } => {
                    StatusCode::BAD_REQUEST
                }
                StoreError::Database(_) | StoreError::Pool(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidPath(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("request failed: {}", self);
            return HttpResponse::build(status).json(json!({
                "error": "An unexpected error occurred.",
                "details": self.to_string(),
            }));
        }

        log::warn!("request rejected with {}: {}", status, self);
        let mut body = MasonBuilder::new();
        body.add_error(self.title(), self.to_string());
        body.add_control("profile", ERROR_PROFILE);
        HttpResponse::build(status)
            .insert_header((header::CONTENT_TYPE, MASON))
            .body(body.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: StoreError) -> StatusCode {
        ApiError::from(err).status_code()
    }

    #[test]
    fn store_errors_map_to_http_status() {
        assert_eq!(
            status_of(StoreError::NotFound {
                resource: Resource::Food,
                id: 1
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_of(StoreError::NoNutritionalInfo(1)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(StoreError::Duplicate {
                resource: Resource::Category,
                name: "Italian".to_string()
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(StoreError::MissingReference {
                resource: Resource::Recipe,
                id: 3
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(StoreError::Database(DieselError::BrokenTransactionManager)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(StoreCallError::Rejected).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_name_resource_and_id() {
        let err = StoreError::NotFound {
            resource: Resource::Food,
            id: 9,
        };
        assert_eq!(err.to_string(), "No food item with ID 9 exists.");
        assert_eq!(ApiError::from(err).title(), "Food not found");

        let err = StoreError::Duplicate {
            resource: Resource::Ingredient,
            name: "Salt".to_string(),
        };
        assert_eq!(err.to_string(), "Ingredient with name 'Salt' already exists.");
    }

    #[test]
    fn only_storage_failures_are_infrastructure() {
        assert!(StoreError::Database(DieselError::NotFound).is_infrastructure());
        assert!(!StoreError::validation("servings must be > 0").is_infrastructure());
        assert!(!StoreError::DuplicateNutritionalInfo(1).is_infrastructure());
        assert!(StoreError::DuplicateNutritionalInfo(1).is_integrity());
    }

    #[test]
    fn server_errors_use_plain_json_body() {
        let resp = ApiError::Unavailable.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let resp = ApiError::UnsupportedMediaType.error_response();
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), MASON);
    }
}
