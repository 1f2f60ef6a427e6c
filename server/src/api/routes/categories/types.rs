//! Category API types

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::routes::microposts::types::MicropostDto;
use crate::core::constants::MAX_CATEGORY_NAME_LENGTH;
use crate::data::types::CategoryRow;

/// Request body for POST /categories
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(
        min = 1,
        max = MAX_CATEGORY_NAME_LENGTH,
        message = "name must be 1-50 characters"
    ))]
    pub name: String,
}

/// Category DTO for API responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDto {
    pub id: i64,
    pub name: String,
}

impl From<CategoryRow> for CategoryDto {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

/// A category with the microposts filed under it
#[derive(Debug, Serialize)]
pub struct CategoryDetailDto {
    #[serde(flatten)]
    pub category: CategoryDto,
    pub microposts: Vec<MicropostDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_limits() {
        let req: CreateCategoryRequest = serde_json::from_str(r#"{"name":"tech"}"#).unwrap();
        assert!(req.validate().is_ok());

        let req: CreateCategoryRequest = serde_json::from_str(r#"{"name":""}"#).unwrap();
        assert!(req.validate().is_err());

        let req = CreateCategoryRequest {
            name: "x".repeat(51),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_detail_flattens_category() {
        let dto = CategoryDetailDto {
            category: CategoryDto {
                id: 4,
                name: "tech".to_string(),
            },
            microposts: Vec::new(),
        };
        let json = serde_json::to_value(dto).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 4, "name": "tech", "microposts": []})
        );
    }
}
