use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::UserSummary;

#[derive(Debug, sqlx::FromRow)]
pub struct ReviewRecord {
    pub review_id: i32,
    pub movie_id: i32,
    pub user_id: i32,
    pub comment: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct Review {
    pub review_id: i32,
    pub movie_id: i32,
    pub user_id: i32,
    pub comment: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    pub user: Option<UserSummary>,
}

#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct ReviewRequest {
    pub movie_id: i32,
    #[validate(length(min = 1, message = "comment is required"))]
    pub comment: String,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,
}

#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct ReviewUpdateRequest {
    pub comment: Option<String>,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: Option<i32>,
}
