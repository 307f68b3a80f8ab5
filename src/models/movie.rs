use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use validator::Validate;

#[derive(Debug, sqlx::FromRow)]
pub struct MovieRecord {
    pub movie_id: i32,
    pub title: String,
    pub description: String,
    pub genre: Json<Vec<String>>,
    pub poster: String,
    pub rating: Decimal,
    pub cast: Json<Vec<String>>,
    pub release_date: NaiveDate,
    pub trailer_url: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Movie {
    pub movie_id: i32,
    pub title: String,
    pub description: String,
    pub genre: Vec<String>,
    pub poster: String,
    /// Mean of all review ratings, 0 when unreviewed.
    pub rating: Decimal,
    pub cast: Vec<String>,
    pub release_date: NaiveDate,
    pub trailer_url: String,
}

impl From<MovieRecord> for Movie {
    fn from(record: MovieRecord) -> Self {
        Movie {
            movie_id: record.movie_id,
            title: record.title,
            description: record.description,
            genre: record.genre.0,
            poster: record.poster,
            rating: record.rating,
            cast: record.cast.0,
            release_date: record.release_date,
            trailer_url: record.trailer_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, sqlx::FromRow)]
pub struct MovieSummary {
    pub movie_id: i32,
    pub title: String,
    pub poster: String,
}

#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct MovieRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "at least one genre is required"))]
    pub genre: Vec<String>,
    #[validate(length(min = 1, message = "poster URL is required"))]
    pub poster: String,
    #[serde(default)]
    pub cast: Vec<String>,
    pub release_date: NaiveDate,
    #[serde(default)]
    pub trailer_url: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct MovieUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre: Option<Vec<String>>,
    pub poster: Option<String>,
    pub cast: Option<Vec<String>>,
    pub release_date: Option<NaiveDate>,
    pub trailer_url: Option<String>,
}
