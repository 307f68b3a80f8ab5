use rust_decimal::Decimal;
use sqlx::MySqlPool;
use validator::Validate;

use crate::models::review::{Review, ReviewRecord, ReviewRequest, ReviewUpdateRequest};
use crate::models::user::UserSummary;
use crate::utils::error::{AppError, AppResult};

#[derive(Clone)]
pub struct ReviewService {
    pool: MySqlPool,
}

impl ReviewService {
    pub fn new(pool: MySqlPool) -> Self {
        ReviewService { pool }
    }

    pub async fn get_movie_reviews(&self, movie_id: i32) -> AppResult<Vec<Review>> {
        let rows = sqlx::query_as::<_, ReviewJoinRow>(
            "SELECT r.review_id, r.movie_id, r.user_id, r.comment, r.rating, r.created_at,
                    u.name AS user_name, u.email AS user_email
             FROM review r
             LEFT JOIN user u ON u.id = r.user_id
             WHERE r.movie_id = ?
             ORDER BY r.created_at DESC",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    pub async fn add_review(&self, user_id: i32, request: ReviewRequest) -> AppResult<Review> {
        request
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        // One review per user per movie
        let existing = sqlx::query("SELECT review_id FROM review WHERE movie_id = ? AND user_id = ?")
            .bind(request.movie_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(
                "You have already reviewed this movie".into(),
            ));
        }

        // The movie must exist before a rating can be attached to it
        let movie = sqlx::query("SELECT movie_id FROM movie WHERE movie_id = ?")
            .bind(request.movie_id)
            .fetch_optional(&self.pool)
            .await?;
        if movie.is_none() {
            return Err(AppError::NotFound("Movie not found".into()));
        }

        let result = sqlx::query(
            "INSERT INTO review (movie_id, user_id, comment, rating) VALUES (?, ?, ?, ?)",
        )
        .bind(request.movie_id)
        .bind(user_id)
        .bind(&request.comment)
        .bind(request.rating)
        .execute(&self.pool)
        .await?;

        self.refresh_movie_rating(request.movie_id).await?;

        self.get_review_by_id(result.last_insert_id() as i32).await
    }

    pub async fn update_review(
        &self,
        review_id: i32,
        user_id: i32,
        request: ReviewUpdateRequest,
    ) -> AppResult<Review> {
        request
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let review = self.fetch_record(review_id).await?;
        if review.user_id != user_id {
            return Err(AppError::Forbidden(
                "Not authorized to update this review".into(),
            ));
        }

        sqlx::query("UPDATE review SET comment = ?, rating = ? WHERE review_id = ?")
            .bind(request.comment.unwrap_or(review.comment))
            .bind(request.rating.unwrap_or(review.rating))
            .bind(review_id)
            .execute(&self.pool)
            .await?;

        self.refresh_movie_rating(review.movie_id).await?;

        self.get_review_by_id(review_id).await
    }

    pub async fn delete_review(&self, review_id: i32, user_id: i32) -> AppResult<()> {
        let review = self.fetch_record(review_id).await?;
        if review.user_id != user_id {
            return Err(AppError::Forbidden(
                "Not authorized to delete this review".into(),
            ));
        }

        sqlx::query("DELETE FROM review WHERE review_id = ?")
            .bind(review_id)
            .execute(&self.pool)
            .await?;

        self.refresh_movie_rating(review.movie_id).await?;

        Ok(())
    }

    async fn fetch_record(&self, review_id: i32) -> AppResult<ReviewRecord> {
        sqlx::query_as::<_, ReviewRecord>(
            "SELECT review_id, movie_id, user_id, comment, rating, created_at
             FROM review WHERE review_id = ?",
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".into()))
    }

    async fn get_review_by_id(&self, review_id: i32) -> AppResult<Review> {
        let row = sqlx::query_as::<_, ReviewJoinRow>(
            "SELECT r.review_id, r.movie_id, r.user_id, r.comment, r.rating, r.created_at,
                    u.name AS user_name, u.email AS user_email
             FROM review r
             LEFT JOIN user u ON u.id = r.user_id
             WHERE r.review_id = ?",
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".into()))?;

        Ok(Review::from(row))
    }

    // Recompute the derived movie rating as the mean of all its review
    // ratings, one decimal place, zero when the last review is gone.
    async fn refresh_movie_rating(&self, movie_id: i32) -> AppResult<()> {
        let (average,): (Option<Decimal>,) =
            sqlx::query_as("SELECT AVG(rating) FROM review WHERE movie_id = ?")
                .bind(movie_id)
                .fetch_one(&self.pool)
                .await?;

        let rating = average.map(|avg| avg.round_dp(1)).unwrap_or(Decimal::ZERO);

        sqlx::query("UPDATE movie SET rating = ? WHERE movie_id = ?")
            .bind(rating)
            .bind(movie_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReviewJoinRow {
    review_id: i32,
    movie_id: i32,
    user_id: i32,
    comment: String,
    rating: i32,
    created_at: chrono::DateTime<chrono::Utc>,
    user_name: Option<String>,
    user_email: Option<String>,
}

impl From<ReviewJoinRow> for Review {
    fn from(row: ReviewJoinRow) -> Self {
        let user = match (row.user_name, row.user_email) {
            (Some(name), Some(email)) => Some(UserSummary {
                id: row.user_id,
                name,
                email,
            }),
            _ => None,
        };

        Review {
            review_id: row.review_id,
            movie_id: row.movie_id,
            user_id: row.user_id,
            comment: row.comment,
            rating: row.rating,
            created_at: row.created_at,
            user,
        }
    }
}
