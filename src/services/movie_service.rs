use sqlx::types::Json;
use sqlx::MySqlPool;
use validator::Validate;

use crate::models::movie::{Movie, MovieRecord, MovieRequest, MovieUpdateRequest};
use crate::utils::error::{AppError, AppResult};

const MOVIE_COLUMNS: &str =
    "movie_id, title, description, genre, poster, rating, `cast`, release_date, trailer_url";

#[derive(Clone)]
pub struct MovieService {
    pool: MySqlPool,
}

impl MovieService {
    pub fn new(pool: MySqlPool) -> Self {
        MovieService { pool }
    }

    pub async fn get_movies(&self) -> AppResult<Vec<Movie>> {
        let records = sqlx::query_as::<_, MovieRecord>(&format!(
            "SELECT {} FROM movie ORDER BY release_date DESC",
            MOVIE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Movie::from).collect())
    }

    pub async fn get_movie_by_id(&self, movie_id: i32) -> AppResult<Movie> {
        let record = sqlx::query_as::<_, MovieRecord>(&format!(
            "SELECT {} FROM movie WHERE movie_id = ?",
            MOVIE_COLUMNS
        ))
        .bind(movie_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Movie not found".into()))?;

        Ok(Movie::from(record))
    }

    pub async fn create_movie(&self, request: MovieRequest) -> AppResult<Movie> {
        request
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO movie (title, description, genre, poster, `cast`, release_date, trailer_url)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&request.title)
        .bind(&request.description)
        .bind(Json(&request.genre))
        .bind(&request.poster)
        .bind(Json(&request.cast))
        .bind(request.release_date)
        .bind(&request.trailer_url)
        .execute(&self.pool)
        .await?;

        self.get_movie_by_id(result.last_insert_id() as i32).await
    }

    pub async fn update_movie(
        &self,
        movie_id: i32,
        request: MovieUpdateRequest,
    ) -> AppResult<Movie> {
        let current = self.get_movie_by_id(movie_id).await?;

        let genre = request.genre.unwrap_or(current.genre);
        if genre.is_empty() {
            return Err(AppError::ValidationError(
                "at least one genre is required".into(),
            ));
        }

        sqlx::query(
            "UPDATE movie
             SET title = ?, description = ?, genre = ?, poster = ?, `cast` = ?,
                 release_date = ?, trailer_url = ?
             WHERE movie_id = ?",
        )
        .bind(request.title.unwrap_or(current.title))
        .bind(request.description.unwrap_or(current.description))
        .bind(Json(&genre))
        .bind(request.poster.unwrap_or(current.poster))
        .bind(Json(&request.cast.unwrap_or(current.cast)))
        .bind(request.release_date.unwrap_or(current.release_date))
        .bind(request.trailer_url.unwrap_or(current.trailer_url))
        .bind(movie_id)
        .execute(&self.pool)
        .await?;

        self.get_movie_by_id(movie_id).await
    }

    pub async fn delete_movie(&self, movie_id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM movie WHERE movie_id = ?")
            .bind(movie_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Movie not found".into()));
        }

        Ok(())
    }
}
