use std::collections::HashMap;

use sqlx::types::Json;
use sqlx::MySqlPool;
use validator::Validate;

use crate::models::movie::MovieSummary;
use crate::models::theatre::{
    MovieRef, SeatCoord, Show, ShowDetails, ShowRequest, ShowUpdateRequest, Theatre,
    TheatreDetails, TheatreRecord, TheatreRequest, TheatreUpdateRequest,
};
use crate::utils::error::{AppError, AppResult};

const MAX_UPDATE_RETRIES: usize = 3;

#[derive(Clone)]
pub struct TheatreService {
    pool: MySqlPool,
}

impl TheatreService {
    pub fn new(pool: MySqlPool) -> Self {
        TheatreService { pool }
    }

    async fn fetch_record(&self, theatre_id: i32) -> AppResult<TheatreRecord> {
        sqlx::query_as::<_, TheatreRecord>(
            "SELECT theatre_id, name, location, screens, shows, version
             FROM theatre WHERE theatre_id = ?",
        )
        .bind(theatre_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Theatre not found".into()))
    }

    // Read-modify-write on the embedded show list, applied as a single
    // compare-and-swap on the theatre version with bounded retries. Two
    // racing writers can never both commit against the same snapshot.
    async fn mutate_shows<F>(&self, theatre_id: i32, mut apply: F) -> AppResult<Vec<Show>>
    where
        F: FnMut(&mut Vec<Show>) -> AppResult<()>,
    {
        let mut retries = 0;

        while retries < MAX_UPDATE_RETRIES {
            let record = self.fetch_record(theatre_id).await?;
            let mut shows = record.shows.0;
            apply(&mut shows)?;

            let result = sqlx::query(
                "UPDATE theatre
                 SET shows = ?, version = version + 1
                 WHERE theatre_id = ? AND version = ?",
            )
            .bind(Json(&shows))
            .bind(theatre_id)
            .bind(record.version)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                retries += 1;
                log::warn!(
                    "version conflict updating theatre {}, retry {}/{}",
                    theatre_id,
                    retries,
                    MAX_UPDATE_RETRIES
                );
                continue;
            }

            return Ok(shows);
        }

        Err(AppError::Conflict(
            "Failed to update show seats after maximum retries".into(),
        ))
    }

    /// Mark the given seats booked, all-or-nothing. Returns the updated
    /// show so callers can price against the same snapshot they booked.
    pub async fn reserve_seats(
        &self,
        theatre_id: i32,
        show_id: &str,
        seats: &[SeatCoord],
    ) -> AppResult<Show> {
        let shows = self
            .mutate_shows(theatre_id, |shows| {
                let show = find_show_mut(shows, show_id)?;
                show.seats.reserve(seats)
            })
            .await?;

        // The show was found inside the closure, so it is still present.
        shows
            .into_iter()
            .find(|show| show.id == show_id)
            .ok_or_else(|| AppError::NotFound("Show not found".into()))
    }

    /// Set the given seats free again. Idempotent.
    pub async fn release_seats(
        &self,
        theatre_id: i32,
        show_id: &str,
        seats: &[SeatCoord],
    ) -> AppResult<()> {
        self.mutate_shows(theatre_id, |shows| {
            let show = find_show_mut(shows, show_id)?;
            show.seats.release(seats);
            Ok(())
        })
        .await?;

        Ok(())
    }

    pub async fn get_show(&self, theatre_id: i32, show_id: &str) -> AppResult<Show> {
        let record = self.fetch_record(theatre_id).await?;
        record
            .shows
            .0
            .into_iter()
            .find(|show| show.id == show_id)
            .ok_or_else(|| AppError::NotFound("Show not found".into()))
    }

    pub async fn get_theatres(&self) -> AppResult<Vec<Theatre>> {
        let records = sqlx::query_as::<_, TheatreRecord>(
            "SELECT theatre_id, name, location, screens, shows, version FROM theatre",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Theatre::from).collect())
    }

    pub async fn get_theatre_by_id(&self, theatre_id: i32) -> AppResult<Theatre> {
        Ok(Theatre::from(self.fetch_record(theatre_id).await?))
    }

    /// Theatres with each show's movie reference populated to a summary
    /// when the movie row still exists, left as a bare id otherwise.
    pub async fn get_theatre_details(&self) -> AppResult<Vec<TheatreDetails>> {
        let records = sqlx::query_as::<_, TheatreRecord>(
            "SELECT theatre_id, name, location, screens, shows, version FROM theatre",
        )
        .fetch_all(&self.pool)
        .await?;

        let summaries = sqlx::query_as::<_, MovieSummary>(
            "SELECT movie_id, title, poster FROM movie",
        )
        .fetch_all(&self.pool)
        .await?;
        let by_id: HashMap<i32, MovieSummary> = summaries
            .into_iter()
            .map(|summary| (summary.movie_id, summary))
            .collect();

        let details = records
            .into_iter()
            .map(|record| TheatreDetails {
                theatre_id: record.theatre_id,
                name: record.name,
                location: record.location,
                screens: record.screens.0,
                shows: record
                    .shows
                    .0
                    .into_iter()
                    .map(|show| ShowDetails {
                        movie: match by_id.get(&show.movie_id) {
                            Some(summary) => MovieRef::Summary(summary.clone()),
                            None => MovieRef::Id(show.movie_id),
                        },
                        id: show.id,
                        showtime: show.showtime,
                        screen: show.screen,
                        price: show.price,
                        seats: show.seats,
                    })
                    .collect(),
            })
            .collect();

        Ok(details)
    }

    pub async fn create_theatre(&self, request: TheatreRequest) -> AppResult<Theatre> {
        request
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO theatre (name, location, screens, shows) VALUES (?, ?, ?, ?)",
        )
        .bind(&request.name)
        .bind(&request.location)
        .bind(Json(&request.screens))
        .bind(Json(Vec::<Show>::new()))
        .execute(&self.pool)
        .await?;

        self.get_theatre_by_id(result.last_insert_id() as i32).await
    }

    pub async fn update_theatre(
        &self,
        theatre_id: i32,
        request: TheatreUpdateRequest,
    ) -> AppResult<Theatre> {
        let record = self.fetch_record(theatre_id).await?;

        let name = request.name.unwrap_or(record.name);
        let location = request.location.unwrap_or(record.location);
        let screens = request.screens.unwrap_or(record.screens.0);
        if screens.is_empty() {
            return Err(AppError::ValidationError(
                "at least one screen is required".into(),
            ));
        }

        sqlx::query("UPDATE theatre SET name = ?, location = ?, screens = ? WHERE theatre_id = ?")
            .bind(&name)
            .bind(&location)
            .bind(Json(&screens))
            .bind(theatre_id)
            .execute(&self.pool)
            .await?;

        self.get_theatre_by_id(theatre_id).await
    }

    pub async fn delete_theatre(&self, theatre_id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM theatre WHERE theatre_id = ?")
            .bind(theatre_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Theatre not found".into()));
        }

        Ok(())
    }

    pub async fn add_show(&self, theatre_id: i32, request: ShowRequest) -> AppResult<Theatre> {
        if request.price < rust_decimal::Decimal::ZERO {
            return Err(AppError::ValidationError("price must not be negative".into()));
        }

        self.mutate_shows(theatre_id, |shows| {
            shows.push(Show::new(request.clone()));
            Ok(())
        })
        .await?;

        self.get_theatre_by_id(theatre_id).await
    }

    pub async fn update_show(
        &self,
        theatre_id: i32,
        show_id: &str,
        request: ShowUpdateRequest,
    ) -> AppResult<Theatre> {
        if matches!(request.price, Some(price) if price < rust_decimal::Decimal::ZERO) {
            return Err(AppError::ValidationError("price must not be negative".into()));
        }

        self.mutate_shows(theatre_id, |shows| {
            let show = find_show_mut(shows, show_id)?;
            if let Some(movie_id) = request.movie_id {
                show.movie_id = movie_id;
            }
            if let Some(showtime) = request.showtime {
                show.showtime = showtime;
            }
            if let Some(screen) = &request.screen {
                show.screen = screen.clone();
            }
            if let Some(price) = request.price {
                show.price = price;
            }
            Ok(())
        })
        .await?;

        self.get_theatre_by_id(theatre_id).await
    }

    pub async fn delete_show(&self, theatre_id: i32, show_id: &str) -> AppResult<()> {
        self.mutate_shows(theatre_id, |shows| {
            let before = shows.len();
            shows.retain(|show| show.id != show_id);
            if shows.len() == before {
                return Err(AppError::NotFound("Show not found".into()));
            }
            Ok(())
        })
        .await?;

        Ok(())
    }
}

fn find_show_mut<'a>(shows: &'a mut Vec<Show>, show_id: &str) -> AppResult<&'a mut Show> {
    shows
        .iter_mut()
        .find(|show| show.id == show_id)
        .ok_or_else(|| AppError::NotFound("Show not found".into()))
}
