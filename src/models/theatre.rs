use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;
use validator::Validate;

use crate::models::movie::MovieSummary;
use crate::utils::error::{AppError, AppResult};

/// A seat position as (row, column), zero-based.
pub type SeatCoord = (usize, usize);

pub const DEFAULT_GRID_ROWS: usize = 10;
pub const DEFAULT_GRID_COLS: usize = 10;

/// Highest row/column index a booking may address. Grids seeded shorter
/// than this are grown on demand; anything beyond is rejected up front.
pub const MAX_SEAT_INDEX: usize = 100;

/// 2D seat occupancy grid, `true` = booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SeatGrid(pub Vec<Vec<bool>>);

impl Default for SeatGrid {
    fn default() -> Self {
        SeatGrid::with_dimensions(DEFAULT_GRID_ROWS, DEFAULT_GRID_COLS)
    }
}

impl SeatGrid {
    pub fn with_dimensions(rows: usize, cols: usize) -> Self {
        SeatGrid(vec![vec![false; cols]; rows])
    }

    /// Rows or columns missing from a sparse grid read as free.
    pub fn is_booked(&self, row: usize, col: usize) -> bool {
        self.0
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }

    fn set(&mut self, row: usize, col: usize, value: bool) {
        if self.0.len() <= row {
            self.0.resize_with(row + 1, Vec::new);
        }
        let grid_row = &mut self.0[row];
        if grid_row.len() <= col {
            grid_row.resize(col + 1, false);
        }
        grid_row[col] = value;
    }

    /// Mark every requested seat as booked, all-or-nothing: if any seat
    /// is already booked the grid is left untouched.
    pub fn reserve(&mut self, seats: &[SeatCoord]) -> AppResult<()> {
        for &(row, col) in seats {
            if self.is_booked(row, col) {
                return Err(AppError::SeatConflict(
                    "One or more seats are already booked".into(),
                ));
            }
        }
        for &(row, col) in seats {
            self.set(row, col, true);
        }
        Ok(())
    }

    /// Mark every requested seat as free. Releasing an already-free seat
    /// is a no-op, so the operation is idempotent.
    pub fn release(&mut self, seats: &[SeatCoord]) {
        for &(row, col) in seats {
            if self.is_booked(row, col) {
                self.set(row, col, false);
            }
        }
    }
}

/// A single screening, embedded in its owning theatre. Shows have no
/// standalone lifecycle: the theatre row is the unit of persistence.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Show {
    pub id: String,
    pub movie_id: i32,
    pub showtime: DateTime<Utc>,
    pub screen: String,
    pub price: Decimal,
    #[serde(default)]
    pub seats: SeatGrid,
}

impl Show {
    pub fn new(request: ShowRequest) -> Self {
        Show {
            id: Uuid::new_v4().to_string(),
            movie_id: request.movie_id,
            showtime: request.showtime,
            screen: request.screen,
            price: request.price,
            seats: SeatGrid::default(),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct TheatreRecord {
    pub theatre_id: i32,
    pub name: String,
    pub location: String,
    pub screens: Json<Vec<String>>,
    pub shows: Json<Vec<Show>>,
    pub version: i32,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct Theatre {
    pub theatre_id: i32,
    pub name: String,
    pub location: String,
    pub screens: Vec<String>,
    pub shows: Vec<Show>,
}

impl From<TheatreRecord> for Theatre {
    fn from(record: TheatreRecord) -> Self {
        Theatre {
            theatre_id: record.theatre_id,
            name: record.name,
            location: record.location,
            screens: record.screens.0,
            shows: record.shows.0,
        }
    }
}

/// A show's movie reference as it appears in listings: either populated
/// to a summary object or left as a bare id when the movie row is gone.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum MovieRef {
    Id(i32),
    Summary(MovieSummary),
}

impl MovieRef {
    pub fn id(&self) -> i32 {
        match self {
            MovieRef::Id(id) => *id,
            MovieRef::Summary(summary) => summary.movie_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShowDetails {
    pub id: String,
    pub movie: MovieRef,
    pub showtime: DateTime<Utc>,
    pub screen: String,
    pub price: Decimal,
    pub seats: SeatGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TheatreDetails {
    pub theatre_id: i32,
    pub name: String,
    pub location: String,
    pub screens: Vec<String>,
    pub shows: Vec<ShowDetails>,
}

#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct TheatreRequest {
    #[validate(length(min = 1, message = "theatre name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "location is required"))]
    pub location: String,
    #[validate(length(min = 1, message = "at least one screen is required"))]
    pub screens: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TheatreUpdateRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub screens: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ShowRequest {
    pub movie_id: i32,
    pub showtime: DateTime<Utc>,
    pub screen: String,
    pub price: Decimal,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ShowUpdateRequest {
    pub movie_id: Option<i32>,
    pub showtime: Option<DateTime<Utc>>,
    pub screen: Option<String>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct TheatreSummary {
    pub theatre_id: i32,
    pub name: String,
    pub location: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_marks_exactly_the_requested_seats() {
        let mut grid = SeatGrid::with_dimensions(2, 2);
        grid.reserve(&[(0, 0), (0, 1)]).unwrap();

        assert_eq!(grid.0, vec![vec![true, true], vec![false, false]]);
    }

    #[test]
    fn reserve_is_all_or_nothing_on_conflict() {
        let mut grid = SeatGrid::with_dimensions(2, 2);
        grid.reserve(&[(1, 1)]).unwrap();
        let before = grid.clone();

        let err = grid.reserve(&[(0, 0), (1, 1)]).unwrap_err();
        assert!(matches!(err, AppError::SeatConflict(_)));
        assert_eq!(grid, before, "a failed reservation must not mutate the grid");
    }

    #[test]
    fn rereserving_the_same_seats_fails_and_leaves_grid_unchanged() {
        let mut grid = SeatGrid::default();
        grid.reserve(&[(3, 4), (3, 5)]).unwrap();
        let before = grid.clone();

        assert!(grid.reserve(&[(3, 4), (3, 5)]).is_err());
        assert_eq!(grid, before);
    }

    #[test]
    fn sparse_grid_rows_read_as_free_and_grow_on_write() {
        // Seeded shorter than the addressed row, as a hand-edited
        // document might be.
        let mut grid = SeatGrid(vec![vec![true]]);
        assert!(!grid.is_booked(5, 5));

        grid.reserve(&[(5, 5)]).unwrap();
        assert!(grid.is_booked(5, 5));
        assert!(grid.is_booked(0, 0), "existing bookings survive the grow");
    }

    #[test]
    fn release_is_idempotent() {
        let mut grid = SeatGrid::with_dimensions(2, 2);
        grid.reserve(&[(0, 0)]).unwrap();

        grid.release(&[(0, 0), (1, 1)]);
        assert_eq!(grid.0, vec![vec![false, false], vec![false, false]]);

        // Releasing again, and releasing out-of-range seats, is a no-op.
        grid.release(&[(0, 0), (9, 9)]);
        assert_eq!(grid.0, vec![vec![false, false], vec![false, false]]);
    }

    #[test]
    fn overlapping_reservations_admit_exactly_one_winner() {
        let mut grid = SeatGrid::default();
        let first = grid.reserve(&[(2, 2), (2, 3)]);
        let second = grid.reserve(&[(2, 3), (2, 4)]);

        assert!(first.is_ok());
        assert!(second.is_err());
        assert!(!grid.is_booked(2, 4), "the loser must not book any seat");
    }

    #[test]
    fn movie_ref_resolves_id_from_both_variants() {
        let bare = MovieRef::Id(7);
        let populated = MovieRef::Summary(MovieSummary {
            movie_id: 7,
            title: "Interstellar".to_string(),
            poster: "poster.jpg".to_string(),
        });

        assert_eq!(bare.id(), 7);
        assert_eq!(populated.id(), 7);
    }
}
