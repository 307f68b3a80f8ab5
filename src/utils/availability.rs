use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::Serialize;

use crate::models::theatre::TheatreDetails;

/// One bookable slot for a movie, flattened out of its theatre.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct MovieShowTime {
    pub theatre_id: i32,
    pub theatre_name: String,
    pub theatre_location: String,
    pub show_id: String,
    pub showtime: DateTime<Utc>,
    pub price: Decimal,
}

/// Flatten theatre/show listings into movie id -> future show-times, so
/// browse pages can offer "Book Now" without a round-trip per movie.
/// Shows whose time has passed relative to `now` are dropped; the movie
/// reference may be populated or a bare id.
pub fn map_shows_by_movie(
    theatres: &[TheatreDetails],
    now: DateTime<Utc>,
) -> HashMap<i32, Vec<MovieShowTime>> {
    let mut by_movie: HashMap<i32, Vec<MovieShowTime>> = HashMap::new();

    for theatre in theatres {
        for show in &theatre.shows {
            if show.showtime < now {
                continue;
            }
            by_movie
                .entry(show.movie.id())
                .or_default()
                .push(MovieShowTime {
                    theatre_id: theatre.theatre_id,
                    theatre_name: theatre.name.clone(),
                    theatre_location: theatre.location.clone(),
                    show_id: show.id.clone(),
                    showtime: show.showtime,
                    price: show.price,
                });
        }
    }

    by_movie
}

/// The earliest future show, ties broken by input order.
pub fn pick_next_show<'a>(
    shows: &'a [MovieShowTime],
    now: DateTime<Utc>,
) -> Option<&'a MovieShowTime> {
    shows
        .iter()
        .filter(|show| show.showtime > now)
        .min_by_key(|show| show.showtime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::movie::MovieSummary;
    use crate::models::theatre::{MovieRef, SeatGrid, ShowDetails};
    use chrono::Duration;

    fn show(id: &str, movie: MovieRef, showtime: DateTime<Utc>) -> ShowDetails {
        ShowDetails {
            id: id.to_string(),
            movie,
            showtime,
            screen: "Screen 1".to_string(),
            price: Decimal::new(200, 0),
            seats: SeatGrid::with_dimensions(2, 2),
        }
    }

    fn theatre(id: i32, name: &str, shows: Vec<ShowDetails>) -> TheatreDetails {
        TheatreDetails {
            theatre_id: id,
            name: name.to_string(),
            location: "Downtown".to_string(),
            screens: vec!["Screen 1".to_string()],
            shows,
        }
    }

    #[test]
    fn groups_future_shows_by_movie_and_drops_past_ones() {
        let now = Utc::now();
        let theatres = vec![
            theatre(
                1,
                "Grand",
                vec![
                    show("s1", MovieRef::Id(10), now + Duration::hours(5)),
                    show("s2", MovieRef::Id(10), now - Duration::hours(1)),
                    show("s3", MovieRef::Id(20), now + Duration::hours(2)),
                ],
            ),
            theatre(
                2,
                "Plaza",
                vec![show("s4", MovieRef::Id(10), now + Duration::hours(1))],
            ),
        ];

        let by_movie = map_shows_by_movie(&theatres, now);

        assert_eq!(by_movie.len(), 2);
        let movie_10: Vec<&str> = by_movie[&10].iter().map(|s| s.show_id.as_str()).collect();
        assert_eq!(movie_10, vec!["s1", "s4"], "past show s2 is excluded");
        assert_eq!(by_movie[&20][0].theatre_name, "Grand");
    }

    #[test]
    fn handles_populated_and_bare_movie_references_alike() {
        let now = Utc::now();
        let populated = MovieRef::Summary(MovieSummary {
            movie_id: 10,
            title: "Dune".to_string(),
            poster: "dune.jpg".to_string(),
        });
        let theatres = vec![theatre(
            1,
            "Grand",
            vec![
                show("s1", populated, now + Duration::hours(1)),
                show("s2", MovieRef::Id(10), now + Duration::hours(2)),
            ],
        )];

        let by_movie = map_shows_by_movie(&theatres, now);

        assert_eq!(by_movie[&10].len(), 2, "both refs group under one movie id");
    }

    #[test]
    fn next_show_is_earliest_future_with_ties_broken_by_input_order() {
        let now = Utc::now();
        let soon = now + Duration::hours(1);
        let slots: Vec<MovieShowTime> = map_shows_by_movie(
            &[theatre(
                1,
                "Grand",
                vec![
                    show("past", MovieRef::Id(1), now - Duration::hours(1)),
                    show("first", MovieRef::Id(1), soon),
                    show("tied", MovieRef::Id(1), soon),
                    show("later", MovieRef::Id(1), now + Duration::hours(3)),
                ],
            )],
            now,
        )
        .remove(&1)
        .unwrap();

        let next = pick_next_show(&slots, now).unwrap();
        assert_eq!(next.show_id, "first");
    }

    #[test]
    fn next_show_is_none_for_empty_or_fully_past_lists() {
        let now = Utc::now();
        assert!(pick_next_show(&[], now).is_none());

        let past_only = vec![MovieShowTime {
            theatre_id: 1,
            theatre_name: "Grand".to_string(),
            theatre_location: "Downtown".to_string(),
            show_id: "s1".to_string(),
            showtime: now - Duration::minutes(5),
            price: Decimal::new(150, 0),
        }];
        assert!(pick_next_show(&past_only, now).is_none());
    }
}
