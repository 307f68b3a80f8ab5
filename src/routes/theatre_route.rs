use std::collections::HashMap;

use crate::models::theatre::{
    ShowRequest, ShowUpdateRequest, Theatre, TheatreDetails, TheatreRequest, TheatreUpdateRequest,
};
use crate::services::theatre_service::TheatreService;
use crate::utils::availability::{map_shows_by_movie, MovieShowTime};
use crate::utils::error::AppError;
use crate::utils::jwt::AdminUser;
use chrono::Utc;
use rocket::serde::json::Json;
use rocket::serde::json::{json, Value};
use rocket::State;
use rocket_okapi::openapi;

/// List theatres with shows, movie references populated
#[openapi(tag = "Theatres")]
#[get("/theatres")]
pub async fn get_theatres(
    theatre_service: &State<TheatreService>,
) -> Result<Json<Vec<TheatreDetails>>, AppError> {
    let theatres = theatre_service.get_theatre_details().await?;
    Ok(Json(theatres))
}

/// Future show-times grouped by movie id, for booking entry points
#[openapi(tag = "Theatres")]
#[get("/theatres/availability")]
pub async fn get_availability(
    theatre_service: &State<TheatreService>,
) -> Result<Json<HashMap<i32, Vec<MovieShowTime>>>, AppError> {
    let theatres = theatre_service.get_theatre_details().await?;
    Ok(Json(map_shows_by_movie(&theatres, Utc::now())))
}

/// Get a theatre by id
#[openapi(tag = "Theatres")]
#[get("/theatres/<id>")]
pub async fn get_theatre_by_id(
    id: i32,
    theatre_service: &State<TheatreService>,
) -> Result<Json<Theatre>, AppError> {
    let theatre = theatre_service.get_theatre_by_id(id).await?;
    Ok(Json(theatre))
}

/// Create a theatre (admin)
#[openapi(tag = "Theatres")]
#[post("/theatres", format = "json", data = "<request>")]
pub async fn create_theatre(
    request: Json<TheatreRequest>,
    _admin: AdminUser,
    theatre_service: &State<TheatreService>,
) -> Result<Json<Theatre>, AppError> {
    let theatre = theatre_service.create_theatre(request.into_inner()).await?;
    Ok(Json(theatre))
}

/// Update a theatre (admin)
#[openapi(tag = "Theatres")]
#[put("/theatres/<id>", format = "json", data = "<request>")]
pub async fn update_theatre(
    id: i32,
    request: Json<TheatreUpdateRequest>,
    _admin: AdminUser,
    theatre_service: &State<TheatreService>,
) -> Result<Json<Theatre>, AppError> {
    let theatre = theatre_service
        .update_theatre(id, request.into_inner())
        .await?;
    Ok(Json(theatre))
}

/// Delete a theatre (admin)
#[openapi(tag = "Theatres")]
#[delete("/theatres/<id>")]
pub async fn delete_theatre(
    id: i32,
    _admin: AdminUser,
    theatre_service: &State<TheatreService>,
) -> Result<Json<Value>, AppError> {
    theatre_service.delete_theatre(id).await?;
    Ok(Json(json!({ "message": "Theatre deleted successfully" })))
}

/// Add a show to a theatre (admin)
#[openapi(tag = "Theatres")]
#[post("/theatres/<id>/shows", format = "json", data = "<request>")]
pub async fn add_show(
    id: i32,
    request: Json<ShowRequest>,
    _admin: AdminUser,
    theatre_service: &State<TheatreService>,
) -> Result<Json<Theatre>, AppError> {
    let theatre = theatre_service.add_show(id, request.into_inner()).await?;
    Ok(Json(theatre))
}

/// Update a show (admin)
#[openapi(tag = "Theatres")]
#[put("/theatres/<id>/shows/<show_id>", format = "json", data = "<request>")]
pub async fn update_show(
    id: i32,
    show_id: String,
    request: Json<ShowUpdateRequest>,
    _admin: AdminUser,
    theatre_service: &State<TheatreService>,
) -> Result<Json<Theatre>, AppError> {
    let theatre = theatre_service
        .update_show(id, &show_id, request.into_inner())
        .await?;
    Ok(Json(theatre))
}

/// Delete a show (admin)
#[openapi(tag = "Theatres")]
#[delete("/theatres/<id>/shows/<show_id>")]
pub async fn delete_show(
    id: i32,
    show_id: String,
    _admin: AdminUser,
    theatre_service: &State<TheatreService>,
) -> Result<Json<Value>, AppError> {
    theatre_service.delete_show(id, &show_id).await?;
    Ok(Json(json!({ "message": "Show deleted successfully" })))
}
