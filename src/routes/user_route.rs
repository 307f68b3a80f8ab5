use crate::models::user::{
    ChangePasswordRequest, ProfileUpdateRequest, RegisterResponse, UserLoginRequest,
    UserLoginResponse, UserProfile, UserRegistrationRequest,
};
use crate::services::user_service::UserService;
use crate::utils::error::AppError;
use crate::utils::jwt::{AdminUser, AuthenticatedUser};
use rocket::serde::json::Json;
use rocket::serde::json::{json, Value};
use rocket::State;
use rocket_okapi::openapi;

/// Register a new user
#[openapi(tag = "Users")]
#[post("/register", format = "json", data = "<request>")]
pub async fn register(
    request: Json<UserRegistrationRequest>,
    user_service: &State<UserService>,
) -> Result<Json<RegisterResponse>, AppError> {
    let user_id = user_service.register_user(request.into_inner()).await?;
    Ok(Json(RegisterResponse {
        user_id,
        status: "success".to_string(),
    }))
}

/// Login a user
#[openapi(tag = "Users")]
#[post("/login", format = "json", data = "<request>")]
pub async fn login(
    request: Json<UserLoginRequest>,
    user_service: &State<UserService>,
) -> Result<Json<UserLoginResponse>, AppError> {
    let response = user_service.login_user(request.into_inner()).await?;
    Ok(Json(response))
}

/// Current user's profile, wallet balance included
#[openapi(tag = "Users")]
#[get("/users/profile")]
pub async fn get_profile(
    auth: AuthenticatedUser,
    user_service: &State<UserService>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = user_service.get_profile(auth.user_id).await?;
    Ok(Json(profile))
}

/// Update the current user's profile
#[openapi(tag = "Users")]
#[put("/users/profile", format = "json", data = "<request>")]
pub async fn update_profile(
    request: Json<ProfileUpdateRequest>,
    auth: AuthenticatedUser,
    user_service: &State<UserService>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = user_service
        .update_profile(auth.user_id, request.into_inner())
        .await?;
    Ok(Json(profile))
}

/// Change the current user's password
#[openapi(tag = "Users")]
#[put("/users/password", format = "json", data = "<request>")]
pub async fn change_password(
    request: Json<ChangePasswordRequest>,
    auth: AuthenticatedUser,
    user_service: &State<UserService>,
) -> Result<Json<Value>, AppError> {
    user_service
        .change_password(auth.user_id, request.into_inner())
        .await?;
    Ok(Json(json!({ "message": "Password updated successfully" })))
}

/// List all users (admin)
#[openapi(tag = "Users")]
#[get("/users")]
pub async fn get_users(
    _admin: AdminUser,
    user_service: &State<UserService>,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    let users = user_service.get_users().await?;
    Ok(Json(users))
}

/// Get a user by id (admin)
#[openapi(tag = "Users")]
#[get("/users/<id>")]
pub async fn get_user_by_id(
    id: i32,
    _admin: AdminUser,
    user_service: &State<UserService>,
) -> Result<Json<UserProfile>, AppError> {
    let user = user_service.get_profile(id).await?;
    Ok(Json(user))
}

/// Block or unblock a user (admin)
#[openapi(tag = "Users")]
#[put("/users/<id>/block")]
pub async fn block_user(
    id: i32,
    _admin: AdminUser,
    user_service: &State<UserService>,
) -> Result<Json<Value>, AppError> {
    let blocked = user_service.toggle_blocked(id).await?;
    let action = if blocked { "blocked" } else { "unblocked" };
    Ok(Json(json!({
        "message": format!("User {} successfully", action)
    })))
}

/// Delete a user (admin)
#[openapi(tag = "Users")]
#[delete("/users/<id>")]
pub async fn delete_user(
    id: i32,
    _admin: AdminUser,
    user_service: &State<UserService>,
) -> Result<Json<Value>, AppError> {
    user_service.delete_user(id).await?;
    Ok(Json(json!({ "message": "User deleted successfully" })))
}
