use bcrypt::{hash, verify, DEFAULT_COST};
use rust_decimal::Decimal;
use sqlx::MySqlPool;
use validator::Validate;

use crate::models::user::{
    ChangePasswordRequest, ProfileUpdateRequest, User, UserLoginRequest, UserLoginResponse,
    UserProfile, UserRegistrationRequest,
};
use crate::utils::error::{AppError, AppResult};
use crate::utils::jwt;

#[derive(Clone)]
pub struct UserService {
    pool: MySqlPool,
}

impl UserService {
    pub fn new(pool: MySqlPool) -> Self {
        UserService { pool }
    }

    // Register a new user
    pub async fn register_user(&self, request: UserRegistrationRequest) -> AppResult<i32> {
        request
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        // Check if the email is already taken
        let existing_user = sqlx::query("SELECT id FROM user WHERE email = ?")
            .bind(&request.email)
            .fetch_optional(&self.pool)
            .await?;

        if existing_user.is_some() {
            return Err(AppError::Conflict("Email already registered".into()));
        }

        // Hash password
        let hashed_password = hash(request.password.as_bytes(), DEFAULT_COST)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        // Insert user
        let result = sqlx::query(
            "INSERT INTO user (name, email, password, role) VALUES (?, ?, ?, 'user')",
        )
        .bind(&request.name)
        .bind(&request.email)
        .bind(&hashed_password)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id() as i32)
    }

    // Login user
    pub async fn login_user(&self, request: UserLoginRequest) -> AppResult<UserLoginResponse> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, role, blocked, wallet_balance
             FROM user WHERE email = ?",
        )
        .bind(&request.email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::AuthError("Invalid credentials".into()))?;

        if user.blocked {
            return Err(AppError::Forbidden("Account is blocked".into()));
        }

        // Verify password
        let password_matches = verify(request.password.as_bytes(), &user.password)
            .map_err(|e| AppError::AuthError(e.to_string()))?;

        if !password_matches {
            return Err(AppError::AuthError("Invalid credentials".into()));
        }

        // Generate JWT token
        let token = jwt::generate_token(user.id, &user.role)
            .map_err(|e| AppError::AuthError(e.to_string()))?;

        Ok(UserLoginResponse {
            token,
            user_id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            wallet_balance: user.wallet_balance,
        })
    }

    pub async fn get_profile(&self, user_id: i32) -> AppResult<UserProfile> {
        sqlx::query_as::<_, UserProfile>(
            "SELECT id, name, email, role, blocked, wallet_balance FROM user WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    pub async fn update_profile(
        &self,
        user_id: i32,
        request: ProfileUpdateRequest,
    ) -> AppResult<UserProfile> {
        if let Some(name) = request.name.filter(|name| !name.is_empty()) {
            sqlx::query("UPDATE user SET name = ? WHERE id = ?")
                .bind(&name)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        }

        self.get_profile(user_id).await
    }

    pub async fn change_password(
        &self,
        user_id: i32,
        request: ChangePasswordRequest,
    ) -> AppResult<()> {
        request
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, role, blocked, wallet_balance
             FROM user WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        let password_matches = verify(request.current_password.as_bytes(), &user.password)
            .map_err(|e| AppError::AuthError(e.to_string()))?;
        if !password_matches {
            return Err(AppError::AuthError("Invalid current password".into()));
        }

        let hashed_password = hash(request.new_password.as_bytes(), DEFAULT_COST)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        sqlx::query("UPDATE user SET password = ? WHERE id = ?")
            .bind(&hashed_password)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn get_users(&self) -> AppResult<Vec<UserProfile>> {
        let users = sqlx::query_as::<_, UserProfile>(
            "SELECT id, name, email, role, blocked, wallet_balance FROM user",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Toggle the blocked flag. Returns the new state.
    pub async fn toggle_blocked(&self, user_id: i32) -> AppResult<bool> {
        let result = sqlx::query("UPDATE user SET blocked = NOT blocked WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }

        Ok(self.get_profile(user_id).await?.blocked)
    }

    pub async fn delete_user(&self, user_id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM user WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }

        Ok(())
    }

    /// Debit the wallet if and only if the balance covers the amount.
    /// The conditional update serializes concurrent debits on the row.
    pub async fn debit_wallet(&self, user_id: i32, amount: Decimal) -> AppResult<()> {
        if amount.is_zero() {
            return Ok(());
        }

        let result = sqlx::query(
            "UPDATE user SET wallet_balance = wallet_balance - ?
             WHERE id = ? AND wallet_balance >= ?",
        )
        .bind(amount)
        .bind(user_id)
        .bind(amount)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Distinguish a missing user from an underfunded wallet
            self.get_profile(user_id).await?;
            return Err(AppError::InsufficientFunds(
                "Insufficient wallet balance".into(),
            ));
        }

        Ok(())
    }

    /// Credit the wallet with an atomic increment.
    pub async fn credit_wallet(&self, user_id: i32, amount: Decimal) -> AppResult<()> {
        if amount.is_zero() {
            return Ok(());
        }

        let result = sqlx::query("UPDATE user SET wallet_balance = wallet_balance + ? WHERE id = ?")
            .bind(amount)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }

        Ok(())
    }
}
