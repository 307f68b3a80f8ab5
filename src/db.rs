use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;

// Database connection manager
pub struct Database {
    pub pool: MySqlPool,
}

impl Database {
    // Create a new database connection pool
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = MySqlPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await?;

        Ok(Database { pool })
    }

    // Get a reference to the connection pool
    pub fn get_pool(&self) -> &MySqlPool {
        &self.pool
    }

    // Create the schema on startup so a fresh database is usable
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        let tables = vec![
            "CREATE TABLE IF NOT EXISTS user (
                id INT AUTO_INCREMENT PRIMARY KEY,
                name CHAR(255) NOT NULL,
                email CHAR(255) NOT NULL,
                password CHAR(255) NOT NULL,
                role ENUM('admin', 'user') DEFAULT 'user' NOT NULL,
                blocked BOOLEAN DEFAULT FALSE NOT NULL,
                wallet_balance DECIMAL(10,2) DEFAULT 0.00 NOT NULL,
                CONSTRAINT user_email_uindex UNIQUE (email)
            )",

            "CREATE TABLE IF NOT EXISTS movie (
                movie_id INT AUTO_INCREMENT PRIMARY KEY,
                title CHAR(255) NOT NULL,
                description TEXT NOT NULL,
                genre JSON NOT NULL,
                poster TEXT NOT NULL,
                rating DECIMAL(3,1) DEFAULT 0.0 NOT NULL,
                `cast` JSON NOT NULL,
                release_date DATE NOT NULL,
                trailer_url TEXT NOT NULL
            )",

            "CREATE TABLE IF NOT EXISTS review (
                review_id INT AUTO_INCREMENT PRIMARY KEY,
                movie_id INT NOT NULL,
                user_id INT NOT NULL,
                comment TEXT NOT NULL,
                rating INT NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP NOT NULL,
                CONSTRAINT review_movie_user_uindex UNIQUE (movie_id, user_id),
                CONSTRAINT review_movie_movie_id_fk
                    FOREIGN KEY (movie_id) REFERENCES movie(movie_id)
                    ON DELETE CASCADE,
                CONSTRAINT review_user_id_fk
                    FOREIGN KEY (user_id) REFERENCES user(id)
                    ON DELETE CASCADE
            )",

            "CREATE TABLE IF NOT EXISTS theatre (
                theatre_id INT AUTO_INCREMENT PRIMARY KEY,
                name CHAR(255) NOT NULL,
                location CHAR(255) NOT NULL,
                screens JSON NOT NULL,
                shows JSON NOT NULL,
                version INT DEFAULT 0 NOT NULL
            )",

            "CREATE TABLE IF NOT EXISTS booking (
                booking_id INT AUTO_INCREMENT PRIMARY KEY,
                user_id INT NOT NULL,
                movie_id INT NOT NULL,
                theatre_id INT NOT NULL,
                show_id CHAR(36) NOT NULL,
                seats JSON NOT NULL,
                total_price DECIMAL(10,2) NOT NULL,
                payment_status ENUM('pending', 'completed', 'failed', 'cancelled')
                    DEFAULT 'pending' NOT NULL,
                payment_id CHAR(255) DEFAULT '' NOT NULL,
                booking_time TIMESTAMP DEFAULT CURRENT_TIMESTAMP NOT NULL,
                showtime TIMESTAMP NOT NULL,
                CONSTRAINT booking_user_id_fk
                    FOREIGN KEY (user_id) REFERENCES user(id)
                    ON DELETE CASCADE
            )",
        ];

        for create_sql in tables {
            sqlx::query(create_sql).execute(&self.pool).await?;
        }

        Ok(())
    }
}
