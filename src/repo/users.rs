use sqlx::SqlitePool;

use crate::domain::User;

pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, user: &User) -> sqlx::Result<()> {
        sqlx::query("INSERT INTO users (id, username, password_hash) VALUES (?1, ?2, ?3)")
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn find_by_username(&self, username: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
    }
}
