use sqlx::{Pool, Sqlite};

use crate::db::models::UserRow;

/// Repository for the single-row user profile
pub struct UserRepository;

impl UserRepository {
    pub async fn get(pool: &Pool<Sqlite>) -> Result<Option<UserRow>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>("SELECT id, name, email FROM users WHERE id = 1")
            .fetch_optional(pool)
            .await
    }

    pub async fn upsert(
        pool: &Pool<Sqlite>,
        name: &str,
        email: &str,
    ) -> Result<UserRow, sqlx::Error> {
        sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email) VALUES (1, ?1, ?2)
            ON CONFLICT (id) DO UPDATE SET name = excluded.name, email = excluded.email
            RETURNING id, name, email
            "#,
        )
        .bind(name)
        .bind(email)
        .fetch_one(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn profile_upsert_round_trip() {
        let pool = test_pool().await;
        assert!(UserRepository::get(&pool).await.unwrap().is_none());

        let created = UserRepository::upsert(&pool, "Ada", "ada@example.com")
            .await
            .unwrap();
        assert_eq!(created.id, 1);

        let updated = UserRepository::upsert(&pool, "Ada L.", "ada@example.com")
            .await
            .unwrap();
        assert_eq!(updated.name, "Ada L.");

        let fetched = UserRepository::get(&pool).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Ada L.");
        assert_eq!(fetched.email, "ada@example.com");
    }
}
