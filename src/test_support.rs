//! Seed helpers for database-backed tests. Each `#[sqlx::test]` case gets
//! its own database with the migrations applied, so helpers only insert
//! the rows a case needs.

use sqlx::PgPool;
use uuid::Uuid;

pub(crate) async fn seed_user(db: &PgPool, email: &str) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO users (name, email, password_hash) VALUES ('Seed User', $1, 'x') RETURNING id",
    )
    .bind(email)
    .fetch_one(db)
    .await
    .unwrap()
}

pub(crate) async fn seed_course(db: &PgPool, title: &str) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO courses (title, university, country, city, level, field, duration)
        VALUES ($1, 'Test University', 'Netherlands', 'Amsterdam', 'Master', 'Engineering', '2 years')
        RETURNING id
        "#,
    )
    .bind(title)
    .fetch_one(db)
    .await
    .unwrap()
}

pub(crate) async fn user_bookmarks(db: &PgPool, id: Uuid) -> Vec<Uuid> {
    sqlx::query_scalar("SELECT bookmarked_courses FROM users WHERE id = $1")
        .bind(id)
        .fetch_one(db)
        .await
        .unwrap()
}

pub(crate) async fn course_bookmarkers(db: &PgPool, id: Uuid) -> Vec<Uuid> {
    sqlx::query_scalar("SELECT bookmarked_by FROM courses WHERE id = $1")
        .bind(id)
        .fetch_one(db)
        .await
        .unwrap()
}
