use serde::Serialize;
use sqlx::PgPool;

/// Aggregate counters for the admin dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_users: i64,
    pub total_courses: i64,
    pub total_bookmarks: i64,
    pub active_users: i64,
    pub new_users_today: i64,
    pub new_users_this_week: i64,
    pub new_users_this_month: i64,
}

pub async fn stats(db: &PgPool) -> anyhow::Result<PlatformStats> {
    let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(db)
        .await?;
    let total_courses: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
        .fetch_one(db)
        .await?;
    // The user side is authoritative for bookmark counts.
    let total_bookmarks: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(cardinality(bookmarked_courses)), 0)::BIGINT FROM users",
    )
    .fetch_one(db)
    .await?;
    let active_users: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE last_login >= now() - INTERVAL '24 hours'",
    )
    .fetch_one(db)
    .await?;
    let new_users_today: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE created_at >= date_trunc('day', now())",
    )
    .fetch_one(db)
    .await?;
    let new_users_this_week: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE created_at >= now() - INTERVAL '7 days'",
    )
    .fetch_one(db)
    .await?;
    let new_users_this_month: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE created_at >= now() - INTERVAL '30 days'",
    )
    .fetch_one(db)
    .await?;

    Ok(PlatformStats {
        total_users,
        total_courses,
        total_bookmarks,
        active_users,
        new_users_today,
        new_users_this_week,
        new_users_this_month,
    })
}
