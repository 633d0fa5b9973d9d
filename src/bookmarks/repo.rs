use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::ApiError;

/// Maintains the symmetric user<->course bookmark relation. Both sides of
/// every mutation run in one transaction, so the relation can never end
/// up one-sided. Course existence is re-checked inside the transaction,
/// under a row lock; a course deleted after the caller last saw it makes
/// the whole mutation roll back.
///
/// The user side is authoritative for membership reads.

/// Lock the user row and report whether the edge is currently present.
async fn lock_membership(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    course_id: Uuid,
) -> Result<bool, ApiError> {
    sqlx::query_scalar(
        "SELECT $2 = ANY(bookmarked_courses) FROM users WHERE id = $1 FOR UPDATE",
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".into()))
}

/// Lock the course row, failing if it no longer exists.
async fn lock_course(tx: &mut Transaction<'_, Postgres>, course_id: Uuid) -> Result<(), ApiError> {
    let found: Option<Uuid> = sqlx::query_scalar("SELECT id FROM courses WHERE id = $1 FOR UPDATE")
        .bind(course_id)
        .fetch_optional(&mut **tx)
        .await?;
    match found {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound("Course not found".into())),
    }
}

async fn add_edge(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    course_id: Uuid,
) -> Result<(), ApiError> {
    // Guarded appends give set semantics: re-adding is a no-op.
    sqlx::query(
        r#"
        UPDATE users
        SET bookmarked_courses = array_append(bookmarked_courses, $2)
        WHERE id = $1 AND NOT ($2 = ANY(bookmarked_courses))
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .execute(&mut **tx)
    .await?;
    sqlx::query(
        r#"
        UPDATE courses
        SET bookmarked_by = array_append(bookmarked_by, $1)
        WHERE id = $2 AND NOT ($1 = ANY(bookmarked_by))
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn remove_edge(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    course_id: Uuid,
) -> Result<(), ApiError> {
    sqlx::query(
        r#"
        UPDATE users
        SET bookmarked_courses = array_remove(bookmarked_courses, $2)
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .execute(&mut **tx)
    .await?;
    sqlx::query(
        r#"
        UPDATE courses
        SET bookmarked_by = array_remove(bookmarked_by, $1)
        WHERE id = $2
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Flip the bookmark edge and return the resulting state. The user row
/// is locked for the duration so concurrent toggles on the same pair
/// serialize instead of racing.
pub async fn toggle(db: &PgPool, user_id: Uuid, course_id: Uuid) -> Result<bool, ApiError> {
    let mut tx = db.begin().await?;
    let bookmarked = lock_membership(&mut tx, user_id, course_id).await?;
    lock_course(&mut tx, course_id).await?;

    if bookmarked {
        remove_edge(&mut tx, user_id, course_id).await?;
    } else {
        add_edge(&mut tx, user_id, course_id).await?;
    }
    tx.commit().await?;
    Ok(!bookmarked)
}

/// Idempotent: adding an already-present edge is a no-op success.
pub async fn add(db: &PgPool, user_id: Uuid, course_id: Uuid) -> Result<(), ApiError> {
    let mut tx = db.begin().await?;
    lock_membership(&mut tx, user_id, course_id).await?;
    lock_course(&mut tx, course_id).await?;
    add_edge(&mut tx, user_id, course_id).await?;
    tx.commit().await?;
    Ok(())
}

/// Idempotent: removing an absent edge is a no-op success.
pub async fn remove(db: &PgPool, user_id: Uuid, course_id: Uuid) -> Result<(), ApiError> {
    let mut tx = db.begin().await?;
    remove_edge(&mut tx, user_id, course_id).await?;
    tx.commit().await?;
    Ok(())
}

/// Membership read from the user side only.
pub async fn status(db: &PgPool, user_id: Uuid, course_id: Uuid) -> Result<bool, ApiError> {
    let bookmarked: Option<bool> =
        sqlx::query_scalar("SELECT $2 = ANY(bookmarked_courses) FROM users WHERE id = $1")
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(db)
            .await?;
    Ok(bookmarked.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{course_bookmarkers, seed_course, seed_user, user_bookmarks};

    #[sqlx::test]
    async fn toggle_is_its_own_inverse(db: PgPool) {
        let user_id = seed_user(&db, "toggler@example.com").await;
        let course_id = seed_course(&db, "MSc Data Science").await;

        assert!(toggle(&db, user_id, course_id).await.unwrap());
        assert_eq!(user_bookmarks(&db, user_id).await, vec![course_id]);
        assert_eq!(course_bookmarkers(&db, course_id).await, vec![user_id]);

        assert!(!toggle(&db, user_id, course_id).await.unwrap());
        assert!(user_bookmarks(&db, user_id).await.is_empty());
        assert!(course_bookmarkers(&db, course_id).await.is_empty());
    }

    #[sqlx::test]
    async fn add_is_idempotent(db: PgPool) {
        let user_id = seed_user(&db, "collector@example.com").await;
        let course_id = seed_course(&db, "BSc Physics").await;

        for _ in 0..3 {
            add(&db, user_id, course_id).await.unwrap();
        }
        assert_eq!(user_bookmarks(&db, user_id).await, vec![course_id]);
        assert_eq!(course_bookmarkers(&db, course_id).await, vec![user_id]);
    }

    #[sqlx::test]
    async fn status_reflects_add_and_remove(db: PgPool) {
        let user_id = seed_user(&db, "watcher@example.com").await;
        let course_id = seed_course(&db, "MBA International Business").await;

        assert!(!status(&db, user_id, course_id).await.unwrap());
        add(&db, user_id, course_id).await.unwrap();
        assert!(status(&db, user_id, course_id).await.unwrap());
        remove(&db, user_id, course_id).await.unwrap();
        assert!(!status(&db, user_id, course_id).await.unwrap());
    }

    #[sqlx::test]
    async fn toggle_on_deleted_course_is_not_found(db: PgPool) {
        let user_id = seed_user(&db, "latecomer@example.com").await;
        let course_id = seed_course(&db, "Short-lived Course").await;
        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(course_id)
            .execute(&db)
            .await
            .unwrap();

        let err = toggle(&db, user_id, course_id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(user_bookmarks(&db, user_id).await.is_empty());
    }

    #[sqlx::test]
    async fn add_on_deleted_course_is_not_found(db: PgPool) {
        let user_id = seed_user(&db, "eager@example.com").await;
        let course_id = seed_course(&db, "Another Short-lived Course").await;
        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(course_id)
            .execute(&db)
            .await
            .unwrap();

        let err = add(&db, user_id, course_id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(user_bookmarks(&db, user_id).await.is_empty());
    }

    #[sqlx::test]
    async fn toggle_for_unknown_user_is_not_found(db: PgPool) {
        let course_id = seed_course(&db, "Orphan Course").await;
        let err = toggle(&db, Uuid::new_v4(), course_id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(course_bookmarkers(&db, course_id).await.is_empty());
    }

    #[sqlx::test]
    async fn remove_of_absent_edge_is_a_noop(db: PgPool) {
        let user_id = seed_user(&db, "tidy@example.com").await;
        let course_id = seed_course(&db, "Untouched Course").await;

        remove(&db, user_id, course_id).await.unwrap();
        assert!(user_bookmarks(&db, user_id).await.is_empty());
        assert!(course_bookmarkers(&db, course_id).await.is_empty());
    }
}
