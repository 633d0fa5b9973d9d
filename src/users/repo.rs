use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::claims::Role;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub nationality: Option<String>,
    pub university: Option<String>,
    pub profile_image: Option<String>,
    pub role: Role,
    pub bookmarked_courses: Vec<Uuid>,
    pub is_active: bool,
    pub last_login: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

/// Partial-merge patch: `None` fields leave the stored value untouched.
#[derive(Debug, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub nationality: Option<String>,
    pub university: Option<String>,
    pub profile_image: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, phone, nationality, university,
                   profile_image, role, bookmarked_courses, is_active, last_login, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, phone, nationality, university,
                   profile_image, role, bookmarked_courses, is_active, last_login, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, phone, nationality, university,
                      profile_image, role, bookmarked_courses, is_active, last_login, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, phone, nationality, university,
                   profile_image, role, bookmarked_courses, is_active, last_login, created_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    pub async fn touch_last_login(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET last_login = now() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Merge `patch` into the stored row; absent fields stay as they are.
    pub async fn update_partial(
        db: &PgPool,
        id: Uuid,
        patch: &UserPatch,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                nationality = COALESCE($5, nationality),
                university = COALESCE($6, university),
                profile_image = COALESCE($7, profile_image),
                role = COALESCE($8, role),
                is_active = COALESCE($9, is_active)
            WHERE id = $1
            RETURNING id, name, email, password_hash, phone, nationality, university,
                      profile_image, role, bookmarked_courses, is_active, last_login, created_at
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.email)
        .bind(&patch.phone)
        .bind(&patch.nationality)
        .bind(&patch.university)
        .bind(&patch.profile_image)
        .bind(patch.role)
        .bind(patch.is_active)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Delete the user and pull its id out of every course's inverse
    /// bookmark set, in one transaction.
    pub async fn delete_with_cleanup(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let mut tx = db.begin().await?;
        sqlx::query(
            r#"
            UPDATE courses
            SET bookmarked_by = array_remove(bookmarked_by, $1)
            WHERE $1 = ANY(bookmarked_by)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bookmarks,
        test_support::{course_bookmarkers, seed_course, seed_user},
    };

    #[sqlx::test]
    async fn deleting_user_purges_course_side(db: PgPool) {
        let user_id = seed_user(&db, "leaver@example.com").await;
        let other_id = seed_user(&db, "stayer@example.com").await;
        let course_id = seed_course(&db, "MSc Robotics").await;
        bookmarks::repo::add(&db, user_id, course_id).await.unwrap();
        bookmarks::repo::add(&db, other_id, course_id).await.unwrap();

        assert!(User::delete_with_cleanup(&db, user_id).await.unwrap());

        assert!(User::find_by_id(&db, user_id).await.unwrap().is_none());
        assert_eq!(course_bookmarkers(&db, course_id).await, vec![other_id]);
    }

    #[sqlx::test]
    async fn deleting_missing_user_returns_false(db: PgPool) {
        assert!(!User::delete_with_cleanup(&db, Uuid::new_v4()).await.unwrap());
    }

    #[sqlx::test]
    async fn update_partial_leaves_absent_fields(db: PgPool) {
        let user_id = seed_user(&db, "patchable@example.com").await;
        let patch = UserPatch {
            phone: Some("+31 6 1234 5678".into()),
            ..UserPatch::default()
        };

        let updated = User::update_partial(&db, user_id, &patch)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.phone.as_deref(), Some("+31 6 1234 5678"));
        assert_eq!(updated.name, "Seed User");
        assert_eq!(updated.email, "patchable@example.com");
    }
}
