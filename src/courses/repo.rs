use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub university: String,
    pub country: String,
    pub city: String,
    pub level: String,
    pub field: String,
    pub duration: String,
    pub tuition_fee: f64,
    pub currency: String,
    pub rating: f64,
    pub image: Option<String>,
    pub bookmarked_by: Vec<Uuid>,
    pub created_at: OffsetDateTime,
}

/// Optional catalog filters; all absent means the full listing.
#[derive(Debug, Default, Deserialize)]
pub struct CourseFilter {
    pub level: Option<String>,
    pub field: Option<String>,
    pub country: Option<String>,
    pub search: Option<String>,
}

impl Course {
    pub async fn list(db: &PgPool, filter: &CourseFilter) -> anyhow::Result<Vec<Course>> {
        let mut qb = QueryBuilder::new(
            r#"
            SELECT id, title, description, university, country, city, level, field,
                   duration, tuition_fee, currency, rating, image, bookmarked_by, created_at
            FROM courses
            WHERE TRUE
            "#,
        );
        if let Some(level) = &filter.level {
            qb.push(" AND level = ").push_bind(level);
        }
        if let Some(field) = &filter.field {
            qb.push(" AND field = ").push_bind(field);
        }
        if let Some(country) = &filter.country {
            qb.push(" AND country = ").push_bind(country);
        }
        if let Some(search) = &filter.search {
            qb.push(" AND (title ILIKE ").push_bind(format!("%{search}%"));
            qb.push(" OR university ILIKE ")
                .push_bind(format!("%{search}%"));
            qb.push(")");
        }
        qb.push(" ORDER BY created_at DESC");
        let courses = qb.build_query_as::<Course>().fetch_all(db).await?;
        Ok(courses)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, title, description, university, country, city, level, field,
                   duration, tuition_fee, currency, rating, image, bookmarked_by, created_at
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(course)
    }

    pub async fn exists(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let found: Option<Uuid> = sqlx::query_scalar("SELECT id FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(found.is_some())
    }

    /// Hydrate a user's bookmark set into course rows.
    pub async fn list_by_ids(db: &PgPool, ids: &[Uuid]) -> anyhow::Result<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, title, description, university, country, city, level, field,
                   duration, tuition_fee, currency, rating, image, bookmarked_by, created_at
            FROM courses
            WHERE id = ANY($1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(ids)
        .fetch_all(db)
        .await?;
        Ok(courses)
    }

    /// Delete the course and pull its id out of every user's bookmark
    /// set, in one transaction. Cleanup is symmetric with user deletion.
    pub async fn delete_with_cleanup(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let mut tx = db.begin().await?;
        sqlx::query(
            r#"
            UPDATE users
            SET bookmarked_courses = array_remove(bookmarked_courses, $1)
            WHERE $1 = ANY(bookmarked_courses)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
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
        test_support::{seed_course, seed_user, user_bookmarks},
    };

    #[sqlx::test]
    async fn deleting_course_purges_user_side(db: PgPool) {
        let user_id = seed_user(&db, "fan@example.com").await;
        let gone_id = seed_course(&db, "Discontinued Course").await;
        let kept_id = seed_course(&db, "Continuing Course").await;
        bookmarks::repo::add(&db, user_id, gone_id).await.unwrap();
        bookmarks::repo::add(&db, user_id, kept_id).await.unwrap();

        assert!(Course::delete_with_cleanup(&db, gone_id).await.unwrap());

        assert!(Course::find_by_id(&db, gone_id).await.unwrap().is_none());
        assert_eq!(user_bookmarks(&db, user_id).await, vec![kept_id]);
    }

    #[sqlx::test]
    async fn deleting_missing_course_returns_false(db: PgPool) {
        assert!(!Course::delete_with_cleanup(&db, Uuid::new_v4()).await.unwrap());
    }
}
