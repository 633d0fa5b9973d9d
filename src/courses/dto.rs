use serde::Serialize;
use uuid::Uuid;

use crate::courses::repo::Course;

/// Catalog view of a course; the inverse bookmark set stays server-side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl From<Course> for CourseSummary {
    fn from(c: Course) -> Self {
        Self {
            id: c.id,
            title: c.title,
            description: c.description,
            university: c.university,
            country: c.country,
            city: c.city,
            level: c.level,
            field: c.field,
            duration: c.duration,
            tuition_fee: c.tuition_fee,
            currency: c.currency,
            rating: c.rating,
            image: c.image,
        }
    }
}
