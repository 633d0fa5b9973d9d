use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{auth::dto::PublicUser, courses::dto::CourseSummary, users::repo::UserPatch};

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub nationality: Option<String>,
    pub university: Option<String>,
    pub profile_picture: Option<String>,
}

impl From<UpdateProfileRequest> for UserPatch {
    fn from(req: UpdateProfileRequest) -> Self {
        UserPatch {
            name: req.name,
            email: req.email,
            phone: req.phone,
            nationality: req.nationality,
            university: req.university,
            profile_image: req.profile_picture,
            role: None,
            is_active: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_bookmarks: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub member_since: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub user: PublicUser,
    pub dashboard_stats: DashboardStats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkList {
    pub bookmarked_courses: Vec<CourseSummary>,
}
