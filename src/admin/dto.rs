use serde::Deserialize;

use crate::{auth::claims::Role, users::repo::UserPatch};

/// Admin-side partial user update; may also touch role and activation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub nationality: Option<String>,
    pub university: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl From<AdminUpdateUserRequest> for UserPatch {
    fn from(req: AdminUpdateUserRequest) -> Self {
        UserPatch {
            name: req.name,
            email: req.email,
            phone: req.phone,
            nationality: req.nationality,
            university: req.university,
            profile_image: None,
            role: req.role,
            is_active: req.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_partial_admin_update() {
        let req: AdminUpdateUserRequest =
            serde_json::from_str(r#"{"role": "admin", "isActive": false}"#).unwrap();
        assert_eq!(req.role, Some(Role::Admin));
        assert_eq!(req.is_active, Some(false));
        assert!(req.name.is_none());

        let patch = UserPatch::from(req);
        assert_eq!(patch.role, Some(Role::Admin));
        assert_eq!(patch.is_active, Some(false));
        assert!(patch.profile_image.is_none());
    }
}
