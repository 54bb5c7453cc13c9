use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Profile {
    /// Name shown in headers: full name, then username, then email.
    pub fn display_name(&self) -> &str {
        [&self.full_name, &self.username, &self.email]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.trim().is_empty())
            .unwrap_or("Anonymous")
    }
}

/// Payload for `PUT /api/v1/profile/me`. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
}

impl ProfileUpdate {
    /// Fields of `draft` that differ from `original`.
    pub fn diff(original: &Profile, draft: &Profile) -> Self {
        fn changed(a: &Option<String>, b: &Option<String>) -> Option<String> {
            if a != b {
                Some(b.clone().unwrap_or_default())
            } else {
                None
            }
        }
        Self {
            full_name: changed(&original.full_name, &draft.full_name),
            username: changed(&original.username, &draft.username),
            email: changed(&original.email, &draft.email),
            bio: changed(&original.bio, &draft.bio),
            location: changed(&original.location, &draft.location),
            profile_picture_url: changed(&original.profile_picture_url, &draft.profile_picture_url),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.username.is_none()
            && self.email.is_none()
            && self.bio.is_none()
            && self.location.is_none()
            && self.profile_picture_url.is_none()
    }
}
