use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DEFAULT_AVATAR: &str = "https://placehold.co/100";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }

    /// Admins may do everything a teacher can.
    pub fn satisfies(&self, required: Role) -> bool {
        *self == required || (required == Role::Teacher && *self == Role::Admin)
    }

    pub fn can_upload(&self) -> bool {
        self.satisfies(Role::Teacher)
    }

    pub fn is_admin(&self) -> bool {
        *self == Role::Admin
    }

    /// Label shown on the dashboard sidebar.
    pub fn dashboard_label(&self) -> &'static str {
        match self {
            Role::Teacher => "User",
            _ => "Admin",
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => Err(Error::Decode(format!("unknown role {other}"))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `GET /users/me`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub profile_url: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
}

impl Profile {
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.username)
    }

    pub fn avatar_url(&self) -> &str {
        self.profile_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_AVATAR)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Fields collected by the sign-up form.
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), Error> {
        if self.password != self.confirm_password {
            return Err(Error::validation("Passwords do not match!"));
        }
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(Error::validation("Username and password are required."));
        }
        Ok(())
    }
}

/// Body of `POST /auth/register`. Fields the form does not ask for are
/// filled from a fixed template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub full_name: String,
    pub password: String,
    pub email: String,
    pub role: Role,
    pub bio: String,
    pub gender: String,
    pub address: String,
    pub profile_url: String,
    pub phone_number: String,
    pub date_of_birth: String,
}

impl RegisterRequest {
    pub fn from_form(form: &RegisterForm, now: DateTime<Utc>) -> Self {
        Self {
            username: form.username.trim().to_string(),
            full_name: form.full_name.trim().to_string(),
            password: form.password.clone(),
            email: form.email.trim().to_string(),
            role: Role::Teacher,
            bio: "LibreShelf Reader".to_string(),
            gender: "other".to_string(),
            address: "Phnom Penh".to_string(),
            profile_url: DEFAULT_AVATAR.to_string(),
            phone_number: "".to_string(),
            date_of_birth: now.to_rfc3339(),
        }
    }
}

/// Body of `PATCH /users/{id}/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub phone_number: String,
    pub bio: String,
    pub gender: String,
    pub profile_url: String,
}

impl ProfileUpdate {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            full_name: profile.full_name.clone().unwrap_or_default(),
            phone_number: profile.phone_number.clone().unwrap_or_default(),
            bio: profile.bio.clone().unwrap_or_default(),
            gender: profile.gender.clone().unwrap_or_default(),
            profile_url: profile.avatar_url().to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_admin_satisfies_teacher() {
        assert!(Role::Admin.satisfies(Role::Teacher));
        assert!(Role::Teacher.satisfies(Role::Teacher));
        assert!(!Role::Student.satisfies(Role::Teacher));
        assert!(!Role::Teacher.satisfies(Role::Admin));
        assert!(!Role::Student.can_upload());
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("student".parse::<Role>(), Ok(Role::Student));
        assert!("librarian".parse::<Role>().is_err());
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let profile: Profile = serde_json::from_str(
            r#"{"id": 7, "username": "sok", "role": "teacher", "full_name": ""}"#,
        )
        .unwrap();
        assert_eq!(profile.display_name(), "sok");
        assert_eq!(profile.avatar_url(), DEFAULT_AVATAR);
    }

    #[test]
    fn test_register_form_password_mismatch() {
        let form = RegisterForm {
            username: "dara".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret2".to_string(),
            ..Default::default()
        };
        assert_eq!(
            form.validate(),
            Err(Error::Validation("Passwords do not match!".to_string()))
        );
    }

    #[test]
    fn test_register_request_template() {
        let form = RegisterForm {
            username: " dara ".to_string(),
            full_name: "Dara Chan".to_string(),
            email: "dara@example.com".to_string(),
            password: "pw".to_string(),
            confirm_password: "pw".to_string(),
        };
        let now = DateTime::parse_from_rfc3339("2025-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let request = RegisterRequest::from_form(&form, now);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["username"], "dara");
        assert_eq!(value["role"], "teacher");
        assert_eq!(value["bio"], "LibreShelf Reader");
        assert_eq!(value["address"], "Phnom Penh");
        assert_eq!(value["phone_number"], "");
        assert_eq!(value["date_of_birth"], "2025-01-02T03:04:05+00:00");
    }
}
