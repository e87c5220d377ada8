//! Users, roles and per-role profiles, plus the account DTOs.

use chrono::{DateTime, Utc};
use lectern_core::serde::deserialize_optional_trimmed;
use lectern_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::ids::UserId;
use crate::value_types::{Email, validate_username};

/// Role fixed at account creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Tutor,
    Admin,
    Alumni,
}

impl UserRole {
    pub const ALL: [UserRole; 4] = [Self::Student, Self::Tutor, Self::Admin, Self::Alumni];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Tutor => "tutor",
            Self::Admin => "admin",
            Self::Alumni => "alumni",
        }
    }

    /// Roles that may be chosen through public registration.
    pub fn is_self_service(&self) -> bool {
        !matches!(self, Self::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "tutor" => Ok(Self::Tutor),
            "admin" => Ok(Self::Admin),
            "alumni" => Ok(Self::Alumni),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub preferred_language: String,
    pub profile_image: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// A user row together with its password hash, only used for login.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    #[sqlx(flatten)]
    pub user: User,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StudentProfile {
    pub user_id: UserId,
    pub student_number: String,
    pub course_of_study: Option<String>,
    pub admission_year: Option<i32>,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TutorProfile {
    pub user_id: UserId,
    pub staff_number: String,
    pub department: Option<String>,
    pub bio: Option<String>,
    /// Comma-separated subjects
    pub subjects: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AdminProfile {
    pub user_id: UserId,
    pub role_title: Option<String>,
    pub department: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AlumniProfile {
    pub user_id: UserId,
    pub graduation_year: Option<i32>,
    pub current_employer: Option<String>,
    pub bio: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Profile {
    Student(StudentProfile),
    Tutor(TutorProfile),
    Admin(AdminProfile),
    Alumni(AlumniProfile),
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserWithProfile {
    #[serde(flatten)]
    pub user: User,
    pub profile: Option<Profile>,
}

fn validate_register_role(role: &UserRole) -> Result<(), ValidationError> {
    if role.is_self_service() {
        Ok(())
    } else {
        Err(ValidationError::new("role")
            .with_message("Admin accounts cannot be self-registered".into()))
    }
}

fn validate_username_field(username: &str) -> Result<(), ValidationError> {
    validate_username(username)
        .map_err(|e| ValidationError::new("username").with_message(e.to_string().into()))
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_username_field"))]
    #[schema(example = "ada.lovelace")]
    pub username: String,
    pub email: Email,
    #[validate(length(min = 1, max = 150, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 150, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirm: String,
    #[validate(custom(function = "validate_register_role"))]
    pub role: UserRole,
    #[validate(length(min = 2, max = 10))]
    pub preferred_language: Option<String>,
    #[validate(length(max = 255))]
    pub course_of_study: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub admission_year: Option<i32>,
    #[validate(length(max = 255))]
    pub department: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub graduation_year: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email is required"))]
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "refresh_token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMeDto {
    #[validate(length(min = 1, max = 150))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 150))]
    pub last_name: Option<String>,
    #[validate(length(min = 2, max = 10))]
    pub preferred_language: Option<String>,
    #[validate(url)]
    pub profile_image: Option<String>,
}

/// Fields that do not belong to the caller's role are ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(length(max = 255))]
    pub course_of_study: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub admission_year: Option<i32>,
    #[validate(length(max = 255))]
    pub department: Option<String>,
    pub bio: Option<String>,
    pub subjects: Option<String>,
    #[validate(length(max = 255))]
    pub role_title: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub graduation_year: Option<i32>,
    #[validate(length(max = 255))]
    pub current_employer: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct UserFilterParams {
    pub role: Option<UserRole>,
    /// Case-insensitive match on username, email or name
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub search: Option<String>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<User>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(role: UserRole) -> RegisterRequest {
        RegisterRequest {
            username: "ada.lovelace".to_string(),
            email: Email::new("ada@example.com").unwrap(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password: "analytical".to_string(),
            password_confirm: "analytical".to_string(),
            role,
            preferred_language: None,
            course_of_study: None,
            admission_year: Some(2024),
            department: None,
            graduation_year: None,
        }
    }

    #[test]
    fn test_role_strings() {
        for role in UserRole::ALL {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!("superuser".parse::<UserRole>().is_err());
        assert_eq!(
            serde_json::to_string(&UserRole::Tutor).unwrap(),
            r#""tutor""#
        );
    }

    #[test]
    fn test_register_accepts_non_admin_roles() {
        for role in [UserRole::Student, UserRole::Tutor, UserRole::Alumni] {
            assert!(register(role).validate().is_ok(), "{role} should register");
        }
    }

    #[test]
    fn test_register_rejects_admin() {
        let errors = register(UserRole::Admin).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("role"));
    }

    #[test]
    fn test_register_password_rules() {
        let mut req = register(UserRole::Student);
        req.password_confirm = "different".to_string();
        assert!(req.validate().unwrap_err().field_errors().contains_key("password_confirm"));

        let mut req = register(UserRole::Student);
        req.password = "short".to_string();
        req.password_confirm = "short".to_string();
        assert!(req.validate().unwrap_err().field_errors().contains_key("password"));
    }

    #[test]
    fn test_register_username_rules() {
        let mut req = register(UserRole::Student);
        req.username = "a b".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_me_validates_url() {
        let dto = UpdateMeDto {
            profile_image: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(dto.validate().is_err());

        let dto = UpdateMeDto {
            profile_image: Some("https://cdn.example.com/a.png".to_string()),
            ..Default::default()
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_profile_is_tagged() {
        let profile = Profile::Alumni(AlumniProfile {
            user_id: UserId::from_u128(7),
            graduation_year: Some(2020),
            current_employer: None,
            bio: None,
            updated_at: Utc::now(),
        });
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["kind"], "alumni");
        assert_eq!(json["graduation_year"], 2020);
    }
}
