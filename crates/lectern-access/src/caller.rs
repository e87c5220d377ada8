use lectern_core::AppError;
use lectern_models::{UserId, UserRole};

/// The identity a request acts as.
///
/// `role` is `None` when the token carried a role this build does not know;
/// such callers are scoped to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: UserId,
    pub role: Option<UserRole>,
}

impl Caller {
    pub fn new(id: UserId, role: UserRole) -> Self {
        Self {
            id,
            role: Some(role),
        }
    }

    /// Builds a caller from the raw role string carried in a token.
    pub fn from_token_role(id: UserId, role: &str) -> Self {
        Self {
            id,
            role: role.parse().ok(),
        }
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        self.role == Some(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(UserRole::Admin)
    }

    pub fn is_tutor(&self) -> bool {
        self.has_role(UserRole::Tutor)
    }

    pub fn is_student(&self) -> bool {
        self.has_role(UserRole::Student)
    }

    pub fn require_role(&self, role: UserRole) -> Result<(), AppError> {
        self.require_any_role(&[role])
    }

    pub fn require_any_role(&self, roles: &[UserRole]) -> Result<(), AppError> {
        match self.role {
            Some(role) if roles.contains(&role) => Ok(()),
            _ => {
                let allowed = roles
                    .iter()
                    .map(UserRole::as_str)
                    .collect::<Vec<_>>()
                    .join(" or ");
                Err(AppError::forbidden(format!(
                    "This action requires the {allowed} role"
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_core::ErrorCode;

    #[test]
    fn test_unknown_role_parses_to_none() {
        let caller = Caller::from_token_role(UserId::new(), "superuser");
        assert_eq!(caller.role, None);
        assert!(!caller.is_admin());
    }

    #[test]
    fn test_require_role() {
        let tutor = Caller::new(UserId::new(), UserRole::Tutor);
        assert!(tutor.require_role(UserRole::Tutor).is_ok());

        let err = tutor.require_role(UserRole::Admin).unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert_eq!(err.error.to_string(), "This action requires the admin role");
    }

    #[test]
    fn test_require_any_role_lists_roles() {
        let student = Caller::new(UserId::new(), UserRole::Student);
        let err = student
            .require_any_role(&[UserRole::Admin, UserRole::Tutor])
            .unwrap_err();
        assert_eq!(
            err.error.to_string(),
            "This action requires the admin or tutor role"
        );
    }
}
