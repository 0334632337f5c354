//! User input validation

use super::validation::{char_len, required_text};
use super::ValidationError;

/// Maximum length for user names
pub const MAX_USER_NAME_LEN: usize = 64;

/// Password bounds (characters)
const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 256;

/// Validated user name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserName(String);

impl UserName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        required_text("user name", s, MAX_USER_NAME_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A validated user registration.
///
/// The password is held only until it is hashed by the user store.
pub struct NewUser {
    pub name: UserName,
    password: String,
}

impl NewUser {
    /// Validate a registration.
    ///
    /// Passwords are not trimmed; they must be 8..=256 characters.
    pub fn new(name: &str, password: &str) -> Result<Self, ValidationError> {
        let name = UserName::new(name)?;
        let len = char_len(password);
        if len == 0 {
            return Err(ValidationError::Empty { field: "password" });
        }
        if len < MIN_PASSWORD_LEN {
            return Err(ValidationError::InvalidFormat {
                field: "password",
                reason: "must be at least 8 characters",
            });
        }
        if len > MAX_PASSWORD_LEN {
            return Err(ValidationError::TooLong {
                field: "password",
                max: MAX_PASSWORD_LEN,
            });
        }
        Ok(Self {
            name,
            password: password.to_owned(),
        })
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_user() {
        let user = NewUser::new(" john ", "correct horse").unwrap();
        assert_eq!(user.name.as_str(), "john");
        assert_eq!(user.password(), "correct horse");
    }

    #[test]
    fn rejects_short_password() {
        assert!(matches!(
            NewUser::new("john", "short").unwrap_err(),
            ValidationError::InvalidFormat { field: "password", .. }
        ));
    }

    #[test]
    fn debug_redacts_password() {
        let user = NewUser::new("john", "correct horse").unwrap();
        assert!(!format!("{:?}", user).contains("correct horse"));
    }
}
