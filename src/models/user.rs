use serde::Serialize;

use super::ValidationError;

const MIN_NAME_LEN: usize = 2;
const MAX_NAME_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

impl User {
    pub fn new(name: &str, email: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        let len = name.chars().count();
        if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
            return Err(ValidationError::InvalidName {
                min: MIN_NAME_LEN,
                max: MAX_NAME_LEN,
            });
        }

        let email = email.trim().to_lowercase();
        if !is_plausible_email(&email) {
            return Err(ValidationError::InvalidEmail(email));
        }

        Ok(Self {
            id: None,
            name: name.to_string(),
            email,
            created_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        _ => false,
    }
}
