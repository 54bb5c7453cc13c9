use serde::{Deserialize, Serialize};

use crate::error::{MemoryMapError, Result};

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

fn check_email(email: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(MemoryMapError::InvalidInput("Email is required".into()));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(MemoryMapError::InvalidInput(
            "Please enter a valid email address".into(),
        )),
    }
}

pub fn validate_credentials(creds: &Credentials) -> Result<()> {
    check_email(&creds.email)?;
    if creds.password.is_empty() {
        return Err(MemoryMapError::InvalidInput("Password is required".into()));
    }
    Ok(())
}

pub fn validate_registration(reg: &Registration) -> Result<()> {
    if reg.name.trim().is_empty() {
        return Err(MemoryMapError::InvalidInput("Name is required".into()));
    }
    check_email(&reg.email)?;
    if reg.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(MemoryMapError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}
