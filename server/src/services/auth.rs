// comanda_server/src/services/auth.rs

//! Admin authentication: argon2 password hashing and JWT bearer tokens.

use crate::errors::AppError;
use argon2::{
  password_hash::{
    rand_core::OsRng, // For generating random salts
    PasswordHash,
    PasswordHasher,   // The main trait for hashing
    PasswordVerifier, // The main trait for verifying
    SaltString,
  },
  Argon2, // The Argon2 algorithm instance
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};
use uuid::Uuid;

const TOKEN_LIFETIME_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminClaims {
  pub sub: Uuid,
  pub email: String,
  pub exp: usize,
}

/// Hashes a plain-text password using Argon2.
#[instrument(name = "auth::hash_password", skip(password))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  let argon2_hasher = Argon2::default();

  match argon2_hasher.hash_password(password.as_bytes(), &salt) {
    Ok(password_hash_obj) => Ok(password_hash_obj.to_string()),
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(AppError::Internal(format!("Password hashing process failed: {}", argon_err)))
    }
  }
}

/// Verifies a plain-text password against a stored Argon2 hash. A wrong
/// password is `Ok(false)`; only a malformed stored hash is an error.
#[instrument(name = "auth::verify_password", skip(stored_hash, provided_password))]
pub fn verify_password(stored_hash: &str, provided_password: &str) -> Result<bool, AppError> {
  let parsed_hash = PasswordHash::new(stored_hash)
    .map_err(|e| AppError::Internal(format!("Stored password hash is malformed: {}", e)))?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => Ok(false),
    Err(e) => {
      error!(error = %e, "Argon2 password verification failed.");
      Err(AppError::Internal(format!("Password verification failed: {}", e)))
    }
  }
}

pub fn issue_token(admin_id: Uuid, email: &str, secret: &str) -> Result<String, AppError> {
  let expiration = Utc::now() + Duration::hours(TOKEN_LIFETIME_HOURS);
  let claims = AdminClaims {
    sub: admin_id,
    email: email.to_string(),
    exp: expiration.timestamp() as usize,
  };
  encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
    .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))
}

pub fn verify_token(token: &str, secret: &str) -> Result<AdminClaims, AppError> {
  let data = decode::<AdminClaims>(
    token,
    &DecodingKey::from_secret(secret.as_bytes()),
    &Validation::default(),
  )
  .map_err(|e| {
    debug!(error = %e, "Admin token rejected");
    AppError::Auth("Invalid or expired admin token".to_string())
  })?;
  Ok(data.claims)
}
