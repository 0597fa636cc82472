use chrono::{Duration, Utc};
use jsonwebtoken::errors::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

/// JWT Claims structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User name
    pub uid: i64,    // User ID
    pub role: String,
    pub iss: String,
    pub exp: u64, // Expiration timestamp
}

/// Sign a new HS256 token for a user.
pub fn sign(config: &AuthConfig, user_id: i64, name: &str, role: &str) -> Result<String> {
    let expiration = Utc::now() + Duration::seconds(config.expire_secs);

    let claims = Claims {
        sub: name.to_owned(),
        uid: user_id,
        role: role.to_owned(),
        iss: config.issuer.clone(),
        exp: expiration.timestamp().max(0) as u64,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

/// Verify signature, expiry and issuer, then decode the claims.
pub fn verify(config: &AuthConfig, token: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[config.issuer.as_str()]);
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}
