use crate::error::{AppError, Result};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access-token claims issued by the task-management API.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: String,
    pub role: String,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::Unauthorized("Invalid token".to_string()))
    }
}

/// Verify JWT token and extract claims
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(sub: &str, secret: &str, expires_in: Duration) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            email: "planner@example.com".to_string(),
            role: "user".to_string(),
            exp: (Utc::now() + expires_in).timestamp(),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_verify_valid_token() {
        let user_id = Uuid::new_v4();
        let claims = verify_jwt(&token(&user_id.to_string(), "secret", Duration::minutes(15)), "secret").unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn test_reject_wrong_secret() {
        let jwt = token(&Uuid::new_v4().to_string(), "secret", Duration::minutes(15));
        assert!(verify_jwt(&jwt, "other").is_err());
    }

    #[test]
    fn test_reject_expired_token() {
        let jwt = token(&Uuid::new_v4().to_string(), "secret", Duration::hours(-2));
        assert!(verify_jwt(&jwt, "secret").is_err());
    }

    #[test]
    fn test_reject_non_uuid_subject() {
        let claims = verify_jwt(&token("not-a-user", "secret", Duration::minutes(15)), "secret").unwrap();
        assert!(claims.user_id().is_err());
    }
}
