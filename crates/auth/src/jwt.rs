//! Bearer token issuance and validation.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};

use crate::Claims;

/// Manages token creation and validation for the whole API.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl JwtManager {
    /// Create a new `JwtManager` with the given secret and token lifetime.
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    /// Issue a token identifying `user_id`.
    pub fn issue_token(&self, user_id: i64) -> Result<String, jsonwebtoken::errors::Error> {
        let now = now_secs();
        let claims = Claims {
            jti: uuid::Uuid::new_v4().to_string(),
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Validate a token and return the user id it identifies.
    ///
    /// Rejects bad signatures, expired tokens, and any subject that is not
    /// a decimal user id.
    pub fn verify(&self, token: &str) -> Result<i64, jsonwebtoken::errors::Error> {
        let data =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        data.claims
            .user_id()
            .ok_or_else(|| jsonwebtoken::errors::ErrorKind::InvalidSubject.into())
    }
}

fn now_secs() -> i64 {
    #[allow(clippy::cast_possible_wrap)]
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    secs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_jwt() -> JwtManager {
        JwtManager::new(b"test-secret-key-for-testing", 3600)
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let jwt = test_jwt();
        let token = jwt.issue_token(42).unwrap();
        assert_eq!(jwt.verify(&token).unwrap(), 42);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = test_jwt().issue_token(42).unwrap();
        let other = JwtManager::new(b"a-different-secret", 3600);
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(test_jwt().verify("not.a.token").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = JwtManager::new(b"test-secret-key-for-testing", -120);
        let token = jwt.issue_token(7).unwrap();
        assert!(jwt.verify(&token).is_err());
    }
}
