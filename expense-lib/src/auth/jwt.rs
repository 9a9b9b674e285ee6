use crate::user::UserId;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::Deserialize;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone)]
pub struct JWTAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

#[derive(Serialize, Deserialize)]
struct Claims {
    exp: u64,
    sub: String,
}

impl JWTAuth {
    /// Tokens are valid for 30 days.
    const EXPIRE_TIME: u64 = 30 * 24 * 60 * 60;

    pub fn from_secret(secret: Vec<u8>) -> JWTAuth {
        JWTAuth {
            encoding_key: EncodingKey::from_secret(&secret),
            decoding_key: DecodingKey::from_secret(&secret),
        }
    }

    pub fn create_token(&self, user_id: UserId) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            exp: Self::generate_exp(),
            sub: user_id.to_string(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
    }

    pub fn validate_token(&self, token: &str) -> Result<UserId, jsonwebtoken::errors::Error> {
        let claim =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        claim
            .claims
            .sub
            .parse()
            .map_err(|_| ErrorKind::InvalidSubject.into())
    }

    fn generate_exp() -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        now + Self::EXPIRE_TIME
    }
}
