use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::auth::claims::{Claims, Role};
use crate::config::JwtConfig;
use crate::state::AppState;

/// Signing and verification keys for session tokens, built from config.
#[derive(Clone)]
pub struct TokenKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.jwt)
    }
}

impl TokenKeys {
    pub fn from_config(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: Duration::from_secs((config.ttl_hours as u64) * 3600),
        }
    }

    pub fn sign(&self, user_id: i64, role: Role) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            role,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, role = ?role, "session token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        debug!(user_id = %data.claims.sub, "session token verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_with_ttl(secret: &str, ttl_hours: i64) -> TokenKeys {
        TokenKeys::from_config(&JwtConfig {
            secret: secret.into(),
            ttl_hours,
        })
    }

    #[test]
    fn sign_and_verify_carries_identity_and_role() {
        let keys = keys_with_ttl("dev-secret", 24);
        let token = keys.sign(42, Role::Admin).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let good = keys_with_ttl("secret-a", 24);
        let bad = keys_with_ttl("secret-b", 24);
        let token = good.sign(1, Role::User).expect("sign");
        assert!(bad.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = keys_with_ttl("dev-secret", 24);
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let stale = Claims {
            sub: 1,
            role: Role::User,
            iat: (now - 7200) as usize,
            exp: (now - 3600) as usize,
        };
        let token = encode(&Header::default(), &stale, &keys.encoding).expect("encode");
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = keys_with_ttl("dev-secret", 24);
        assert!(keys.verify("not-a-token").is_err());
    }
}
