use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::claims::{Claims, Role, TokenKind},
    config::JwtConfig,
    state::AppState,
};

/// Holds signing and verification keys for both principal kinds.
///
/// User and admin tokens are signed with distinct secrets, so a token of
/// one kind can never verify as the other regardless of what its payload
/// claims.
#[derive(Clone)]
pub struct JwtKeys {
    user_encoding: EncodingKey,
    user_decoding: DecodingKey,
    admin_encoding: EncodingKey,
    admin_decoding: DecodingKey,
    pub issuer: String,
    pub ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            user_encoding: EncodingKey::from_secret(cfg.user_secret.as_bytes()),
            user_decoding: DecodingKey::from_secret(cfg.user_secret.as_bytes()),
            admin_encoding: EncodingKey::from_secret(cfg.admin_secret.as_bytes()),
            admin_decoding: DecodingKey::from_secret(cfg.admin_secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            ttl: Duration::from_secs((cfg.ttl_minutes as u64) * 60),
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    fn encoding(&self, kind: TokenKind) -> &EncodingKey {
        match kind {
            TokenKind::User => &self.user_encoding,
            TokenKind::Admin => &self.admin_encoding,
        }
    }

    fn decoding(&self, kind: TokenKind) -> &DecodingKey {
        match kind {
            TokenKind::User => &self.user_decoding,
            TokenKind::Admin => &self.admin_decoding,
        }
    }

    fn sign_with_ttl(
        &self,
        kind: TokenKind,
        id: Uuid,
        email: &str,
        role: Role,
        ttl_secs: i64,
    ) -> anyhow::Result<(String, OffsetDateTime)> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(ttl_secs);
        let claims = Claims {
            sub: id,
            email: email.to_string(),
            role,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
        };
        let token = encode(&Header::default(), &claims, self.encoding(kind))?;
        debug!(user_id = %id, kind = ?kind, "jwt signed");
        Ok((token, exp))
    }

    /// Sign a claim set with the secret selected by `kind`; returns the
    /// token and its expiry instant.
    pub fn sign(
        &self,
        kind: TokenKind,
        id: Uuid,
        email: &str,
        role: Role,
    ) -> anyhow::Result<(String, OffsetDateTime)> {
        self.sign_with_ttl(kind, id, email, role, self.ttl.as_secs() as i64)
    }

    /// Verify a token against `kind`'s secret. Fails on wrong-secret
    /// signature, expiry, or structural invalidity.
    pub fn verify(&self, token: &str, kind: TokenKind) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, self.decoding(kind), &validation)?;
        debug!(user_id = %data.claims.sub, kind = ?kind, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
impl JwtKeys {
    /// A user-kind token that expired beyond the validation leeway.
    pub(crate) fn expired_token_for_tests(&self, id: Uuid) -> String {
        self.sign_with_ttl(TokenKind::User, id, "expired@example.com", Role::User, -120)
            .expect("sign expired")
            .0
    }
}
