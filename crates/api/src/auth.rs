//! HMAC-signed access tokens and the extractors that require them.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use common::User;
use domain::{TokenError, TokenPayload, TokenService};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::ApiError;
use crate::state::{AppState, PosCache, PosStore};

type HmacSha256 = Hmac<Sha256>;

/// Issues tokens of the form `base64url(payload).base64url(signature)`,
/// where the payload is the JSON-encoded [`TokenPayload`] and the signature
/// is HMAC-SHA256 over the encoded payload.
#[derive(Clone)]
pub struct HmacTokenService {
    secret: Vec<u8>,
    duration: chrono::Duration,
}

impl HmacTokenService {
    pub fn new(secret: impl Into<Vec<u8>>, duration: chrono::Duration) -> Self {
        Self {
            secret: secret.into(),
            duration,
        }
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::Creation)
    }
}

impl TokenService for HmacTokenService {
    fn create_token(&self, user: &User) -> Result<String, TokenError> {
        let payload = TokenPayload::new(user, Utc::now(), self.duration);
        let json = serde_json::to_vec(&payload).map_err(|_| TokenError::Creation)?;
        let encoded = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac()?;
        mac.update(encoded.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{encoded}.{signature}"))
    }

    fn verify_token(&self, token: &str) -> Result<TokenPayload, TokenError> {
        let (encoded, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac().map_err(|_| TokenError::InvalidSignature)?;
        mac.update(encoded.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let json = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| TokenError::Malformed)?;
        let payload: TokenPayload =
            serde_json::from_slice(&json).map_err(|_| TokenError::Malformed)?;

        if payload.is_expired_at(Utc::now()) {
            return Err(TokenError::Expired);
        }
        Ok(payload)
    }
}

/// Any signed-in user.
#[derive(Debug, Clone)]
pub struct AuthUser(pub TokenPayload);

/// A signed-in user with the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub TokenPayload);

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid authorization header".to_string()))
}

fn rejection_reason(err: &TokenError) -> &'static str {
    match err {
        TokenError::Malformed => "malformed",
        TokenError::InvalidSignature => "invalid_signature",
        TokenError::Expired => "expired",
        TokenError::Creation => "creation",
    }
}

impl<S: PosStore, C: PosCache> FromRequestParts<Arc<AppState<S, C>>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S, C>>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let payload = state.auth.tokens().verify_token(token).inspect_err(|err| {
            metrics::counter!("auth_rejections_total", "reason" => rejection_reason(err))
                .increment(1);
        })?;
        Ok(Self(payload))
    }
}

impl<S: PosStore, C: PosCache> FromRequestParts<Arc<AppState<S, C>>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S, C>>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(payload) = AuthUser::from_request_parts(parts, state).await?;
        if !payload.is_admin() {
            tracing::warn!(user_id = %payload.user_id, "non-admin on admin route");
            return Err(ApiError::Forbidden("Admin role required".to_string()));
        }
        Ok(Self(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{UserId, UserRole};

    fn user() -> User {
        let now = Utc::now();
        User {
            id: UserId::new(7),
            name: "Admin".to_string(),
            email: "admin@example.com".to_string(),
            password: String::new(),
            role: UserRole::Admin,
            created_at: now,
            updated_at: now,
        }
    }

    fn tokens() -> HmacTokenService {
        HmacTokenService::new("test-secret", chrono::Duration::hours(1))
    }

    #[test]
    fn issued_token_verifies() {
        let token = tokens().create_token(&user()).unwrap();
        let payload = tokens().verify_token(&token).unwrap();

        assert_eq!(payload.user_id, UserId::new(7));
        assert!(payload.is_admin());
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let other = HmacTokenService::new("other-secret", chrono::Duration::hours(1));
        let token = other.create_token(&user()).unwrap();

        assert_eq!(
            tokens().verify_token(&token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let token = tokens().create_token(&user()).unwrap();
        let (_, signature) = token.split_once('.').unwrap();
        let forged = URL_SAFE_NO_PAD.encode(br#"{"role":"admin"}"#);

        assert_eq!(
            tokens().verify_token(&format!("{forged}.{signature}")),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let expired = HmacTokenService::new("test-secret", chrono::Duration::seconds(-1));
        let token = expired.create_token(&user()).unwrap();

        assert_eq!(tokens().verify_token(&token), Err(TokenError::Expired));
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(tokens().verify_token("no-dot"), Err(TokenError::Malformed));
        assert_eq!(tokens().verify_token("a.!!!"), Err(TokenError::Malformed));
    }
}
