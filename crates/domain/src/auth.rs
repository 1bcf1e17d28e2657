//! Login.

use store::UserRepository;

use crate::error::{DomainError, Result};
use crate::password::verify_password;
use crate::token::TokenService;

/// Exchanges credentials for an access token.
pub struct AuthService<R, T> {
    repo: R,
    tokens: T,
}

impl<R: UserRepository, T: TokenService> AuthService<R, T> {
    pub fn new(repo: R, tokens: T) -> Self {
        Self { repo, tokens }
    }

    pub fn tokens(&self) -> &T {
        &self.tokens
    }

    /// Returns a token for the user with `email` if `password` matches.
    ///
    /// An unknown email and a wrong password fail the same way.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let user = match self.repo.get_user_by_email(email).await {
            Ok(user) => user,
            Err(store::StoreError::NotFound) => return Err(DomainError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        };

        if !verify_password(password, &user.password) {
            tracing::warn!(user_id = %user.id, "login with wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        self.tokens.create_token(&user).map_err(|e| {
            tracing::error!(error = %e, "token creation failed");
            DomainError::Internal
        })
    }
}
