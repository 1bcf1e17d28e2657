//! User account use cases.

use common::{NewUser, Pagination, User, UserId, UserUpdate};
use store::{Cache, UserRepository, keys};

use crate::cached::CacheAside;
use crate::error::{DomainError, Result};
use crate::password::{hash_password, verify_password};
use crate::patch;

const ENTITY: &str = "user";
const COLLECTION: &str = "users";

/// Service for managing user accounts.
///
/// Passwords are accepted in plain text and stored as Argon2id hashes.
pub struct UserService<R, C> {
    repo: R,
    cache: CacheAside<C>,
}

impl<R: UserRepository, C: Cache> UserService<R, C> {
    pub fn new(repo: R, cache: C) -> Self {
        Self {
            repo,
            cache: CacheAside::new(cache),
        }
    }

    /// Registers a new user. A taken email is a conflict.
    #[tracing::instrument(skip(self, user), fields(email = %user.email))]
    pub async fn register(&self, mut user: NewUser) -> Result<User> {
        user.password = hash_password(&user.password)?;
        let user = self.repo.create_user(user).await?;

        self.cache.write(&keys::entity(ENTITY, user.id), &user).await?;
        self.cache.invalidate(COLLECTION).await?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_user(&self, id: UserId) -> Result<User> {
        let key = keys::entity(ENTITY, id);
        if let Some(user) = self.cache.read(&key).await? {
            return Ok(user);
        }

        let user = self.repo.get_user_by_id(id).await?;
        self.cache.write(&key, &user).await?;
        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_users(&self, page: Pagination) -> Result<Vec<User>> {
        let key = keys::list(COLLECTION, &page.cache_params());
        if let Some(users) = self.cache.read(&key).await? {
            return Ok(users);
        }

        let users = self.repo.list_users(page).await?;
        self.cache.write(&key, &users).await?;
        Ok(users)
    }

    /// Applies a partial update.
    ///
    /// A new password is re-hashed; one that verifies against the stored
    /// hash counts as unchanged.
    #[tracing::instrument(skip(self, update))]
    pub async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<User> {
        let mut user = self.repo.get_user_by_id(id).await?;

        let mut changed = patch::apply_text(&mut user.name, update.name);
        changed |= patch::apply_text(&mut user.email, update.email);
        changed |= patch::apply(&mut user.role, update.role);
        if let Some(password) = update.password.filter(|p| !p.is_empty())
            && !verify_password(&password, &user.password)
        {
            user.password = hash_password(&password)?;
            changed = true;
        }
        if !changed {
            return Err(DomainError::NoUpdatedData);
        }

        let user = self.repo.update_user(&user).await?;

        self.cache.write(&keys::entity(ENTITY, id), &user).await?;
        self.cache.invalidate(COLLECTION).await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_user(&self, id: UserId) -> Result<()> {
        self.repo.get_user_by_id(id).await?;

        self.cache.remove(&keys::entity(ENTITY, id)).await?;
        self.cache.invalidate(COLLECTION).await?;

        self.repo.delete_user(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::UserRole;
    use store::{InMemoryCache, InMemoryStore};

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Dewi".to_string(),
            email: email.to_string(),
            password: "hunter22".to_string(),
            role: UserRole::Cashier,
        }
    }

    fn service() -> UserService<InMemoryStore, InMemoryCache> {
        UserService::new(InMemoryStore::new(), InMemoryCache::new())
    }

    #[tokio::test]
    async fn register_stores_hash_not_password() {
        let service = service();

        let user = service.register(new_user("dewi@example.com")).await.unwrap();

        assert_ne!(user.password, "hunter22");
        assert!(verify_password("hunter22", &user.password));
        assert_eq!(service.get_user(user.id).await.unwrap(), user);
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let service = service();
        service.register(new_user("dewi@example.com")).await.unwrap();

        let result = service.register(new_user("dewi@example.com")).await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn same_password_is_not_an_update() {
        let service = service();
        let user = service.register(new_user("dewi@example.com")).await.unwrap();

        let result = service
            .update_user(
                user.id,
                UserUpdate {
                    password: Some("hunter22".to_string()),
                    role: Some(UserRole::Cashier),
                    ..Default::default()
                },
            )
            .await;

        assert_eq!(result, Err(DomainError::NoUpdatedData));
    }

    #[tokio::test]
    async fn new_password_is_rehashed() {
        let service = service();
        let user = service.register(new_user("dewi@example.com")).await.unwrap();

        let updated = service
            .update_user(
                user.id,
                UserUpdate {
                    password: Some("correct horse".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(verify_password("correct horse", &updated.password));
        assert!(!verify_password("hunter22", &updated.password));
    }

    #[tokio::test]
    async fn promote_to_admin() {
        let service = service();
        let user = service.register(new_user("dewi@example.com")).await.unwrap();

        let updated = service
            .update_user(
                user.id,
                UserUpdate {
                    role: Some(UserRole::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.role, UserRole::Admin);
        assert_eq!(service.get_user(user.id).await.unwrap().role, UserRole::Admin);
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let service = service();
        assert_eq!(
            service.delete_user(UserId::new(1)).await,
            Err(DomainError::NotFound)
        );
    }
}
