use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::data::user_repository::UserRepository;
use crate::domain::{error::DomainError, user::User};
use crate::infrastructure::security::{JwtKeys, hash_password, verify_password};

const PASSWORD_MIN: usize = 6;

#[derive(Clone)]
pub struct AuthService<R: UserRepository + 'static> {
    repo: Arc<R>,
    keys: JwtKeys,
}

impl<R> AuthService<R>
where
    R: UserRepository + 'static,
{
    pub fn new(repo: Arc<R>, keys: JwtKeys) -> Self {
        Self { repo, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))
    }

    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: String,
        name: Option<String>,
        password: String,
    ) -> Result<User, DomainError> {
        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(DomainError::Validation("a valid email is required".into()));
        }
        if password.len() < PASSWORD_MIN {
            return Err(DomainError::Validation(format!(
                "password must be at least {PASSWORD_MIN} characters"
            )));
        }

        let hash =
            hash_password(&password).map_err(|err| DomainError::Internal(err.to_string()))?;
        let user = User::new(email, name, hash);
        self.repo.create(user).await
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), DomainError> {
        let user = self
            .repo
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or(DomainError::Unauthorized)?;

        let valid = verify_password(password, &user.password_hash)
            .map_err(|_| DomainError::Unauthorized)?;
        if !valid {
            return Err(DomainError::Unauthorized);
        }

        self.repo.touch_last_login(user.id).await?;

        let token = self
            .keys
            .generate_token(user.id)
            .map_err(|err| DomainError::Internal(err.to_string()))?;
        Ok((user, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemoryUserRepository {
        users: Mutex<Vec<User>>,
    }

    #[async_trait]
    impl UserRepository for InMemoryUserRepository {
        async fn create(&self, user: User) -> Result<User, DomainError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == user.email) {
                return Err(DomainError::UserAlreadyExists(user.email.clone()));
            }
            users.push(user.clone());
            Ok(user)
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id == id)
                .cloned())
        }

        async fn touch_last_login(&self, id: Uuid) -> Result<(), DomainError> {
            if let Some(user) = self.users.lock().unwrap().iter_mut().find(|u| u.id == id) {
                user.last_login = Some(Utc::now());
            }
            Ok(())
        }
    }

    fn service() -> AuthService<InMemoryUserRepository> {
        AuthService::new(
            Arc::new(InMemoryUserRepository::default()),
            JwtKeys::new("test-secret".into()),
        )
    }

    #[tokio::test]
    async fn register_normalizes_email_and_defaults_name() {
        let service = service();
        let user = service
            .register("  Ada@Example.COM ".into(), None, "hunter2".into())
            .await
            .unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.name, "ada");
    }

    #[tokio::test]
    async fn register_rejects_short_password() {
        let err = service()
            .register("ada@example.com".into(), None, "short".into())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let service = service();
        service
            .register("ada@example.com".into(), None, "hunter2".into())
            .await
            .unwrap();
        let err = service
            .register("ada@example.com".into(), None, "hunter2".into())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UserAlreadyExists(_)));
    }

    #[tokio::test]
    async fn login_issues_verifiable_token_and_touches_last_login() {
        let service = service();
        service
            .register("ada@example.com".into(), None, "hunter2".into())
            .await
            .unwrap();

        let (user, token) = service.login("ada@example.com", "hunter2").await.unwrap();
        let claims = service.keys().verify_token(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());

        let stored = service.get_user(user.id).await.unwrap();
        assert!(stored.last_login.is_some());
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthorized() {
        let service = service();
        service
            .register("ada@example.com".into(), None, "hunter2".into())
            .await
            .unwrap();
        let err = service
            .login("ada@example.com", "wrong-password")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized));
    }
}
