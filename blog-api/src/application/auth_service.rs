use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};

use crate::data::user_repository::{NewUser, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{LoginRequest, RegisterRequest, User};
use crate::infrastructure::jwt::JwtService;

#[derive(Debug, Clone)]
pub(crate) struct AuthResult {
    pub(crate) user: User,
    pub(crate) access_token: String,
}

pub(crate) struct AuthService<R: UserRepository> {
    repo: R,
    jwt: JwtService,
}

impl<R: UserRepository> AuthService<R> {
    // Verified when the username is unknown so login latency does not
    // reveal which usernames exist.
    const DUMMY_PASSWORD_HASH: &'static str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$gwN6hT1sNdk9kI95f7n2Gl3fL0qRmBf2Ffkj2r90/0M";

    pub(crate) fn new(repo: R, jwt: JwtService) -> Self {
        Self { repo, jwt }
    }

    pub(crate) async fn register(&self, req: RegisterRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let password_hash = self.hash_password(&req.password)?;
        let user = self
            .repo
            .create_user(NewUser {
                username: req.username,
                email: req.email,
                password_hash,
            })
            .await?;

        let access_token = self
            .jwt
            .generate_token(user.id, &user.username)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;

        Ok(AuthResult { user, access_token })
    }

    pub(crate) async fn login(&self, req: LoginRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let creds = match self.repo.find_by_username(&req.username).await? {
            Some(creds) => creds,
            None => {
                match self.verify_password(&req.password, Self::DUMMY_PASSWORD_HASH) {
                    Ok(()) | Err(DomainError::InvalidCredentials) => {}
                    Err(err) => return Err(err),
                }
                return Err(DomainError::InvalidCredentials);
            }
        };

        self.verify_password(&req.password, &creds.password_hash)?;

        let access_token = self
            .jwt
            .generate_token(creds.user.id, &creds.user.username)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;

        Ok(AuthResult {
            user: creds.user,
            access_token,
        })
    }

    fn hash_password(&self, raw_password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()?
            .hash_password(raw_password.as_bytes(), &salt)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, raw_password: &str, password_hash: &str) -> Result<(), DomainError> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Self::argon2()?
            .verify_password(raw_password.as_bytes(), &parsed_hash)
            .map_err(|err| match err {
                PasswordHashError::Password => DomainError::InvalidCredentials,
                _ => DomainError::Unexpected(err.to_string()),
            })
    }

    fn argon2() -> Result<Argon2<'static>, DomainError> {
        let params = Params::new(19 * 1024, 2, 1, None)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::AuthService;
    use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
    use crate::domain::error::DomainError;
    use crate::domain::user::{LoginRequest, RegisterRequest, User};
    use crate::infrastructure::jwt::JwtService;

    #[derive(Clone, Default)]
    struct FakeUserRepo {
        stored: Arc<Mutex<Option<UserCredentials>>>,
    }

    #[async_trait]
    impl UserRepository for FakeUserRepo {
        async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
            let user = User::new(1, input.username, input.email, Utc::now())
                .map_err(|err| DomainError::Unexpected(err.to_string()))?;
            *self.stored.lock().expect("stored mutex poisoned") = Some(UserCredentials {
                user: user.clone(),
                password_hash: input.password_hash,
            });
            Ok(user)
        }

        async fn find_by_username(
            &self,
            username: &str,
        ) -> Result<Option<UserCredentials>, DomainError> {
            Ok(self
                .stored
                .lock()
                .expect("stored mutex poisoned")
                .clone()
                .filter(|creds| creds.user.username == username))
        }
    }

    fn jwt() -> JwtService {
        JwtService::new("0123456789abcdef0123456789abcdef", 3600)
    }

    #[tokio::test]
    async fn register_then_login_roundtrip() {
        let repo = FakeUserRepo::default();
        let service = AuthService::new(repo.clone(), jwt());

        let registered = service
            .register(RegisterRequest {
                username: "valid_user".to_string(),
                email: "test@example.com".to_string(),
                password: "very-secure-password".to_string(),
            })
            .await
            .expect("register must succeed");
        assert!(!registered.access_token.is_empty());

        let logged_in = service
            .login(LoginRequest {
                username: "valid_user".to_string(),
                password: "very-secure-password".to_string(),
            })
            .await
            .expect("login must succeed");
        assert_eq!(logged_in.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_invalid_credentials() {
        let repo = FakeUserRepo::default();
        let service = AuthService::new(repo, jwt());

        service
            .register(RegisterRequest {
                username: "valid_user".to_string(),
                email: "test@example.com".to_string(),
                password: "very-secure-password".to_string(),
            })
            .await
            .expect("register must succeed");

        let err = service
            .login(LoginRequest {
                username: "valid_user".to_string(),
                password: "wrong-password!".to_string(),
            })
            .await
            .expect_err("must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_with_unknown_username_is_invalid_credentials() {
        let service = AuthService::new(FakeUserRepo::default(), jwt());

        let err = service
            .login(LoginRequest {
                username: "nobody".to_string(),
                password: "whatever-password".to_string(),
            })
            .await
            .expect_err("must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }
}
