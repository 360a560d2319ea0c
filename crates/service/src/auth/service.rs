use tracing::{debug, error, info, instrument};

use super::domain::{AuthUser, UserResponse, UsernamePasswordInput};
use super::errors::AuthError;
use super::password::{password_is_strong, username_is_valid, Argon2Hasher};
use super::RequestContext;

pub const USERNAME_TOO_SHORT: &str = "length must be greater than 2";
pub const PASSWORD_TOO_WEAK: &str = "password is too weak";
pub const USERNAME_TAKEN: &str = "username already exists";
pub const USERNAME_UNKNOWN: &str = "username doesn't exist";
pub const PASSWORD_INCORRECT: &str = "incorrect password";
pub const REGISTRATION_FAILED: &str = "registration failed";

/// Field name used for failures not tied to one input.
pub const GENERAL_FIELD: &str = "general";

/// Auth business service independent of web framework
#[derive(Clone, Default)]
pub struct AuthService {
    hasher: Argon2Hasher,
}

impl AuthService {
    pub fn new(hasher: Argon2Hasher) -> Self { Self { hasher } }

    /// Register a new user with a hashed password.
    ///
    /// Input problems and a taken username come back as field errors.
    /// Any other failure is logged and reported as a generic field error.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, RequestContext};
    /// use service::auth::domain::UsernamePasswordInput;
    /// use service::auth::repository::mock::MockAuthRepository;
    /// use service::auth::session::mock::MemorySession;
    /// let repo = MockAuthRepository::default();
    /// let session = MemorySession::default();
    /// let ctx = RequestContext::new(&repo, &session);
    /// let svc = AuthService::default();
    /// let res = tokio_test::block_on(svc.register(ctx, UsernamePasswordInput::new("alice", "Str0ngPW"))).unwrap();
    /// assert_eq!(res.user.unwrap().username, "alice");
    /// ```
    #[instrument(skip(self, ctx, input), fields(username = %input.username))]
    pub async fn register(&self, ctx: RequestContext<'_>, input: UsernamePasswordInput) -> Result<UserResponse, AuthError> {
        if !username_is_valid(&input.username) {
            return Ok(UserResponse::field_error("username", USERNAME_TOO_SHORT));
        }
        if !password_is_strong(&input.password) {
            return Ok(UserResponse::field_error("password", PASSWORD_TOO_WEAK));
        }

        let hash = match self.hasher.hash(&input.password).await {
            Ok(hash) => hash,
            Err(e) => {
                error!(error = %e, code = e.code(), "password hashing failed");
                return Ok(UserResponse::field_error(GENERAL_FIELD, REGISTRATION_FAILED));
            }
        };

        match ctx.users.create_user(&input.username, &hash).await {
            Ok(user) => {
                info!(user_id = user.id, "user_registered");
                Ok(UserResponse::with_user(user))
            }
            Err(AuthError::Conflict) => {
                debug!("username taken");
                Ok(UserResponse::field_error("username", USERNAME_TAKEN))
            }
            Err(e) => {
                error!(error = %e, code = e.code(), "user insert failed");
                Ok(UserResponse::field_error(GENERAL_FIELD, REGISTRATION_FAILED))
            }
        }
    }

    /// Authenticate a user and bind it to the caller's session.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, RequestContext};
    /// use service::auth::domain::UsernamePasswordInput;
    /// use service::auth::repository::mock::MockAuthRepository;
    /// use service::auth::session::mock::MemorySession;
    /// let repo = MockAuthRepository::default();
    /// let session = MemorySession::default();
    /// let ctx = RequestContext::new(&repo, &session);
    /// let svc = AuthService::default();
    /// tokio_test::block_on(svc.register(ctx, UsernamePasswordInput::new("u_e", "Passw0rd"))).unwrap();
    /// let res = tokio_test::block_on(svc.login(ctx, UsernamePasswordInput::new("u_e", "Passw0rd"))).unwrap();
    /// assert_eq!(res.user.unwrap().username, "u_e");
    /// assert!(session.current().is_some());
    /// ```
    #[instrument(skip(self, ctx, input), fields(username = %input.username))]
    pub async fn login(&self, ctx: RequestContext<'_>, input: UsernamePasswordInput) -> Result<UserResponse, AuthError> {
        let Some(creds) = ctx.users.find_user_by_username(&input.username).await? else {
            debug!("unknown username");
            return Ok(UserResponse::field_error("username", USERNAME_UNKNOWN));
        };

        if !self.hasher.verify(&input.password, &creds.password_hash).await? {
            debug!(user_id = creds.user.id, "password mismatch");
            return Ok(UserResponse::field_error("password", PASSWORD_INCORRECT));
        }

        // rotate the id before binding the user
        ctx.session.cycle_id().await?;
        ctx.session.set_user_id(creds.user.id).await?;
        info!(user_id = creds.user.id, "user_logged_in");
        Ok(UserResponse::with_user(creds.user))
    }

    /// The user bound to the caller's session, if any.
    #[instrument(skip(self, ctx))]
    pub async fn me(&self, ctx: RequestContext<'_>) -> Result<Option<AuthUser>, AuthError> {
        let Some(user_id) = ctx.session.user_id().await? else {
            return Ok(None);
        };
        let user = ctx.users.find_user_by_id(user_id).await?;
        if user.is_none() {
            debug!(user_id, "session references a missing user");
        }
        Ok(user)
    }
}
