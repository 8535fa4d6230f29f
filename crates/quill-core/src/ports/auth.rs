//! Identity ports - who is making the request.

use uuid::Uuid;

use crate::domain::User;

/// Role granting editorial rights.
pub const ROLE_STAFF: &str = "staff";
/// Role granting every right.
pub const ROLE_SUPERUSER: &str = "superuser";

/// Claims stored in JWT tokens.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub exp: i64,
}

/// Token service trait for JWT operations.
pub trait TokenService: Send + Sync {
    /// Generate an access token for a user.
    fn generate_token(
        &self,
        user_id: Uuid,
        username: &str,
        email: &str,
        roles: Vec<String>,
    ) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of freshly generated tokens.
    fn expiration_seconds(&self) -> i64;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,
}

/// An authenticated account as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Identity {
    /// Local mirror row for this identity.
    pub fn to_user(&self) -> User {
        let mut user = User::new(self.user_id, self.username.clone(), self.email.clone());
        user.is_staff = self.is_staff;
        user.is_superuser = self.is_superuser;
        user
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        let has_role = |role: &str| claims.roles.iter().any(|r| r == role);
        Self {
            is_staff: has_role(ROLE_STAFF),
            is_superuser: has_role(ROLE_SUPERUSER),
            user_id: claims.user_id,
            username: claims.username,
            email: claims.email,
        }
    }
}

/// The party behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Requester {
    #[default]
    Anonymous,
    Authenticated(Identity),
}

impl Requester {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Requester::Anonymous => None,
            Requester::Authenticated(identity) => Some(identity),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }

    pub fn is_staff(&self) -> bool {
        self.identity().is_some_and(|i| i.is_staff)
    }

    pub fn is_superuser(&self) -> bool {
        self.identity().is_some_and(|i| i.is_superuser)
    }
}

impl From<Option<Identity>> for Requester {
    fn from(identity: Option<Identity>) -> Self {
        identity.map_or(Requester::Anonymous, Requester::Authenticated)
    }
}
