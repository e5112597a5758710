use thiserror::Error;

/// Failures from the movie-metadata upstream.
///
/// Results carrying this error cross task boundaries as messages, so the
/// type stays `Clone` and keeps only printable payloads.
#[derive(Debug, Clone, Error)]
pub enum TmdbError {
    #[error("network error: {0}")]
    Network(String),

    #[error("failed to parse upstream response: {0}")]
    Parse(String),

    #[error("rate limited by upstream")]
    RateLimit,

    #[error("invalid or missing API key")]
    Unauthorized,

    #[error("upstream returned HTTP {0}")]
    Status(u16),
}

/// Failures from the hosted identity/document provider.
///
/// Every variant maps to a user-visible status message in the profile
/// flows; nothing here is fatal to the process.
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email is already registered")]
    EmailInUse,

    #[error("password is too weak")]
    WeakPassword,

    #[error("recent sign-in required before this operation")]
    RequiresRecentLogin,

    #[error("no signed-in user")]
    NotSignedIn,

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to parse provider response: {0}")]
    Parse(String),

    #[error("provider rejected the request: {0}")]
    Provider(String),
}
