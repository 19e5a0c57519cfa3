//! Authentication hook for resolving callers.
//!
//! Gamenight doesn't parse requests itself. Whatever sits in front of it
//! (an HTTP router, a CLI, a test) pulls a token out of the request and
//! asks an [`Authenticator`] who it belongs to. [`PlayerService`]
//! implements it against stored token digests; tests can swap in a
//! fixed mapping without touching any service code.
//!
//! [`PlayerService`]: crate::PlayerService

use gamenight_domain::PlayerId;

use crate::PlayerError;

/// Resolves a raw session token to the player it was issued to.
///
/// # Trait bounds
///
/// - `Send + Sync` → one authenticator is shared by every request
///   handler, possibly on different worker threads.
/// - `'static` → it lives as long as the application.
///
/// # Example
///
/// ```rust
/// use gamenight_domain::PlayerId;
/// use gamenight_player::{Authenticator, PlayerError};
///
/// /// Treats the token as a numeric player id. Tests only.
/// struct FixedAuthenticator;
///
/// impl Authenticator for FixedAuthenticator {
///     async fn authenticate(&self, token: &str) -> Result<PlayerId, PlayerError> {
///         token
///             .parse()
///             .map(PlayerId)
///             .map_err(|_| PlayerError::NotLoggedIn)
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Returns the owner of `token`.
    ///
    /// # Errors
    /// [`PlayerError::NotLoggedIn`] if no logged-in player holds it.
    fn authenticate(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<PlayerId, PlayerError>> + Send;
}

/// Extracts the token from an `Authorization` header value of the form
/// `Bearer <token>`. The scheme is matched case-insensitively.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_extracts_token() {
        assert_eq!(bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(bearer_token("bearer   abc123 "), Some("abc123"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token("Basic abc123"), None);
        assert_eq!(bearer_token("abc123"), None);
        assert_eq!(bearer_token("Bearer "), None);
    }
}
