//! The identity-resolution boundary.

use cluework_protocol::PlayerId;

/// Maps raw platform handles to stable player identities and answers
/// online/offline queries.
///
/// Implemented by the platform integration layer, not the engine. The arena
/// consults it when taking its eligibility snapshot for role assignment:
/// players the resolver reports offline are skipped even if a leave event for
/// them has not arrived yet.
pub trait IdentityResolver: Send + Sync + 'static {
    /// Resolves a raw connection/session handle to a stable identity.
    fn resolve(&self, raw: &str) -> Option<PlayerId>;

    /// Whether the player is currently connected.
    fn is_online(&self, player: PlayerId) -> bool;
}

/// Resolver that treats every known player as online and parses raw handles
/// as decimal ids. Suitable for tests and single-process demos.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

impl IdentityResolver for AlwaysOnline {
    fn resolve(&self, raw: &str) -> Option<PlayerId> {
        raw.parse().ok().map(PlayerId)
    }

    fn is_online(&self, _player: PlayerId) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_online_parses_decimal_handles() {
        assert_eq!(AlwaysOnline.resolve("17"), Some(PlayerId(17)));
        assert_eq!(AlwaysOnline.resolve("steve"), None);
        assert!(AlwaysOnline.is_online(PlayerId(17)));
    }
}
