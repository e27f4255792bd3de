//! Cache key builders for AuthGate cache entries.

/// Namespace applied to session keys.
const SESSION_NS: &str = "session";

/// Cache key for a session record by token.
pub fn session(token: &str) -> String {
    format!("{SESSION_NS}:{token}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key() {
        assert_eq!(session("abc"), "session:abc");
    }
}
