//! Session token generation.

use argon2::password_hash::rand_core::{OsRng, RngCore};

use authgate_core::types::SessionId;
use authgate_core::types::session::SESSION_ID_BYTES;

/// Draws a fresh session id from the operating system CSPRNG.
pub fn generate() -> SessionId {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    SessionId::from_random_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique_and_parseable() {
        let ids: HashSet<_> = (0..256).map(|_| generate()).collect();
        assert_eq!(ids.len(), 256);
        for id in &ids {
            assert_eq!(SessionId::parse(id.as_str()).as_ref(), Some(id));
        }
    }
}
