//! Opaque text-id generation for new rows.
//!
//! Every persisted entity keys on a random alphanumeric text id, matching
//! the id shape the identity provider uses for the rows it owns.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of generated ids in characters.
pub const ID_LENGTH: usize = 24;

/// Generates a random alphanumeric id of [`ID_LENGTH`] characters.
pub fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_length() {
        assert_eq!(generate_id().len(), ID_LENGTH);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_ids_are_alphanumeric() {
        assert!(generate_id().chars().all(char::is_alphanumeric));
    }
}
