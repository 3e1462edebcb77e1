//! Property tests for object key handling and collaborator names

use proptest::prelude::*;

use pium::backend::instagram::normalize_collaborators;
use pium::backend::storage::handlers::sanitize_prefix;
use pium::backend::storage::object_store::validate_key;

proptest! {
    #[test]
    fn prop_sanitized_prefix_is_a_valid_key_prefix(raw in "\\PC{0,60}") {
        let prefix = sanitize_prefix(Some(raw.as_str()), "uploads");

        prop_assert!(!prefix.is_empty());
        prop_assert!(!prefix.starts_with('/') && !prefix.ends_with('/'));
        prop_assert!(prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '/')));
        let key = format!("{prefix}/photo.jpg");
        prop_assert!(validate_key(&key).is_ok());
    }

    #[test]
    fn prop_traversal_keys_rejected(
        head in "[a-z]{1,8}",
        tail in "[a-z]{1,8}",
    ) {
        let traversal = format!("{head}/../{tail}.jpg");
        let absolute = format!("/{head}/{tail}.jpg");
        prop_assert!(validate_key(&traversal).is_err());
        prop_assert!(validate_key(&absolute).is_err());
    }

    #[test]
    fn prop_collaborators_lose_at_sign(
        names in prop::collection::vec("@?[a-z0-9._]{1,20}", 0..=3),
    ) {
        let normalized = normalize_collaborators(Some(names.as_slice()))
            .expect("up to three names are accepted");

        prop_assert_eq!(normalized.len(), names.len());
        for (clean, raw) in normalized.iter().zip(&names) {
            prop_assert!(!clean.starts_with('@'));
            prop_assert_eq!(clean.as_str(), raw.trim_start_matches('@'));
        }
    }

    #[test]
    fn prop_more_than_three_collaborators_rejected(
        names in prop::collection::vec("[a-z]{1,10}", 4..10),
    ) {
        prop_assert!(normalize_collaborators(Some(names.as_slice())).is_err());
    }
}
