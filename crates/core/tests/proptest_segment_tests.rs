//! Property-based tests for path-segment hardening.
//!
//! Whatever a user types as candidate or version, every path the store builds
//! must stay inside its namespace directory.

use proptest::prelude::*;
use sdkup_core::{Sdk, VersionStore, validate_segment};
use std::path::{Component, Path};

/// Arbitrary strings biased towards traversal attempts.
fn hostile_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just(".".to_string()),
        Just("..".to_string()),
        Just("current".to_string()),
        "(\\.\\./){1,3}[a-z]{1,5}".prop_map(String::from),
        "[a-z]{0,4}[/\\\\][a-z]{0,4}".prop_map(String::from),
        "\\PC{0,12}".prop_map(String::from),
    ]
}

/// Versions as catalogs publish them.
fn version_strategy() -> impl Strategy<Value = String> {
    "[0-9]{1,2}(\\.[0-9]{1,2}){0,2}(-[a-z]{2,5})?".prop_map(String::from)
}

proptest! {
    #[test]
    fn store_paths_never_escape_namespace(candidate in hostile_strategy(), version in hostile_strategy()) {
        let store = VersionStore::new("/sdk");
        let sdk = Sdk::new(candidate, version);
        if let Ok(dir) = store.version_dir(&sdk) {
            let relative = dir.strip_prefix(Path::new("/sdk/candidates")).unwrap();
            prop_assert_eq!(relative.components().count(), 2);
            prop_assert!(relative.components().all(|c| matches!(c, Component::Normal(_))));
        }
    }

    #[test]
    fn accepted_segments_are_single_normal_components(value in hostile_strategy()) {
        if validate_segment("version", &value).is_ok() {
            let components: Vec<_> = Path::new(&value).components().collect();
            prop_assert_eq!(components.len(), 1);
            prop_assert!(matches!(components[0], Component::Normal(_)));
        }
    }

    #[test]
    fn published_versions_are_accepted(version in version_strategy()) {
        prop_assert!(validate_segment("version", &version).is_ok());
        let store = VersionStore::new("/sdk");
        prop_assert!(store.version_dir(&Sdk::new("java", version)).is_ok());
    }
}
