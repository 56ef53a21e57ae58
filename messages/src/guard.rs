//! Privacy boundary for public aggregate payloads.
//!
//! Public voter nodes and point snapshots must never carry nullifiers, proof
//! material, or session tokens. The guard walks the entire payload (nested
//! objects and arrays included) and reports the first forbidden key, so a
//! payload smuggling identity data under a nested wrapper still rejects.

use serde_json::Value;

const FORBIDDEN_PUBLIC_KEYS: &[&str] = &[
    "nullifier",
    "district_hash",
    "constituency_proof",
    "merkle_root",
    "identity",
    "identity_id",
    "voter_id",
    "proof",
    "proof_ref",
    "token",
    "access_token",
    "refresh_token",
    "auth_token",
    "oauth_token",
    "bearer_token",
];

fn is_forbidden_public_key(key: &str) -> bool {
    let normalized = key.to_lowercase();
    if FORBIDDEN_PUBLIC_KEYS.contains(&normalized.as_str()) {
        return true;
    }
    if normalized.starts_with("identity_") || normalized.ends_with("_token") {
        return true;
    }
    normalized.contains("oauth") || normalized.contains("bearer") || normalized.contains("nullifier")
}

/// Return the first forbidden key found anywhere in `value`, if any.
pub fn find_forbidden_field(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                if is_forbidden_public_key(key) {
                    return Some(key.clone());
                }
                if let Some(found) = find_forbidden_field(nested) {
                    return Some(found);
                }
            }
            None
        }
        Value::Array(items) => items.iter().find_map(find_forbidden_field),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clean_payload_passes() {
        let payload = json!({
            "point_id": "p1",
            "agreement": 1,
            "weight": 0.9,
            "updated_at": "2026-02-07T00:00:00.000Z",
        });
        assert_eq!(find_forbidden_field(&payload), None);
    }

    #[test]
    fn every_listed_forbidden_key_rejects() {
        for key in [
            "nullifier",
            "proof_ref",
            "constituency_proof",
            "voter_id",
            "proof",
            "district_hash",
        ] {
            let payload = json!({ key: "x" });
            assert_eq!(find_forbidden_field(&payload), Some(key.to_owned()), "{key}");
        }
    }

    #[test]
    fn nested_and_array_wrapped_keys_reject() {
        let nested = json!({ "meta": { "inner": { "merkle_root": "m" } } });
        assert_eq!(find_forbidden_field(&nested), Some("merkle_root".into()));

        let in_array = json!({ "rows": [{ "ok": 1 }, { "auth_token": "t" }] });
        assert_eq!(find_forbidden_field(&in_array), Some("auth_token".into()));
    }

    #[test]
    fn pattern_keys_reject() {
        for key in [
            "identity_hint",
            "session_token",
            "oauthCredential",
            "BearerValue",
            "user_nullifier_v2",
            "Nullifier",
        ] {
            let payload = json!({ key: "x" });
            assert!(find_forbidden_field(&payload).is_some(), "{key}");
        }
    }

    proptest::proptest! {
        #[test]
        fn forbidden_keys_are_found_at_any_nesting_depth(
            wrappers in proptest::collection::vec("[a-z]{1,8}", 0..6),
        ) {
            let mut payload = json!({ "nullifier": "n1" });
            for key in wrappers {
                payload = json!({ key: payload });
            }
            // Wrapper keys can themselves be forbidden; either way the walk
            // must report something.
            proptest::prop_assert!(find_forbidden_field(&payload).is_some());
        }
    }

    #[test]
    fn benign_lookalikes_pass() {
        for key in ["tokens_total", "approved", "identityless"] {
            let payload = json!({ key: 1 });
            assert_eq!(find_forbidden_field(&payload), None, "{key}");
        }
    }
}
