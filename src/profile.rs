//! Profile response normalization.

use crate::error::{Error, Result};
use serde_json::Value;

/// Bytes per mebibyte
const MIB: f64 = 1024.0 * 1024.0;

/// Quota fields of `user` reported in bytes
pub const QUOTA_FIELDS: [&str; 3] = [
    "sumAssetFilesSize",
    "sumPrivateAssetFilesSize",
    "remainingPrivateQuota",
];

/// Rescale the user's quota fields from bytes to MiB
///
/// Absent or null fields are left as they are. Fails when the body has no
/// `user` object.
pub fn normalize(mut profile: Value) -> Result<Value> {
    let user = profile
        .get_mut("user")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| Error::UnexpectedResponse("profile is None".to_string()))?;

    for field in QUOTA_FIELDS {
        let Some(value) = user.get_mut(field) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        let Some(bytes) = value.as_f64() else {
            tracing::warn!(field, value = %value, "quota field is not a number, leaving as is");
            continue;
        };
        *value = Value::from(bytes / MIB);
    }

    Ok(profile)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn one_mebibyte_becomes_one() {
        let out = normalize(json!({"user": {"sumAssetFilesSize": 1048576}})).unwrap();
        assert_eq!(out["user"]["sumAssetFilesSize"], json!(1.0));
    }

    #[test]
    fn all_three_fields_are_scaled() {
        let out = normalize(json!({
            "user": {
                "sumAssetFilesSize": 3 * 1048576,
                "sumPrivateAssetFilesSize": 524288,
                "remainingPrivateQuota": 10_737_418_240_u64,
                "id": 42
            }
        }))
        .unwrap();

        assert_eq!(out["user"]["sumAssetFilesSize"], json!(3.0));
        assert_eq!(out["user"]["sumPrivateAssetFilesSize"], json!(0.5));
        assert_eq!(out["user"]["remainingPrivateQuota"], json!(10240.0));
        assert_eq!(out["user"]["id"], 42, "unrelated fields untouched");
    }

    #[test]
    fn absent_field_is_not_materialized() {
        let out = normalize(json!({"user": {"email": "a@b.c"}})).unwrap();
        let user = out["user"].as_object().unwrap();
        assert!(!user.contains_key("sumAssetFilesSize"));
    }

    #[test]
    fn null_field_stays_null() {
        let out = normalize(json!({"user": {"remainingPrivateQuota": null}})).unwrap();
        assert!(out["user"]["remainingPrivateQuota"].is_null());
    }

    #[test]
    fn top_level_keys_are_preserved() {
        let out = normalize(json!({"user": {}, "canEditAllAssets": true})).unwrap();
        assert_eq!(out["canEditAllAssets"], true);
    }

    #[test]
    fn missing_or_null_user_is_an_error() {
        for body in [json!({}), json!({"user": null}), json!([1, 2])] {
            let err = normalize(body).unwrap_err();
            assert_eq!(err.to_string(), "profile is None");
        }
    }
}
