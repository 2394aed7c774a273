// Response normalization
//
// The backend is inconsistent about collection shapes: some endpoints
// return bare arrays, others a paginated envelope with the items under
// `results`, and a few use a domain key (`categories`, `comments`).
// Everything shape-tolerant lives here; the rest of the workspace only
// ever sees canonical values. These functions never fail -- unparseable
// input degrades to an empty collection or a zero count.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Extract an ordered entity sequence from a collection payload.
///
/// Accepts a bare array, or an object carrying the array under
/// `results` or any of `extra_keys`. Anything else yields an empty
/// sequence.
pub fn entity_list(payload: &Value, extra_keys: &[&str]) -> Vec<Value> {
    match payload {
        Value::Array(items) => items.clone(),
        Value::Object(map) => {
            let candidate = map
                .get("results")
                .or_else(|| extra_keys.iter().find_map(|key| map.get(*key)));
            match candidate {
                Some(Value::Array(items)) => items.clone(),
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}

/// Extract a non-negative count from a count payload, defaulting to 0.
pub fn count(payload: &Value) -> u64 {
    payload
        .get("count")
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

/// Typed layer over [`entity_list`]: elements that fail to deserialize
/// are skipped (with a warning), never propagated.
pub fn parse_list<T: DeserializeOwned>(payload: &Value, extra_keys: &[&str]) -> Vec<T> {
    entity_list(payload, extra_keys)
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(entity) => Some(entity),
            Err(e) => {
                warn!(error = %e, "skipping malformed collection element");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_array_passes_through() {
        let items = entity_list(&json!([1, 2, 3]), &[]);
        assert_eq!(items, vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn results_envelope_is_unwrapped() {
        let items = entity_list(&json!({"count": 3, "results": [1, 2, 3]}), &[]);
        assert_eq!(items, vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn domain_key_is_unwrapped() {
        let items = entity_list(&json!({"categories": [{"id": 1}]}), &["categories"]);
        assert_eq!(items, vec![json!({"id": 1})]);
    }

    #[test]
    fn unknown_shape_yields_empty() {
        assert!(entity_list(&json!({"unexpectedKey": 1}), &[]).is_empty());
        assert!(entity_list(&json!("nope"), &[]).is_empty());
        assert!(entity_list(&json!(null), &[]).is_empty());
    }

    #[test]
    fn count_defaults_to_zero() {
        assert_eq!(count(&json!({"count": 4})), 4);
        assert_eq!(count(&json!({"count": "four"})), 0);
        assert_eq!(count(&json!({})), 0);
        assert_eq!(count(&json!([1, 2])), 0);
    }

    #[test]
    fn parse_list_skips_malformed_elements() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Item {
            id: i64,
        }

        let items: Vec<Item> =
            parse_list(&json!([{"id": 1}, {"id": "bogus"}, {"id": 3}]), &[]);
        assert_eq!(items, vec![Item { id: 1 }, Item { id: 3 }]);
    }
}
