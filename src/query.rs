//! Parameter translation: generic parameter bag to a typed query.
//!
//! The host protocol is untyped, so listen commands carry their query
//! refinements as a loose string-keyed map. [`translate`] turns that
//! map into a [`QueryDescription`] the store client can consume. It is
//! pure and deterministic: no client calls, no state, identical input
//! always yields an identical description.
//!
//! Rules apply independently and in a fixed order, each one a narrowing
//! refinement of the query being built: orderBy, startAt, endAt,
//! equalTo, limit.

use crate::error::{BridgeError, Result};
use crate::types::{Bound, EqualityFilter, OrderBy, QueryDescription, ScalarValue};
use serde_json::{Map, Value};

/// Build a [`QueryDescription`] for `collection_path` from a protocol
/// parameter map.
///
/// Fails with [`BridgeError::InvalidParameter`] when a required
/// companion key is missing (`orderByKey` for `orderBy == "key"`,
/// `equalToKey` for `equalTo`), when a `*Key` companion is not a
/// string, when a bound or filter value has no scalar coercion, or
/// when `limit` is not an unsigned integer. The protocol is untyped,
/// so all of this is validated defensively rather than assumed.
pub fn translate(
    collection_path: &str,
    parameters: Option<&Map<String, Value>>,
) -> Result<QueryDescription> {
    let mut description = QueryDescription::collection(collection_path);
    let Some(parameters) = parameters else {
        return Ok(description);
    };

    if parameters.get("orderBy").and_then(Value::as_str) == Some("key") {
        let field = companion_key(parameters, "orderByKey")?
            .ok_or_else(|| missing("orderByKey", "orderBy"))?;
        description.order_by = Some(OrderBy {
            field,
            direction: Default::default(),
        });
    }

    if let Some(start_at) = parameters.get("startAt") {
        description.start_bound = Some(Bound {
            value: scalar("startAt", start_at)?,
            key: companion_key(parameters, "startAtKey")?,
        });
    }

    if let Some(end_at) = parameters.get("endAt") {
        description.end_bound = Some(Bound {
            value: scalar("endAt", end_at)?,
            key: companion_key(parameters, "endAtKey")?,
        });
    }

    if let Some(equal_to) = parameters.get("equalTo") {
        let field = companion_key(parameters, "equalToKey")?
            .ok_or_else(|| missing("equalToKey", "equalTo"))?;
        description.equality_filter = Some(EqualityFilter {
            field,
            value: scalar("equalTo", equal_to)?,
        });
    }

    if let Some(limit) = parameters.get("limit") {
        let limit = limit
            .as_u64()
            .ok_or_else(|| BridgeError::InvalidParameter("limit must be an unsigned integer".into()))?;
        description.limit = Some(limit);
    }

    Ok(description)
}

/// Three-way kind dispatch for comparison values.
///
/// Booleans and strings pass through; everything else is coerced to
/// `f64`. The coercion is deliberately lossy (large integers lose
/// precision) because the original protocol's numeric representation
/// is a double, and wire compatibility wins over exactness.
fn scalar(name: &str, value: &Value) -> Result<ScalarValue> {
    match value {
        Value::Bool(b) => Ok(ScalarValue::Bool(*b)),
        Value::String(s) => Ok(ScalarValue::Str(s.clone())),
        other => other.as_f64().map(ScalarValue::Number).ok_or_else(|| {
            BridgeError::InvalidParameter(format!("{name} must be a boolean, string, or number"))
        }),
    }
}

/// Read an optional `*Key` companion; present but non-string is an
/// error, absent is fine.
fn companion_key(parameters: &Map<String, Value>, name: &str) -> Result<Option<String>> {
    match parameters.get(name) {
        None => Ok(None),
        Some(Value::String(key)) => Ok(Some(key.clone())),
        Some(_) => Err(BridgeError::InvalidParameter(format!(
            "{name} must be a string"
        ))),
    }
}

fn missing(companion: &str, primary: &str) -> BridgeError {
    BridgeError::InvalidParameter(format!("{companion} is required with {primary}"))
}
