use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::{self, Action, Applied, StoreError};
use serde::de::DeserializeOwned;
use serde_json::json;

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    let v = req
        .params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))?;
    if v.is_empty() {
        return Err(err(
            &req.id,
            "bad_params",
            format!("{} must not be empty", key),
            None,
        ));
    }
    Ok(v)
}

pub fn optional_str(req: &Request, key: &str) -> Result<Option<String>, serde_json::Value> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => {
            let Some(s) = v.as_str() else {
                return Err(err(
                    &req.id,
                    "bad_params",
                    format!("{} must be string or null", key),
                    None,
                ));
            };
            let t = s.trim();
            Ok(if t.is_empty() { None } else { Some(t.to_string()) })
        }
    }
}

pub fn required_f64(req: &Request, key: &str) -> Result<f64, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("{} must be a number", key),
                None,
            )
        })
}

pub fn optional_limit(req: &Request, default: usize) -> Result<usize, serde_json::Value> {
    match req.params.get("limit") {
        None => Ok(default),
        Some(v) if v.is_null() => Ok(default),
        Some(v) => v.as_u64().map(|n| n as usize).ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                "limit must be a non-negative integer",
                Some(json!({ "limit": v })),
            )
        }),
    }
}

/// Lower-cased `params.search`, if any. Surrounding spaces are part of the
/// needle; only an empty string means "no filter".
pub fn search_needle(req: &Request) -> Result<Option<String>, serde_json::Value> {
    match req.params.get("search") {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => match v.as_str() {
            Some("") => Ok(None),
            Some(s) => Ok(Some(s.to_lowercase())),
            None => Err(err(&req.id, "bad_params", "search must be string or null", None)),
        },
    }
}

/// Deserializes `params[key]` (or the whole params object when `key` is None).
pub fn parse_params<T: DeserializeOwned>(
    req: &Request,
    key: Option<&str>,
) -> Result<T, serde_json::Value> {
    let raw = match key {
        Some(k) => match req.params.get(k) {
            Some(v) if v.is_object() => v.clone(),
            _ => {
                return Err(err(
                    &req.id,
                    "bad_params",
                    format!("missing/invalid {}", k),
                    None,
                ))
            }
        },
        None if req.params.is_null() => json!({}),
        None => req.params.clone(),
    };
    serde_json::from_value(raw).map_err(|e| err(&req.id, "bad_params", e.to_string(), None))
}

pub fn store_err(req: &Request, e: StoreError) -> serde_json::Value {
    let details = match &e {
        StoreError::NotFound { entity, id } | StoreError::DuplicateId { entity, id } => {
            Some(json!({ "entity": entity, "id": id }))
        }
        StoreError::InvalidField { field, .. } => Some(json!({ "field": field })),
        StoreError::AlreadyGraded(id) => Some(json!({ "submissionId": id })),
    };
    err(&req.id, e.code(), e.to_string(), details)
}

/// Runs `action` through the reducer and swaps in the new snapshot on success.
/// `id_key` names the id field in the reply for created entities.
pub fn dispatch(
    state: &mut AppState,
    req: &Request,
    action: Action,
    id_key: &str,
) -> serde_json::Value {
    match store::reduce(&state.snapshot, action) {
        Ok((next, applied)) => {
            state.snapshot = next;
            tracing::info!(method = %req.method, ?applied, "applied");
            let result = match applied {
                Applied::Created { id } => json!({ id_key: id }),
                Applied::Updated { .. } => json!({ "ok": true }),
                Applied::Deleted { cascaded, .. } => json!({ "ok": true, "cascaded": cascaded }),
            };
            ok(&req.id, result)
        }
        Err(e) => {
            tracing::debug!(method = %req.method, error = %e, "rejected");
            store_err(req, e)
        }
    }
}
