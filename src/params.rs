//! Typed accessors over the `arguments` object of a `tools/call` request.
//!
//! Every failure here is a caller mistake and is reported back as a
//! tool-level error result, never as a JSON-RPC error.

use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 30;
pub const MAX_PER_PAGE: i64 = 100;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("missing required parameter: {0}")]
    Missing(String),
    #[error("parameter {name} is not of type {expected}")]
    WrongType { name: String, expected: &'static str },
    #[error("parameter {name} must be an integer")]
    NotInteger { name: String },
    #[error("parameter {name} {reason}")]
    Invalid { name: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

fn lookup<'a>(args: &'a Value, name: &str) -> Option<&'a Value> {
    args.get(name).filter(|v| !v.is_null())
}

pub fn required_str(args: &Value, name: &str) -> Result<String, ParamError> {
    match lookup(args, name) {
        None => Err(ParamError::Missing(name.to_string())),
        Some(Value::String(s)) if s.is_empty() => Err(ParamError::Missing(name.to_string())),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ParamError::WrongType {
            name: name.to_string(),
            expected: "string",
        }),
    }
}

pub fn optional_str(args: &Value, name: &str) -> Result<Option<String>, ParamError> {
    match lookup(args, name) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ParamError::WrongType {
            name: name.to_string(),
            expected: "string",
        }),
    }
}

fn as_int(name: &str, v: &Value) -> Result<i64, ParamError> {
    let Value::Number(n) = v else {
        return Err(ParamError::WrongType {
            name: name.to_string(),
            expected: "number",
        });
    };
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    // MCP clients frequently send integers as floats (42.0).
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
        _ => Err(ParamError::NotInteger {
            name: name.to_string(),
        }),
    }
}

/// Zero counts as missing.
pub fn required_int(args: &Value, name: &str) -> Result<i64, ParamError> {
    let v = lookup(args, name).ok_or_else(|| ParamError::Missing(name.to_string()))?;
    match as_int(name, v)? {
        0 => Err(ParamError::Missing(name.to_string())),
        i => Ok(i),
    }
}

pub fn optional_int_with_default(args: &Value, name: &str, default: i64) -> Result<i64, ParamError> {
    match lookup(args, name) {
        None => Ok(default),
        Some(v) => as_int(name, v),
    }
}

/// Reads `page` and `perPage`.
pub fn optional_pagination(args: &Value) -> Result<Pagination, ParamError> {
    let page = optional_int_with_default(args, "page", DEFAULT_PAGE)?;
    if page < 1 {
        return Err(ParamError::Invalid {
            name: "page".into(),
            reason: "must be at least 1".into(),
        });
    }
    let per_page = optional_int_with_default(args, "perPage", DEFAULT_PER_PAGE)?;
    if !(1..=MAX_PER_PAGE).contains(&per_page) {
        return Err(ParamError::Invalid {
            name: "perPage".into(),
            reason: format!("must be between 1 and {}", MAX_PER_PAGE),
        });
    }
    Ok(Pagination { page, per_page })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_str_rejects_missing_empty_and_wrong_type() {
        let args = json!({"org": "octo", "empty": "", "n": 3, "nil": null});
        assert_eq!(required_str(&args, "org").unwrap(), "octo");
        assert_eq!(
            required_str(&args, "absent").unwrap_err().to_string(),
            "missing required parameter: absent"
        );
        assert_eq!(
            required_str(&args, "empty").unwrap_err(),
            ParamError::Missing("empty".into())
        );
        assert_eq!(
            required_str(&args, "nil").unwrap_err(),
            ParamError::Missing("nil".into())
        );
        assert_eq!(
            required_str(&args, "n").unwrap_err().to_string(),
            "parameter n is not of type string"
        );
    }

    #[test]
    fn optional_str_allows_absence() {
        let args = json!({"state": "open", "bad": true});
        assert_eq!(optional_str(&args, "state").unwrap().as_deref(), Some("open"));
        assert_eq!(optional_str(&args, "missing").unwrap(), None);
        assert!(optional_str(&args, "bad").is_err());
    }

    #[test]
    fn required_int_accepts_integral_floats() {
        let args = json!({"a": 42, "b": 42.0, "c": 4.5, "z": 0, "s": "42"});
        assert_eq!(required_int(&args, "a").unwrap(), 42);
        assert_eq!(required_int(&args, "b").unwrap(), 42);
        assert_eq!(
            required_int(&args, "c").unwrap_err(),
            ParamError::NotInteger { name: "c".into() }
        );
        assert_eq!(required_int(&args, "z").unwrap_err(), ParamError::Missing("z".into()));
        assert!(matches!(
            required_int(&args, "s").unwrap_err(),
            ParamError::WrongType { .. }
        ));
    }

    #[test]
    fn pagination_defaults_and_bounds() {
        assert_eq!(optional_pagination(&json!({})).unwrap(), Pagination::default());
        assert_eq!(
            optional_pagination(&json!({"page": 2, "perPage": 50})).unwrap(),
            Pagination {
                page: 2,
                per_page: 50
            }
        );
        assert!(optional_pagination(&json!({"perPage": 0})).is_err());
        assert!(optional_pagination(&json!({"perPage": 101})).is_err());
        assert_eq!(
            optional_pagination(&json!({"page": 0})).unwrap_err().to_string(),
            "parameter page must be at least 1"
        );
    }
}
