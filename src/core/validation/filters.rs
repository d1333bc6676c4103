//! Reusable field filters
//!
//! These filters normalize field values before validation

use anyhow::Result;
use serde_json::{Number, Value, json};

/// Filter: trim whitespace from string
pub fn trim() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| {
        if let Some(s) = value.as_str() {
            Ok(Value::String(s.trim().to_string()))
        } else {
            Ok(value)
        }
    }
}

/// Filter: parse numeric strings (`"12"`, `" 9.99 "`) into JSON numbers
///
/// Strings that do not parse are left alone for the validators to reject.
pub fn numeric_string() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| {
        let Some(s) = value.as_str() else {
            return Ok(value);
        };
        let s = s.trim();
        if let Ok(i) = s.parse::<i64>() {
            return Ok(Value::Number(i.into()));
        }
        match s.parse::<f64>().ok().and_then(Number::from_f64) {
            Some(n) => Ok(Value::Number(n)),
            None => Ok(value),
        }
    }
}

/// Filter: turn integral floats (`5.0`) into integers
pub fn integral() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| match value.as_f64() {
        Some(f) if value.is_f64() && f.fract() == 0.0 && f.abs() < 9.0e15 => {
            Ok(json!(f as i64))
        }
        _ => Ok(value),
    }
}

/// Filter: round number to specified decimal places
///
/// Negative numbers pass through unrounded so that a sign check still sees them.
pub fn round_decimals(
    decimals: u32,
) -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    move |_: &str, value: Value| match value.as_f64() {
        Some(num) if value.is_f64() && num >= 0.0 => {
            let factor = 10_f64.powi(decimals as i32);
            let rounded = (num * factor).round() / factor;
            Ok(json!(rounded))
        }
        _ => Ok(value),
    }
}
