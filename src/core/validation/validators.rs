//! Reusable field validators
//!
//! Each validator inspects one (already filtered) field value and returns a
//! human-readable message on failure. Validators that do not apply to a value's
//! JSON type let it pass; pair them with [`string`] or a numeric validator.

use crate::core::field::is_valid_email;
use serde_json::Value;

/// Validator: field is required (not null)
pub fn required() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if value.is_null() {
            Err(format!("{} is required", field))
        } else {
            Ok(())
        }
    }
}

/// Validator: value must be a JSON string
pub fn string() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if value.is_string() {
            Ok(())
        } else {
            Err(format!("{} must be a string", field))
        }
    }
}

/// Validator: string length, in characters, must be within range
pub fn string_length(
    min: usize,
    max: usize,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        if let Some(s) = value.as_str() {
            let len = s.chars().count();
            if len < min || len > max {
                Err(format!(
                    "{} must be between {} and {} characters",
                    field, min, max
                ))
            } else {
                Ok(())
            }
        } else {
            Ok(())
        }
    }
}

/// Validator: string must have at least `min` characters
pub fn min_length(min: usize) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        if let Some(s) = value.as_str() {
            if s.chars().count() < min {
                Err(format!(
                    "{} must be at least {} characters long",
                    field, min
                ))
            } else {
                Ok(())
            }
        } else {
            Ok(())
        }
    }
}

/// Validator: value must be in allowed list (exact, case-sensitive)
pub fn in_list(
    allowed: Vec<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| match value.as_str() {
        Some(s) if allowed.iter().any(|a| a == s) => Ok(()),
        _ => Err(format!("invalid {}", field)),
    }
}

/// Validator: string must look like an email address
pub fn email() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value.as_str() {
        Some(s) if is_valid_email(s) => Ok(()),
        Some(_) => Err(format!("invalid {}", field)),
        None => Ok(()),
    }
}

/// Validator: value must be an integer in `0..=i32::MAX`
///
/// Integral floats (`5.0`) are accepted, fractional ones are not.
pub fn non_negative_integer() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone
{
    |field: &str, value: &Value| {
        let valid = match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => (0..=i64::from(i32::MAX)).contains(&i),
                None => n
                    .as_f64()
                    .is_some_and(|f| f.fract() == 0.0 && (0.0..=f64::from(i32::MAX)).contains(&f)),
            },
            _ => false,
        };
        if valid {
            Ok(())
        } else {
            Err(format!("invalid {}", field))
        }
    }
}

/// Validator: value must be a finite number >= 0
pub fn non_negative_number() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value.as_f64() {
        Some(num) if num.is_finite() && num >= 0.0 => Ok(()),
        _ => Err(format!("invalid {}", field)),
    }
}

/// Validator: number must not exceed maximum
pub fn max_value(max: f64) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        if let Some(num) = value.as_f64() {
            if num > max {
                Err(format!("{} must not exceed {}", field, max))
            } else {
                Ok(())
            }
        } else {
            Ok(())
        }
    }
}
