//! Best-effort conversions from stored values to Rust scalars.
//!
//! Every function returns `None` when the value has no sensible reading as
//! the requested type. Numbers convert between widths with `as`, so
//! narrowing wraps and float-to-integer conversion truncates and saturates.

use crate::value::DataValue;

fn integral(value: &DataValue) -> Option<i64> {
    match value {
        DataValue::Byte(v) => Some(i64::from(*v)),
        DataValue::Short(v) => Some(i64::from(*v)),
        DataValue::Int(v) => Some(i64::from(*v)),
        DataValue::Long(v) => Some(*v),
        _ => None,
    }
}

fn floating(value: &DataValue) -> Option<f64> {
    match value {
        DataValue::Float(v) => Some(f64::from(*v)),
        DataValue::Double(v) => Some(*v),
        _ => None,
    }
}

enum Number {
    Integer(i64),
    Float(f64),
}

fn number(value: &DataValue) -> Option<Number> {
    if let Some(v) = integral(value) {
        return Some(Number::Integer(v));
    }
    if let Some(v) = floating(value) {
        return Some(Number::Float(v));
    }
    let text = value.as_str()?.trim();
    if let Ok(v) = text.parse::<i64>() {
        return Some(Number::Integer(v));
    }
    text.parse::<f64>().ok().map(Number::Float)
}

pub fn as_long(value: &DataValue) -> Option<i64> {
    Some(match number(value)? {
        Number::Integer(v) => v,
        Number::Float(v) => v as i64,
    })
}

pub fn as_int(value: &DataValue) -> Option<i32> {
    Some(match number(value)? {
        Number::Integer(v) => v as i32,
        Number::Float(v) => v as i32,
    })
}

pub fn as_short(value: &DataValue) -> Option<i16> {
    Some(match number(value)? {
        Number::Integer(v) => v as i16,
        Number::Float(v) => v as i16,
    })
}

pub fn as_byte(value: &DataValue) -> Option<i8> {
    Some(match number(value)? {
        Number::Integer(v) => v as i8,
        Number::Float(v) => v as i8,
    })
}

pub fn as_double(value: &DataValue) -> Option<f64> {
    Some(match number(value)? {
        Number::Integer(v) => v as f64,
        Number::Float(v) => v,
    })
}

pub fn as_float(value: &DataValue) -> Option<f32> {
    as_double(value).map(|v| v as f32)
}

pub fn as_boolean(value: &DataValue) -> Option<bool> {
    if let DataValue::Bool(v) = value {
        return Some(*v);
    }
    if let Some(v) = integral(value) {
        return Some(v != 0);
    }
    let text = value.as_str()?.trim();
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

pub fn as_char(value: &DataValue) -> Option<char> {
    match value {
        DataValue::Char(c) => Some(*c),
        DataValue::String(s) => s.chars().next(),
        other => integral(other)
            .and_then(|v| u32::try_from(v).ok())
            .and_then(char::from_u32),
    }
}

/// Renders a scalar. Arrays, lists, maps and views have no string form.
pub fn as_string(value: &DataValue) -> Option<String> {
    Some(match value {
        DataValue::String(s) => s.clone(),
        DataValue::Char(c) => c.to_string(),
        DataValue::Bool(v) => v.to_string(),
        DataValue::Byte(v) => v.to_string(),
        DataValue::Short(v) => v.to_string(),
        DataValue::Int(v) => v.to_string(),
        DataValue::Long(v) => v.to_string(),
        DataValue::Float(v) => v.to_string(),
        DataValue::Double(v) => v.to_string(),
        _ => return None,
    })
}
