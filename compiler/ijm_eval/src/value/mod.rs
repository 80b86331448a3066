//! Runtime values.
//!
//! A value holds exactly one of a number, a text string or an array of
//! values. The enum is the only way to build one, so a value can never carry
//! two payloads at once.

use std::fmt;


/// A runtime value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Array(Vec<Value>),
}

impl Value {
    /// Boolean as the language represents it (1 or 0).
    #[inline]
    pub fn boolean(b: bool) -> Self {
        Value::Number(if b { 1.0 } else { 0.0 })
    }

    /// Numeric view: text is parsed, unparsable text and arrays are NaN.
    pub fn as_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Text(s) => parse_number(s),
            Value::Array(_) => f64::NAN,
        }
    }

    /// Text view: numbers use the default number format, arrays are
    /// comma-separated.
    pub fn as_text(&self) -> String {
        match self {
            Value::Number(n) => n2s(*n),
            Value::Text(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(Value::as_text)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Name of the payload kind, for dumps and diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Text(_) => "string",
            Value::Array(_) => "array",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Number(0.0)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

/// Parse text as a number; surrounding whitespace is ignored, failures are NaN.
pub fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return i64::from_str_radix(hex, 16).map_or(f64::NAN, |n| n as f64);
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Default number format.
///
/// Integral values below 1e9 in magnitude print without decimals. Other
/// values print with up to four decimals, switching to scientific notation
/// below 1e-4 or at 1e9 and above. Trailing zeros are dropped.
pub fn n2s(n: f64) -> String {
    if let Some(special) = non_finite(n) {
        return special.to_string();
    }
    if n == n.trunc() && n.abs() < 1e9 {
        // `as i64` also folds -0 into 0
        return (n as i64).to_string();
    }
    let magnitude = n.abs();
    if magnitude < 1e-4 || magnitude >= 1e9 {
        let formatted = format!("{n:.4E}");
        match formatted.split_once('E') {
            Some((mantissa, exponent)) => format!("{}E{exponent}", trim_zeros(mantissa)),
            None => formatted,
        }
    } else {
        trim_zeros(&format!("{n:.4}")).to_string()
    }
}

/// Fixed-decimal format; a negative `decimals` selects scientific notation
/// with that many mantissa digits.
pub fn d2s(n: f64, decimals: i32) -> String {
    if let Some(special) = non_finite(n) {
        return special.to_string();
    }
    let digits = decimals.unsigned_abs().min(9) as usize;
    if decimals < 0 {
        format!("{n:.digits$E}")
    } else {
        format!("{n:.digits$}")
    }
}

fn non_finite(n: f64) -> Option<&'static str> {
    if n.is_nan() {
        Some("NaN")
    } else if n == f64::INFINITY {
        Some("Infinity")
    } else if n == f64::NEG_INFINITY {
        Some("-Infinity")
    } else {
        None
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
