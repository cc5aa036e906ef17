//! Loosely typed form values
//!
//! Onboarding answers reach the engine as whatever the form produced: select
//! and radio inputs give strings, numeric inputs may give numbers or text,
//! and unanswered fields are missing or null. Every coercion in this module is
//! total. A value that cannot be read yields `None`, never an error.

use serde::{Deserialize, Serialize};

/// A single form field value of unknown shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<FieldValue>),
    /// Anything else (objects); never contributes to a score
    Other(serde_json::Value),
}

impl FieldValue {
    /// Borrow the value as text, if it is a string
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Leading-integer parse
    ///
    /// Text is read up to the first non-digit after an optional sign, so
    /// `"3 times"` reads as 3. Numbers are truncated toward zero.
    pub fn parse_int(&self) -> Option<i64> {
        match self {
            FieldValue::Number(n) if n.is_finite() => Some(n.trunc() as i64),
            FieldValue::Text(s) => leading_int(s),
            _ => None,
        }
    }

    /// Leading-decimal parse (`"6.5h"` reads as 6.5); result is always finite
    pub fn parse_float(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) if n.is_finite() => Some(*n),
            FieldValue::Text(s) => leading_float(s),
            _ => None,
        }
    }

    /// Whole-value numeric conversion
    ///
    /// Unlike [`parse_float`](Self::parse_float), trailing text makes the
    /// value unreadable. Blank text is treated as absent.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) if n.is_finite() => Some(*n),
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
            }
            _ => None,
        }
    }

    /// The value, unless it is an empty answer
    ///
    /// Forms submit an untouched numeric field as `0` and an untouched text
    /// field as `""`; both mean the question was skipped, as do `false` and
    /// `null`. Text `"0"` is a typed answer and is kept.
    pub fn filled(&self) -> Option<&Self> {
        let blank = match self {
            FieldValue::Bool(b) => !b,
            FieldValue::Number(n) => *n == 0.0 || n.is_nan(),
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(_) => false,
            FieldValue::Other(v) => v.is_null(),
        };
        if blank {
            None
        } else {
            Some(self)
        }
    }

    /// Text items of a list value; non-list values have none
    pub fn text_items(&self) -> Vec<&str> {
        match self {
            FieldValue::List(items) => items.iter().filter_map(FieldValue::as_text).collect(),
            _ => Vec::new(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

/// Length of an optional sign followed by a run of ASCII digits
fn sign_and_digits(s: &str) -> (usize, usize) {
    let bytes = s.as_bytes();
    let sign = usize::from(matches!(bytes.first(), Some(b'+') | Some(b'-')));
    let digits = bytes[sign..].iter().take_while(|b| b.is_ascii_digit()).count();
    (sign, digits)
}

fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = sign_and_digits(s);
    if digits == 0 {
        return None;
    }
    let negative = s.starts_with('-');
    match s[..sign + digits].parse::<i64>() {
        Ok(n) => Some(n),
        // Overflow saturates rather than discarding the answer
        Err(_) if negative => Some(i64::MIN),
        Err(_) => Some(i64::MAX),
    }
}

fn leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let (sign, int_digits) = sign_and_digits(s);
    let mut end = sign + int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = bytes[end + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        end += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    // Exponent only counts when it carries digits
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let (exp_sign, exp_digits) = sign_and_digits(&s[end + 1..]);
        if exp_digits > 0 {
            end += 1 + exp_sign + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_from_text() {
        assert_eq!(FieldValue::from("2").parse_int(), Some(2));
        assert_eq!(FieldValue::from("  12 days").parse_int(), Some(12));
        assert_eq!(FieldValue::from("-3").parse_int(), Some(-3));
        assert_eq!(FieldValue::from("2.9").parse_int(), Some(2));
        assert_eq!(FieldValue::from("abc").parse_int(), None);
        assert_eq!(FieldValue::from("").parse_int(), None);
        assert_eq!(FieldValue::from("-").parse_int(), None);
    }

    #[test]
    fn test_parse_int_from_number() {
        assert_eq!(FieldValue::from(5.0).parse_int(), Some(5));
        assert_eq!(FieldValue::from(5.7).parse_int(), Some(5));
        assert_eq!(FieldValue::Number(f64::NAN).parse_int(), None);
        assert_eq!(FieldValue::Bool(true).parse_int(), None);
    }

    #[test]
    fn test_parse_int_saturates() {
        assert_eq!(
            FieldValue::from("99999999999999999999999").parse_int(),
            Some(i64::MAX)
        );
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(FieldValue::from("6.5").parse_float(), Some(6.5));
        assert_eq!(FieldValue::from("6.5 hours").parse_float(), Some(6.5));
        assert_eq!(FieldValue::from(".5").parse_float(), Some(0.5));
        assert_eq!(FieldValue::from("8.").parse_float(), Some(8.0));
        assert_eq!(FieldValue::from("1e1").parse_float(), Some(10.0));
        assert_eq!(FieldValue::from("7e").parse_float(), Some(7.0));
        assert_eq!(FieldValue::from("Infinity").parse_float(), None);
        assert_eq!(FieldValue::from("about 7").parse_float(), None);
        assert_eq!(FieldValue::from(".").parse_float(), None);
    }

    #[test]
    fn test_to_number_requires_whole_value() {
        assert_eq!(FieldValue::from(" 72 ").to_number(), Some(72.0));
        assert_eq!(FieldValue::from("72bpm").to_number(), None);
        assert_eq!(FieldValue::from("   ").to_number(), None);
        assert_eq!(FieldValue::from(0.0).to_number(), Some(0.0));
    }

    #[test]
    fn test_filled_skips_empty_answers() {
        assert_eq!(FieldValue::Number(0.0).filled(), None);
        assert_eq!(FieldValue::from("").filled(), None);
        assert_eq!(FieldValue::Bool(false).filled(), None);
        assert_eq!(FieldValue::Other(serde_json::Value::Null).filled(), None);
        assert_eq!(
            FieldValue::from("0").filled(),
            Some(&FieldValue::from("0"))
        );
        assert_eq!(FieldValue::from(72.0).filled(), Some(&FieldValue::from(72.0)));
    }

    #[test]
    fn test_deserialize_loose_shapes() {
        let values: Vec<FieldValue> =
            serde_json::from_str(r#"[true, 3, "yes", ["a", 1], {"k": 1}]"#).unwrap();
        assert_eq!(values[0], FieldValue::Bool(true));
        assert_eq!(values[1], FieldValue::Number(3.0));
        assert_eq!(values[2].as_text(), Some("yes"));
        assert_eq!(values[3].text_items(), vec!["a"]);
        assert!(matches!(values[4], FieldValue::Other(_)));
    }
}
