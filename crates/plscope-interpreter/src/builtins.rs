//! Builtin functions over scalar arguments

use std::cmp::Ordering;

use crate::{RuntimeError, Value};

fn expect_args(name: &str, args: &[Value], min: usize, max: usize) -> Result<(), RuntimeError> {
    if (min..=max).contains(&args.len()) {
        Ok(())
    } else {
        Err(RuntimeError::ArityMismatch {
            name: name.to_string(),
            expected: min,
            found: args.len(),
        })
    }
}

pub(crate) fn call_builtin(name: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
    match name {
        "TO_NUMBER" => {
            expect_args(name, &args, 1, 2)?;
            Ok(args[0].to_number()?.map_or(Value::Null, Value::Number))
        }
        "TO_CHAR" => {
            expect_args(name, &args, 1, 2)?;
            Ok(args[0].to_text().map_or(Value::Null, Value::String))
        }
        "SUBSTR" => {
            expect_args(name, &args, 2, 3)?;
            substr(&args[0], &args[1], args.get(2))
        }
        "NVL" => {
            expect_args(name, &args, 2, 2)?;
            let mut args = args.into_iter();
            let value = args.next().unwrap_or_default();
            let fallback = args.next().unwrap_or_default();
            Ok(if value.is_null() { fallback } else { value })
        }
        "DECODE" => {
            expect_args(name, &args, 3, usize::MAX)?;
            decode(&args)
        }
        "ROUND" => {
            expect_args(name, &args, 1, 2)?;
            round(&args[0], args.get(1))
        }
        "SUM" => {
            expect_args(name, &args, 1, usize::MAX)?;
            let mut total: Option<f64> = None;
            for arg in &args {
                if let Some(n) = arg.to_number()? {
                    total = Some(total.unwrap_or(0.0) + n);
                }
            }
            Ok(total.map_or(Value::Null, Value::Number))
        }
        "MAX" => {
            expect_args(name, &args, 1, usize::MAX)?;
            let mut best: Option<Value> = None;
            for arg in args.into_iter().filter(|arg| !arg.is_null()) {
                let replace = match &best {
                    Some(current) => current.compare(&arg)? == Some(Ordering::Less),
                    None => true,
                };
                if replace {
                    best = Some(arg);
                }
            }
            Ok(best.unwrap_or_default())
        }
        other => Err(RuntimeError::Unsupported(format!("function {other}"))),
    }
}

/// `SUBSTR(s, position [, length])` with 1-based, end-relative negative positions
fn substr(text: &Value, position: &Value, length: Option<&Value>) -> Result<Value, RuntimeError> {
    let (Some(text), Some(position)) = (text.to_text(), position.to_number()?) else {
        return Ok(Value::Null);
    };
    let chars: Vec<char> = text.chars().collect();
    let position = position.trunc() as i64;
    let start = match position {
        0 => 0,
        p if p > 0 => p - 1,
        p => chars.len() as i64 + p,
    };
    if start < 0 || start >= chars.len() as i64 {
        return Ok(Value::Null);
    }

    let remaining = chars.len() - start as usize;
    let count = match length.map(Value::to_number).transpose()? {
        None => remaining,
        Some(None) => return Ok(Value::Null),
        Some(Some(len)) if len < 1.0 => return Ok(Value::Null),
        Some(Some(len)) => (len.trunc() as usize).min(remaining),
    };
    let result: String = chars[start as usize..start as usize + count].iter().collect();
    Ok(Value::String(result))
}

/// `DECODE(expr, search, result, ... [, default])`; NULL matches NULL here
fn decode(args: &[Value]) -> Result<Value, RuntimeError> {
    let (subject, rest) = args.split_first().ok_or(RuntimeError::ArityMismatch {
        name: "DECODE".to_string(),
        expected: 3,
        found: 0,
    })?;
    let mut pairs = rest.chunks_exact(2);
    for pair in pairs.by_ref() {
        let matched = match (subject, &pair[0]) {
            (Value::Null, Value::Null) => true,
            (a, b) => a.sql_eq(b)? == Some(true),
        };
        if matched {
            return Ok(pair[1].clone());
        }
    }
    Ok(pairs.remainder().first().cloned().unwrap_or_default())
}

fn round(value: &Value, places: Option<&Value>) -> Result<Value, RuntimeError> {
    let Some(n) = value.to_number()? else {
        return Ok(Value::Null);
    };
    let places = match places.map(Value::to_number).transpose()? {
        None => 0,
        Some(None) => return Ok(Value::Null),
        Some(Some(p)) => p.trunc() as i32,
    };
    let factor = 10f64.powi(places);
    Ok(Value::Number((n * factor).round() / factor))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[Value]) -> Value {
        call_builtin(name, args.to_vec()).unwrap_or_else(|e| panic!("{name} failed: {e}"))
    }

    #[test]
    fn test_substr() {
        assert_eq!(call("SUBSTR", &["hello".into(), 2i64.into(), 3i64.into()]), Value::from("ell"));
        assert_eq!(call("SUBSTR", &["hello".into(), (-3i64).into()]), Value::from("llo"));
        assert_eq!(call("SUBSTR", &["hello".into(), 0i64.into(), 2i64.into()]), Value::from("he"));
        assert_eq!(call("SUBSTR", &["hello".into(), 9i64.into()]), Value::Null);
    }

    #[test]
    fn test_decode_and_nvl() {
        let args: Vec<Value> = vec![
            2i64.into(),
            1i64.into(),
            "one".into(),
            2i64.into(),
            "two".into(),
            "many".into(),
        ];
        assert_eq!(call("DECODE", &args), Value::from("two"));
        assert_eq!(call("DECODE", &[Value::Null, Value::Null, "null".into()]), Value::from("null"));
        assert_eq!(call("DECODE", &[5i64.into(), 1i64.into(), "one".into()]), Value::Null);
        assert_eq!(call("NVL", &[Value::Null, 0i64.into()]), Value::Number(0.0));
    }

    #[test]
    fn test_aggregates_skip_nulls() {
        assert_eq!(call("SUM", &[1i64.into(), Value::Null, 2i64.into()]), Value::Number(3.0));
        assert_eq!(call("SUM", &[Value::Null]), Value::Null);
        assert_eq!(call("MAX", &[3i64.into(), Value::Null, 7i64.into(), 5i64.into()]), Value::Number(7.0));
    }

    #[test]
    fn test_round_and_conversions() {
        assert_eq!(call("ROUND", &[2.5.into()]), Value::Number(3.0));
        assert_eq!(call("ROUND", &[123.456.into(), 2i64.into()]), Value::Number(123.46));
        assert_eq!(call("TO_NUMBER", &["42".into()]), Value::Number(42.0));
        assert_eq!(call("TO_CHAR", &[42i64.into()]), Value::from("42"));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(call_builtin("NVL", vec![Value::Null]), Err(RuntimeError::ArityMismatch { .. })));
        assert!(matches!(call_builtin("TO_DATE", vec!["2024-01-01".into()]), Err(RuntimeError::Unsupported(_))));
        assert!(matches!(call_builtin("TO_NUMBER", vec!["abc".into()]), Err(RuntimeError::TypeMismatch { .. })));
    }
}
