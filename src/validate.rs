//! Input validation and type coercion for inbound transaction records
//!
//! Validation runs in two passes. The presence pass walks the required
//! fields in a fixed order so the first missing field reported is always
//! the same for a given payload. The coercion pass then converts each
//! field in feature-column order, stopping at the first violation.

use serde_json::Value;

use crate::error::ValidationError;
use crate::types::{RawRecord, TransactionRecord};

/// Required fields, in the order the presence check walks them.
pub const REQUIRED_FIELDS: [&str; 8] = [
    "amount",
    "transaction_hour",
    "merchant_category",
    "foreign_transaction",
    "location_mismatch",
    "device_trust_score",
    "velocity_last_24h",
    "cardholder_age",
];

/// Checks an inbound record for required fields and type/range conformance
/// and produces the typed, immutable record the pipeline scores.
///
/// A JSON `null` counts as absent. Unseen merchant categories pass through
/// here untouched; the categorical encoder downstream deals with them.
pub fn validate(raw: &RawRecord) -> Result<TransactionRecord, ValidationError> {
    for field in REQUIRED_FIELDS {
        require(raw, field)?;
    }

    let amount = coerce_amount(require(raw, "amount")?)?;
    let transaction_hour =
        coerce_ranged_integer(require(raw, "transaction_hour")?, "transaction_hour", 0, 23)? as u8;
    let device_trust_score = coerce_ranged_integer(
        require(raw, "device_trust_score")?,
        "device_trust_score",
        0,
        100,
    )? as u8;
    let velocity_last_24h = coerce_ranged_integer(
        require(raw, "velocity_last_24h")?,
        "velocity_last_24h",
        0,
        i64::from(u32::MAX),
    )? as u32;
    let cardholder_age = coerce_ranged_integer(
        require(raw, "cardholder_age")?,
        "cardholder_age",
        0,
        i64::from(u32::MAX),
    )? as u32;
    let merchant_category = coerce_category(require(raw, "merchant_category")?)?;
    let foreign_transaction = coerce_flag(require(raw, "foreign_transaction")?, "foreign_transaction")?;
    let location_mismatch = coerce_flag(require(raw, "location_mismatch")?, "location_mismatch")?;

    Ok(TransactionRecord {
        transaction_id: raw.transaction_id.clone(),
        amount,
        transaction_hour,
        merchant_category,
        cardholder_age,
        device_trust_score,
        velocity_last_24h,
        foreign_transaction,
        location_mismatch,
    })
}

fn require<'a>(raw: &'a RawRecord, field: &'static str) -> Result<&'a Value, ValidationError> {
    let value = match field {
        "amount" => raw.amount.as_ref(),
        "transaction_hour" => raw.transaction_hour.as_ref(),
        "merchant_category" => raw.merchant_category.as_ref(),
        "foreign_transaction" => raw.foreign_transaction.as_ref(),
        "location_mismatch" => raw.location_mismatch.as_ref(),
        "device_trust_score" => raw.device_trust_score.as_ref(),
        "velocity_last_24h" => raw.velocity_last_24h.as_ref(),
        "cardholder_age" => raw.cardholder_age.as_ref(),
        _ => None,
    };
    match value {
        Some(v) if !v.is_null() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn coerce_amount(value: &Value) -> Result<f64, ValidationError> {
    let amount = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ValidationError::invalid("amount", "expected a number"))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::invalid("amount", "expected a number"))?,
        _ => return Err(ValidationError::invalid("amount", "expected a number")),
    };
    if !amount.is_finite() {
        return Err(ValidationError::invalid("amount", "must be finite"));
    }
    if amount < 0.0 {
        return Err(ValidationError::out_of_range("amount", "must not be negative"));
    }
    Ok(amount)
}

fn coerce_integer(value: &Value, field: &'static str) -> Result<i64, ValidationError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            // integral floats such as 14.0 are accepted, 14.5 is not
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
                    Ok(f as i64)
                }
                _ => Err(ValidationError::invalid(field, "expected an integer")),
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::invalid(field, "expected an integer")),
        _ => Err(ValidationError::invalid(field, "expected an integer")),
    }
}

fn coerce_ranged_integer(
    value: &Value,
    field: &'static str,
    min: i64,
    max: i64,
) -> Result<i64, ValidationError> {
    let n = coerce_integer(value, field)?;
    if n < min || n > max {
        return Err(ValidationError::out_of_range(
            field,
            format!("must be between {min} and {max}"),
        ));
    }
    Ok(n)
}

fn coerce_category(value: &Value) -> Result<String, ValidationError> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
        _ => Err(ValidationError::invalid(
            "merchant_category",
            "expected a non-empty string",
        )),
    }
}

fn coerce_flag(value: &Value, field: &'static str) -> Result<bool, ValidationError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(_) => match coerce_integer(value, field)? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(ValidationError::invalid(field, "expected 0 or 1")),
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "0" | "false" => Ok(false),
            "1" | "true" => Ok(true),
            _ => Err(ValidationError::invalid(field, "expected 0 or 1")),
        },
        _ => Err(ValidationError::invalid(field, "expected 0 or 1")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawRecord {
        serde_json::from_value(value).unwrap()
    }

    fn complete() -> serde_json::Value {
        json!({
            "amount": 45.5,
            "transaction_hour": 14,
            "merchant_category": "Grocery",
            "foreign_transaction": 0,
            "location_mismatch": 0,
            "device_trust_score": 85,
            "velocity_last_24h": 2,
            "cardholder_age": 35
        })
    }

    #[test]
    fn test_validates_complete_record() {
        let record = validate(&raw(complete())).unwrap();
        assert_eq!(record.amount, 45.5);
        assert_eq!(record.transaction_hour, 14);
        assert_eq!(record.merchant_category, "Grocery");
        assert!(!record.foreign_transaction);
        assert!(!record.location_mismatch);
        assert_eq!(record.device_trust_score, 85);
        assert_eq!(record.velocity_last_24h, 2);
        assert_eq!(record.cardholder_age, 35);
    }

    #[test]
    fn test_first_missing_field_follows_fixed_order() {
        let mut payload = complete();
        payload.as_object_mut().unwrap().remove("amount");
        payload.as_object_mut().unwrap().remove("cardholder_age");

        let err = validate(&raw(payload)).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("amount"));
        assert_eq!(err.to_string(), "Missing required field: amount");
    }

    #[test]
    fn test_every_required_field_is_enforced() {
        for field in REQUIRED_FIELDS {
            let mut payload = complete();
            payload.as_object_mut().unwrap().remove(field);
            let err = validate(&raw(payload)).unwrap_err();
            assert_eq!(err, ValidationError::MissingField(field));
        }
    }

    #[test]
    fn test_null_counts_as_missing() {
        let mut payload = complete();
        payload["device_trust_score"] = json!(null);
        let err = validate(&raw(payload)).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("device_trust_score"));
    }

    #[test]
    fn test_numeric_string_amount_is_accepted() {
        let mut payload = complete();
        payload["amount"] = json!(" 120.75 ");
        let record = validate(&raw(payload)).unwrap();
        assert_eq!(record.amount, 120.75);
    }

    #[test]
    fn test_non_numeric_amount_is_rejected() {
        let mut payload = complete();
        payload["amount"] = json!("a lot");
        let err = validate(&raw(payload)).unwrap_err();
        assert_eq!(err.field(), "amount");
        assert!(err.to_string().starts_with("Invalid value for 'amount'"));
    }

    #[test]
    fn test_negative_amount_is_out_of_range() {
        let mut payload = complete();
        payload["amount"] = json!(-0.01);
        let err = validate(&raw(payload)).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "amount", .. }));
    }

    #[test]
    fn test_non_finite_amount_string_is_rejected() {
        let mut payload = complete();
        payload["amount"] = json!("NaN");
        let err = validate(&raw(payload)).unwrap_err();
        assert_eq!(err.field(), "amount");
    }

    #[test]
    fn test_integral_float_hour_is_accepted() {
        let mut payload = complete();
        payload["transaction_hour"] = json!(14.0);
        let record = validate(&raw(payload)).unwrap();
        assert_eq!(record.transaction_hour, 14);
    }

    #[test]
    fn test_fractional_hour_is_rejected() {
        let mut payload = complete();
        payload["transaction_hour"] = json!(14.5);
        let err = validate(&raw(payload)).unwrap_err();
        assert_eq!(err.field(), "transaction_hour");
    }

    #[test]
    fn test_hour_out_of_range() {
        let mut payload = complete();
        payload["transaction_hour"] = json!(24);
        let err = validate(&raw(payload)).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange { field: "transaction_hour", .. }
        ));
    }

    #[test]
    fn test_trust_score_above_hundred_is_rejected() {
        let mut payload = complete();
        payload["device_trust_score"] = json!(101);
        let err = validate(&raw(payload)).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange { field: "device_trust_score", .. }
        ));
    }

    #[test]
    fn test_negative_velocity_is_rejected() {
        let mut payload = complete();
        payload["velocity_last_24h"] = json!(-1);
        let err = validate(&raw(payload)).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange { field: "velocity_last_24h", .. }
        ));
    }

    #[test]
    fn test_bool_is_not_an_integer() {
        let mut payload = complete();
        payload["cardholder_age"] = json!(true);
        let err = validate(&raw(payload)).unwrap_err();
        assert_eq!(err.field(), "cardholder_age");
    }

    #[test]
    fn test_flag_accepts_bool_int_and_string_forms() {
        for (value, expected) in [
            (json!(true), true),
            (json!(false), false),
            (json!(1), true),
            (json!(0), false),
            (json!("1"), true),
            (json!("false"), false),
            (json!("TRUE"), true),
        ] {
            let mut payload = complete();
            payload["foreign_transaction"] = value;
            let record = validate(&raw(payload)).unwrap();
            assert_eq!(record.foreign_transaction, expected);
        }
    }

    #[test]
    fn test_flag_rejects_other_integers() {
        let mut payload = complete();
        payload["location_mismatch"] = json!(2);
        let err = validate(&raw(payload)).unwrap_err();
        assert_eq!(err.field(), "location_mismatch");
    }

    #[test]
    fn test_empty_category_is_rejected() {
        let mut payload = complete();
        payload["merchant_category"] = json!("  ");
        let err = validate(&raw(payload)).unwrap_err();
        assert_eq!(err.field(), "merchant_category");
    }

    #[test]
    fn test_unseen_category_passes_validation() {
        let mut payload = complete();
        payload["merchant_category"] = json!("Jet Ski Rental");
        let record = validate(&raw(payload)).unwrap();
        assert_eq!(record.merchant_category, "Jet Ski Rental");
    }

    #[test]
    fn test_coercion_stops_at_first_violation_in_column_order() {
        // transaction_hour precedes merchant_category in the feature column
        // order, so the hour violation is the one reported
        let mut payload = complete();
        payload["transaction_hour"] = json!("soon");
        payload["merchant_category"] = json!("");
        let err = validate(&raw(payload)).unwrap_err();
        assert_eq!(err.field(), "transaction_hour");
    }

    #[test]
    fn test_transaction_id_is_carried_through() {
        let mut payload = complete();
        payload["transaction_id"] = json!("T042");
        let record = validate(&raw(payload)).unwrap();
        assert_eq!(record.transaction_id.as_deref(), Some("T042"));
    }
}
