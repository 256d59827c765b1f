use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// A stored product as returned to API callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Unvalidated create payload. Every field is optional so that missing
/// values surface as validation errors rather than deserialization noise.
/// Scalars are cast the way a loosely typed JSON client expects: numeric
/// strings become prices, dates accept ISO text or epoch millis.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductCandidate {
    #[serde(default, deserialize_with = "cast::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "cast::number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "cast::text")]
    pub description: Option<String>,
    #[serde(default, rename = "createdAt", deserialize_with = "cast::date")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A validated product waiting for the datastore to assign its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ProductCandidate {
    /// Reads a candidate out of an arbitrary JSON body. Fields that cannot be
    /// cast are reported as validation failures.
    pub fn from_json(body: &serde_json::Value) -> Result<Self, DomainError> {
        serde_json::from_value(body.clone()).map_err(|e| {
            DomainError::Validation(format!("product validation failed: {e}"))
        })
    }

    pub fn validate(self, now: DateTime<Utc>) -> Result<NewProduct, DomainError> {
        let name = self
            .name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| DomainError::missing_field("name"))?;
        let price = self
            .price
            .ok_or_else(|| DomainError::missing_field("price"))?;
        if !price.is_finite() {
            return Err(DomainError::Validation(
                "product validation failed: price: must be a finite number".into(),
            ));
        }

        Ok(NewProduct {
            name,
            price,
            description: self.description,
            created_at: self.created_at.unwrap_or(now),
        })
    }
}

impl NewProduct {
    pub fn with_id(self, id: impl Into<String>) -> Product {
        Product {
            id: id.into(),
            name: self.name,
            price: self.price,
            description: self.description,
            created_at: self.created_at,
        }
    }
}

mod cast {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            Value::Bool(b) => Ok(Some(b.to_string())),
            other => Err(D::Error::custom(format!(
                "cast to string failed for value {other}"
            ))),
        }
    }

    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let parsed = match &value {
            Value::Null => return Ok(None),
            Value::Number(n) => n.as_f64(),
            Value::String(s) if s.trim().is_empty() => return Ok(None),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        };
        parsed
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("cast to number failed for value {value}")))
    }

    pub fn date<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let parsed = match &value {
            Value::Null => return Ok(None),
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .and_then(DateTime::from_timestamp_millis),
            Value::String(s) => parse_date(s.trim()),
            _ => None,
        };
        parsed
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("cast to date failed for value {value}")))
    }

    fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return day.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
        raw.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn validate_defaults_created_at() {
        let candidate = ProductCandidate::from_json(&json!({"name": "Widget", "price": 9.99}))
            .unwrap();
        let product = candidate.validate(now()).unwrap();
        assert_eq!(product.name, "Widget");
        assert_eq!(product.price, 9.99);
        assert_eq!(product.description, None);
        assert_eq!(product.created_at, now());
    }

    #[test]
    fn validate_keeps_supplied_created_at() {
        let candidate = ProductCandidate::from_json(&json!({
            "name": "Widget",
            "price": 1,
            "createdAt": "2020-01-02T03:04:05Z"
        }))
        .unwrap();
        let product = candidate.validate(now()).unwrap();
        assert_eq!(
            product.created_at,
            Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap()
        );
    }

    #[test]
    fn missing_name_or_price_is_rejected() {
        let no_name = ProductCandidate::from_json(&json!({"price": 3.5})).unwrap();
        assert!(no_name.validate(now()).unwrap_err().is_validation());

        let blank_name = ProductCandidate::from_json(&json!({"name": "  ", "price": 3.5})).unwrap();
        assert!(blank_name.validate(now()).unwrap_err().is_validation());

        let no_price = ProductCandidate::from_json(&json!({"name": "Widget"})).unwrap();
        let err = no_price.validate(now()).unwrap_err();
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn uncastable_price_is_a_validation_error() {
        for price in [json!("cheap"), json!(true), json!([1]), json!({"amount": 1})] {
            let err = ProductCandidate::from_json(&json!({"name": "Widget", "price": price}))
                .unwrap_err();
            assert!(err.is_validation());
            assert!(err.to_string().contains("cast to number failed"));
        }
    }

    #[test]
    fn scalar_fields_are_cast() {
        let candidate = ProductCandidate::from_json(&json!({
            "name": 42,
            "price": " 9.99 ",
            "description": false,
            "createdAt": "2020-01-02"
        }))
        .unwrap();
        assert_eq!(candidate.name.as_deref(), Some("42"));
        assert_eq!(candidate.price, Some(9.99));
        assert_eq!(candidate.description.as_deref(), Some("false"));
        assert_eq!(
            candidate.created_at,
            Some(Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn created_at_accepts_epoch_millis_and_local_iso() {
        let from_number = ProductCandidate::from_json(&json!({"createdAt": 1_700_000_000_000_i64}))
            .unwrap();
        assert_eq!(
            from_number.created_at,
            Some(Utc.timestamp_millis_opt(1_700_000_000_000).unwrap())
        );

        let from_text = ProductCandidate::from_json(&json!({"createdAt": "2021-06-07T08:09:10"}))
            .unwrap();
        assert_eq!(
            from_text.created_at,
            Some(Utc.with_ymd_and_hms(2021, 6, 7, 8, 9, 10).unwrap())
        );

        let err = ProductCandidate::from_json(&json!({"createdAt": "yesterday"})).unwrap_err();
        assert!(err.to_string().contains("cast to date failed"));
    }

    #[test]
    fn null_and_empty_values_count_as_missing() {
        let candidate = ProductCandidate::from_json(&json!({"name": null, "price": ""})).unwrap();
        let err = candidate.validate(now()).unwrap_err();
        assert!(err.to_string().contains("`name` is required"));

        let candidate = ProductCandidate::from_json(&json!({"name": "Widget", "price": ""}))
            .unwrap();
        let err = candidate.validate(now()).unwrap_err();
        assert!(err.to_string().contains("`price` is required"));
    }

    #[test]
    fn product_serializes_with_wire_names() {
        let product = NewProduct {
            name: "Widget".into(),
            price: 9.99,
            description: None,
            created_at: now(),
        }
        .with_id("abc");
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["_id"], "abc");
        assert_eq!(value["createdAt"], "2024-05-01T12:00:00Z");
        assert!(value.get("description").is_none());
    }
}
