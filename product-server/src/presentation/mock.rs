//! Placeholder payloads returned while the datastore cannot be used.
//! Nothing built here is ever persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MockProduct {
    #[serde(rename = "_id")]
    pub id: &'static str,
    pub name: &'static str,
    pub price: f64,
    pub description: &'static str,
}

/// Served by `GET /api/products` while not connected.
pub fn unavailable_products() -> Vec<MockProduct> {
    vec![
        MockProduct {
            id: "mock1",
            name: "Mock Product 1",
            price: 19.99,
            description: "This is a mock product (MongoDB not connected)",
        },
        MockProduct {
            id: "mock2",
            name: "Mock Product 2",
            price: 29.99,
            description: "Another mock product (MongoDB not connected)",
        },
    ]
}

/// Attached to `500` responses when a read fails.
pub fn error_products() -> Vec<MockProduct> {
    vec![
        MockProduct {
            id: "error1",
            name: "Error Product 1",
            price: 19.99,
            description: "Mock product due to DB error",
        },
        MockProduct {
            id: "error2",
            name: "Error Product 2",
            price: 29.99,
            description: "Another mock product due to DB error",
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoReason {
    NotConnected,
    StoreFailed,
}

impl EchoReason {
    fn id_prefix(self) -> &'static str {
        match self {
            EchoReason::NotConnected => "mock",
            EchoReason::StoreFailed => "error",
        }
    }

    fn note(self) -> &'static str {
        match self {
            EchoReason::NotConnected => "This is a mock response (MongoDB not connected)",
            EchoReason::StoreFailed => "Mock response due to database error",
        }
    }
}

/// Echoes the request body with a synthesized time-based `_id` and a note.
/// Non-object bodies echo as an empty object.
pub fn echo(body: &Value, reason: EchoReason, now: DateTime<Utc>) -> Value {
    let mut fields = match body {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    fields.insert(
        "_id".into(),
        Value::String(format!("{}-{}", reason.id_prefix(), now.timestamp_millis())),
    );
    fields.insert("note".into(), Value::String(reason.note().into()));
    Value::Object(fields)
}
