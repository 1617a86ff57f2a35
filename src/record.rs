//! Log record assembly — fields and the fully assembled entry handed to a drain.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::level::Level;

/// A single key-value pair attached to a log call or a logger.
#[derive(Debug, Clone)]
pub struct Field {
    key: String,
    value: Value,
}

impl Field {
    /// Build a field from any serializable value.
    ///
    /// A value that fails to serialize is replaced by a marker string so that a
    /// log call can never fail.
    pub fn new(key: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value)
            .unwrap_or_else(|e| Value::String(format!("<unserializable: {e}>")));
        Field {
            key: key.into(),
            value,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl<K: Into<String>, V: Serialize> From<(K, V)> for Field {
    fn from((key, value): (K, V)) -> Self {
        Field::new(key, value)
    }
}

/// A fully assembled log entry, ready for encoding.
///
/// `fields` already contains the persistent fields (service first), call-site
/// fields, and the trace id if one was injected, in that insertion order. Key
/// collisions were resolved last-write-wins when the map was built.
#[derive(Debug, Clone)]
pub struct Record {
    pub level: Level,
    pub ts: DateTime<Utc>,
    pub caller: String,
    pub msg: String,
    pub fields: Map<String, Value>,
}

impl Record {
    /// Encode as a single JSON object: `level`, `ts`, `caller`, `msg`, then all
    /// accumulated fields in insertion order.
    pub fn to_json(&self) -> Value {
        let mut map = Map::with_capacity(self.fields.len() + 4);
        map.insert("level".into(), Value::String(self.level.as_str().into()));
        map.insert(
            "ts".into(),
            Value::String(self.ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        map.insert("caller".into(), Value::String(self.caller.clone()));
        map.insert("msg".into(), Value::String(self.msg.clone()));
        for (key, value) in &self.fields {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }

    /// Render as one newline-terminated NDJSON line.
    pub fn render(&self) -> String {
        let mut line = self.to_json().to_string();
        line.push('\n');
        line
    }
}
