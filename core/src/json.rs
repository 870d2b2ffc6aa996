//! Conversion between values and JSON.

use crate::{Item, Value};
use serde_json::{Map, Number, Value as Json};

impl Value {
    /// Convert a JSON document. Objects become records, arrays become lists.
    pub fn from_json(json: &Json) -> Value {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
            Json::Object(map) => Value::Record(Item::from_json_object(map)),
        }
    }

    /// Render as JSON. Non-finite floats render as `null`.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::Number((*i).into()),
            Value::Float(f) => Number::from_f64(*f).map(Json::Number).unwrap_or(Json::Null),
            Value::String(s) => Json::String(s.clone()),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Record(item) => item.to_json(),
        }
    }
}

impl Item {
    pub fn from_json_object(map: &Map<String, Json>) -> Item {
        map.iter()
            .map(|(name, value)| (name.clone(), Value::from_json(value)))
            .collect()
    }

    pub fn to_json(&self) -> Json {
        let map: Map<String, Json> = self
            .fields()
            .map(|(name, value)| (name.to_string(), value.to_json()))
            .collect();
        Json::Object(map)
    }
}
