//! Normalizes the list envelopes the marketplace API returns.
//!
//! Different endpoints wrap their arrays differently: a bare array,
//! `{properties: [...]}`, `{data: {properties: [...]}}`, `{data: [...]}`, or
//! something else with an array buried inside. [`Envelope::parse`] names the
//! shape it found so callers can tell a malformed payload from an empty list.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::models::{Page, Pagination};

#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Bare(Vec<Value>),
    Properties(Vec<Value>),
    DataProperties(Vec<Value>),
    Data(Vec<Value>),
    /// First array found by depth-first search of object values.
    Nested(Vec<Value>),
    /// No array anywhere in the payload.
    Unknown,
}

impl Envelope {
    pub fn parse(payload: Value) -> Self {
        let mut object = match payload {
            Value::Array(items) => return Envelope::Bare(items),
            Value::Object(object) => object,
            _ => return Envelope::Unknown,
        };

        if matches!(object.get("properties"), Some(Value::Array(_))) {
            if let Some(Value::Array(items)) = object.remove("properties") {
                return Envelope::Properties(items);
            }
        }

        let data_is_array = matches!(object.get("data"), Some(Value::Array(_)));
        let data_has_properties = object
            .get("data")
            .and_then(|data| data.get("properties"))
            .is_some_and(Value::is_array);

        if data_is_array {
            if let Some(Value::Array(items)) = object.remove("data") {
                return Envelope::Data(items);
            }
        } else if data_has_properties {
            if let Some(Value::Array(items)) = object
                .remove("data")
                .and_then(|mut data| data.get_mut("properties").map(Value::take))
            {
                return Envelope::DataProperties(items);
            }
        }

        match first_array(object) {
            Some(items) => Envelope::Nested(items),
            None => Envelope::Unknown,
        }
    }

    /// The records, with `Unknown` collapsing to an empty list.
    pub fn records(self) -> Vec<Value> {
        match self {
            Envelope::Bare(items)
            | Envelope::Properties(items)
            | Envelope::DataProperties(items)
            | Envelope::Data(items)
            | Envelope::Nested(items) => items,
            Envelope::Unknown => Vec::new(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Envelope::Unknown)
    }
}

fn first_array(object: Map<String, Value>) -> Option<Vec<Value>> {
    for (_, value) in object {
        match value {
            Value::Array(items) => return Some(items),
            Value::Object(inner) => {
                if let Some(items) = first_array(inner) {
                    return Some(items);
                }
            }
            _ => {}
        }
    }
    None
}

/// Decodes records one by one, dropping the ones that don't fit `T`.
pub fn decode_records<T: DeserializeOwned>(records: Vec<Value>) -> Vec<T> {
    let total = records.len();
    let decoded: Vec<T> = records
        .into_iter()
        .enumerate()
        .filter_map(|(idx, record)| match serde_json::from_value(record) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!(index = idx, error = %err, "skipping record that failed to decode");
                None
            }
        })
        .collect();

    if decoded.len() != total {
        debug!("decoded {} of {} records", decoded.len(), total);
    }
    decoded
}

/// Reads paging metadata from `pagination`, `data.pagination`, or flat top-level fields.
pub fn pagination(payload: &Value, requested_page: u32, record_count: usize) -> Pagination {
    let source = payload
        .get("pagination")
        .filter(|v| v.is_object())
        .or_else(|| {
            payload
                .get("data")
                .and_then(|data| data.get("pagination"))
                .filter(|v| v.is_object())
        })
        .unwrap_or(payload);

    let number = |keys: &[&str]| keys.iter().find_map(|key| source.get(*key).and_then(as_u64));

    let current_page = number(&["currentPage", "page"])
        .map(|page| page as u32)
        .filter(|page| *page > 0)
        .unwrap_or(requested_page.max(1));
    let total_pages = number(&["totalPages", "pages"])
        .map(|pages| pages as u32)
        .filter(|pages| *pages > 0)
        .unwrap_or(1);
    let total = number(&["total", "totalCount"]).unwrap_or(record_count as u64);

    Pagination {
        current_page,
        total_pages,
        total,
    }
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Normalizes, decodes and pages a list payload in one go.
pub fn decode_page<T: DeserializeOwned>(payload: Value, requested_page: u32) -> Page<T> {
    // Paging has to be read before the envelope consumes the payload.
    let raw_paging = payload.clone();
    let envelope = Envelope::parse(payload);
    let malformed = envelope.is_unknown();
    if malformed {
        warn!("list response matched no known envelope, treating as empty");
    }

    let items: Vec<T> = decode_records(envelope.records());
    let pagination = pagination(&raw_paging, requested_page, items.len());

    Page {
        items,
        pagination,
        malformed,
    }
}

/// Unwraps `{data: {...}}` for single-object endpoints, else returns the payload itself.
pub fn unwrap_data(payload: Value) -> Value {
    match payload {
        Value::Object(mut object) if matches!(object.get("data"), Some(Value::Object(_))) => {
            object.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}
