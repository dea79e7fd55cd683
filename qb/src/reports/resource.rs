use eyre::Result;
use serde::Serialize;
use serde_json::{Map, Value as Json};

use super::{Report, Rows};

/// Any API response, shown as-is in JSON and flattened for tabular formats.
///
/// Arrays of objects become one row per element with the union of their
/// keys as columns; a single object becomes a `field`/`value` listing.
pub struct ResourceReport {
    json: Json,
}

impl ResourceReport {
    pub fn new<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self {
            json: serde_json::to_value(value)?,
        })
    }
}

impl Report for ResourceReport {
    fn json(&self) -> Json {
        self.json.clone()
    }

    fn rows(&self) -> Rows {
        match &self.json {
            Json::Array(items) if items.iter().all(Json::is_object) => object_rows(items),
            Json::Array(items) => Rows {
                headers: vec!["value".into()],
                rows: items.iter().map(|v| vec![cell(v)]).collect(),
            },
            Json::Object(map) => match single_list(map) {
                Some(items) => object_rows(items),
                None => Rows {
                    headers: vec!["field".into(), "value".into()],
                    rows: map.iter().map(|(k, v)| vec![k.clone(), cell(v)]).collect(),
                },
            },
            other => Rows {
                headers: vec!["value".into()],
                rows: vec![vec![cell(other)]],
            },
        }
    }
}

// `{"relationships": [...], "metadata": {...}}` reads best as the list.
fn single_list(map: &Map<String, Json>) -> Option<&[Json]> {
    let mut lists = map
        .values()
        .filter_map(|v| v.as_array())
        .filter(|items| items.iter().all(Json::is_object));
    match (lists.next(), lists.next()) {
        (Some(items), None) if !items.is_empty() => Some(items),
        _ => None,
    }
}

fn object_rows(items: &[Json]) -> Rows {
    let mut headers: Vec<String> = Vec::new();
    for item in items {
        if let Json::Object(map) = item {
            for key in map.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }
    }
    let rows = items
        .iter()
        .map(|item| {
            headers
                .iter()
                .map(|h| item.get(h).map(cell).unwrap_or_default())
                .collect()
        })
        .collect();
    Rows { headers, rows }
}

fn cell(value: &Json) -> String {
    match value {
        Json::Null => String::new(),
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}
