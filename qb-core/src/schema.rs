//! Per-run cache of table schemas.
//!
//! A table's fields are fetched the first time something needs them and kept
//! for the rest of the process. Callers racing on the same table wait for a
//! single fetch instead of issuing their own.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{BoxError, Error, FieldId, FieldType, Result};

/// A column of a table as reported by the fields endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub id: FieldId,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", alias = "fieldType")]
    pub field_type: FieldType,
}

/// Anything that can list a table's fields.
pub trait SchemaSource {
    fn fetch_table_schema(&self, table_id: &str) -> std::result::Result<Vec<FieldDescriptor>, BoxError>;
}

impl<F> SchemaSource for F
where
    F: Fn(&str) -> std::result::Result<Vec<FieldDescriptor>, BoxError>,
{
    fn fetch_table_schema(&self, table_id: &str) -> std::result::Result<Vec<FieldDescriptor>, BoxError> {
        self(table_id)
    }
}

/// The fields of one table keyed by id.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    table_id: String,
    fields: BTreeMap<FieldId, FieldDescriptor>,
}

impl TableSchema {
    pub fn new(table_id: impl Into<String>, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        Self {
            table_id: table_id.into(),
            fields: fields.into_iter().map(|f| (f.id, f)).collect(),
        }
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    pub fn field(&self, field_id: FieldId) -> Option<&FieldDescriptor> {
        self.fields.get(&field_id)
    }

    pub fn type_of(&self, field_id: FieldId) -> Result<FieldType> {
        self.field(field_id)
            .map(|f| f.field_type)
            .ok_or_else(|| {
                Box::new(Error::UnknownField {
                    table_id: Some(self.table_id.clone()),
                    field_id,
                })
            })
    }

    /// Look a field up by its label, ignoring case.
    pub fn by_label(&self, label: &str) -> Option<&FieldDescriptor> {
        self.fields
            .values()
            .find(|f| f.label.eq_ignore_ascii_case(label.trim()))
    }

    /// Field ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.fields.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

type Slot = Arc<Mutex<Option<Arc<TableSchema>>>>;

/// Lazily populated table schemas, safe to share between threads.
#[derive(Debug, Default)]
pub struct SchemaCache {
    tables: Mutex<HashMap<String, Slot>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the schema for `table_id`, fetching it on first use.
    ///
    /// Failed fetches are not cached; the next call tries again.
    pub fn resolve(&self, table_id: &str, source: &dyn SchemaSource) -> Result<Arc<TableSchema>> {
        let slot = Arc::clone(self.tables.lock().entry(table_id.to_string()).or_default());

        // Held across the fetch so concurrent callers for this table wait.
        let mut entry = slot.lock();
        if let Some(schema) = entry.as_ref() {
            trace!(table_id, "schema cache hit");
            return Ok(Arc::clone(schema));
        }

        debug!(table_id, "fetching table schema");
        let fields = match source.fetch_table_schema(table_id) {
            Ok(fields) => fields,
            Err(source) => {
                self.forget_if_unused(table_id, &slot);
                return Err(Box::new(Error::SchemaFetch {
                    table_id: table_id.to_string(),
                    source,
                }));
            }
        };
        let schema = Arc::new(TableSchema::new(table_id, fields));
        debug!(table_id, fields = schema.len(), "cached table schema");
        *entry = Some(Arc::clone(&schema));
        Ok(schema)
    }

    /// Drop an empty slot after a failed fetch unless another caller is
    /// waiting on it.
    fn forget_if_unused(&self, table_id: &str, slot: &Slot) {
        let mut tables = self.tables.lock();
        // Only the map and the failing caller hold the slot.
        if Arc::strong_count(slot) == 2
            && tables.get(table_id).is_some_and(|s| Arc::ptr_eq(s, slot))
        {
            tables.remove(table_id);
        }
    }

    /// The cached schema, without fetching.
    pub fn get(&self, table_id: &str) -> Option<Arc<TableSchema>> {
        let slot = self.tables.lock().get(table_id).cloned()?;
        let entry = slot.lock();
        entry.clone()
    }

    /// Declared type of a field in an already resolved table.
    pub fn type_of(&self, table_id: &str, field_id: FieldId) -> Result<FieldType> {
        let schema = self.get(table_id).ok_or_else(|| {
            Box::new(Error::SchemaNotResolved {
                table_id: table_id.to_string(),
            })
        })?;
        schema.type_of(field_id)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::atomic::{AtomicUsize, Ordering},
        thread,
        time::Duration,
    };

    use super::*;

    struct CountingSource {
        calls: AtomicUsize,
        delay: Duration,
    }

    impl CountingSource {
        fn new(delay: Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SchemaSource for CountingSource {
        fn fetch_table_schema(
            &self,
            _table_id: &str,
        ) -> std::result::Result<Vec<FieldDescriptor>, BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(self.delay);
            Ok(vec![
                FieldDescriptor {
                    id: 3,
                    label: "Record ID#".into(),
                    field_type: FieldType::RecordId,
                },
                FieldDescriptor {
                    id: 6,
                    label: "Amount".into(),
                    field_type: FieldType::Currency,
                },
            ])
        }
    }

    #[test]
    fn test_resolve_fetches_once() {
        let cache = SchemaCache::new();
        let source = CountingSource::new(Duration::ZERO);

        let first = cache.resolve("bqx", &source).unwrap();
        let second = cache.resolve("bqx", &source).unwrap();

        assert_eq!(first, second);
        assert_eq!(source.calls(), 1);
        assert_eq!(cache.type_of("bqx", 6).unwrap(), FieldType::Currency);
    }

    #[test]
    fn test_concurrent_resolve_fetches_once() {
        let cache = SchemaCache::new();
        let source = CountingSource::new(Duration::from_millis(50));

        let schemas: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| cache.resolve("bqx", &source).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(source.calls(), 1);
        assert!(schemas.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_distinct_tables_fetch_separately() {
        let cache = SchemaCache::new();
        let source = CountingSource::new(Duration::ZERO);
        cache.resolve("a", &source).unwrap();
        cache.resolve("b", &source).unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[test]
    fn test_failed_fetch_is_not_cached() {
        let cache = SchemaCache::new();
        let failing = |_: &str| -> std::result::Result<Vec<FieldDescriptor>, BoxError> {
            Err(Box::new(io::Error::other("connection reset")))
        };
        let err = cache.resolve("bqx", &failing).unwrap_err();
        assert!(matches!(*err, Error::SchemaFetch { .. }));
        assert!(cache.get("bqx").is_none());
        assert!(cache.tables.lock().is_empty());

        let source = CountingSource::new(Duration::ZERO);
        cache.resolve("bqx", &source).unwrap();
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn test_type_of_before_resolve() {
        let cache = SchemaCache::new();
        let err = cache.type_of("bqx", 6).unwrap_err();
        assert!(matches!(*err, Error::SchemaNotResolved { .. }));
    }

    #[test]
    fn test_type_of_unknown_field() {
        let cache = SchemaCache::new();
        cache
            .resolve("bqx", &CountingSource::new(Duration::ZERO))
            .unwrap();
        let err = cache.type_of("bqx", 99).unwrap_err();
        assert!(matches!(*err, Error::UnknownField { field_id: 99, .. }));
    }

    #[test]
    fn test_by_label_ignores_case() {
        let schema = TableSchema::new(
            "bqx",
            [FieldDescriptor {
                id: 6,
                label: "Amount".into(),
                field_type: FieldType::Currency,
            }],
        );
        assert_eq!(schema.by_label("amount").map(|f| f.id), Some(6));
        assert!(schema.by_label("total").is_none());
    }

    #[test]
    fn test_descriptor_accepts_field_type_key() {
        let json = r#"{"id": 7, "label": "Due", "fieldType": "date"}"#;
        let field: FieldDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(field.field_type, FieldType::Date);
    }
}
