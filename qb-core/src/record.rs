use std::collections::{HashMap, hash_map};

use crate::Value;

/// Numeric identifier of a field within a table.
pub type FieldId = u32;

/// Field id of the built-in record id field.
pub const RECORD_ID_FIELD: FieldId = 3;

/// One row: field id to value. Field order is not preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: HashMap<FieldId, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field's value, replacing any previous value.
    pub fn set_value(&mut self, field_id: FieldId, value: Value) -> &mut Self {
        self.fields.insert(field_id, value);
        self
    }

    pub fn get(&self, field_id: FieldId) -> Option<&Value> {
        self.fields.get(&field_id)
    }

    pub fn remove(&mut self, field_id: FieldId) -> Option<Value> {
        self.fields.remove(&field_id)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, FieldId, Value> {
        self.fields.iter()
    }

    /// Field ids in ascending order.
    pub fn field_ids(&self) -> Vec<FieldId> {
        let mut ids: Vec<_> = self.fields.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl FromIterator<(FieldId, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (FieldId, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a FieldId, &'a Value);
    type IntoIter = hash_map::Iter<'a, FieldId, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_value_replaces() {
        let mut record = Record::new();
        record
            .set_value(6, Value::numeric(1.0))
            .set_value(6, Value::numeric(2.0))
            .set_value(7, Value::checkbox(true));
        assert_eq!(record.len(), 2);
        assert_eq!(record.get(6).and_then(Value::as_f64), Some(2.0));
        assert_eq!(record.field_ids(), [6, 7]);
    }
}
