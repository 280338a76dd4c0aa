//! One editable field view over the current selection

use std::collections::BTreeMap;

use crate::domain::ContainerId;
use crate::error::FieldError;

use super::field::{Field, FieldChanged, Scope};
use super::holder::{FieldHolder, FieldHolderStore};
use super::value::{FieldType, FieldValue};

/// Merged view of the fields of every bound element.
///
/// When bound elements disagree, the first element bound for a field type
/// provides the aggregator's value. Later bindings never overwrite it.
/// [`FieldAggregator::has_mixed_values`] reports the disagreement without
/// changing that rule.
#[derive(Debug, Default, Clone)]
pub struct FieldAggregator {
    fields: BTreeMap<FieldType, Field>,
    bound: Vec<ContainerId>,
}

impl FieldAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of bound elements in bind order
    pub fn bound_elements(&self) -> &[ContainerId] {
        &self.bound
    }

    pub fn is_bound(&self, id: ContainerId) -> bool {
        self.bound.contains(&id)
    }

    pub fn bind_element(&mut self, id: ContainerId, holder: &dyn FieldHolder) {
        if self.is_bound(id) {
            return;
        }
        self.bound.push(id);
        self.adopt_fields(holder);
    }

    fn adopt_fields(&mut self, holder: &dyn FieldHolder) {
        for field_type in holder.field_types() {
            if self.fields.contains_key(&field_type) {
                continue;
            }
            let mut field = Field::new(field_type, Scope::AGGREGATOR);
            if let Some(value) = holder.field_value(field_type)
                && let Err(err) = field.set(value.clone())
            {
                // the holder's field has the same type, so this is a defect
                debug_assert!(false, "holder value does not fit: {err}");
                log::error!("Aggregator rejected {field_type}: {err}");
            }
            self.fields.insert(field_type, field);
        }
    }

    /// Unbind one element and rebuild the view from the remaining ones
    pub fn unbind_element(&mut self, id: ContainerId, store: &dyn FieldHolderStore) {
        if !self.is_bound(id) {
            return;
        }
        let remaining: Vec<ContainerId> =
            self.bound.iter().copied().filter(|b| *b != id).collect();
        self.unbind_all();
        for other in remaining {
            if let Some(holder) = store.holder(other) {
                self.bind_element(other, holder);
            }
        }
    }

    /// Forget all bound elements. Element values are left untouched.
    pub fn unbind_all(&mut self) {
        self.bound.clear();
        self.fields.clear();
    }

    pub fn has_field(&self, field_type: FieldType) -> bool {
        self.fields.contains_key(&field_type)
    }

    pub fn field(&self, field_type: FieldType) -> Option<&Field> {
        self.fields.get(&field_type)
    }

    pub fn field_value(&self, field_type: FieldType) -> Option<&FieldValue> {
        self.field(field_type).map(Field::value)
    }

    pub fn field_types(&self) -> Vec<FieldType> {
        self.fields.keys().copied().collect()
    }

    /// Write a value to the aggregator and to every bound element that
    /// exposes the field type. Elements without it are left alone.
    ///
    /// Returns the change notification of each element that changed.
    pub fn set_field_value(
        &mut self,
        field_type: FieldType,
        value: FieldValue,
        store: &mut dyn FieldHolderStore,
    ) -> Result<Vec<(ContainerId, FieldChanged)>, FieldError> {
        let field = self
            .fields
            .entry(field_type)
            .or_insert_with(|| Field::new(field_type, Scope::AGGREGATOR));
        field.set(value.clone())?;

        let mut changes = Vec::new();
        for id in &self.bound {
            let Some(holder) = store.holder_mut(*id) else {
                continue;
            };
            if !holder.has_field(field_type) {
                continue;
            }
            if let Some(change) = holder.set_field_value(field_type, value.clone())? {
                changes.push((*id, change));
            }
        }
        Ok(changes)
    }

    /// Whether bound elements exposing `field_type` hold different values
    pub fn has_mixed_values(&self, field_type: FieldType, store: &dyn FieldHolderStore) -> bool {
        let mut values = self
            .bound
            .iter()
            .filter_map(|id| store.holder(*id))
            .filter_map(|holder| holder.field_value(field_type));
        match values.next() {
            Some(first) => values.any(|v| v != first),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    /// Minimal holder with a fixed field set
    struct TestHolder {
        fields: BTreeMap<FieldType, Field>,
    }

    impl TestHolder {
        fn new(values: &[(FieldType, FieldValue)]) -> Self {
            let fields = values
                .iter()
                .map(|(t, v)| {
                    (
                        *t,
                        Field::with_value(*t, Scope("Test"), v.clone()).unwrap(),
                    )
                })
                .collect();
            Self { fields }
        }
    }

    impl FieldHolder for TestHolder {
        fn field_types(&self) -> Vec<FieldType> {
            self.fields.keys().copied().collect()
        }

        fn field(&self, field_type: FieldType) -> Option<&Field> {
            self.fields.get(&field_type)
        }

        fn set_field_value(
            &mut self,
            field_type: FieldType,
            value: FieldValue,
        ) -> Result<Option<FieldChanged>, FieldError> {
            self.fields
                .get_mut(&field_type)
                .ok_or(FieldError::Unsupported(field_type))?
                .set(value)
        }
    }

    #[derive(Default)]
    struct TestStore(HashMap<ContainerId, TestHolder>);

    impl FieldHolderStore for TestStore {
        fn holder(&self, id: ContainerId) -> Option<&dyn FieldHolder> {
            self.0.get(&id).map(|h| h as &dyn FieldHolder)
        }

        fn holder_mut(&mut self, id: ContainerId) -> Option<&mut dyn FieldHolder> {
            self.0.get_mut(&id).map(|h| h as &mut dyn FieldHolder)
        }
    }

    fn thickness(v: i32) -> TestHolder {
        TestHolder::new(&[(FieldType::LineThickness, FieldValue::Int(v))])
    }

    #[test]
    fn test_first_bound_wins_then_set_propagates() {
        let mut store = TestStore::default();
        let ids: Vec<ContainerId> = [597, 595, 600]
            .into_iter()
            .map(|v| {
                let id = ContainerId::new();
                store.0.insert(id, thickness(v));
                id
            })
            .collect();

        let mut aggregator = FieldAggregator::new();
        for id in &ids {
            aggregator.bind_element(*id, store.holder(*id).unwrap());
        }
        assert_eq!(
            aggregator.field_value(FieldType::LineThickness),
            Some(&FieldValue::Int(597))
        );
        assert!(aggregator.has_mixed_values(FieldType::LineThickness, &store));

        let changes = aggregator
            .set_field_value(FieldType::LineThickness, FieldValue::Int(599), &mut store)
            .unwrap();
        assert_eq!(changes.len(), 3);
        assert_eq!(
            aggregator.field_value(FieldType::LineThickness),
            Some(&FieldValue::Int(599))
        );
        for id in &ids {
            assert_eq!(
                store.holder(*id).unwrap().field_value(FieldType::LineThickness),
                Some(&FieldValue::Int(599))
            );
        }
        assert!(!aggregator.has_mixed_values(FieldType::LineThickness, &store));
    }

    #[test]
    fn test_set_skips_holders_without_the_field() {
        let mut store = TestStore::default();
        let with = ContainerId::new();
        let without = ContainerId::new();
        store.0.insert(with, thickness(2));
        store.0.insert(
            without,
            TestHolder::new(&[(FieldType::Shadow, FieldValue::Bool(true))]),
        );

        let mut aggregator = FieldAggregator::new();
        aggregator.bind_element(with, store.holder(with).unwrap());
        aggregator.bind_element(without, store.holder(without).unwrap());
        aggregator
            .set_field_value(FieldType::LineThickness, FieldValue::Int(8), &mut store)
            .unwrap();

        let untouched = store.holder(without).unwrap();
        assert!(!untouched.has_field(FieldType::LineThickness));
        assert_eq!(
            untouched.field_value(FieldType::Shadow),
            Some(&FieldValue::Bool(true))
        );
    }

    #[test]
    fn test_unbind_leaves_holders_untouched() {
        let mut store = TestStore::default();
        let first = ContainerId::new();
        let second = ContainerId::new();
        store.0.insert(first, thickness(1));
        store.0.insert(second, thickness(7));

        let mut aggregator = FieldAggregator::new();
        aggregator.bind_element(first, store.holder(first).unwrap());
        aggregator.bind_element(second, store.holder(second).unwrap());

        aggregator.unbind_element(first, &store);
        assert_eq!(aggregator.bound_elements(), &[second]);
        assert_eq!(
            aggregator.field_value(FieldType::LineThickness),
            Some(&FieldValue::Int(7))
        );

        aggregator.unbind_all();
        assert!(aggregator.bound_elements().is_empty());
        assert!(!aggregator.has_field(FieldType::LineThickness));
        assert_eq!(
            store.holder(first).unwrap().field_value(FieldType::LineThickness),
            Some(&FieldValue::Int(1))
        );
    }

    #[test]
    fn test_domain_mismatch_is_reported() {
        let mut store = TestStore::default();
        let id = ContainerId::new();
        store.0.insert(id, thickness(1));
        let mut aggregator = FieldAggregator::new();
        aggregator.bind_element(id, store.holder(id).unwrap());
        let err = aggregator
            .set_field_value(FieldType::LineThickness, FieldValue::Bool(true), &mut store)
            .unwrap_err();
        assert!(matches!(err, FieldError::DomainMismatch { .. }));
    }

    #[test]
    fn test_unset_holder_value_is_adopted() {
        let mut store = TestStore::default();
        let unset = ContainerId::new();
        let set = ContainerId::new();
        store
            .0
            .insert(unset, TestHolder::new(&[(FieldType::LineThickness, FieldValue::Null)]));
        store.0.insert(set, thickness(3));

        let mut aggregator = FieldAggregator::new();
        aggregator.bind_element(unset, store.holder(unset).unwrap());
        aggregator.bind_element(set, store.holder(set).unwrap());
        assert_eq!(
            aggregator.field_value(FieldType::LineThickness),
            Some(&FieldValue::Null)
        );
        assert!(aggregator.has_field(FieldType::LineThickness));
    }
}
