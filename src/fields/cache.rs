//! Last-used field values shared by every surface of a session

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::field::{Field, Scope};
use super::value::{FieldType, FieldValue};

#[derive(Debug, Default)]
struct CacheInner {
    last_used: RwLock<HashMap<(FieldType, Scope), FieldValue>>,
    overrides: HashMap<FieldType, FieldValue>,
    remember: bool,
}

/// Session context consulted when new fields are created.
///
/// Cloning is cheap and clones share the same store. Writes are
/// last-writer-wins.
#[derive(Debug, Clone)]
pub struct FieldCache {
    inner: Arc<CacheInner>,
}

impl Default for FieldCache {
    fn default() -> Self {
        Self::new(HashMap::new(), true)
    }
}

impl FieldCache {
    /// Create a cache with configured defaults that take precedence over
    /// the static default table. Overrides that don't fit their field
    /// type are dropped.
    pub fn new(overrides: HashMap<FieldType, FieldValue>, remember: bool) -> Self {
        let overrides = overrides
            .into_iter()
            .filter(|(field_type, value)| {
                let fits = !value.is_null() && value.fits(*field_type);
                if !fits {
                    log::warn!("Ignoring configured default for {field_type}: {value:?}");
                }
                fits
            })
            .collect();
        Self {
            inner: Arc::new(CacheInner {
                last_used: RwLock::new(HashMap::new()),
                overrides,
                remember,
            }),
        }
    }

    /// Value a newly created field starts with: last used value for the
    /// scope, then the element kind's own default, then the configured
    /// default, then the static default.
    pub fn initial_value(
        &self,
        field_type: FieldType,
        scope: Scope,
        kind_default: Option<FieldValue>,
    ) -> FieldValue {
        let last_used = self
            .inner
            .last_used
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(field_type, scope))
            .cloned();
        last_used
            .or(kind_default)
            .or_else(|| self.inner.overrides.get(&field_type).cloned())
            .unwrap_or_else(|| field_type.default_value())
    }

    /// Build a field initialized from the cache
    pub fn create_field(
        &self,
        field_type: FieldType,
        scope: Scope,
        kind_default: Option<FieldValue>,
    ) -> Field {
        let value = self.initial_value(field_type, scope, kind_default);
        let mut field = Field::new(field_type, scope);
        if let Err(err) = field.set(value) {
            // initial values are filtered by domain, so this is a defect
            debug_assert!(false, "cached value does not fit: {err}");
            log::error!("Cached value for {field_type} rejected: {err}");
        }
        field
    }

    /// Record a value chosen by the user so the next element of the same
    /// scope starts with it.
    pub fn remember(&self, field_type: FieldType, scope: Scope, value: &FieldValue) {
        if !self.inner.remember || value.is_null() || !value.fits(field_type) {
            return;
        }
        log::debug!("Remembering {field_type} for {scope}: {value:?}");
        self.inner
            .last_used
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((field_type, scope), value.clone());
    }

    pub fn last_used(&self, field_type: FieldType, scope: Scope) -> Option<FieldValue> {
        self.inner
            .last_used
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(field_type, scope))
            .cloned()
    }
}
