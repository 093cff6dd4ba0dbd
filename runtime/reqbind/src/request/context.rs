use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A value attached to the request by an upstream middleware.
///
/// Textual values go through the usual coercion rules when bound.
/// Typed values are bound as they are, but only into a field of the very same type.
#[derive(Clone)]
pub enum ContextValue {
    Text(String),
    Typed {
        type_id: TypeId,
        type_name: &'static str,
        value: Arc<dyn Any + Send + Sync>,
    },
}

impl ContextValue {
    /// Wrap a typed value.
    pub fn typed<T: Any + Send + Sync>(value: T) -> Self {
        Self::Typed {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            value: Arc::new(value),
        }
    }

    /// The name of the type stored in this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            ContextValue::Text(_) => std::any::type_name::<String>(),
            ContextValue::Typed { type_name, .. } => type_name,
        }
    }

    /// Get a reference to the stored value, if it is of type `T`.
    ///
    /// Textual values can only be read as `String`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            ContextValue::Text(text) => (text as &dyn Any).downcast_ref(),
            ContextValue::Typed { type_id, value, .. } => {
                if *type_id != TypeId::of::<T>() {
                    return None;
                }
                value.downcast_ref()
            }
        }
    }
}

impl fmt::Debug for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
            ContextValue::Typed { type_name, .. } => {
                f.debug_struct("Typed").field("type_name", type_name).finish_non_exhaustive()
            }
        }
    }
}

/// The values attached to the request by upstream middlewares, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ContextValues(HashMap<String, ContextValue>);

impl ContextValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a textual value.
    pub fn insert_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), ContextValue::Text(value.into()));
    }

    /// Attach a typed value.
    pub fn insert_typed<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.0.insert(key.into(), ContextValue::typed(value));
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
