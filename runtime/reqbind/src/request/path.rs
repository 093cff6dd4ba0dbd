use std::collections::HashMap;

/// The values captured from the path of the incoming request by the router,
/// keyed by parameter name.
///
/// Values are expected to be already percent-decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathValues(HashMap<String, String>);

impl PathValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, replacing the previous one for the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for PathValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
