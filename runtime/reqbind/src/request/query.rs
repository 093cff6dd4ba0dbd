use std::collections::HashMap;

/// The query parameters of the incoming request, as a multimap.
///
/// The values for each key are kept in the order they appear in the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryValues(HashMap<String, Vec<String>>);

impl QueryValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `application/x-www-form-urlencoded` query string, keeping only the
    /// keys listed in `aliases`.
    ///
    /// Keys that are not declared are never stored.
    pub fn parse<'a>(query: &str, aliases: impl IntoIterator<Item = &'a str>) -> Self {
        let mut values: HashMap<String, Vec<String>> = aliases
            .into_iter()
            .map(|alias| (alias.to_owned(), Vec::new()))
            .collect();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if let Some(slot) = values.get_mut(key.as_ref()) {
                slot.push(value.into_owned());
            }
        }
        values.retain(|_, v| !v.is_empty());
        Self(values)
    }

    /// Append a value to the list for `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    /// Mark `key` as present, without values.
    pub fn insert_empty(&mut self, key: impl Into<String>) {
        self.0.entry(key.into()).or_default();
    }

    /// All the values supplied for `key`, or `None` if the key is absent.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_declared_keys_are_kept() {
        let query = QueryValues::parse("title=Hi%20there&secret=42&tag=a", ["title", "tag"]);
        assert_eq!(query.get("title"), Some(&["Hi there".to_string()][..]));
        assert_eq!(query.get("tag"), Some(&["a".to_string()][..]));
        assert_eq!(query.get("secret"), None);
    }

    #[test]
    fn repeated_keys_keep_their_order() {
        let query = QueryValues::parse("id=3&id=1&other=x&id=2", ["id"]);
        assert_eq!(
            query.get("id").unwrap(),
            &["3".to_string(), "1".to_string(), "2".to_string()]
        );
    }

    #[test]
    fn declared_but_absent_keys_are_missing() {
        let query = QueryValues::parse("", ["status"]);
        assert_eq!(query.get("status"), None);
        assert!(query.is_empty());
    }

    #[test]
    fn keys_without_a_value_are_present_and_empty() {
        let query = QueryValues::parse("status=&plus=a+b", ["status", "plus"]);
        assert_eq!(query.get("status"), Some(&["".to_string()][..]));
        assert_eq!(query.get("plus"), Some(&["a b".to_string()][..]));
    }
}
