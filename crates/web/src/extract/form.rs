use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Ordered key/value pairs decoded from a form body or a query string.
///
/// Keys may repeat, the pairs keep the order in which they were sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    /// Parses `application/x-www-form-urlencoded` bytes, invalid UTF-8 is replaced
    pub fn parse(input: &[u8]) -> Result<Self, serde_urlencoded::de::Error> {
        let pairs = serde_urlencoded::from_bytes::<Vec<(String, String)>>(input)?;
        Ok(Self { pairs })
    }

    /// Returns the first value sent for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Returns every value sent for `key`, in order
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs.iter().filter(move |(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn into_inner(self) -> Vec<(String, String)> {
        self.pairs
    }
}

impl From<Vec<(String, String)>> for FormData {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }
}

impl Serialize for FormData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.pairs.len()))?;
        for (key, value) in &self.pairs {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl fmt::Display for FormData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, value)) in self.pairs.iter().enumerate() {
            if index > 0 {
                f.write_str("&")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_order_and_duplicates() {
        let form = FormData::parse(b"id=king&title=tortuga&id=queen").unwrap();

        assert_eq!(form.len(), 3);
        assert_eq!(form.get("id"), Some("king"));
        assert_eq!(form.get_all("id").collect::<Vec<_>>(), vec!["king", "queen"]);
        assert_eq!(form.get("title"), Some("tortuga"));
        assert_eq!(form.get("missing"), None);
        assert_eq!(
            form.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            vec!["id", "title", "id"]
        );
    }

    #[test]
    fn parse_percent_and_plus() {
        let form = FormData::parse(b"name=hello+world&zip=%E4%B8%AD").unwrap();

        assert_eq!(form.get("name"), Some("hello world"));
        assert_eq!(form.get("zip"), Some("中"));
    }

    #[test]
    fn empty_input() {
        assert!(FormData::parse(b"").unwrap().is_empty());
    }

    #[test]
    fn display_and_serialize() {
        let form = FormData::from(vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]);

        assert_eq!(form.to_string(), "a=1&b=2");
        assert_eq!(serde_json::to_string(&form).unwrap(), r#"{"a":"1","b":"2"}"#);
    }
}
