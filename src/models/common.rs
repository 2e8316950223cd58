//! Query string construction shared by the list endpoints.

use url::form_urlencoded;

/// Ordered query parameters.
///
/// Absent values are dropped rather than sent as a literal `null`.
/// Encoding follows `application/x-www-form-urlencoded`, the same as a
/// browser's `URLSearchParams`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Creates an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl ToString) -> &mut Self {
        self.pairs.push((name.into(), value.to_string()));
        self
    }

    /// Appends a parameter only if it has a value.
    pub fn push_opt<V: ToString>(&mut self, name: impl Into<String>, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.push(name, value);
        }
        self
    }

    /// Returns true if no parameters were added.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns true if a parameter with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.pairs.iter().any(|(n, _)| n == name)
    }

    /// Returns the first value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Encodes the parameters, without a leading `?`.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    /// Appends the query string to `path`, leaving the path bare when empty.
    pub fn append_to(&self, path: &str) -> String {
        if self.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, self.to_query_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_params_leave_path_bare() {
        assert_eq!(QueryParams::new().append_to("/tickets"), "/tickets");
    }

    #[test]
    fn test_push_opt_skips_none() {
        let mut params = QueryParams::new();
        params.push_opt("status", Some("NEW")).push_opt("priority", None::<&str>);
        assert_eq!(params.to_query_string(), "status=NEW");
        assert!(!params.contains("priority"));
    }

    #[test]
    fn test_values_are_form_encoded() {
        let mut params = QueryParams::new();
        params.push("q", "printer & scanner").push("path", "a/b?c");
        assert_eq!(params.to_query_string(), "q=printer+%26+scanner&path=a%2Fb%3Fc");
    }

    #[test]
    fn test_order_is_preserved() {
        let mut params = QueryParams::new();
        params.push("limit", 10).push("offset", 0).push("a", "z");
        assert_eq!(params.append_to("/x"), "/x?limit=10&offset=0&a=z");
        assert_eq!(params.get("offset"), Some("0"));
    }
}
