//! Search query assembly.
//!
//! The catalog's full-text engine takes a single query string: the
//! collection name, every typed word with a wildcard suffix, and the
//! checked category filters as an alternation group. The same string goes
//! to both the text search and the geo discovery service.

/// Builds the query string from the collection name, free-text input and
/// category filters.
#[derive(Debug, Clone, Default)]
pub struct SearchQueryBuilder {
    collection: String,
    input: String,
    filters: Vec<String>,
}

impl SearchQueryBuilder {
    #[must_use]
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            input: String::new(),
            filters: Vec::new(),
        }
    }

    pub fn set_input(&mut self, input: &str) {
        self.input = input.to_string();
    }

    pub fn set_filters(&mut self, filters: Vec<String>) {
        self.filters = filters;
    }

    /// Renders `{collection} {word}* ... ({filter}|{filter})`, lowercased.
    #[must_use]
    pub fn build(&self) -> String {
        let mut query = self.collection.clone();

        for word in self.input.split_whitespace() {
            query.push(' ');
            query.push_str(word);
            query.push('*');
        }

        if !self.filters.is_empty() {
            query.push_str(" (");
            query.push_str(&self.filters.join("|"));
            query.push(')');
        }

        query.to_lowercase()
    }
}
