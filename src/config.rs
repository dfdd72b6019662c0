//! Explicit configuration handed to the builders that need it.

/// Maximum write requests in a single batch write.
pub const BATCH_WRITE_LIMIT: usize = 25;
/// Maximum keys in a single batch get.
pub const BATCH_GET_LIMIT: usize = 100;
/// Maximum items in a single write transaction.
pub const TRANSACTION_WRITE_LIMIT: usize = 100;
/// Maximum items in a single read transaction.
pub const TRANSACTION_GET_LIMIT: usize = 100;
/// Separator between the parts of a composite sort key.
pub const COMPOSITE_KEY_SEPARATOR: &str = "#";

/// Limits and key formatting shared by query validation and key helpers.
///
/// ```rust
/// use dynamodb_access::config::Config;
///
/// let config = Config {
///     batch_write_limit: 10,
///     ..Default::default()
/// };
/// assert_eq!(config.batch_get_limit, 100);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Ceiling on write requests across all tables of a batch write.
    pub batch_write_limit: usize,
    /// Ceiling on keys across all tables of a batch get.
    pub batch_get_limit: usize,
    /// Ceiling on items of a write transaction.
    pub transaction_write_limit: usize,
    /// Ceiling on items of a read transaction.
    pub transaction_get_limit: usize,
    /// Separator used by [`Config::composite_key`].
    pub composite_key_separator: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_write_limit: BATCH_WRITE_LIMIT,
            batch_get_limit: BATCH_GET_LIMIT,
            transaction_write_limit: TRANSACTION_WRITE_LIMIT,
            transaction_get_limit: TRANSACTION_GET_LIMIT,
            composite_key_separator: COMPOSITE_KEY_SEPARATOR.to_string(),
        }
    }
}

impl Config {
    /// Join key parts with the configured separator.
    pub fn composite_key<I, S>(&self, parts: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut key = String::new();
        for (index, part) in parts.into_iter().enumerate() {
            if index > 0 {
                key.push_str(&self.composite_key_separator);
            }
            key.push_str(part.as_ref());
        }
        key
    }
}

/// Fixed leading segment of a composite sort key, e.g. `order` in `order#2024-01-01#42`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SortKeyPrefix(pub &'static str);

impl SortKeyPrefix {
    /// Build a sort key starting with this prefix.
    pub fn composite<I, S>(&self, config: &Config, parts: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut key = self.0.to_string();
        for part in parts {
            key.push_str(&config.composite_key_separator);
            key.push_str(part.as_ref());
        }
        key
    }

    /// The value to pass to a `BeginsWith` key predicate to match every key with this prefix.
    pub fn begins_with(&self, config: &Config) -> String {
        format!("{}{}", self.0, config.composite_key_separator)
    }
}
