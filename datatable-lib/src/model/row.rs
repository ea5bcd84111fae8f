//! The `Row` trait

use serde_json::Value;

/// A record displayed as one table line.
///
/// Rows are looked up by column key. [`Row::id`] is the identifying field the
/// table falls back to for row keys when no cache-key function is configured.
///
/// # Example
///
/// ```
/// use datatable_lib::model::Row;
/// use serde_json::Value;
///
/// #[derive(Clone)]
/// struct Fruit {
///     id: u32,
///     name: String,
/// }
///
/// impl Row for Fruit {
///     fn field(&self, key: &str) -> Option<Value> {
///         match key {
///             "id" => Some(self.id.into()),
///             "name" => Some(self.name.clone().into()),
///             _ => None,
///         }
///     }
/// }
///
/// let fruit = Fruit { id: 7, name: "Pear".into() };
/// assert_eq!(fruit.id().as_deref(), Some("7"));
/// ```
pub trait Row: Clone + Send + Sync + 'static {
    /// Returns the value stored under `key`, if any.
    fn field(&self, key: &str) -> Option<Value>;

    /// Returns the identifying field rendered as a string.
    ///
    /// Defaults to the `id` field. Strings are used as-is, numbers and other
    /// scalars use their JSON text. `null` counts as missing.
    fn id(&self) -> Option<String> {
        match self.field("id")? {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}
