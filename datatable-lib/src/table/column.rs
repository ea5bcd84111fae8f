//! Column descriptors

use std::sync::Arc;

use serde_json::Value;

use crate::model::Row;

/// Horizontal alignment of a column's header and cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Formats a cell from its raw value and the whole row.
pub type CellRenderer<R> = Arc<dyn Fn(&Value, &R) -> String + Send + Sync>;

/// Column configuration.
///
/// Columns are immutable descriptors supplied by the caller: a key into the
/// row, a header label, an optional alignment override, an optional fixed
/// width, and an optional custom renderer.
///
/// # Examples
///
/// ```ignore
/// let columns = vec![
///     Column::new("username", "Username"),
///     Column::new("totalTasks", "Total Tasks")
///         .align(Alignment::Center)
///         .render(|value, _row: &User| format!("{} tasks", value)),
/// ];
/// ```
pub struct Column<R> {
    /// Key of the row field this column displays.
    pub key: String,
    /// Header text.
    pub label: String,
    /// Alignment override. `None` uses the table default.
    pub align: Option<Alignment>,
    /// Fixed width hint (e.g. `"100px"`).
    pub width: Option<String>,
    renderer: Option<CellRenderer<R>>,
}

impl<R: Row> Column<R> {
    /// Creates a new column for `key` with header `label`.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            align: None,
            width: None,
            renderer: None,
        }
    }

    /// Set the column alignment.
    pub fn align(mut self, align: Alignment) -> Self {
        self.align = Some(align);
        self
    }

    /// Set a fixed width hint.
    pub fn width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    /// Set a custom cell renderer.
    pub fn render<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&Value, &R) -> String + Send + Sync + 'static,
    {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    /// Returns the alignment to use, falling back to `default`.
    pub fn resolved_align(&self, default: Alignment) -> Alignment {
        self.align.unwrap_or(default)
    }

    /// Renders this column's cell for `row`.
    ///
    /// Uses the custom renderer if one is set, else the raw value.
    pub fn render_cell(&self, row: &R) -> String {
        let value = row.field(&self.key).unwrap_or(Value::Null);
        match &self.renderer {
            Some(renderer) => renderer(&value, row),
            None => display_value(&value),
        }
    }
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            label: self.label.clone(),
            align: self.align,
            width: self.width.clone(),
            renderer: self.renderer.clone(),
        }
    }
}

impl<R> std::fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("align", &self.align)
            .field("width", &self.width)
            .field("custom_renderer", &self.renderer.is_some())
            .finish()
    }
}

/// Renders a raw JSON value as cell text.
///
/// `null` is empty, strings are unquoted, everything else is JSON text.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
