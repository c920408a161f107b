//! # Change Intents and Field Merge
//!
//! A [`ChangeIntent`] is one item of a batch: either a full create or a
//! partial update. Partial updates are collapsed into a [`FieldSet`] by a
//! [`FieldMergePolicy`]; the store applies exactly the columns in the set.
//!
//! ## Zero and empty values
//!
//! Presence is carried by `Option`. Under [`FieldMergePolicy::Explicit`] a
//! supplied `price` of `0.0` is written. [`FieldMergePolicy::LegacyZeroIsAbsent`]
//! treats a zero price as "leave unchanged" for clients that send `0` to mean
//! "no change". Blank strings are never applied under either policy.

use crate::book::{BookPatch, NewBook};

/// One item of a batch mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeIntent {
    /// Insert a new record with every column supplied.
    Create(NewBook),
    /// Update only the supplied columns of an existing record.
    PartialUpdate(BookPatch),
}

impl ChangeIntent {
    /// ISBN the intent is keyed on.
    pub fn isbn(&self) -> &str {
        match self {
            Self::Create(book) => &book.isbn,
            Self::PartialUpdate(patch) => &patch.isbn,
        }
    }

    /// Title carried by the intent, if any. Used in rejection messages.
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Create(book) => Some(book.title.as_str()),
            Self::PartialUpdate(patch) => patch.title.as_deref(),
        }
    }
}

/// A mutable column of the `books` table. The ISBN is not one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookColumn {
    /// `title`
    Title,
    /// `author`
    Author,
    /// `price`
    Price,
}

impl BookColumn {
    /// SQL column name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Price => "price",
        }
    }
}

impl std::fmt::Display for BookColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value assigned to a column.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Text column value.
    Text(String),
    /// Numeric column value.
    Number(f64),
}

/// Ordered column assignments for one update, in `title, author, price` order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldSet {
    assignments: Vec<(BookColumn, FieldValue)>,
}

impl FieldSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an assignment. A column already present is overwritten in place.
    pub fn set(&mut self, column: BookColumn, value: FieldValue) {
        match self.assignments.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.assignments.push((column, value)),
        }
    }

    /// Iterate assignments in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(BookColumn, FieldValue)> {
        self.assignments.iter()
    }

    /// Columns written by this set.
    pub fn columns(&self) -> Vec<BookColumn> {
        self.assignments.iter().map(|(c, _)| *c).collect()
    }

    /// Whether no column would be written.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Number of columns written.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Apply the assignments to an in-memory record.
    pub fn apply_to(&self, book: &mut crate::Book) {
        for (column, value) in &self.assignments {
            match (column, value) {
                (BookColumn::Title, FieldValue::Text(v)) => book.title = v.clone(),
                (BookColumn::Author, FieldValue::Text(v)) => book.author = v.clone(),
                (BookColumn::Price, FieldValue::Number(v)) => book.price = *v,
                (column, value) => {
                    tracing::error!(%column, ?value, "mismatched column type in field set; skipped");
                }
            }
        }
    }
}

/// How a [`BookPatch`] collapses into a [`FieldSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldMergePolicy {
    /// `Some(v)` is applied, including a zero price.
    #[default]
    Explicit,
    /// A zero price is treated as absent.
    LegacyZeroIsAbsent,
}

impl FieldMergePolicy {
    /// Collect the columns of `patch` that should be written.
    pub fn merge(&self, patch: &BookPatch) -> FieldSet {
        let mut fields = FieldSet::new();
        if let Some(title) = non_blank(patch.title.as_deref()) {
            fields.set(BookColumn::Title, FieldValue::Text(title.to_string()));
        }
        if let Some(author) = non_blank(patch.author.as_deref()) {
            fields.set(BookColumn::Author, FieldValue::Text(author.to_string()));
        }
        if let Some(price) = patch.price {
            let skip = matches!(self, Self::LegacyZeroIsAbsent) && price == 0.0;
            if !skip {
                fields.set(BookColumn::Price, FieldValue::Number(price));
            }
        }
        fields
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
