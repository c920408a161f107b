//! # Per-Item Outcomes
//!
//! Each intent of a batch produces exactly one [`Outcome`], in input order.
//! The wire shape is `{"isbn": ..., "message": ...}`; the [`OutcomeKind`]
//! stays internal and drives [`BatchReport::any_succeeded`].

use serde::Serialize;

use crate::error::ItemError;

/// Classification of an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// A create was written.
    Created,
    /// An update matched a row and was written.
    Altered,
    /// Rejected before reaching the store.
    Rejected,
    /// The store reported an error.
    Failed,
    /// An update matched zero rows.
    NotApplied,
}

impl OutcomeKind {
    /// Whether this outcome counts as a success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Created | Self::Altered)
    }
}

/// Result of one intent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    /// ISBN of the intent, as supplied (possibly empty).
    pub isbn: String,
    /// Confirmation or error text.
    pub message: String,
    /// Internal classification.
    #[serde(skip)]
    pub kind: OutcomeKind,
}

impl Outcome {
    /// A successful create.
    pub fn created(isbn: impl Into<String>) -> Self {
        let isbn = isbn.into();
        Self {
            message: format!("Book {isbn} created successfully."),
            isbn,
            kind: OutcomeKind::Created,
        }
    }

    /// A successful update.
    pub fn altered(isbn: impl Into<String>) -> Self {
        let isbn = isbn.into();
        Self {
            message: format!("Book {isbn} altered successfully."),
            isbn,
            kind: OutcomeKind::Altered,
        }
    }

    /// A failed item.
    pub fn failed(isbn: impl Into<String>, error: &ItemError) -> Self {
        let kind = match error {
            ItemError::Validation(_) => OutcomeKind::Rejected,
            ItemError::Store(_) => OutcomeKind::Failed,
            ItemError::NotApplied { .. } => OutcomeKind::NotApplied,
        };
        Self {
            isbn: isbn.into(),
            message: error.to_string(),
            kind,
        }
    }

    /// Whether this outcome counts as a success.
    pub fn is_success(&self) -> bool {
        self.kind.is_success()
    }
}

/// Everything a batch produced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchReport {
    /// One outcome per intent, in input order.
    pub outcomes: Vec<Outcome>,
    /// True iff at least one outcome is a success.
    pub any_succeeded: bool,
}

impl BatchReport {
    /// Record the next outcome.
    pub fn push(&mut self, outcome: Outcome) {
        self.any_succeeded |= outcome.is_success();
        self.outcomes.push(outcome);
    }

    /// Number of successful outcomes.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of failed outcomes.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn outcome_serializes_isbn_and_message_only() {
        let json = serde_json::to_value(Outcome::created("A")).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(json["isbn"], "A");
        assert_eq!(json["message"], "Book A created successfully.");
    }

    #[test]
    fn failure_kinds_follow_item_error() {
        let rejected = Outcome::failed("", &ItemError::Validation("no isbn".into()));
        assert_eq!(rejected.kind, OutcomeKind::Rejected);

        let failed = Outcome::failed("A", &ItemError::Store(StoreError::Backend("x".into())));
        assert_eq!(failed.kind, OutcomeKind::Failed);

        let missing = Outcome::failed("A", &ItemError::NotApplied { isbn: "A".into() });
        assert_eq!(missing.kind, OutcomeKind::NotApplied);
        assert!(!missing.is_success());
    }

    #[test]
    fn report_tracks_any_succeeded() {
        let mut report = BatchReport::default();
        report.push(Outcome::failed("", &ItemError::Validation("x".into())));
        assert!(!report.any_succeeded);
        report.push(Outcome::altered("A"));
        report.push(Outcome::failed("B", &ItemError::NotApplied { isbn: "B".into() }));
        assert!(report.any_succeeded);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 2);
    }
}
