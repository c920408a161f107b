//! # Batch Mutation Processor
//!
//! Applies an ordered sequence of [`ChangeIntent`]s to a [`RecordStore`],
//! one store write per item, and reports one [`Outcome`] per item.
//!
//! ## Guarantees
//!
//! - `report.outcomes.len() == intents.len()`, in input order.
//! - An intent with a blank ISBN is rejected without a store call.
//! - Items are applied strictly in sequence; each write completes before the
//!   next one starts. No transaction spans the batch.
//! - A failing item never aborts the remaining items.
//! - [`BatchReport::any_succeeded`] is true iff some item was written.

use crate::error::ItemError;
use crate::intent::{ChangeIntent, FieldMergePolicy};
use crate::outcome::{BatchReport, Outcome};
use crate::store::RecordStore;

/// Stateless batch processor. Cheap to copy and safe to share.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchProcessor {
    policy: FieldMergePolicy,
}

impl BatchProcessor {
    /// A processor merging partial updates with `policy`.
    pub fn new(policy: FieldMergePolicy) -> Self {
        Self { policy }
    }

    /// The merge policy in use.
    pub fn policy(&self) -> FieldMergePolicy {
        self.policy
    }

    /// Apply every intent in order and collect the outcomes.
    pub async fn process<S>(&self, intents: Vec<ChangeIntent>, store: &S) -> BatchReport
    where
        S: RecordStore + ?Sized,
    {
        let total = intents.len();
        let mut report = BatchReport {
            outcomes: Vec::with_capacity(total),
            any_succeeded: false,
        };

        for (index, intent) in intents.into_iter().enumerate() {
            let isbn = intent.isbn().to_string();
            let outcome = match self.apply(intent, store).await {
                Ok(outcome) => {
                    tracing::debug!(index, isbn = %isbn, "batch item applied");
                    outcome
                }
                Err(err) => {
                    tracing::warn!(index, isbn = %isbn, error = %err, "batch item not applied");
                    Outcome::failed(isbn, &err)
                }
            };
            report.push(outcome);
        }

        tracing::info!(
            items = total,
            succeeded = report.succeeded(),
            failed = report.failed(),
            "batch processed"
        );
        report
    }

    /// Apply a single intent with exactly one store write.
    async fn apply<S>(&self, intent: ChangeIntent, store: &S) -> Result<Outcome, ItemError>
    where
        S: RecordStore + ?Sized,
    {
        if intent.isbn().trim().is_empty() {
            return Err(ItemError::Validation(format!(
                "ISBN is required; item with title \"{}\" was not applied.",
                intent.title().unwrap_or_default()
            )));
        }

        match intent {
            ChangeIntent::Create(new_book) => {
                let book = new_book.into_book();
                store.insert(&book).await?;
                Ok(Outcome::created(book.isbn))
            }
            ChangeIntent::PartialUpdate(patch) => {
                let fields = self.policy.merge(&patch);
                match store.update_fields(&patch.isbn, &fields).await? {
                    0 => Err(ItemError::NotApplied { isbn: patch.isbn }),
                    _ => Ok(Outcome::altered(patch.isbn)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{Book, BookPatch, NewBook};
    use crate::error::StoreError;
    use crate::intent::{BookColumn, FieldSet};
    use crate::memory::MemoryStore;
    use crate::outcome::OutcomeKind;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use proptest::prelude::*;

    /// Store stub that records every call and the columns each update wrote.
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryStore,
        calls: Mutex<Vec<String>>,
        written_columns: Mutex<Vec<Vec<BookColumn>>>,
        fail_isbn: Option<String>,
    }

    impl RecordingStore {
        fn failing_on(isbn: &str) -> Self {
            Self {
                fail_isbn: Some(isbn.to_string()),
                ..Self::default()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    #[async_trait]
    impl RecordStore for RecordingStore {
        async fn insert(&self, book: &Book) -> Result<(), StoreError> {
            self.calls.lock().push(format!("insert:{}", book.isbn));
            if self.fail_isbn.as_deref() == Some(book.isbn.as_str()) {
                return Err(StoreError::Backend("simulated write failure".into()));
            }
            self.inner.insert(book).await
        }

        async fn update_fields(&self, isbn: &str, fields: &FieldSet) -> Result<u64, StoreError> {
            self.calls.lock().push(format!("update:{isbn}"));
            self.written_columns.lock().push(fields.columns());
            if self.fail_isbn.as_deref() == Some(isbn) {
                return Err(StoreError::Backend("simulated write failure".into()));
            }
            self.inner.update_fields(isbn, fields).await
        }

        async fn get(&self, isbn: &str) -> Result<Option<Book>, StoreError> {
            self.inner.get(isbn).await
        }

        async fn list(&self) -> Result<Vec<Book>, StoreError> {
            self.inner.list().await
        }

        async fn delete(&self, isbn: &str) -> Result<u64, StoreError> {
            self.inner.delete(isbn).await
        }
    }

    fn create(isbn: &str, title: &str) -> ChangeIntent {
        ChangeIntent::Create(NewBook::from_parts(isbn, Some(title.into()), None, None))
    }

    fn update(patch: BookPatch) -> ChangeIntent {
        ChangeIntent::PartialUpdate(patch)
    }

    #[tokio::test]
    async fn blank_isbn_never_reaches_store() {
        let store = RecordingStore::default();
        let report = BatchProcessor::default()
            .process(
                vec![create("", "T"), update(BookPatch::new("  ").title("x"))],
                &store,
            )
            .await;

        assert_eq!(store.call_count(), 0);
        assert_eq!(report.outcomes.len(), 2);
        assert!(report
            .outcomes
            .iter()
            .all(|o| o.kind == OutcomeKind::Rejected));
        assert!(!report.any_succeeded);
    }

    #[tokio::test]
    async fn rejection_message_mentions_title() {
        let store = RecordingStore::default();
        let report = BatchProcessor::default()
            .process(vec![create("", "Dune")], &store)
            .await;
        assert!(report.outcomes[0].message.contains("Dune"));
        assert_eq!(report.outcomes[0].isbn, "");
    }

    #[tokio::test]
    async fn price_only_update_leaves_title_and_author() {
        let store = RecordingStore::default();
        store
            .inner
            .insert(&Book {
                isbn: "A".into(),
                title: "Keep".into(),
                author: "Me".into(),
                price: 1.0,
            })
            .await
            .unwrap();

        let report = BatchProcessor::default()
            .process(vec![update(BookPatch::new("A").price(2.5))], &store)
            .await;

        assert!(report.any_succeeded);
        assert_eq!(*store.written_columns.lock(), vec![vec![BookColumn::Price]]);
        let book = store.inner.get("A").await.unwrap().unwrap();
        assert_eq!(book.title, "Keep");
        assert_eq!(book.author, "Me");
        assert_eq!(book.price, 2.5);
    }

    #[tokio::test]
    async fn update_of_missing_record_is_not_applied() {
        let store = RecordingStore::default();
        let report = BatchProcessor::default()
            .process(vec![update(BookPatch::new("ghost").title("T"))], &store)
            .await;
        assert_eq!(report.outcomes[0].kind, OutcomeKind::NotApplied);
        assert!(report.outcomes[0].message.contains("ghost"));
        assert!(!report.any_succeeded);
    }

    #[tokio::test]
    async fn store_failure_does_not_abort_batch() {
        let store = RecordingStore::failing_on("B");
        let report = BatchProcessor::default()
            .process(
                vec![create("A", "1"), create("B", "2"), create("C", "3")],
                &store,
            )
            .await;

        assert_eq!(store.call_count(), 3);
        let kinds: Vec<OutcomeKind> = report.outcomes.iter().map(|o| o.kind).collect();
        assert_eq!(
            kinds,
            vec![OutcomeKind::Created, OutcomeKind::Failed, OutcomeKind::Created]
        );
        assert_eq!(report.outcomes[1].message, "simulated write failure");
        assert!(report.any_succeeded);
    }

    #[tokio::test]
    async fn duplicate_create_reports_store_text() {
        let store = RecordingStore::default();
        let report = BatchProcessor::default()
            .process(vec![create("A", "1"), create("A", "2")], &store)
            .await;
        assert_eq!(report.outcomes[0].kind, OutcomeKind::Created);
        assert_eq!(report.outcomes[1].kind, OutcomeKind::Failed);
        assert!(report.outcomes[1].message.contains("already exists"));
    }

    #[tokio::test]
    async fn all_failing_batch_has_no_success() {
        let store = RecordingStore::default();
        let report = BatchProcessor::default()
            .process(
                vec![
                    create("", "x"),
                    update(BookPatch::new("missing").price(1.0)),
                ],
                &store,
            )
            .await;
        assert!(!report.any_succeeded);
        assert_eq!(report.succeeded(), 0);
    }

    #[tokio::test]
    async fn empty_batch_reports_nothing() {
        let store = RecordingStore::default();
        let report = BatchProcessor::default().process(Vec::new(), &store).await;
        assert!(report.outcomes.is_empty());
        assert!(!report.any_succeeded);
    }

    #[tokio::test]
    async fn mixed_create_and_update_end_to_end() {
        let store = RecordingStore::default();
        let report = BatchProcessor::default()
            .process(
                vec![
                    create("A", "T1"),
                    create("", "T2"),
                    update(BookPatch::new("A").price(9.99)),
                ],
                &store,
            )
            .await;

        let kinds: Vec<OutcomeKind> = report.outcomes.iter().map(|o| o.kind).collect();
        assert_eq!(
            kinds,
            vec![OutcomeKind::Created, OutcomeKind::Rejected, OutcomeKind::Altered]
        );
        assert_eq!(report.outcomes[0].isbn, "A");
        assert_eq!(report.outcomes[1].isbn, "");
        assert_eq!(report.outcomes[2].isbn, "A");
        assert!(report.any_succeeded);

        let book = store.inner.get("A").await.unwrap().unwrap();
        assert_eq!(book.title, "T1");
        assert_eq!(book.price, 9.99);
    }

    #[tokio::test]
    async fn legacy_policy_ignores_zero_price() {
        let store = RecordingStore::default();
        store
            .inner
            .insert(&Book {
                isbn: "A".into(),
                title: "T".into(),
                author: "W".into(),
                price: 4.0,
            })
            .await
            .unwrap();

        let report = BatchProcessor::new(FieldMergePolicy::LegacyZeroIsAbsent)
            .process(vec![update(BookPatch::new("A").price(0.0))], &store)
            .await;

        assert!(report.any_succeeded);
        assert_eq!(store.inner.get("A").await.unwrap().unwrap().price, 4.0);
    }

    fn arb_intent() -> impl Strategy<Value = ChangeIntent> {
        let isbn = prop_oneof![Just(String::new()), "[A-D]"];
        (isbn, any::<bool>(), proptest::option::of("[a-z]{0,4}")).prop_map(
            |(isbn, is_create, title)| {
                if is_create {
                    ChangeIntent::Create(NewBook::from_parts(isbn, title, None, None))
                } else {
                    ChangeIntent::PartialUpdate(BookPatch {
                        isbn,
                        title,
                        ..BookPatch::default()
                    })
                }
            },
        )
    }

    proptest! {
        #[test]
        fn outcomes_match_intents_in_length_and_order(
            intents in proptest::collection::vec(arb_intent(), 0..24)
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            let store = RecordingStore::default();
            let expected: Vec<String> = intents.iter().map(|i| i.isbn().to_string()).collect();
            let blank = expected.iter().filter(|i| i.trim().is_empty()).count();

            let report = runtime.block_on(BatchProcessor::default().process(intents, &store));

            let actual: Vec<String> = report.outcomes.iter().map(|o| o.isbn.clone()).collect();
            prop_assert_eq!(actual, expected.clone());
            prop_assert_eq!(store.call_count(), expected.len() - blank);
            prop_assert_eq!(
                report.any_succeeded,
                report.outcomes.iter().any(|o| o.is_success())
            );
        }
    }
}
