//! Book persistence operations on the `books` table.

use async_trait::async_trait;
use bookshelf_core::{Book, FieldSet, FieldValue, RecordStore, StoreError};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::store_error;

/// [`RecordStore`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    /// Wrap a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Build the field-scoped update for one record.
///
/// Column names come from the closed [`BookColumn`](bookshelf_core::BookColumn)
/// enum; every value, including the key, is a bound parameter. The leading
/// `isbn = $1` keeps the statement valid for an empty field set, so the row
/// count still reports whether the record exists.
pub(crate) fn update_statement<'a>(
    isbn: &'a str,
    fields: &'a FieldSet,
) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE books SET isbn = ");
    builder.push_bind(isbn);
    for (column, value) in fields.iter() {
        builder.push(", ").push(column.as_str()).push(" = ");
        match value {
            FieldValue::Text(text) => builder.push_bind(text.as_str()),
            FieldValue::Number(number) => builder.push_bind(*number),
        };
    }
    builder.push(" WHERE isbn = ");
    builder.push_bind(isbn);
    builder
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, book: &Book) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO books (isbn, title, author, price) VALUES ($1, $2, $3, $4)")
            .bind(&book.isbn)
            .bind(&book.title)
            .bind(&book.author)
            .bind(book.price)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn update_fields(&self, isbn: &str, fields: &FieldSet) -> Result<u64, StoreError> {
        let result = update_statement(isbn, fields)
            .build()
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected())
    }

    async fn get(&self, isbn: &str) -> Result<Option<Book>, StoreError> {
        let row = sqlx::query_as::<_, BookRow>(
            "SELECT isbn, title, author, price FROM books WHERE isbn = $1",
        )
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(row.map(BookRow::into_book))
    }

    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        let rows = sqlx::query_as::<_, BookRow>(
            "SELECT isbn, title, author, price FROM books ORDER BY isbn",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(rows.into_iter().map(BookRow::into_book).collect())
    }

    async fn delete(&self, isbn: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = $1")
            .bind(isbn)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected())
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct BookRow {
    isbn: String,
    title: String,
    author: String,
    price: f64,
}

impl BookRow {
    fn into_book(self) -> Book {
        Book {
            isbn: self.isbn,
            title: self.title,
            author: self.author,
            price: self.price,
        }
    }
}
