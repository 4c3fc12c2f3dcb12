use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;

use super::schema_gen::{generate_create_table, generate_indexes};
use crate::schema::ALL_TABLES;

/// A book ready for insertion, as extracted from one item card.
///
/// The price is kept as the string scraped from the page; SQLite column
/// affinity coerces it on insert.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub price: String,
    pub amount: i64,
    pub image_path: String,
    pub author_name: String,
}

/// Owns the database connection for one seeding run.
///
/// Lifecycle: `create` (or `open_in_memory` in tests) -> pipeline calls ->
/// `finalize`.
pub struct BookStore {
    conn: Connection,
}

impl BookStore {
    /// Create a fresh database at the given path, removing any existing file,
    /// and set up the full schema.
    pub fn create(db_path: &Path) -> Result<Self> {
        if db_path.exists() {
            std::fs::remove_file(db_path).context("Failed to remove existing database")?;
        }

        let conn = Connection::open(db_path).context("Failed to create database")?;

        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        let store = Self { conn };
        store.create_tables()?;
        Ok(store)
    }

    /// Open an in-memory database with the full schema. Used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let store = Self { conn };
        store.create_tables()?;
        Ok(store)
    }

    fn create_tables(&self) -> Result<()> {
        for schema in ALL_TABLES {
            let sql = generate_create_table(schema);
            self.conn
                .execute(&sql, [])
                .with_context(|| format!("Failed to create table: {}", schema.name))?;

            for index_sql in generate_indexes(schema) {
                self.conn
                    .execute(&index_sql, [])
                    .with_context(|| format!("Failed to create index for: {}", schema.name))?;
            }
        }

        Ok(())
    }

    /// Insert the genre vocabulary, one row per name, in a single
    /// transaction. No duplicate check: the schema is always created fresh.
    pub fn seed_genres(&mut self, names: &[&str]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached("INSERT INTO genres (name) VALUES (?1)")?;
            for name in names {
                stmt.execute([name])
                    .with_context(|| format!("Failed to insert genre: {}", name))?;
            }
        }
        tx.commit()?;
        Ok(names.len())
    }

    /// Insert one page worth of books in a single transaction, resolving each
    /// author by name (reusing the existing row, or inserting a new one).
    /// If any insert fails the whole page rolls back.
    pub fn insert_books(&mut self, books: &[NewBook]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO books (title, price, amount, image_path, author_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for book in books {
                let author_id = resolve_author(&tx, &book.author_name)?;
                stmt.execute(params![
                    book.title,
                    book.price,
                    book.amount,
                    book.image_path,
                    author_id
                ])
                .with_context(|| format!("Failed to insert book: {}", book.title))?;
            }
        }
        tx.commit()?;
        Ok(books.len())
    }

    /// All book ids, in insertion order
    pub fn book_ids(&self) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare("SELECT id FROM books ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    /// All genre ids, in insertion order
    pub fn genre_ids(&self) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare("SELECT id FROM genres ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    /// Attach genre links to books, all in a single transaction.
    pub fn attach_genres(&mut self, links: &[(i64, i64)]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt =
                tx.prepare_cached("INSERT INTO book_genres (book_id, genre_id) VALUES (?1, ?2)")?;
            for (book_id, genre_id) in links {
                stmt.execute(params![book_id, genre_id])
                    .with_context(|| format!("Failed to link book {} to genre {}", book_id, genre_id))?;
            }
        }
        tx.commit()?;
        Ok(links.len())
    }

    /// Number of rows in a table
    pub fn count_rows(&self, table: &str) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let count = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }

    /// Number of genre rows with the given name
    pub fn genre_count_by_name(&self, name: &str) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM genres WHERE name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Author id of a book
    pub fn book_author_id(&self, book_id: i64) -> Result<i64> {
        let id = self.conn.query_row(
            "SELECT author_id FROM books WHERE id = ?1",
            [book_id],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Genre ids attached to a book
    pub fn genres_of_book(&self, book_id: i64) -> Result<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT genre_id FROM book_genres WHERE book_id = ?1")?;
        let ids = stmt
            .query_map([book_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    /// Stored price of a book, as coerced by the REAL column
    pub fn book_price(&self, book_id: i64) -> Result<f64> {
        let price =
            self.conn
                .query_row("SELECT price FROM books WHERE id = ?1", [book_id], |row| {
                    row.get(0)
                })?;
        Ok(price)
    }

    /// Finalize the database before closing
    pub fn finalize(self) -> Result<()> {
        self.conn.execute("PRAGMA optimize;", [])?;
        Ok(())
    }
}

/// Look up an author by exact name, inserting a new row on first sight.
/// One query per book, by design of the source catalog flow.
fn resolve_author(tx: &Transaction, name: &str) -> Result<i64> {
    let existing: Option<i64> = tx
        .query_row(
            "SELECT id FROM authors WHERE name = ?1 LIMIT 1",
            [name],
            |row| row.get(0),
        )
        .optional()
        .with_context(|| format!("Failed to look up author: {}", name))?;

    if let Some(id) = existing {
        return Ok(id);
    }

    tx.execute("INSERT INTO authors (name) VALUES (?1)", [name])
        .with_context(|| format!("Failed to insert author: {}", name))?;
    Ok(tx.last_insert_rowid())
}
