//! Table definitions for the bookstore database.
//!
//! Declared in dependency order: FK parents come before their children so
//! `ALL_TABLES` can be created front to back.

use super::types::*;

// =============================================================================
// Independent Tables (no FK dependencies)
// =============================================================================

pub static AUTHORS: TableSchema = TableSchema {
    name: "authors",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text),
    ],
    foreign_keys: &[],
    // Author resolution does an exact-name lookup per book
    indexes: &[Index::on(&["name"])],
};

pub static GENRES: TableSchema = TableSchema {
    name: "genres",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text),
    ],
    foreign_keys: &[],
    indexes: &[],
};

pub static CITIES: TableSchema = TableSchema {
    name: "cities",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text),
        Column::required("days_delivery", ColumnType::Integer),
    ],
    foreign_keys: &[],
    indexes: &[],
};

pub static STEPS: TableSchema = TableSchema {
    name: "steps",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text),
    ],
    foreign_keys: &[],
    indexes: &[],
};

// =============================================================================
// Dependent Tables
// =============================================================================

pub static BOOKS: TableSchema = TableSchema {
    name: "books",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("title", ColumnType::Text),
        Column::required("price", ColumnType::Real),
        Column::required("amount", ColumnType::Integer),
        Column::new("image_path", ColumnType::Text),
        Column::new("author_id", ColumnType::Integer),
    ],
    foreign_keys: &[ForeignKey::new("author_id", "authors")],
    indexes: &[],
};

pub static CLIENTS: TableSchema = TableSchema {
    name: "clients",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("first_name", ColumnType::Text),
        Column::required("last_name", ColumnType::Text),
        Column::required("email", ColumnType::Text),
        Column::required("login", ColumnType::Text),
        Column::required("password_hash", ColumnType::Text),
        Column::new("city_id", ColumnType::Integer),
    ],
    foreign_keys: &[ForeignKey::new("city_id", "cities")],
    indexes: &[],
};

pub static ORDERS: TableSchema = TableSchema {
    name: "orders",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::new("client_id", ColumnType::Integer),
    ],
    foreign_keys: &[ForeignKey::new("client_id", "clients")],
    indexes: &[],
};

// =============================================================================
// Junction Tables
// =============================================================================

pub static BOOK_GENRES: TableSchema = TableSchema {
    name: "book_genres",
    columns: &[
        Column::new("book_id", ColumnType::Integer),
        Column::new("genre_id", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("book_id", "books"),
        ForeignKey::new("genre_id", "genres"),
    ],
    indexes: &[],
};

pub static ORDER_BOOKS: TableSchema = TableSchema {
    name: "order_books",
    columns: &[
        Column::new("order_id", ColumnType::Integer),
        Column::new("book_id", ColumnType::Integer),
        Column::new("amount", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("order_id", "orders"),
        ForeignKey::new("book_id", "books"),
    ],
    indexes: &[],
};

pub static ORDER_STEPS: TableSchema = TableSchema {
    name: "order_steps",
    columns: &[
        Column::new("order_id", ColumnType::Integer),
        Column::new("step_id", ColumnType::Integer),
        Column::new("date", ColumnType::Timestamp),
    ],
    foreign_keys: &[
        ForeignKey::new("order_id", "orders"),
        ForeignKey::new("step_id", "steps"),
    ],
    indexes: &[],
};

/// All tables in creation order (parents before FK children)
pub static ALL_TABLES: &[&TableSchema] = &[
    &AUTHORS,
    &GENRES,
    &CITIES,
    &STEPS,
    &BOOKS,
    &CLIENTS,
    &ORDERS,
    &BOOK_GENRES,
    &ORDER_BOOKS,
    &ORDER_STEPS,
];

/// Look up a table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().find(|t| t.name == name).copied()
}

/// All table names in creation order
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_all_tables_in_dependency_order() {
        let mut seen: HashSet<&str> = HashSet::new();
        for table in ALL_TABLES {
            for dep in table.dependencies() {
                assert!(
                    seen.contains(dep),
                    "table {} declared before its parent {}",
                    table.name,
                    dep
                );
            }
            seen.insert(table.name);
        }
    }

    #[test]
    fn test_foreign_keys_reference_known_tables() {
        for table in ALL_TABLES {
            for fk in table.foreign_keys {
                assert!(
                    get_table(fk.references_table).is_some(),
                    "{}.{} references unknown table {}",
                    table.name,
                    fk.column,
                    fk.references_table
                );
            }
        }
    }

    #[test]
    fn test_get_table() {
        assert_eq!(get_table("books").unwrap().name, "books");
        assert!(get_table("missing").is_none());
    }
}
