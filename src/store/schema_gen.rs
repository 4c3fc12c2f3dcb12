use crate::schema::{ColumnType, TableSchema};

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE {} (\n", schema.name);
    let mut columns = Vec::new();

    for col in schema.columns {
        let sql_type = match col.col_type {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Timestamp => "TEXT",
        };

        let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
        let pk = if col.name == "id" { " PRIMARY KEY" } else { "" };

        columns.push(format!(
            "    {} {}{}{}",
            col.name, sql_type, pk, null_constraint
        ));
    }

    // Add foreign key constraints
    for fk in schema.foreign_keys {
        columns.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({})",
            fk.column, fk.references_table, fk.references_column
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements: one per foreign key column, plus any
/// explicit indexes the schema declares
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    let mut indexes: Vec<String> = schema
        .foreign_keys
        .iter()
        .map(|fk| {
            format!(
                "CREATE INDEX idx_{}_{} ON {}({})",
                schema.name, fk.column, schema.name, fk.column
            )
        })
        .collect();

    for index in schema.indexes {
        let unique = if index.unique { "UNIQUE " } else { "" };
        indexes.push(format!(
            "CREATE {}INDEX idx_{}_{} ON {}({})",
            unique,
            schema.name,
            index.columns.join("_"),
            schema.name,
            index.columns.join(", ")
        ));
    }

    indexes
}
