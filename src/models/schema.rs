//! Relational schema description.
//!
//! Mirrors the foreign keys declared in `migrations/` so that delete policies
//! can be looked up (and checked) from Rust code.

use std::fmt;

/// What happens to dependent rows when a referenced row is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Refuse the delete while dependents exist
    Restrict,
    /// Clear the reference on dependents
    SetNull,
    /// Delete the dependents too
    Cascade,
}

impl DeletePolicy {
    pub fn as_sql(&self) -> &'static str {
        match self {
            DeletePolicy::Restrict => "ON DELETE RESTRICT",
            DeletePolicy::SetNull => "ON DELETE SET NULL",
            DeletePolicy::Cascade => "ON DELETE CASCADE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub nullable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
    pub references: &'static str,
    pub on_delete: DeletePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    UnknownTable(&'static str),
    UnknownColumn(&'static str, &'static str),
    /// SET NULL on a column that cannot hold NULL
    NotNullable(&'static str, &'static str),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::UnknownTable(t) => write!(f, "unknown table {}", t),
            SchemaError::UnknownColumn(t, c) => write!(f, "unknown column {}.{}", t, c),
            SchemaError::NotNullable(t, c) => {
                write!(f, "{}.{} uses SET NULL but is not nullable", t, c)
            }
        }
    }
}

impl std::error::Error for SchemaError {}

const fn col(name: &'static str, nullable: bool) -> Column {
    Column { name, nullable }
}

const fn fk(
    table: &'static str,
    column: &'static str,
    references: &'static str,
    on_delete: DeletePolicy,
) -> ForeignKey {
    ForeignKey {
        table,
        column,
        references,
        on_delete,
    }
}

pub const TABLES: &[Table] = &[
    Table {
        name: "users",
        columns: &[col("id", false), col("username", false), col("password_hash", false)],
    },
    Table {
        name: "genres",
        columns: &[col("id", false), col("name", false)],
    },
    Table {
        name: "languages",
        columns: &[col("id", false), col("name", false)],
    },
    Table {
        name: "authors",
        columns: &[
            col("id", false),
            col("first_name", false),
            col("last_name", false),
            col("date_of_birth", true),
            col("date_of_death", true),
        ],
    },
    Table {
        name: "books",
        columns: &[
            col("id", false),
            col("title", false),
            col("author_id", true),
            col("summary", false),
            col("isbn", false),
            col("language_id", true),
        ],
    },
    Table {
        name: "book_genres",
        columns: &[col("book_id", false), col("genre_id", false)],
    },
    Table {
        name: "book_instances",
        columns: &[
            col("id", false),
            col("book_id", true),
            col("imprint", false),
            col("due_back", true),
            col("borrower_id", true),
            col("status", false),
        ],
    },
];

pub const FOREIGN_KEYS: &[ForeignKey] = &[
    fk("books", "author_id", "authors", DeletePolicy::Restrict),
    fk("books", "language_id", "languages", DeletePolicy::SetNull),
    fk("book_genres", "book_id", "books", DeletePolicy::Cascade),
    fk("book_genres", "genre_id", "genres", DeletePolicy::Cascade),
    fk("book_instances", "book_id", "books", DeletePolicy::Restrict),
    fk("book_instances", "borrower_id", "users", DeletePolicy::SetNull),
];

fn table(name: &'static str) -> Result<&'static Table, SchemaError> {
    TABLES
        .iter()
        .find(|t| t.name == name)
        .ok_or(SchemaError::UnknownTable(name))
}

/// Check that every foreign key is consistent with the table definitions.
pub fn validate() -> Result<(), SchemaError> {
    for key in FOREIGN_KEYS {
        table(key.references)?;
        let column = table(key.table)?
            .columns
            .iter()
            .find(|c| c.name == key.column)
            .ok_or(SchemaError::UnknownColumn(key.table, key.column))?;

        if key.on_delete == DeletePolicy::SetNull && !column.nullable {
            return Err(SchemaError::NotNullable(key.table, key.column));
        }
    }
    Ok(())
}

/// Foreign keys that point at `table`
pub fn referencing(table: &str) -> impl Iterator<Item = &'static ForeignKey> + '_ {
    FOREIGN_KEYS.iter().filter(move |k| k.references == table)
}

/// Tables whose rows block deletion of a row in `table`
pub fn restricting_tables(table: &str) -> Vec<&'static str> {
    referencing(table)
        .filter(|k| k.on_delete == DeletePolicy::Restrict)
        .map(|k| k.table)
        .collect()
}
