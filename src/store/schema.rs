//! Table layouts and SQL statement builders.

use crate::ruleset::DomainEntry;
use crate::DomainKind;

/// A TEXT column following the `id` primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub not_null: bool,
}

/// A record type that maps to one row of a rule table.
pub trait TableRow {
    /// Columns after `id`, in insert order.
    const COLUMNS: &'static [Column];

    /// One value per column; `None` is stored as NULL.
    fn values(&self) -> Vec<Option<&str>>;
}

/// IP-CIDR table layout:
///
/// ```text
/// +----+----------------+
/// | id | ip_cidr        |
/// +----+----------------+
/// | 1  | 5.62.60.5/32   |
/// | 2  | 34.99.208.0/23 |
/// +----+----------------+
/// ```
impl TableRow for String {
    const COLUMNS: &'static [Column] = &[Column {
        name: "ip_cidr",
        not_null: true,
    }];

    fn values(&self) -> Vec<Option<&str>> {
        vec![Some(self.as_str())]
    }
}

/// Domain table layout; each row fills exactly one of the four columns:
///
/// ```text
/// +----+---------------+----------------+----------------+--------------+
/// | id | domain        | domain_suffix  | domain_keyword | domain_regex |
/// +----+---------------+----------------+----------------+--------------+
/// | 1  | 1password.com |                |                |              |
/// | 2  |               | 4everproxy.com |                |              |
/// | 3  |               |                | 9to5mac        |              |
/// +----+---------------+----------------+----------------+--------------+
/// ```
impl TableRow for DomainEntry {
    const COLUMNS: &'static [Column] = &[
        Column {
            name: "domain",
            not_null: false,
        },
        Column {
            name: "domain_suffix",
            not_null: false,
        },
        Column {
            name: "domain_keyword",
            not_null: false,
        },
        Column {
            name: "domain_regex",
            not_null: false,
        },
    ];

    fn values(&self) -> Vec<Option<&str>> {
        DomainKind::ALL
            .iter()
            .map(|k| (*k == self.kind).then_some(self.value.as_str()))
            .collect()
    }
}

/// `CREATE TABLE IF NOT EXISTS` for a row type. `table` must already be a
/// valid identifier.
pub fn create_table_sql<R: TableRow>(table: &str) -> String {
    let mut columns = vec!["id INTEGER PRIMARY KEY AUTOINCREMENT".to_string()];
    for col in R::COLUMNS {
        if col.not_null {
            columns.push(format!("{} TEXT NOT NULL", col.name));
        } else {
            columns.push(format!("{} TEXT", col.name));
        }
    }
    format!("CREATE TABLE IF NOT EXISTS \"{}\" ({});", table, columns.join(", "))
}

/// Parameterized INSERT naming every column of a row type.
pub fn insert_sql<R: TableRow>(table: &str) -> String {
    let names: Vec<&str> = R::COLUMNS.iter().map(|c| c.name).collect();
    let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO \"{}\" ({}) VALUES ({})",
        table,
        names.join(", "),
        placeholders.join(", ")
    )
}
