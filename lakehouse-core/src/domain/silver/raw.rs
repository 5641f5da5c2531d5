// lakehouse-core/src/domain/silver/raw.rs

/// Untyped content of one Bronze file.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Lines the reader could not split into the header's width.
    pub malformed: usize,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers,
            rows,
            malformed: 0,
        }
    }

    /// Index of the first header matching one of `aliases` (case-insensitive).
    pub fn column(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|alias| {
            self.headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(alias))
        })
    }

    /// Resolves a whole column layout at once.
    pub fn layout<const N: usize>(&self, aliases: [&[&str]; N]) -> [Option<usize>; N] {
        aliases.map(|a| self.column(a))
    }
}

/// Reads one field of a raw row through a resolved column index.
pub fn field(row: &[String], idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| row.get(i)).map(String::as_str)
}
