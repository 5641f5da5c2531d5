// lakehouse-core/src/domain/table.rs
//
// Engine-independent tabular model shared by the zone codecs and the warehouse loader.

use crate::domain::error::DomainError;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Integer,
    Float,
    Date,
}

impl ColumnType {
    /// Warehouse column type.
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Text => "VARCHAR",
            ColumnType::Integer => "BIGINT",
            ColumnType::Float => "DOUBLE",
            ColumnType::Date => "DATE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub nullable: bool,
}

impl ColumnDef {
    pub const fn required(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            nullable: false,
        }
    }

    pub const fn optional(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            nullable: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    fn kind(&self) -> &'static str {
        match self {
            Cell::Null => "null",
            Cell::Text(_) => "text",
            Cell::Integer(_) => "integer",
            Cell::Float(_) => "float",
            Cell::Date(_) => "date",
        }
    }

    /// Whether this cell may be stored in a column of the given type.
    pub fn fits(&self, column_type: ColumnType) -> bool {
        matches!(
            (self, column_type),
            (Cell::Null, _)
                | (Cell::Text(_), ColumnType::Text)
                | (Cell::Integer(_), ColumnType::Integer)
                | (Cell::Float(_), ColumnType::Float)
                | (Cell::Date(_), ColumnType::Date)
        )
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Integer(i) => write!(f, "{}", i),
            Cell::Float(v) => write!(f, "{}", v),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Integer(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Cell::Date(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Null, Into::into)
    }
}

/// A typed row that can be stored in a zone file or a warehouse table.
///
/// `to_cells` must yield exactly one cell per entry of `COLUMNS`, in order.
pub trait Record: Sized {
    const TABLE: &'static str;
    const COLUMNS: &'static [ColumnDef];

    fn to_cells(&self) -> Vec<Cell>;

    fn from_row(row: &RowReader<'_>) -> Result<Self, DomainError>;
}

/// Name-based typed access to one row of a table whose layout is `columns`.
pub struct RowReader<'a> {
    table: &'static str,
    columns: &'static [ColumnDef],
    cells: &'a [Cell],
}

impl<'a> RowReader<'a> {
    pub fn new(table: &'static str, columns: &'static [ColumnDef], cells: &'a [Cell]) -> Self {
        Self {
            table,
            columns,
            cells,
        }
    }

    fn cell(&self, column: &str) -> Result<&'a Cell, DomainError> {
        self.columns
            .iter()
            .position(|c| c.name == column)
            .and_then(|idx| self.cells.get(idx))
            .ok_or_else(|| DomainError::UnknownColumn {
                table: self.table.to_string(),
                column: column.to_string(),
            })
    }

    fn mismatch(&self, column: &str, expected: &str, found: &Cell) -> DomainError {
        DomainError::SchemaMismatch {
            table: self.table.to_string(),
            column: column.to_string(),
            expected: expected.to_string(),
            found: found.kind().to_string(),
        }
    }

    pub fn opt_text(&self, column: &str) -> Result<Option<String>, DomainError> {
        match self.cell(column)? {
            Cell::Null => Ok(None),
            Cell::Text(s) => Ok(Some(s.clone())),
            other => Err(self.mismatch(column, "text", other)),
        }
    }

    pub fn text(&self, column: &str) -> Result<String, DomainError> {
        self.opt_text(column)?
            .ok_or_else(|| self.mismatch(column, "text", &Cell::Null))
    }

    pub fn opt_int(&self, column: &str) -> Result<Option<i64>, DomainError> {
        match self.cell(column)? {
            Cell::Null => Ok(None),
            Cell::Integer(i) => Ok(Some(*i)),
            other => Err(self.mismatch(column, "integer", other)),
        }
    }

    pub fn int(&self, column: &str) -> Result<i64, DomainError> {
        self.opt_int(column)?
            .ok_or_else(|| self.mismatch(column, "integer", &Cell::Null))
    }

    pub fn opt_float(&self, column: &str) -> Result<Option<f64>, DomainError> {
        match self.cell(column)? {
            Cell::Null => Ok(None),
            Cell::Float(v) => Ok(Some(*v)),
            other => Err(self.mismatch(column, "float", other)),
        }
    }

    pub fn opt_date(&self, column: &str) -> Result<Option<NaiveDate>, DomainError> {
        match self.cell(column)? {
            Cell::Null => Ok(None),
            Cell::Date(d) => Ok(Some(*d)),
            other => Err(self.mismatch(column, "date", other)),
        }
    }
}

/// Rows of a record type flattened into cells, ready for any tabular sink.
#[derive(Debug, Clone)]
pub struct TableData {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    pub rows: Vec<Vec<Cell>>,
}

impl TableData {
    pub fn from_records<R: Record>(records: &[R]) -> Self {
        Self {
            name: R::TABLE,
            columns: R::COLUMNS,
            rows: records.iter().map(Record::to_cells).collect(),
        }
    }

    pub fn into_records<R: Record>(self) -> Result<Vec<R>, DomainError> {
        self.rows
            .iter()
            .map(|cells| R::from_row(&RowReader::new(R::TABLE, self.columns, cells)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Checks every row against the declared column count, types and nullability.
    pub fn validate(&self) -> Result<(), DomainError> {
        for row in &self.rows {
            if row.len() != self.columns.len() {
                return Err(DomainError::SchemaMismatch {
                    table: self.name.to_string(),
                    column: "*".to_string(),
                    expected: format!("{} cells", self.columns.len()),
                    found: format!("{} cells", row.len()),
                });
            }
            for (cell, column) in row.iter().zip(self.columns) {
                if !cell.fits(column.column_type) || (cell.is_null() && !column.nullable) {
                    return Err(DomainError::SchemaMismatch {
                        table: self.name.to_string(),
                        column: column.name.to_string(),
                        expected: format!("{:?}", column.column_type).to_lowercase(),
                        found: cell.kind().to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
