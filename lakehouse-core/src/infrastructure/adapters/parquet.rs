// lakehouse-core/src/infrastructure/adapters/parquet.rs
//
// Silver and Gold zone codec: one Parquet file per table, columns typed from the record schema.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use datafusion::arrow::array::{
    Array, ArrayRef, Date32Array, Float64Array, Int64Array, StringArray,
};
use datafusion::arrow::compute::cast;
use datafusion::arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::parquet::arrow::ArrowWriter;
use datafusion::parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use datafusion::parquet::basic::Compression;
use datafusion::parquet::file::properties::WriterProperties;
use tracing::{debug, instrument};

use crate::domain::error::DomainError;
use crate::domain::table::{Cell, ColumnDef, ColumnType, Record, TableData};
use crate::error::LakehouseError;
use crate::infrastructure::error::InfrastructureError;

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
const UNIX_EPOCH_CE_DAYS: i32 = 719_163;

fn arrow_type(column_type: ColumnType) -> DataType {
    match column_type {
        ColumnType::Text => DataType::Utf8,
        ColumnType::Integer => DataType::Int64,
        ColumnType::Float => DataType::Float64,
        ColumnType::Date => DataType::Date32,
    }
}

pub fn arrow_schema(columns: &[ColumnDef]) -> SchemaRef {
    Arc::new(Schema::new(
        columns
            .iter()
            .map(|c| Field::new(c.name, arrow_type(c.column_type), c.nullable))
            .collect::<Vec<_>>(),
    ))
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_CE_DAYS
}

fn date_from_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_CE_DAYS)
}

fn column_array(table: &TableData, idx: usize) -> ArrayRef {
    let cells = table.rows.iter().map(|row| row.get(idx).unwrap_or(&Cell::Null));
    match table.columns[idx].column_type {
        ColumnType::Text => Arc::new(
            cells
                .map(|c| match c {
                    Cell::Text(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect::<StringArray>(),
        ),
        ColumnType::Integer => Arc::new(
            cells
                .map(|c| match c {
                    Cell::Integer(i) => Some(*i),
                    _ => None,
                })
                .collect::<Int64Array>(),
        ),
        ColumnType::Float => Arc::new(
            cells
                .map(|c| match c {
                    Cell::Float(v) => Some(*v),
                    _ => None,
                })
                .collect::<Float64Array>(),
        ),
        ColumnType::Date => Arc::new(
            cells
                .map(|c| match c {
                    Cell::Date(d) => Some(days_since_epoch(*d)),
                    _ => None,
                })
                .collect::<Date32Array>(),
        ),
    }
}

pub fn to_record_batch(table: &TableData) -> Result<RecordBatch, LakehouseError> {
    table.validate()?;
    let arrays = (0..table.columns.len())
        .map(|idx| column_array(table, idx))
        .collect();
    RecordBatch::try_new(arrow_schema(table.columns), arrays)
        .map_err(|e| InfrastructureError::Arrow(e).into())
}

/// Writes `table` to `path`, replacing any previous file atomically.
///
/// Same rows in, same bytes out: no timestamps are written and rows keep their order.
#[instrument(skip(table), fields(table = table.name, rows = table.len()))]
pub fn write_table(path: &Path, table: &TableData) -> Result<(), LakehouseError> {
    let batch = to_record_batch(table)?;
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_created_by("lakehouse".to_string())
        .build();

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    {
        let mut writer = ArrowWriter::try_new(&mut temp_file, batch.schema(), Some(props))
            .map_err(InfrastructureError::Parquet)?;
        writer.write(&batch).map_err(InfrastructureError::Parquet)?;
        writer.close().map_err(InfrastructureError::Parquet)?;
    }
    temp_file.as_file().sync_all()?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    debug!(path = %path.display(), "Parquet file written");
    Ok(())
}

/// Reads a zone file back into the layout `columns`. Extra file columns are ignored.
pub fn read_table(
    path: &Path,
    name: &'static str,
    columns: &'static [ColumnDef],
) -> Result<TableData, LakehouseError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)
        .map_err(InfrastructureError::Parquet)?;
    let reader = builder.build().map_err(InfrastructureError::Parquet)?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch.map_err(InfrastructureError::Arrow)?;
        let mut decoded: Vec<Vec<Cell>> = vec![Vec::with_capacity(columns.len()); batch.num_rows()];
        for column in columns {
            let array = batch
                .column_by_name(column.name)
                .ok_or_else(|| DomainError::UnknownColumn {
                    table: name.to_string(),
                    column: column.name.to_string(),
                })?;
            let array = cast(array, &arrow_type(column.column_type))
                .map_err(InfrastructureError::Arrow)?;
            for (row, cells) in decoded.iter_mut().enumerate() {
                cells.push(cell_at(&array, column.column_type, row));
            }
        }
        rows.extend(decoded);
    }

    Ok(TableData {
        name,
        columns,
        rows,
    })
}

pub fn read_records<R: Record>(path: &Path) -> Result<Vec<R>, LakehouseError> {
    Ok(read_table(path, R::TABLE, R::COLUMNS)?.into_records()?)
}

fn cell_at(array: &ArrayRef, column_type: ColumnType, row: usize) -> Cell {
    if array.is_null(row) {
        return Cell::Null;
    }
    let any = array.as_any();
    match column_type {
        ColumnType::Text => any
            .downcast_ref::<StringArray>()
            .map_or(Cell::Null, |a| Cell::Text(a.value(row).to_string())),
        ColumnType::Integer => any
            .downcast_ref::<Int64Array>()
            .map_or(Cell::Null, |a| Cell::Integer(a.value(row))),
        ColumnType::Float => any
            .downcast_ref::<Float64Array>()
            .map_or(Cell::Null, |a| Cell::Float(a.value(row))),
        ColumnType::Date => any
            .downcast_ref::<Date32Array>()
            .and_then(|a| date_from_days(a.value(row)))
            .map_or(Cell::Null, Cell::Date),
    }
}
