// lakehouse-core/src/infrastructure/adapters/duckdb.rs

use async_trait::async_trait;
use duckdb::types::{ToSql, ToSqlOutput, Value};
use duckdb::{Config, Connection, Transaction, appender_params_from_iter, params_from_iter};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, instrument, warn};

use crate::domain::gold::GoldTable;
use crate::domain::table::{Cell, ColumnDef, TableData};
use crate::error::LakehouseError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::warehouse::{FactRow, ProjectFilter, ProjectRow, Warehouse};

impl ToSql for Cell {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Cell::Null => ToSqlOutput::Owned(Value::Null),
            Cell::Text(s) => ToSqlOutput::from(s.as_str()),
            Cell::Integer(i) => ToSqlOutput::Owned(Value::BigInt(*i)),
            Cell::Float(v) => ToSqlOutput::Owned(Value::Double(*v)),
            // DuckDB casts ISO text into DATE columns
            Cell::Date(d) => ToSqlOutput::Owned(Value::Text(d.format("%Y-%m-%d").to_string())),
        })
    }
}

pub struct DuckDbWarehouse {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDbWarehouse {
    pub fn new(db_path: &str) -> Result<Self, InfrastructureError> {
        let config = Config::default();

        let conn = if db_path == ":memory:" {
            Connection::open_in_memory_with_flags(config)?
        } else {
            if let Some(parent) = Path::new(db_path).parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            Connection::open_with_flags(db_path, config)?
        };

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, LakehouseError> {
        self.conn.lock().map_err(|_| {
            LakehouseError::Infrastructure(InfrastructureError::Io(std::io::Error::other(
                "DuckDB Mutex Poisoned",
            )))
        })
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn create_table_sql(name: &str, columns: &[ColumnDef]) -> String {
    let cols: Vec<String> = columns
        .iter()
        .map(|c| {
            let null = if c.nullable { "" } else { " NOT NULL" };
            format!("{} {}{}", quote_ident(c.name), c.column_type.sql_type(), null)
        })
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_ident(name),
        cols.join(", ")
    )
}

/// `(name, type)` pairs currently declared in the warehouse, empty if the table is absent.
fn existing_columns(conn: &Connection, name: &str) -> duckdb::Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{}')", name.replace('\'', "''")))?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>("name")?, row.get::<_, String>("type")?))
    })?;
    rows.collect()
}

fn has_drifted(existing: &[(String, String)], columns: &[ColumnDef]) -> bool {
    existing.len() != columns.len()
        || existing.iter().zip(columns).any(|((name, ty), col)| {
            name != col.name || !ty.eq_ignore_ascii_case(col.column_type.sql_type())
        })
}

/// Creates the table, recreating it when its columns no longer match the schema.
fn prepare_table(conn: &Connection, name: &str, columns: &[ColumnDef]) -> duckdb::Result<()> {
    let existing = existing_columns(conn, name)?;
    if !existing.is_empty() && has_drifted(&existing, columns) {
        warn!(table = name, "Warehouse schema drifted, recreating table");
        conn.execute_batch(&format!("DROP TABLE {}", quote_ident(name)))?;
    }
    conn.execute_batch(&create_table_sql(name, columns))
}

fn load_table(tx: &Transaction<'_>, table: &TableData) -> duckdb::Result<()> {
    prepare_table(tx, table.name, table.columns)?;
    tx.execute_batch(&format!("DELETE FROM {}", quote_ident(table.name)))?;

    let mut appender = tx.appender(table.name)?;
    for row in &table.rows {
        appender.append_row(appender_params_from_iter(row.iter()))?;
    }
    appender.flush()?;
    Ok(())
}

fn load_failed(table: &str, err: impl ToString) -> LakehouseError {
    LakehouseError::Infrastructure(InfrastructureError::Database(DatabaseError::LoadFailed {
        table: table.to_string(),
        reason: err.to_string(),
    }))
}

const PROJECTS_SQL: &str = r#"
WITH participation AS (
    SELECT DISTINCT f.project_sk, f.organization_sk, f.funding_amount
    FROM fact_project_funding f
)
SELECT p.project_id,
       p.acronym,
       p.title,
       p.country,
       p.year,
       p.framework_programme,
       SUM(pa.funding_amount) AS total_funding,
       COUNT(DISTINCT pa.organization_sk) AS organizations,
       string_agg(DISTINCT o.country, ',' ORDER BY o.country) AS participant_countries
FROM dim_project p
LEFT JOIN participation pa ON pa.project_sk = p.project_sk
LEFT JOIN dim_organization o ON o.organization_sk = pa.organization_sk
"#;

const FACTS_SQL: &str = r#"
SELECT p.project_id,
       p.year,
       o.organisation_id,
       o.country,
       t.topic_code,
       pp.priority_code,
       lb.legal_basis_code,
       f.funding_amount,
       f.duration_days
FROM fact_project_funding f
JOIN dim_project p ON p.project_sk = f.project_sk
LEFT JOIN dim_organization o ON o.organization_sk = f.organization_sk
LEFT JOIN dim_topic t ON t.topic_sk = f.topic_sk
LEFT JOIN dim_policy_priority pp ON pp.priority_sk = f.priority_sk
LEFT JOIN dim_legal_basis lb ON lb.legal_basis_sk = f.legal_basis_sk
"#;

#[async_trait]
impl Warehouse for DuckDbWarehouse {
    async fn ensure_tables(&self, tables: &[GoldTable]) -> Result<(), LakehouseError> {
        let conn = self.lock()?;
        for table in tables {
            prepare_table(&conn, table.table_name(), table.columns())?;
        }
        Ok(())
    }

    #[instrument(skip_all, fields(tables = tables.len()))]
    async fn replace_tables(&self, tables: &[TableData]) -> Result<(), LakehouseError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        for table in tables {
            table.validate()?;
            // Dropping `tx` on the error path rolls the whole load back
            load_table(&tx, table).map_err(|e| load_failed(table.name, e))?;
            info!(table = table.name, rows = table.len(), "Table staged in transaction");
        }

        tx.commit().map_err(|e| load_failed("<commit>", e))?;
        Ok(())
    }

    async fn query_projects(
        &self,
        filter: &ProjectFilter,
    ) -> Result<Vec<ProjectRow>, LakehouseError> {
        let mut clauses = Vec::new();
        let mut params: Vec<Cell> = Vec::new();
        if let Some(year) = filter.year {
            clauses.push("p.year = ?");
            params.push(Cell::Integer(year));
        }
        if let Some(country) = &filter.country {
            clauses.push(
                "EXISTS (SELECT 1 FROM fact_project_funding f2 \
                 JOIN dim_organization o2 ON o2.organization_sk = f2.organization_sk \
                 WHERE f2.project_sk = p.project_sk AND upper(o2.country) = ?)",
            );
            params.push(Cell::Text(country.to_uppercase()));
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "{} {} GROUP BY ALL ORDER BY p.year DESC NULLS LAST, p.project_id LIMIT {}",
            PROJECTS_SQL, where_sql, filter.limit
        );

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Ok(ProjectRow {
                project_id: row.get(0)?,
                acronym: row.get(1)?,
                title: row.get(2)?,
                country: row.get(3)?,
                year: row.get(4)?,
                framework_programme: row.get(5)?,
                total_funding: row.get(6)?,
                organizations: row.get(7)?,
                participant_countries: row.get(8)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    async fn query_facts(&self, filter: &ProjectFilter) -> Result<Vec<FactRow>, LakehouseError> {
        let mut clauses = Vec::new();
        let mut params: Vec<Cell> = Vec::new();
        if let Some(year) = filter.year {
            clauses.push("p.year = ?");
            params.push(Cell::Integer(year));
        }
        if let Some(country) = &filter.country {
            clauses.push("upper(o.country) = ?");
            params.push(Cell::Text(country.to_uppercase()));
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "{} {} ORDER BY p.project_id, o.organisation_id NULLS LAST, t.topic_code NULLS LAST LIMIT {}",
            FACTS_SQL, where_sql, filter.limit
        );

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Ok(FactRow {
                project_id: row.get(0)?,
                year: row.get(1)?,
                organisation_id: row.get(2)?,
                organization_country: row.get(3)?,
                topic_code: row.get(4)?,
                priority_code: row.get(5)?,
                legal_basis_code: row.get(6)?,
                funding_amount: row.get(7)?,
                duration_days: row.get(8)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    async fn count_rows(&self, table: &str) -> Result<u64, LakehouseError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            &format!("SELECT count(*) FROM {}", quote_ident(table)),
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    fn engine_name(&self) -> &str {
        "duckdb"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::gold::{FundingFact, OrganizationDim, ProjectDim};
    use crate::domain::table::{ColumnType, Record};
    use anyhow::Result;

    fn project(sk: i64, id: &str, year: i64) -> ProjectDim {
        ProjectDim {
            project_sk: sk,
            project_id: id.to_string(),
            acronym: None,
            title: Some(format!("Project {}", id)),
            abstract_text: None,
            status: None,
            start_date: chrono::NaiveDate::from_ymd_opt(year as i32, 1, 1),
            end_date: None,
            duration_days: None,
            total_cost: None,
            ec_max_contribution: None,
            framework_programme: Some("HORIZON".into()),
            country: None,
            year: Some(year),
            science_fields: None,
        }
    }

    fn org(sk: i64, id: &str, country: &str) -> OrganizationDim {
        OrganizationDim {
            organization_sk: sk,
            organisation_id: id.to_string(),
            name: None,
            short_name: None,
            country: Some(country.to_string()),
            city: None,
            activity_type: None,
            vat_number: None,
            organization_url: None,
        }
    }

    fn fact(project_sk: i64, org_sk: Option<i64>, topic_sk: Option<i64>, amount: f64) -> FundingFact {
        FundingFact {
            project_sk,
            organization_sk: org_sk,
            topic_sk,
            priority_sk: None,
            legal_basis_sk: None,
            funding_amount: Some(amount),
            duration_days: None,
            web_item_count: 0,
            web_link_count: 0,
        }
    }

    fn star() -> Vec<TableData> {
        vec![
            TableData::from_records(&[project(1, "P1", 2021), project(2, "P2", 2022)]),
            TableData::from_records(&[org(1, "O1", "DE"), org(2, "O2", "FR")]),
            TableData::from_records::<crate::domain::gold::TopicDim>(&[]),
            TableData::from_records::<crate::domain::gold::PolicyPriorityDim>(&[]),
            TableData::from_records::<crate::domain::gold::LegalBasisDim>(&[]),
            TableData::from_records(&[
                fact(1, Some(1), Some(1), 100.0),
                fact(1, Some(1), Some(2), 100.0),
                fact(1, Some(2), None, 50.0),
                fact(2, Some(2), None, 10.0),
            ]),
        ]
    }

    #[tokio::test]
    async fn test_replace_and_query_projects() -> Result<()> {
        let warehouse = DuckDbWarehouse::new(":memory:")?;
        warehouse.replace_tables(&star()).await?;

        let all = warehouse
            .query_projects(&ProjectFilter {
                limit: 10,
                ..Default::default()
            })
            .await?;
        assert_eq!(all.len(), 2);
        // newest year first
        assert_eq!(all[0].project_id, "P2");
        let p1 = &all[1];
        assert_eq!(p1.organizations, 2);
        assert_eq!(p1.total_funding, Some(150.0));
        assert_eq!(p1.participant_countries.as_deref(), Some("DE,FR"));

        let german = warehouse
            .query_projects(&ProjectFilter {
                country: Some("de".into()),
                year: None,
                limit: 10,
            })
            .await?;
        assert_eq!(german.len(), 1);
        assert_eq!(german[0].project_id, "P1");
        Ok(())
    }

    #[tokio::test]
    async fn test_reload_replaces_previous_rows() -> Result<()> {
        let warehouse = DuckDbWarehouse::new(":memory:")?;
        warehouse.replace_tables(&star()).await?;
        warehouse
            .replace_tables(&[TableData::from_records(&[project(1, "P9", 2020)])])
            .await?;

        assert_eq!(warehouse.count_rows("dim_project").await?, 1);
        assert_eq!(warehouse.count_rows("fact_project_funding").await?, 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_load_rolls_back_every_table() -> Result<()> {
        let warehouse = DuckDbWarehouse::new(":memory:")?;
        warehouse.replace_tables(&star()).await?;

        const BROKEN_COLUMNS: &[ColumnDef] = &[ColumnDef::required("project_sk", ColumnType::Integer)];
        let orgs = TableData::from_records(&[org(7, "O7", "IT")]);
        // Second table fails validation after the first one was staged
        let broken = TableData {
            name: "dim_project",
            columns: BROKEN_COLUMNS,
            rows: vec![vec![Cell::Text("not a number".into())]],
        };

        let result = warehouse.replace_tables(&[orgs, broken]).await;

        assert!(result.is_err());
        assert_eq!(warehouse.count_rows("dim_organization").await?, 2);
        assert_eq!(warehouse.count_rows("dim_project").await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_schema_drift_recreates_table() -> Result<()> {
        let warehouse = DuckDbWarehouse::new(":memory:")?;
        {
            let conn = warehouse.lock()?;
            conn.execute_batch("CREATE TABLE dim_topic (topic_sk BIGINT, legacy VARCHAR)")?;
        }

        warehouse.ensure_tables(&[GoldTable::DimTopic]).await?;

        let conn = warehouse.lock()?;
        let columns = existing_columns(&conn, "dim_topic")?;
        let names: Vec<&str> = columns.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            crate::domain::gold::TopicDim::COLUMNS
                .iter()
                .map(|c| c.name)
                .collect::<Vec<_>>()
        );
        Ok(())
    }
}
