// lakehouse-core/src/domain/run.rs
//
// Explicit run state passed through every stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use uuid::Uuid;

use crate::domain::entity::SourceEntity;
use crate::domain::gold::GoldTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Silver,
    Gold,
    Warehouse,
    SearchIndex,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Silver => "silver",
            Stage::Gold => "gold",
            Stage::Warehouse => "warehouse",
            Stage::SearchIndex => "search-index",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RunMode {
    Full,
    Selective { changed: BTreeSet<SourceEntity> },
}

/// Row accounting of one entity during the Silver stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounters {
    pub read: usize,
    pub written: usize,
    pub skipped: usize,
    pub duplicates: usize,
    pub source_missing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Completed,
    Skipped,
    Degraded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: Stage,
    pub status: StageStatus,
    pub duration_ms: u128,
    pub detail: String,
}

#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: Uuid,
    pub mode: RunMode,
    pub started_at: DateTime<Utc>,
    pub strict_inputs: bool,
    dirty: BTreeSet<SourceEntity>,
    counters: BTreeMap<SourceEntity, EntityCounters>,
    rebuilt: BTreeMap<GoldTable, usize>,
    indexed_documents: Option<usize>,
    stages: Vec<StageReport>,
}

impl RunContext {
    pub fn new(mode: RunMode, strict_inputs: bool) -> Self {
        let dirty = match &mode {
            RunMode::Full => SourceEntity::ALL.into_iter().collect(),
            RunMode::Selective { changed } => changed.clone(),
        };
        Self {
            run_id: Uuid::new_v4(),
            mode,
            started_at: Utc::now(),
            strict_inputs,
            dirty,
            counters: BTreeMap::new(),
            rebuilt: BTreeMap::new(),
            indexed_documents: None,
            stages: Vec::new(),
        }
    }

    pub fn full(strict_inputs: bool) -> Self {
        Self::new(RunMode::Full, strict_inputs)
    }

    pub fn selective(changed: impl IntoIterator<Item = SourceEntity>, strict_inputs: bool) -> Self {
        Self::new(
            RunMode::Selective {
                changed: changed.into_iter().collect(),
            },
            strict_inputs,
        )
    }

    pub fn dirty(&self) -> &BTreeSet<SourceEntity> {
        &self.dirty
    }

    pub fn is_dirty(&self, entity: SourceEntity) -> bool {
        self.dirty.contains(&entity)
    }

    pub fn record_entity(&mut self, entity: SourceEntity, counters: EntityCounters) {
        self.counters.insert(entity, counters);
    }

    pub fn counters(&self, entity: SourceEntity) -> Option<&EntityCounters> {
        self.counters.get(&entity)
    }

    pub fn total_skipped(&self) -> usize {
        self.counters.values().map(|c| c.skipped).sum()
    }

    pub fn record_table(&mut self, table: GoldTable, rows: usize) {
        self.rebuilt.insert(table, rows);
    }

    pub fn rebuilt_tables(&self) -> impl Iterator<Item = GoldTable> + '_ {
        self.rebuilt.keys().copied()
    }

    pub fn record_indexed(&mut self, documents: usize) {
        self.indexed_documents = Some(documents);
    }

    pub fn record_stage(&mut self, report: StageReport) {
        self.stages.push(report);
    }

    pub fn report(&self) -> RunReport {
        let failed_stage = self
            .stages
            .iter()
            .find(|s| s.status == StageStatus::Failed)
            .map(|s| s.stage);
        RunReport {
            run_id: self.run_id.to_string(),
            mode: self.mode.clone(),
            started_at: self.started_at.to_rfc3339(),
            finished_at: Utc::now().to_rfc3339(),
            success: failed_stage.is_none(),
            failed_stage,
            entities: self
                .counters
                .iter()
                .map(|(entity, counters)| (entity.name().to_string(), *counters))
                .collect(),
            gold_tables: self
                .rebuilt
                .iter()
                .map(|(table, rows)| (table.table_name().to_string(), *rows))
                .collect(),
            indexed_documents: self.indexed_documents,
            stages: self.stages.clone(),
        }
    }
}

/// Serializable summary of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub mode: RunMode,
    pub started_at: String,
    pub finished_at: String,
    pub success: bool,
    pub failed_stage: Option<Stage>,
    pub entities: BTreeMap<String, EntityCounters>,
    pub gold_tables: BTreeMap<String, usize>,
    pub indexed_documents: Option<usize>,
    pub stages: Vec<StageReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_run_marks_every_entity_dirty() {
        let ctx = RunContext::full(false);
        assert_eq!(ctx.dirty().len(), SourceEntity::ALL.len());
    }

    #[test]
    fn test_report_names_the_failed_stage() {
        let mut ctx = RunContext::selective([SourceEntity::Topic], false);
        ctx.record_stage(StageReport {
            stage: Stage::Silver,
            status: StageStatus::Completed,
            duration_ms: 3,
            detail: String::new(),
        });
        ctx.record_stage(StageReport {
            stage: Stage::Warehouse,
            status: StageStatus::Failed,
            duration_ms: 1,
            detail: "connection refused".into(),
        });

        let report = ctx.report();

        assert!(!report.success);
        assert_eq!(report.failed_stage, Some(Stage::Warehouse));
        assert!(ctx.is_dirty(SourceEntity::Topic));
        assert!(!ctx.is_dirty(SourceEntity::Project));
    }

    #[test]
    fn test_skip_counters_accumulate() {
        let mut ctx = RunContext::full(false);
        ctx.record_entity(
            SourceEntity::Project,
            EntityCounters {
                skipped: 2,
                ..Default::default()
            },
        );
        ctx.record_entity(
            SourceEntity::WebLink,
            EntityCounters {
                skipped: 5,
                ..Default::default()
            },
        );
        assert_eq!(ctx.total_skipped(), 7);
    }
}
