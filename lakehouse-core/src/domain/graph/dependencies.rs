// lakehouse-core/src/domain/graph/dependencies.rs
//
// entity -> {dimensions it feeds} -> fact table

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::domain::entity::SourceEntity;
use crate::domain::error::DomainError;
use crate::domain::gold::GoldTable;

#[derive(Debug, Clone)]
struct Node {
    sources: BTreeSet<SourceEntity>,
    depends_on: BTreeSet<GoldTable>,
}

#[derive(Debug, Clone)]
pub struct DependencyGraph {
    nodes: BTreeMap<GoldTable, Node>,
}

/// Gold tables to rebuild, layered so that every layer only needs the previous ones.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GoldPlan {
    pub layers: Vec<Vec<GoldTable>>,
}

impl GoldPlan {
    pub fn contains(&self, table: GoldTable) -> bool {
        self.layers.iter().any(|l| l.contains(&table))
    }

    pub fn tables(&self) -> impl Iterator<Item = GoldTable> + '_ {
        self.layers.iter().flatten().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(Vec::is_empty)
    }
}

impl DependencyGraph {
    /// The lakehouse star schema as declared by `GoldTable`.
    pub fn star_schema() -> Self {
        let edges = GoldTable::ALL.into_iter().map(|table| {
            (
                table,
                table.source_inputs().to_vec(),
                table.table_inputs().to_vec(),
            )
        });
        Self::from_edges(edges)
    }

    pub fn from_edges(
        edges: impl IntoIterator<Item = (GoldTable, Vec<SourceEntity>, Vec<GoldTable>)>,
    ) -> Self {
        let nodes = edges
            .into_iter()
            .map(|(table, sources, depends_on)| {
                (
                    table,
                    Node {
                        sources: sources.into_iter().collect(),
                        depends_on: depends_on.into_iter().collect(),
                    },
                )
            })
            .collect();
        Self { nodes }
    }

    /// Topological sort with layers (Kahn). Layer N depends only on layers 0..N-1.
    pub fn plan_execution(&self) -> Result<Vec<Vec<GoldTable>>, DomainError> {
        let mut in_degree: BTreeMap<GoldTable, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<GoldTable, Vec<GoldTable>> = BTreeMap::new();

        for (&table, node) in &self.nodes {
            let known_deps = node
                .depends_on
                .iter()
                .filter(|d| self.nodes.contains_key(*d))
                .count();
            in_degree.insert(table, known_deps);
            for &dep in node.depends_on.iter().filter(|d| self.nodes.contains_key(*d)) {
                dependents.entry(dep).or_default().push(table);
            }
        }

        let mut queue: VecDeque<GoldTable> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(table, _)| *table)
            .collect();

        let mut layers = Vec::new();
        let mut resolved = 0;

        while !queue.is_empty() {
            let mut layer = Vec::with_capacity(queue.len());
            for _ in 0..queue.len() {
                let Some(current) = queue.pop_front() else {
                    break;
                };
                layer.push(current);
                resolved += 1;

                for next in dependents.get(&current).into_iter().flatten() {
                    if let Some(degree) = in_degree.get_mut(next) {
                        *degree -= 1;
                        if *degree == 0 {
                            queue.push_back(*next);
                        }
                    }
                }
            }
            layers.push(layer);
        }

        if resolved != self.nodes.len() {
            let stuck: Vec<String> = in_degree
                .iter()
                .filter(|(_, degree)| **degree > 0)
                .map(|(table, _)| table.to_string())
                .collect();
            return Err(DomainError::CircularDependency(format!(
                "Resolved {}/{} tables, stuck on [{}]",
                resolved,
                self.nodes.len(),
                stuck.join(", ")
            )));
        }

        Ok(layers)
    }

    /// Tables that must be rebuilt when `dirty` entities changed: direct readers of a
    /// dirty entity, plus everything downstream of a rebuilt table.
    pub fn plan_for(&self, dirty: &BTreeSet<SourceEntity>) -> Result<GoldPlan, DomainError> {
        let mut affected: BTreeSet<GoldTable> = BTreeSet::new();
        let mut layers = Vec::new();

        for layer in self.plan_execution()? {
            let selected: Vec<GoldTable> = layer
                .into_iter()
                .filter(|table| {
                    self.nodes.get(table).is_some_and(|node| {
                        !node.sources.is_disjoint(dirty)
                            || node.depends_on.iter().any(|d| affected.contains(d))
                    })
                })
                .collect();
            affected.extend(selected.iter().copied());
            if !selected.is_empty() {
                layers.push(selected);
            }
        }

        Ok(GoldPlan { layers })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_star_schema_layers_dimensions_before_fact() -> Result<()> {
        let layers = DependencyGraph::star_schema().plan_execution()?;

        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].len(), 5);
        assert_eq!(layers[1], vec![GoldTable::FactProjectFunding]);
        Ok(())
    }

    #[test]
    fn test_topic_change_rebuilds_topic_dimension_and_fact_only() -> Result<()> {
        let dirty = BTreeSet::from([SourceEntity::Topic]);

        let plan = DependencyGraph::star_schema().plan_for(&dirty)?;

        let tables: Vec<GoldTable> = plan.tables().collect();
        assert_eq!(
            tables,
            vec![GoldTable::DimTopic, GoldTable::FactProjectFunding]
        );
        Ok(())
    }

    #[test]
    fn test_organization_change_also_rebuilds_project_dimension() -> Result<()> {
        let dirty = BTreeSet::from([SourceEntity::Organization]);

        let plan = DependencyGraph::star_schema().plan_for(&dirty)?;

        assert!(plan.contains(GoldTable::DimProject));
        assert!(plan.contains(GoldTable::DimOrganization));
        assert!(plan.contains(GoldTable::FactProjectFunding));
        assert!(!plan.contains(GoldTable::DimTopic));
        Ok(())
    }

    #[test]
    fn test_web_links_only_touch_the_fact() -> Result<()> {
        let dirty = BTreeSet::from([SourceEntity::WebLink]);

        let plan = DependencyGraph::star_schema().plan_for(&dirty)?;

        assert_eq!(plan.layers, vec![vec![GoldTable::FactProjectFunding]]);
        Ok(())
    }

    #[test]
    fn test_nothing_dirty_is_an_empty_plan() -> Result<()> {
        let plan = DependencyGraph::star_schema().plan_for(&BTreeSet::new())?;
        assert!(plan.is_empty());
        Ok(())
    }

    #[test]
    fn test_cycle_is_rejected() {
        let graph = DependencyGraph::from_edges([
            (GoldTable::DimProject, vec![], vec![GoldTable::FactProjectFunding]),
            (GoldTable::FactProjectFunding, vec![], vec![GoldTable::DimProject]),
        ]);

        let result = graph.plan_execution();

        assert!(matches!(result, Err(DomainError::CircularDependency(_))));
    }
}
