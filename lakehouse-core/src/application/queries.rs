// lakehouse-core/src/application/queries.rs
//
// Validated read access to the warehouse views.

use crate::domain::error::DomainError;
use crate::error::LakehouseError;
use crate::ports::warehouse::{
    DEFAULT_QUERY_LIMIT, FactRow, MAX_QUERY_LIMIT, ProjectFilter, ProjectRow, Warehouse,
};

/// Builds a filter from raw query parameters: ISO-2 country (any case), plausible year,
/// limit in `1..=1000` defaulting to 50.
pub fn project_filter(
    country: Option<&str>,
    year: Option<i64>,
    limit: Option<usize>,
) -> Result<ProjectFilter, DomainError> {
    let country = match country.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) if c.len() == 2 && c.chars().all(|ch| ch.is_ascii_alphabetic()) => {
            Some(c.to_ascii_uppercase())
        }
        Some(c) => {
            return Err(DomainError::InvalidQuery(format!(
                "country must be a two-letter ISO code, got '{}'",
                c
            )));
        }
        None => None,
    };
    if let Some(y) = year
        && !(1900..=2100).contains(&y)
    {
        return Err(DomainError::InvalidQuery(format!("year {} is out of range", y)));
    }
    let limit = limit.unwrap_or(DEFAULT_QUERY_LIMIT);
    if limit == 0 || limit > MAX_QUERY_LIMIT {
        return Err(DomainError::InvalidQuery(format!(
            "limit must be between 1 and {}, got {}",
            MAX_QUERY_LIMIT, limit
        )));
    }
    Ok(ProjectFilter {
        country,
        year,
        limit,
    })
}

pub async fn gold_projects(
    warehouse: &dyn Warehouse,
    filter: &ProjectFilter,
) -> Result<Vec<ProjectRow>, LakehouseError> {
    warehouse.query_projects(filter).await
}

pub async fn gold_facts(
    warehouse: &dyn Warehouse,
    filter: &ProjectFilter,
) -> Result<Vec<FactRow>, LakehouseError> {
    warehouse.query_facts(filter).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let filter = project_filter(None, None, None).unwrap_or_default();
        assert_eq!(filter.limit, DEFAULT_QUERY_LIMIT);
        assert_eq!(filter.country, None);
    }

    #[test]
    fn test_country_is_normalized() {
        let filter = project_filter(Some(" de "), Some(2021), Some(10));
        assert!(matches!(filter, Ok(ProjectFilter { country: Some(ref c), .. }) if c == "DE"));
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        assert!(project_filter(Some("DEU"), None, None).is_err());
        assert!(project_filter(Some("1A"), None, None).is_err());
        assert!(project_filter(None, Some(20222), None).is_err());
        assert!(project_filter(None, None, Some(0)).is_err());
        assert!(project_filter(None, None, Some(MAX_QUERY_LIMIT + 1)).is_err());
    }
}
