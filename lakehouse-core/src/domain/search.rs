// lakehouse-core/src/domain/search.rs

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::gold::ProjectDim;

pub const MAX_RESULTS: usize = 200;

/// Denormalized view of a project row as stored in the search collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    pub id: String,
    pub project_id: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl ProjectDocument {
    pub fn from_dimension(row: &ProjectDim) -> Self {
        Self {
            id: row.project_id.clone(),
            project_id: row.project_id.clone(),
            title: row.title.clone().unwrap_or_default(),
            abstract_text: row.abstract_text.clone().unwrap_or_default(),
            country: row.country.clone(),
            year: row.year,
            embedding: None,
        }
    }

    /// Text handed to the embedding provider.
    pub fn embedding_text(&self) -> String {
        let year = self.year.map(|y| y.to_string()).unwrap_or_default();
        [
            self.title.as_str(),
            self.abstract_text.as_str(),
            self.country.as_deref().unwrap_or_default(),
            year.as_str(),
        ]
        .join(" | ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Int64,
    FloatArray,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    pub facet: bool,
    pub optional: bool,
    pub full_text: bool,
    pub dimensions: Option<usize>,
}

impl FieldSpec {
    fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            facet: false,
            optional: false,
            full_text: false,
            dimensions: None,
        }
    }

    fn facet(mut self) -> Self {
        self.facet = true;
        self
    }

    fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    fn full_text(mut self) -> Self {
        self.full_text = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl CollectionSchema {
    /// `project_id` keyed documents, `title`/`abstract` searchable, `country`/`year` facets.
    pub fn projects(name: &str, embedding_dims: Option<usize>) -> Self {
        let mut fields = vec![
            FieldSpec::new("project_id", FieldType::String),
            FieldSpec::new("title", FieldType::String).full_text(),
            FieldSpec::new("abstract", FieldType::String).full_text(),
            FieldSpec::new("country", FieldType::String).facet().optional(),
            FieldSpec::new("year", FieldType::Int64).facet().optional(),
        ];
        if let Some(dims) = embedding_dims {
            let mut embedding = FieldSpec::new("embedding", FieldType::FloatArray).optional();
            embedding.dimensions = Some(dims);
            fields.push(embedding);
        }
        Self {
            name: name.to_string(),
            fields,
        }
    }

    pub fn facet_fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter(|f| f.facet).map(|f| f.name.as_str())
    }

    pub fn full_text_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.full_text)
            .map(|f| f.name.as_str())
    }
}

/// Full-text query plus exact facet filters, intersected.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchQuery {
    pub text: String,
    pub country: Option<String>,
    pub year: Option<i64>,
    pub limit: usize,
    pub vector: Option<Vec<f32>>,
}

impl SearchQuery {
    pub fn new(
        text: &str,
        country: Option<&str>,
        year: Option<i64>,
        limit: usize,
    ) -> Result<Self, DomainError> {
        if limit == 0 || limit > MAX_RESULTS {
            return Err(DomainError::InvalidQuery(format!(
                "k must be between 1 and {}, got {}",
                MAX_RESULTS, limit
            )));
        }
        let text = text.trim();
        Ok(Self {
            text: if text.is_empty() { "*".to_string() } else { text.to_string() },
            country: country
                .map(|c| c.trim().to_uppercase())
                .filter(|c| !c.is_empty()),
            year,
            limit,
            vector: None,
        })
    }

    pub fn is_match_all(&self) -> bool {
        self.text == "*"
    }

    /// Filter in the engine's `field:=value && ...` syntax, `None` when unfiltered.
    pub fn filter_expression(&self) -> Option<String> {
        let mut clauses = Vec::new();
        if let Some(country) = &self.country {
            clauses.push(format!("country:=`{}`", country.replace('`', "")));
        }
        if let Some(year) = self.year {
            clauses.push(format!("year:={}", year));
        }
        (!clauses.is_empty()).then(|| clauses.join(" && "))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document: ProjectDocument,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetValue {
    pub value: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetCounts {
    pub field: String,
    pub counts: Vec<FacetValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SearchResponse {
    pub found: u64,
    pub hits: Vec<SearchHit>,
    pub facets: Vec<FacetCounts>,
}
