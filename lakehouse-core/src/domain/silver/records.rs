// lakehouse-core/src/domain/silver/records.rs

use crate::domain::error::DomainError;
use crate::domain::table::{Cell, ColumnDef, ColumnType, Record, RowReader};
use chrono::NaiveDate;

use ColumnType::{Date, Float, Integer, Text};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SilverProject {
    pub project_id: String,
    pub acronym: Option<String>,
    pub status: Option<String>,
    pub title: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub duration_days: Option<i64>,
    pub total_cost: Option<f64>,
    pub ec_max_contribution: Option<f64>,
    pub legal_basis: Option<String>,
    pub framework_programme: Option<String>,
    pub funding_scheme: Option<String>,
    pub objective: Option<String>,
    pub keywords: Option<String>,
    pub country: Option<String>,
}

impl Record for SilverProject {
    const TABLE: &'static str = "silver_project";
    const COLUMNS: &'static [ColumnDef] = &[
        ColumnDef::required("project_id", Text),
        ColumnDef::optional("acronym", Text),
        ColumnDef::optional("status", Text),
        ColumnDef::optional("title", Text),
        ColumnDef::optional("start_date", Date),
        ColumnDef::optional("end_date", Date),
        ColumnDef::optional("duration_days", Integer),
        ColumnDef::optional("total_cost", Float),
        ColumnDef::optional("ec_max_contribution", Float),
        ColumnDef::optional("legal_basis", Text),
        ColumnDef::optional("framework_programme", Text),
        ColumnDef::optional("funding_scheme", Text),
        ColumnDef::optional("objective", Text),
        ColumnDef::optional("keywords", Text),
        ColumnDef::optional("country", Text),
    ];

    fn to_cells(&self) -> Vec<Cell> {
        vec![
            self.project_id.clone().into(),
            self.acronym.clone().into(),
            self.status.clone().into(),
            self.title.clone().into(),
            self.start_date.into(),
            self.end_date.into(),
            self.duration_days.into(),
            self.total_cost.into(),
            self.ec_max_contribution.into(),
            self.legal_basis.clone().into(),
            self.framework_programme.clone().into(),
            self.funding_scheme.clone().into(),
            self.objective.clone().into(),
            self.keywords.clone().into(),
            self.country.clone().into(),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, DomainError> {
        Ok(Self {
            project_id: row.text("project_id")?,
            acronym: row.opt_text("acronym")?,
            status: row.opt_text("status")?,
            title: row.opt_text("title")?,
            start_date: row.opt_date("start_date")?,
            end_date: row.opt_date("end_date")?,
            duration_days: row.opt_int("duration_days")?,
            total_cost: row.opt_float("total_cost")?,
            ec_max_contribution: row.opt_float("ec_max_contribution")?,
            legal_basis: row.opt_text("legal_basis")?,
            framework_programme: row.opt_text("framework_programme")?,
            funding_scheme: row.opt_text("funding_scheme")?,
            objective: row.opt_text("objective")?,
            keywords: row.opt_text("keywords")?,
            country: row.opt_text("country")?,
        })
    }
}

/// One participation of an organisation in a project.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SilverOrganization {
    pub project_id: String,
    pub organisation_id: String,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub activity_type: Option<String>,
    pub role: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub vat_number: Option<String>,
    pub organization_url: Option<String>,
    pub ec_contribution: Option<f64>,
    pub net_ec_contribution: Option<f64>,
    pub total_cost: Option<f64>,
}

impl SilverOrganization {
    pub fn is_coordinator(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case("coordinator"))
    }
}

impl Record for SilverOrganization {
    const TABLE: &'static str = "silver_organization";
    const COLUMNS: &'static [ColumnDef] = &[
        ColumnDef::required("project_id", Text),
        ColumnDef::required("organisation_id", Text),
        ColumnDef::optional("name", Text),
        ColumnDef::optional("short_name", Text),
        ColumnDef::optional("activity_type", Text),
        ColumnDef::optional("role", Text),
        ColumnDef::optional("country", Text),
        ColumnDef::optional("city", Text),
        ColumnDef::optional("vat_number", Text),
        ColumnDef::optional("organization_url", Text),
        ColumnDef::optional("ec_contribution", Float),
        ColumnDef::optional("net_ec_contribution", Float),
        ColumnDef::optional("total_cost", Float),
    ];

    fn to_cells(&self) -> Vec<Cell> {
        vec![
            self.project_id.clone().into(),
            self.organisation_id.clone().into(),
            self.name.clone().into(),
            self.short_name.clone().into(),
            self.activity_type.clone().into(),
            self.role.clone().into(),
            self.country.clone().into(),
            self.city.clone().into(),
            self.vat_number.clone().into(),
            self.organization_url.clone().into(),
            self.ec_contribution.into(),
            self.net_ec_contribution.into(),
            self.total_cost.into(),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, DomainError> {
        Ok(Self {
            project_id: row.text("project_id")?,
            organisation_id: row.text("organisation_id")?,
            name: row.opt_text("name")?,
            short_name: row.opt_text("short_name")?,
            activity_type: row.opt_text("activity_type")?,
            role: row.opt_text("role")?,
            country: row.opt_text("country")?,
            city: row.opt_text("city")?,
            vat_number: row.opt_text("vat_number")?,
            organization_url: row.opt_text("organization_url")?,
            ec_contribution: row.opt_float("ec_contribution")?,
            net_ec_contribution: row.opt_float("net_ec_contribution")?,
            total_cost: row.opt_float("total_cost")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SilverTopic {
    pub project_id: String,
    pub topic_code: String,
    pub topic_title: Option<String>,
}

impl Record for SilverTopic {
    const TABLE: &'static str = "silver_topic";
    const COLUMNS: &'static [ColumnDef] = &[
        ColumnDef::required("project_id", Text),
        ColumnDef::required("topic_code", Text),
        ColumnDef::optional("topic_title", Text),
    ];

    fn to_cells(&self) -> Vec<Cell> {
        vec![
            self.project_id.clone().into(),
            self.topic_code.clone().into(),
            self.topic_title.clone().into(),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, DomainError> {
        Ok(Self {
            project_id: row.text("project_id")?,
            topic_code: row.text("topic_code")?,
            topic_title: row.opt_text("topic_title")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SilverPolicyPriority {
    pub project_id: String,
    pub priority_code: String,
    pub priority_title: Option<String>,
}

impl Record for SilverPolicyPriority {
    const TABLE: &'static str = "silver_policy_priority";
    const COLUMNS: &'static [ColumnDef] = &[
        ColumnDef::required("project_id", Text),
        ColumnDef::required("priority_code", Text),
        ColumnDef::optional("priority_title", Text),
    ];

    fn to_cells(&self) -> Vec<Cell> {
        vec![
            self.project_id.clone().into(),
            self.priority_code.clone().into(),
            self.priority_title.clone().into(),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, DomainError> {
        Ok(Self {
            project_id: row.text("project_id")?,
            priority_code: row.text("priority_code")?,
            priority_title: row.opt_text("priority_title")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SilverLegalBasis {
    pub project_id: String,
    pub legal_basis_code: String,
    pub legal_basis_title: Option<String>,
    pub unique_programme_part: Option<String>,
}

impl Record for SilverLegalBasis {
    const TABLE: &'static str = "silver_legal_basis";
    const COLUMNS: &'static [ColumnDef] = &[
        ColumnDef::required("project_id", Text),
        ColumnDef::required("legal_basis_code", Text),
        ColumnDef::optional("legal_basis_title", Text),
        ColumnDef::optional("unique_programme_part", Text),
    ];

    fn to_cells(&self) -> Vec<Cell> {
        vec![
            self.project_id.clone().into(),
            self.legal_basis_code.clone().into(),
            self.legal_basis_title.clone().into(),
            self.unique_programme_part.clone().into(),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, DomainError> {
        Ok(Self {
            project_id: row.text("project_id")?,
            legal_basis_code: row.text("legal_basis_code")?,
            legal_basis_title: row.opt_text("legal_basis_title")?,
            unique_programme_part: row.opt_text("unique_programme_part")?,
        })
    }
}

/// A EuroSciVoc classification attached to a project.
#[derive(Debug, Clone, PartialEq)]
pub struct SilverVocabularyTerm {
    pub project_id: String,
    pub code: String,
    pub path: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl Record for SilverVocabularyTerm {
    const TABLE: &'static str = "silver_vocabulary";
    const COLUMNS: &'static [ColumnDef] = &[
        ColumnDef::required("project_id", Text),
        ColumnDef::required("code", Text),
        ColumnDef::optional("path", Text),
        ColumnDef::optional("title", Text),
        ColumnDef::optional("description", Text),
    ];

    fn to_cells(&self) -> Vec<Cell> {
        vec![
            self.project_id.clone().into(),
            self.code.clone().into(),
            self.path.clone().into(),
            self.title.clone().into(),
            self.description.clone().into(),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, DomainError> {
        Ok(Self {
            project_id: row.text("project_id")?,
            code: row.text("code")?,
            path: row.opt_text("path")?,
            title: row.opt_text("title")?,
            description: row.opt_text("description")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SilverWebItem {
    pub project_id: String,
    pub uri: Option<String>,
    pub title: Option<String>,
    pub item_type: Option<String>,
    pub language: Option<String>,
}

impl Record for SilverWebItem {
    const TABLE: &'static str = "silver_web_item";
    const COLUMNS: &'static [ColumnDef] = &[
        ColumnDef::required("project_id", Text),
        ColumnDef::optional("uri", Text),
        ColumnDef::optional("title", Text),
        ColumnDef::optional("item_type", Text),
        ColumnDef::optional("language", Text),
    ];

    fn to_cells(&self) -> Vec<Cell> {
        vec![
            self.project_id.clone().into(),
            self.uri.clone().into(),
            self.title.clone().into(),
            self.item_type.clone().into(),
            self.language.clone().into(),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, DomainError> {
        Ok(Self {
            project_id: row.text("project_id")?,
            uri: row.opt_text("uri")?,
            title: row.opt_text("title")?,
            item_type: row.opt_text("item_type")?,
            language: row.opt_text("language")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SilverWebLink {
    pub project_id: String,
    pub link_id: Option<String>,
    pub url: Option<String>,
    pub link_type: Option<String>,
    pub status: Option<String>,
}

impl Record for SilverWebLink {
    const TABLE: &'static str = "silver_web_link";
    const COLUMNS: &'static [ColumnDef] = &[
        ColumnDef::required("project_id", Text),
        ColumnDef::optional("link_id", Text),
        ColumnDef::optional("url", Text),
        ColumnDef::optional("link_type", Text),
        ColumnDef::optional("status", Text),
    ];

    fn to_cells(&self) -> Vec<Cell> {
        vec![
            self.project_id.clone().into(),
            self.link_id.clone().into(),
            self.url.clone().into(),
            self.link_type.clone().into(),
            self.status.clone().into(),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, DomainError> {
        Ok(Self {
            project_id: row.text("project_id")?,
            link_id: row.opt_text("link_id")?,
            url: row.opt_text("url")?,
            link_type: row.opt_text("link_type")?,
            status: row.opt_text("status")?,
        })
    }
}
