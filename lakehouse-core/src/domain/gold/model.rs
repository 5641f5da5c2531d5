// lakehouse-core/src/domain/gold/model.rs

use crate::domain::error::DomainError;
use crate::domain::table::{Cell, ColumnDef, ColumnType, Record, RowReader};
use chrono::NaiveDate;

use ColumnType::{Date, Float, Integer, Text};

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDim {
    pub project_sk: i64,
    pub project_id: String,
    pub acronym: Option<String>,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub duration_days: Option<i64>,
    pub total_cost: Option<f64>,
    pub ec_max_contribution: Option<f64>,
    pub framework_programme: Option<String>,
    pub country: Option<String>,
    pub year: Option<i64>,
    pub science_fields: Option<String>,
}

impl Record for ProjectDim {
    const TABLE: &'static str = "dim_project";
    const COLUMNS: &'static [ColumnDef] = &[
        ColumnDef::required("project_sk", Integer),
        ColumnDef::required("project_id", Text),
        ColumnDef::optional("acronym", Text),
        ColumnDef::optional("title", Text),
        ColumnDef::optional("abstract", Text),
        ColumnDef::optional("status", Text),
        ColumnDef::optional("start_date", Date),
        ColumnDef::optional("end_date", Date),
        ColumnDef::optional("duration_days", Integer),
        ColumnDef::optional("total_cost", Float),
        ColumnDef::optional("ec_max_contribution", Float),
        ColumnDef::optional("framework_programme", Text),
        ColumnDef::optional("country", Text),
        ColumnDef::optional("year", Integer),
        ColumnDef::optional("science_fields", Text),
    ];

    fn to_cells(&self) -> Vec<Cell> {
        vec![
            self.project_sk.into(),
            self.project_id.clone().into(),
            self.acronym.clone().into(),
            self.title.clone().into(),
            self.abstract_text.clone().into(),
            self.status.clone().into(),
            self.start_date.into(),
            self.end_date.into(),
            self.duration_days.into(),
            self.total_cost.into(),
            self.ec_max_contribution.into(),
            self.framework_programme.clone().into(),
            self.country.clone().into(),
            self.year.into(),
            self.science_fields.clone().into(),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, DomainError> {
        Ok(Self {
            project_sk: row.int("project_sk")?,
            project_id: row.text("project_id")?,
            acronym: row.opt_text("acronym")?,
            title: row.opt_text("title")?,
            abstract_text: row.opt_text("abstract")?,
            status: row.opt_text("status")?,
            start_date: row.opt_date("start_date")?,
            end_date: row.opt_date("end_date")?,
            duration_days: row.opt_int("duration_days")?,
            total_cost: row.opt_float("total_cost")?,
            ec_max_contribution: row.opt_float("ec_max_contribution")?,
            framework_programme: row.opt_text("framework_programme")?,
            country: row.opt_text("country")?,
            year: row.opt_int("year")?,
            science_fields: row.opt_text("science_fields")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrganizationDim {
    pub organization_sk: i64,
    pub organisation_id: String,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub activity_type: Option<String>,
    pub vat_number: Option<String>,
    pub organization_url: Option<String>,
}

impl Record for OrganizationDim {
    const TABLE: &'static str = "dim_organization";
    const COLUMNS: &'static [ColumnDef] = &[
        ColumnDef::required("organization_sk", Integer),
        ColumnDef::required("organisation_id", Text),
        ColumnDef::optional("name", Text),
        ColumnDef::optional("short_name", Text),
        ColumnDef::optional("country", Text),
        ColumnDef::optional("city", Text),
        ColumnDef::optional("activity_type", Text),
        ColumnDef::optional("vat_number", Text),
        ColumnDef::optional("organization_url", Text),
    ];

    fn to_cells(&self) -> Vec<Cell> {
        vec![
            self.organization_sk.into(),
            self.organisation_id.clone().into(),
            self.name.clone().into(),
            self.short_name.clone().into(),
            self.country.clone().into(),
            self.city.clone().into(),
            self.activity_type.clone().into(),
            self.vat_number.clone().into(),
            self.organization_url.clone().into(),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, DomainError> {
        Ok(Self {
            organization_sk: row.int("organization_sk")?,
            organisation_id: row.text("organisation_id")?,
            name: row.opt_text("name")?,
            short_name: row.opt_text("short_name")?,
            country: row.opt_text("country")?,
            city: row.opt_text("city")?,
            activity_type: row.opt_text("activity_type")?,
            vat_number: row.opt_text("vat_number")?,
            organization_url: row.opt_text("organization_url")?,
        })
    }
}

/// Shape shared by the code/title lookup dimensions.
macro_rules! code_dimension {
    ($name:ident, $table:literal, $sk:literal, $code:literal, $title:literal) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            pub sk: i64,
            pub code: String,
            pub title: Option<String>,
        }

        impl Record for $name {
            const TABLE: &'static str = $table;
            const COLUMNS: &'static [ColumnDef] = &[
                ColumnDef::required($sk, Integer),
                ColumnDef::required($code, Text),
                ColumnDef::optional($title, Text),
            ];

            fn to_cells(&self) -> Vec<Cell> {
                vec![
                    self.sk.into(),
                    self.code.clone().into(),
                    self.title.clone().into(),
                ]
            }

            fn from_row(row: &RowReader<'_>) -> Result<Self, DomainError> {
                Ok(Self {
                    sk: row.int($sk)?,
                    code: row.text($code)?,
                    title: row.opt_text($title)?,
                })
            }
        }
    };
}

code_dimension!(TopicDim, "dim_topic", "topic_sk", "topic_code", "topic_title");
code_dimension!(
    PolicyPriorityDim,
    "dim_policy_priority",
    "priority_sk",
    "priority_code",
    "priority_title"
);
code_dimension!(
    LegalBasisDim,
    "dim_legal_basis",
    "legal_basis_sk",
    "legal_basis_code",
    "legal_basis_title"
);

#[derive(Debug, Clone, PartialEq)]
pub struct FundingFact {
    pub project_sk: i64,
    pub organization_sk: Option<i64>,
    pub topic_sk: Option<i64>,
    pub priority_sk: Option<i64>,
    pub legal_basis_sk: Option<i64>,
    pub funding_amount: Option<f64>,
    pub duration_days: Option<i64>,
    pub web_item_count: i64,
    pub web_link_count: i64,
}

impl Record for FundingFact {
    const TABLE: &'static str = "fact_project_funding";
    const COLUMNS: &'static [ColumnDef] = &[
        ColumnDef::required("project_sk", Integer),
        ColumnDef::optional("organization_sk", Integer),
        ColumnDef::optional("topic_sk", Integer),
        ColumnDef::optional("priority_sk", Integer),
        ColumnDef::optional("legal_basis_sk", Integer),
        ColumnDef::optional("funding_amount", Float),
        ColumnDef::optional("duration_days", Integer),
        ColumnDef::required("web_item_count", Integer),
        ColumnDef::required("web_link_count", Integer),
    ];

    fn to_cells(&self) -> Vec<Cell> {
        vec![
            self.project_sk.into(),
            self.organization_sk.into(),
            self.topic_sk.into(),
            self.priority_sk.into(),
            self.legal_basis_sk.into(),
            self.funding_amount.into(),
            self.duration_days.into(),
            self.web_item_count.into(),
            self.web_link_count.into(),
        ]
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, DomainError> {
        Ok(Self {
            project_sk: row.int("project_sk")?,
            organization_sk: row.opt_int("organization_sk")?,
            topic_sk: row.opt_int("topic_sk")?,
            priority_sk: row.opt_int("priority_sk")?,
            legal_basis_sk: row.opt_int("legal_basis_sk")?,
            funding_amount: row.opt_float("funding_amount")?,
            duration_days: row.opt_int("duration_days")?,
            web_item_count: row.int("web_item_count")?,
            web_link_count: row.int("web_link_count")?,
        })
    }
}
