// lakehouse-core/src/domain/gold/star.rs
//
// Silver -> Gold star schema. Dimensions first, then one fact row per distinct
// foreign-key combination, with outer-join semantics on every dimension.

use std::collections::{HashMap, HashSet};

use chrono::Datelike;

use crate::domain::gold::dimension::Dimension;
use crate::domain::gold::model::*;
use crate::domain::silver::SilverSnapshot;

/// The five dimensions the fact table resolves against.
#[derive(Debug, Clone, Default)]
pub struct DimensionSet {
    pub projects: Dimension<ProjectDim>,
    pub organizations: Dimension<OrganizationDim>,
    pub topics: Dimension<TopicDim>,
    pub priorities: Dimension<PolicyPriorityDim>,
    pub legal_bases: Dimension<LegalBasisDim>,
}

/// Related rows of one project, grouped once so the fact build stays linear.
#[derive(Default)]
struct ProjectLinks<'a> {
    organizations: Vec<&'a crate::domain::silver::SilverOrganization>,
    topics: Vec<&'a str>,
    priorities: Vec<&'a str>,
    legal_bases: Vec<&'a str>,
    own_legal_basis: Option<&'a str>,
    science_fields: Vec<&'a str>,
    web_items: i64,
    web_links: i64,
}

fn group_links(silver: &SilverSnapshot) -> HashMap<&str, ProjectLinks<'_>> {
    let mut links: HashMap<&str, ProjectLinks<'_>> = HashMap::new();
    for project in &silver.projects {
        if let Some(basis) = project.legal_basis.as_deref() {
            links.entry(&project.project_id).or_default().own_legal_basis = Some(basis);
        }
    }
    for org in &silver.organizations {
        links.entry(&org.project_id).or_default().organizations.push(org);
    }
    for topic in &silver.topics {
        links.entry(&topic.project_id).or_default().topics.push(&topic.topic_code);
    }
    for priority in &silver.priorities {
        links
            .entry(&priority.project_id)
            .or_default()
            .priorities
            .push(&priority.priority_code);
    }
    for basis in &silver.legal_bases {
        links
            .entry(&basis.project_id)
            .or_default()
            .legal_bases
            .push(&basis.legal_basis_code);
    }
    for term in &silver.vocabulary {
        if let Some(title) = term.title.as_deref() {
            links.entry(&term.project_id).or_default().science_fields.push(title);
        }
    }
    for item in &silver.web_items {
        links.entry(&item.project_id).or_default().web_items += 1;
    }
    for link in &silver.web_links {
        links.entry(&link.project_id).or_default().web_links += 1;
    }
    links
}

/// Project country: own column, else the coordinator's, else the first participant's.
fn project_country(own: Option<&String>, links: Option<&ProjectLinks<'_>>) -> Option<String> {
    if let Some(country) = own {
        return Some(country.clone());
    }
    let orgs = &links?.organizations;
    orgs.iter()
        .find(|o| o.is_coordinator() && o.country.is_some())
        .or_else(|| orgs.iter().find(|o| o.country.is_some()))
        .and_then(|o| o.country.clone())
}

fn distinct_in_order<'a>(values: &[&'a str]) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values.iter().copied().filter(|v| seen.insert(*v)).collect()
}

pub fn build_project_dimension(silver: &SilverSnapshot) -> Dimension<ProjectDim> {
    let links = group_links(silver);
    Dimension::build(
        &silver.projects,
        |p| Some(p.project_id.as_str()),
        |sk, p| {
            let project_links = links.get(p.project_id.as_str());
            let fields = project_links
                .map(|l| distinct_in_order(&l.science_fields).join("; "))
                .filter(|s| !s.is_empty());
            ProjectDim {
                project_sk: sk,
                project_id: p.project_id.clone(),
                acronym: p.acronym.clone(),
                title: p.title.clone(),
                abstract_text: p.objective.clone(),
                status: p.status.clone(),
                start_date: p.start_date,
                end_date: p.end_date,
                duration_days: p.duration_days,
                total_cost: p.total_cost,
                ec_max_contribution: p.ec_max_contribution,
                framework_programme: p.framework_programme.clone(),
                country: project_country(p.country.as_ref(), project_links),
                year: p.start_date.map(|d| i64::from(d.year())),
                science_fields: fields,
            }
        },
    )
}

pub fn build_organization_dimension(silver: &SilverSnapshot) -> Dimension<OrganizationDim> {
    Dimension::build(
        &silver.organizations,
        |o| Some(o.organisation_id.as_str()),
        |sk, o| OrganizationDim {
            organization_sk: sk,
            organisation_id: o.organisation_id.clone(),
            name: o.name.clone(),
            short_name: o.short_name.clone(),
            country: o.country.clone(),
            city: o.city.clone(),
            activity_type: o.activity_type.clone(),
            vat_number: o.vat_number.clone(),
            organization_url: o.organization_url.clone(),
        },
    )
}

pub fn build_topic_dimension(silver: &SilverSnapshot) -> Dimension<TopicDim> {
    Dimension::build(
        &silver.topics,
        |t| Some(t.topic_code.as_str()),
        |sk, t| TopicDim {
            sk,
            code: t.topic_code.clone(),
            title: t.topic_title.clone(),
        },
    )
}

pub fn build_policy_priority_dimension(silver: &SilverSnapshot) -> Dimension<PolicyPriorityDim> {
    Dimension::build(
        &silver.priorities,
        |p| Some(p.priority_code.as_str()),
        |sk, p| PolicyPriorityDim {
            sk,
            code: p.priority_code.clone(),
            title: p.priority_title.clone(),
        },
    )
}

pub fn build_legal_basis_dimension(silver: &SilverSnapshot) -> Dimension<LegalBasisDim> {
    Dimension::build(
        &silver.legal_bases,
        |l| Some(l.legal_basis_code.as_str()),
        |sk, l| LegalBasisDim {
            sk,
            code: l.legal_basis_code.clone(),
            title: l.legal_basis_title.clone(),
        },
    )
}

/// Resolves natural codes through a dimension. An empty result becomes a single
/// `None` so the project still yields a fact row.
fn resolve(codes: &[&str], lookup: impl Fn(&str) -> Option<i64>) -> Vec<Option<i64>> {
    let mut keys: Vec<Option<i64>> = Vec::new();
    for code in distinct_in_order(codes) {
        let key = lookup(code);
        if key.is_some() && !keys.contains(&key) {
            keys.push(key);
        }
    }
    if keys.is_empty() {
        keys.push(None);
    }
    keys
}

pub fn build_facts(silver: &SilverSnapshot, dims: &DimensionSet) -> Vec<FundingFact> {
    let links = group_links(silver);
    let empty = ProjectLinks::default();
    let mut facts = Vec::new();
    let mut seen = HashSet::new();

    for project in dims.projects.rows() {
        let l = links.get(project.project_id.as_str()).unwrap_or(&empty);

        // (organization_sk, contribution) per participation
        let mut participations: Vec<(Option<i64>, Option<f64>)> = l
            .organizations
            .iter()
            .filter_map(|o| {
                dims.organizations
                    .key_of(&o.organisation_id)
                    .map(|sk| (Some(sk), o.ec_contribution))
            })
            .collect();
        if participations.is_empty() {
            participations.push((None, None));
        }

        let topics = resolve(&l.topics, |c| dims.topics.key_of(c));
        let priorities = resolve(&l.priorities, |c| dims.priorities.key_of(c));
        let mut basis_codes = l.legal_bases.clone();
        if basis_codes.is_empty()
            && let Some(own) = l.own_legal_basis
        {
            basis_codes.push(own);
        }
        let legal_bases = resolve(&basis_codes, |c| dims.legal_bases.key_of(c));

        for &(organization_sk, contribution) in &participations {
            for &topic_sk in &topics {
                for &priority_sk in &priorities {
                    for &legal_basis_sk in &legal_bases {
                        let grain = (
                            project.project_sk,
                            organization_sk,
                            topic_sk,
                            priority_sk,
                            legal_basis_sk,
                        );
                        if !seen.insert(grain) {
                            continue;
                        }
                        let funding_amount = match organization_sk {
                            Some(_) => contribution,
                            None => project.ec_max_contribution,
                        };
                        facts.push(FundingFact {
                            project_sk: project.project_sk,
                            organization_sk,
                            topic_sk,
                            priority_sk,
                            legal_basis_sk,
                            funding_amount,
                            duration_days: project.duration_days,
                            web_item_count: l.web_items,
                            web_link_count: l.web_links,
                        });
                    }
                }
            }
        }
    }

    facts
}
