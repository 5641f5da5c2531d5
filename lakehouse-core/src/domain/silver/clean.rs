// lakehouse-core/src/domain/silver/clean.rs
//
// Per-entity Bronze -> Silver rules. Header aliases cover the CORDIS exports
// and the lower-case variants produced by common spreadsheet tools.

use std::collections::HashSet;

use crate::domain::silver::parse::{
    clean_code, clean_text, duration_days, parse_date, parse_number, trailing_segment,
};
use crate::domain::silver::raw::{RawTable, field};
use crate::domain::silver::records::*;

const PROJECT_REF: &[&str] = &["projectID", "projectId", "project_id"];

/// Outcome of cleaning one Bronze table.
#[derive(Debug, Clone)]
pub struct Cleaned<T> {
    pub records: Vec<T>,
    /// Rows dropped because the reader rejected them or a required field was missing.
    pub skipped: usize,
    /// Rows dropped because their natural key was already seen.
    pub duplicates: usize,
}

/// Shared skeleton: build each row, drop the unbuildable ones, keep the first of each key.
fn collect<T>(
    raw: &RawTable,
    build: impl Fn(&[String]) -> Option<T>,
    key: impl Fn(&T) -> String,
) -> Cleaned<T> {
    let mut records = Vec::with_capacity(raw.rows.len());
    let mut seen = HashSet::new();
    let mut skipped = raw.malformed;
    let mut duplicates = 0;

    for row in &raw.rows {
        match build(row) {
            Some(record) => {
                if seen.insert(key(&record)) {
                    records.push(record);
                } else {
                    duplicates += 1;
                }
            }
            None => skipped += 1,
        }
    }

    Cleaned {
        records,
        skipped,
        duplicates,
    }
}

pub fn clean_projects(raw: &RawTable) -> Cleaned<SilverProject> {
    let [
        id,
        acronym,
        status,
        title,
        start,
        end,
        total_cost,
        ec_max,
        legal_basis,
        programme,
        scheme,
        objective,
        keywords,
        country,
    ] = raw.layout([
        &["projectID", "projectId", "project_id", "id"],
        &["acronym"],
        &["status"],
        &["title"],
        &["startDate", "start_date", "start"],
        &["endDate", "end_date", "end"],
        &["totalCost", "total_cost"],
        &["ecMaxContribution", "ec_max_contribution"],
        &["legalBasis", "legal_basis"],
        &["frameworkProgramme", "framework_programme"],
        &["fundingScheme", "funding_scheme"],
        &["objective", "abstract"],
        &["keywords"],
        &["country", "coordinatorCountry"],
    ]);

    collect(
        raw,
        |row| {
            let start_date = parse_date(field(row, start));
            let end_date = parse_date(field(row, end));
            Some(SilverProject {
                project_id: clean_text(field(row, id))?,
                acronym: clean_text(field(row, acronym)),
                status: clean_text(field(row, status)),
                title: clean_text(field(row, title)),
                start_date,
                end_date,
                duration_days: duration_days(start_date, end_date),
                total_cost: parse_number(field(row, total_cost)),
                ec_max_contribution: parse_number(field(row, ec_max)),
                legal_basis: clean_text(field(row, legal_basis)),
                framework_programme: clean_text(field(row, programme)),
                funding_scheme: clean_text(field(row, scheme)),
                objective: clean_text(field(row, objective)),
                keywords: clean_text(field(row, keywords)),
                country: clean_code(field(row, country)),
            })
        },
        |p| p.project_id.clone(),
    )
}

pub fn clean_organizations(raw: &RawTable) -> Cleaned<SilverOrganization> {
    let [
        project,
        org,
        name,
        short_name,
        activity,
        role,
        country,
        city,
        vat,
        url,
        contribution,
        net_contribution,
        total_cost,
    ] = raw.layout([
        PROJECT_REF,
        &["organisationID", "organizationID", "organisation_id", "organization_id"],
        &["name"],
        &["shortName", "short_name"],
        &["activityType", "activity_type"],
        &["role"],
        &["country"],
        &["city"],
        &["vatNumber", "vat_number"],
        &["organizationURL", "organisationURL", "url"],
        &["ecContribution", "ec_contribution"],
        &["netEcContribution", "net_ec_contribution"],
        &["totalCost", "total_cost"],
    ]);

    collect(
        raw,
        |row| {
            Some(SilverOrganization {
                project_id: clean_text(field(row, project))?,
                organisation_id: clean_text(field(row, org))?,
                name: clean_text(field(row, name)),
                short_name: clean_text(field(row, short_name)),
                activity_type: clean_text(field(row, activity)),
                role: clean_text(field(row, role)).map(|r| r.to_lowercase()),
                country: clean_code(field(row, country)),
                city: clean_text(field(row, city)),
                vat_number: clean_text(field(row, vat)),
                organization_url: clean_text(field(row, url)),
                ec_contribution: parse_number(field(row, contribution)),
                net_ec_contribution: parse_number(field(row, net_contribution)),
                total_cost: parse_number(field(row, total_cost)),
            })
        },
        |o| format!("{}\u{1f}{}", o.project_id, o.organisation_id),
    )
}

pub fn clean_topics(raw: &RawTable) -> Cleaned<SilverTopic> {
    let [project, code, title] = raw.layout([
        PROJECT_REF,
        &["topic", "topicCode", "code"],
        &["title", "topicName", "name", "label", "description"],
    ]);

    collect(
        raw,
        |row| {
            Some(SilverTopic {
                project_id: clean_text(field(row, project))?,
                topic_code: clean_text(field(row, code))?,
                topic_title: clean_text(field(row, title)),
            })
        },
        |t| format!("{}\u{1f}{}", t.project_id, t.topic_code),
    )
}

pub fn clean_policy_priorities(raw: &RawTable) -> Cleaned<SilverPolicyPriority> {
    let [project, code, title] = raw.layout([
        PROJECT_REF,
        &["policyPriority", "priority", "code"],
        &["title", "name", "label", "description"],
    ]);

    collect(
        raw,
        |row| {
            Some(SilverPolicyPriority {
                project_id: clean_text(field(row, project))?,
                priority_code: clean_text(field(row, code))?,
                priority_title: clean_text(field(row, title)),
            })
        },
        |p| format!("{}\u{1f}{}", p.project_id, p.priority_code),
    )
}

pub fn clean_legal_bases(raw: &RawTable) -> Cleaned<SilverLegalBasis> {
    let [project, code, title, part] = raw.layout([
        PROJECT_REF,
        &["legalBasis", "legal_basis", "code"],
        &["title", "name", "description"],
        &["uniqueProgrammePart", "unique_programme_part"],
    ]);

    collect(
        raw,
        |row| {
            Some(SilverLegalBasis {
                project_id: clean_text(field(row, project))?,
                legal_basis_code: clean_text(field(row, code))?,
                legal_basis_title: clean_text(field(row, title)),
                unique_programme_part: clean_text(field(row, part)),
            })
        },
        |l| format!("{}\u{1f}{}", l.project_id, l.legal_basis_code),
    )
}

pub fn clean_vocabulary(raw: &RawTable) -> Cleaned<SilverVocabularyTerm> {
    let [project, code, path, title, description] = raw.layout([
        PROJECT_REF,
        &["euroSciVocCode", "code"],
        &["euroSciVocPath", "path"],
        &["euroSciVocTitle", "title"],
        &["euroSciVocDescription", "description"],
    ]);

    collect(
        raw,
        |row| {
            Some(SilverVocabularyTerm {
                project_id: clean_text(field(row, project))?,
                code: clean_text(field(row, code))?,
                path: clean_text(field(row, path)),
                title: clean_text(field(row, title)),
                description: clean_text(field(row, description)),
            })
        },
        |v| format!("{}\u{1f}{}", v.project_id, v.code),
    )
}

pub fn clean_web_items(raw: &RawTable) -> Cleaned<SilverWebItem> {
    let [project, represents, uri, title, item_type, language] = raw.layout([
        PROJECT_REF,
        &["represents"],
        &["uri"],
        &["title"],
        &["type"],
        &["language"],
    ]);

    collect(
        raw,
        |row| {
            let project_id = clean_text(field(row, project))
                .or_else(|| trailing_segment(field(row, represents)))?;
            Some(SilverWebItem {
                project_id,
                uri: clean_text(field(row, uri)),
                title: clean_text(field(row, title)),
                item_type: clean_text(field(row, item_type)),
                language: clean_text(field(row, language)),
            })
        },
        |w| {
            format!(
                "{}\u{1f}{}\u{1f}{}",
                w.project_id,
                w.uri.as_deref().unwrap_or_default(),
                w.language.as_deref().unwrap_or_default()
            )
        },
    )
}

pub fn clean_web_links(raw: &RawTable) -> Cleaned<SilverWebLink> {
    let [project, represents, link_id, url, link_type, status] = raw.layout([
        PROJECT_REF,
        &["represents"],
        &["id", "linkId"],
        &["physUrl", "url"],
        &["type"],
        &["status"],
    ]);

    collect(
        raw,
        |row| {
            let project_id = clean_text(field(row, project))
                .or_else(|| trailing_segment(field(row, represents)))?;
            Some(SilverWebLink {
                project_id,
                link_id: clean_text(field(row, link_id)),
                url: clean_text(field(row, url)),
                link_type: clean_text(field(row, link_type)),
                status: clean_text(field(row, status)),
            })
        },
        // Link ids are only unique within a project
        |l| match &l.link_id {
            Some(id) => format!("{}\u{1f}id\u{1f}{}", l.project_id, id),
            None => format!(
                "{}\u{1f}url\u{1f}{}",
                l.project_id,
                l.url.as_deref().unwrap_or_default()
            ),
        },
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_project_duration_and_missing_end_date() {
        let raw = table(
            &["id", "startDate", "endDate"],
            &[&["P1", "2020-01-01", "2020-01-11"], &["P2", "2021-06-01", ""]],
        );

        let cleaned = clean_projects(&raw);

        assert_eq!(cleaned.records.len(), 2);
        let p1 = &cleaned.records[0];
        assert_eq!(p1.project_id, "P1");
        assert_eq!(p1.duration_days, Some(10));
        let p2 = &cleaned.records[1];
        assert_eq!(p2.start_date, NaiveDate::from_ymd_opt(2021, 6, 1));
        assert_eq!(p2.end_date, None);
        assert_eq!(p2.duration_days, None);
    }

    #[test]
    fn test_project_rows_without_id_are_skipped_and_duplicates_dropped() {
        let mut raw = table(
            &["projectID", "title", "totalCost"],
            &[
                &["P1", " First ", "1000,5"],
                &["  ", "No id", "1"],
                &["P1", "Again", "2"],
            ],
        );
        raw.malformed = 2;

        let cleaned = clean_projects(&raw);

        assert_eq!(cleaned.records.len(), 1);
        assert_eq!(cleaned.records[0].title.as_deref(), Some("First"));
        assert_eq!(cleaned.records[0].total_cost, Some(1000.5));
        assert_eq!(cleaned.skipped, 3);
        assert_eq!(cleaned.duplicates, 1);
    }

    #[test]
    fn test_organizations_normalize_country_and_role() {
        let raw = table(
            &["projectID", "organisationID", "country", "role", "ecContribution"],
            &[
                &["P1", " 999 ", " de ", "Coordinator", "500.25"],
                &["P1", "", "FR", "participant", "1"],
            ],
        );

        let cleaned = clean_organizations(&raw);

        assert_eq!(cleaned.records.len(), 1);
        let org = &cleaned.records[0];
        assert_eq!(org.organisation_id, "999");
        assert_eq!(org.country.as_deref(), Some("DE"));
        assert!(org.is_coordinator());
        assert_eq!(org.ec_contribution, Some(500.25));
        assert_eq!(cleaned.skipped, 1);
    }

    #[test]
    fn test_web_items_resolve_project_from_represents() {
        let raw = table(
            &["uri", "represents", "language"],
            &[&["http://x/1", "project/101000001", "en"]],
        );

        let cleaned = clean_web_items(&raw);

        assert_eq!(cleaned.records[0].project_id, "101000001");
    }

    #[test]
    fn test_web_links_are_unique_per_project_and_id() {
        let raw = table(
            &["projectID", "id", "physUrl"],
            &[
                &["101", "L1", "https://a.eu"],
                &["102", "L1", "https://b.eu"],
                &["101", "L1", "https://a.eu/again"],
            ],
        );

        let cleaned = clean_web_links(&raw);

        let projects: Vec<&str> = cleaned.records.iter().map(|l| l.project_id.as_str()).collect();
        assert_eq!(projects, vec!["101", "102"]);
        assert_eq!(cleaned.duplicates, 1);
    }

    #[test]
    fn test_topics_missing_code_column_skips_every_row() {
        let raw = table(&["projectID", "label"], &[&["P1", "Something"]]);

        let cleaned = clean_topics(&raw);

        assert!(cleaned.records.is_empty());
        assert_eq!(cleaned.skipped, 1);
    }
}
