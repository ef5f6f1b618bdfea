//! Canonical job -> search document projection
//!
//! Pure transformation, no I/O. Anything malformed in the canonical record
//! degrades to a safe default here; a partially-degraded document always
//! beats a dropped index update.

use crate::models::CanonicalJob;
use crate::search::document::JobDocument;
use crate::search::geo::GeoPoint;

/// Project a canonical job into its flattened search document.
pub fn project(job: &CanonicalJob) -> JobDocument {
    let work_modes = lowercase_all(job.work_modes.to_vec());
    let experience_levels = lowercase_all(job.experience_levels.to_vec());
    let employment_type = job
        .employment_type
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase);

    let location_full = job
        .location_full
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| join_address_parts(job));

    let geo = match (job.latitude, job.longitude) {
        (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
        _ => None,
    };

    let suggest_inputs = build_suggest_inputs(job, &work_modes, &experience_levels);

    JobDocument {
        id: job.id.to_string(),
        title: job.title.clone(),
        salary_min: job.salary_min,
        salary_max: job.salary_max,
        negotiable: job.salary_negotiable,
        employment_type,
        work_modes,
        experience_levels,
        city: clean(job.city.as_deref()),
        district: clean(job.district.as_deref()),
        ward: clean(job.ward.as_deref()),
        street: clean(job.street.as_deref()),
        location_full,
        geo,
        status: job.status.to_string(),
        deadline: job.deadline,
        skills: job
            .skills
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        category: clean(job.category.as_deref()),
        company_name: clean(job.company_name.as_deref()),
        company_logo: clean(job.company_logo.as_deref()),
        company_industries: job.company_industries.to_vec(),
        company_tech_stack: job.company_tech_stack.to_vec(),
        suggest_inputs,
        created_at: job.created_at,
        updated_at: job.updated_at,
    }
}

fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn lowercase_all(values: Vec<String>) -> Vec<String> {
    values.into_iter().map(|v| v.to_lowercase()).collect()
}

/// Comma-join of the non-empty address parts, most specific first.
fn join_address_parts(job: &CanonicalJob) -> Option<String> {
    let parts: Vec<&str> = [
        job.street.as_deref(),
        job.ward.as_deref(),
        job.district.as_deref(),
        job.city.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .filter(|p| !p.is_empty())
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Deduplicated union of everything a user might type into the search box.
fn build_suggest_inputs(
    job: &CanonicalJob,
    work_modes: &[String],
    experience_levels: &[String],
) -> Vec<String> {
    let mut inputs: Vec<String> = Vec::new();
    let mut push = |value: &str| {
        let value = value.trim().to_lowercase();
        if !value.is_empty() && !inputs.contains(&value) {
            inputs.push(value);
        }
    };

    push(&job.title);
    if let Some(ref name) = job.company_name {
        push(name);
    }
    for skill in &job.skills {
        push(skill);
    }
    if let Some(ref category) = job.category {
        push(category);
    }
    for mode in work_modes {
        push(mode);
    }
    for level in experience_levels {
        push(level);
    }
    if let Some(ref employment) = job.employment_type {
        push(employment);
    }

    inputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FlexValue, JobStatus};
    use uuid::Uuid;

    fn sample_job() -> CanonicalJob {
        let mut job = CanonicalJob::new(Uuid::new_v4(), "Senior Backend Engineer");
        job.skills = vec!["Node.js".to_string(), "PostgreSQL".to_string()];
        job.category = Some("Software Development".to_string());
        job.company_name = Some("Acme Corp".to_string());
        job.work_modes = FlexValue::Raw("remote".to_string());
        job.experience_levels = FlexValue::Array(vec!["Senior".to_string()]);
        job.employment_type = Some("Full-time".to_string());
        job.city = Some("Hanoi".to_string());
        job.district = Some("Cau Giay".to_string());
        job.street = Some("123 Xuan Thuy".to_string());
        job
    }

    #[test]
    fn test_project_flattens_relations() {
        let job = sample_job();
        let doc = project(&job);

        assert_eq!(doc.id, job.id.to_string());
        assert_eq!(doc.title, "Senior Backend Engineer");
        assert_eq!(doc.skills, vec!["Node.js", "PostgreSQL"]);
        assert_eq!(doc.category.as_deref(), Some("Software Development"));
        assert_eq!(doc.status, "active");
    }

    #[test]
    fn test_bare_string_work_mode() {
        let doc = project(&sample_job());
        assert_eq!(doc.work_modes, vec!["remote".to_string()]);
    }

    #[test]
    fn test_json_array_string_work_modes() {
        let mut job = sample_job();
        job.work_modes = FlexValue::Raw(r#"["remote","hybrid"]"#.to_string());
        let doc = project(&job);
        assert_eq!(doc.work_modes, vec!["remote", "hybrid"]);
    }

    #[test]
    fn test_absent_work_modes() {
        let mut job = sample_job();
        job.work_modes = FlexValue::Absent;
        let doc = project(&job);
        assert!(doc.work_modes.is_empty());
    }

    #[test]
    fn test_location_full_computed_from_parts() {
        let doc = project(&sample_job());
        assert_eq!(
            doc.location_full.as_deref(),
            Some("123 Xuan Thuy, Cau Giay, Hanoi")
        );
    }

    #[test]
    fn test_location_full_passthrough_when_set() {
        let mut job = sample_job();
        job.location_full = Some("Somewhere else entirely".to_string());
        let doc = project(&job);
        assert_eq!(doc.location_full.as_deref(), Some("Somewhere else entirely"));
    }

    #[test]
    fn test_geo_requires_both_coordinates() {
        let mut job = sample_job();
        job.latitude = Some(21.0285);
        assert!(project(&job).geo.is_none());

        job.longitude = Some(105.8542);
        let geo = project(&job).geo.unwrap();
        assert_eq!(geo.lat, 21.0285);
        assert_eq!(geo.lon, 105.8542);
    }

    #[test]
    fn test_suggest_inputs_deduplicated_non_blank() {
        let mut job = sample_job();
        job.skills.push("  ".to_string());
        job.skills.push("senior backend engineer".to_string()); // dup of title
        let doc = project(&job);

        assert!(doc.suggest_inputs.contains(&"senior backend engineer".to_string()));
        assert!(doc.suggest_inputs.contains(&"acme corp".to_string()));
        assert!(doc.suggest_inputs.contains(&"node.js".to_string()));
        assert!(doc.suggest_inputs.contains(&"remote".to_string()));
        assert!(doc.suggest_inputs.contains(&"full-time".to_string()));

        let unique: std::collections::HashSet<_> = doc.suggest_inputs.iter().collect();
        assert_eq!(unique.len(), doc.suggest_inputs.len());
        assert!(doc.suggest_inputs.iter().all(|s| !s.trim().is_empty()));
    }

    #[test]
    fn test_projection_deterministic() {
        let job = sample_job();
        assert_eq!(project(&job), project(&job));
    }

    #[test]
    fn test_hidden_status_projects_as_hidden() {
        let mut job = sample_job();
        job.status = JobStatus::Hidden;
        assert_eq!(project(&job).status, "hidden");
    }
}
