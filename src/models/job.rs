use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Lifecycle status of a canonical job. Transitions are decided by the
/// relational layer; this subsystem only reacts to the result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum JobStatus {
    Active,
    Hidden,
    Closed,
    Expired,
}

impl JobStatus {
    /// Only active jobs may have a document in the search index.
    pub fn is_searchable(&self) -> bool {
        matches!(self, JobStatus::Active)
    }
}

/// A field that the canonical store may hand us as a real JSON array,
/// as a JSON-encoded string, as a bare string, or not at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlexValue {
    Array(Vec<String>),
    Raw(String),
    #[default]
    Absent,
}

impl FlexValue {
    /// Normalize into a clean string array.
    ///
    /// A raw value that parses as a JSON string array is expanded; any other
    /// non-blank raw value becomes a single-element array. Blank entries are
    /// dropped everywhere. Invalid input never fails, it degrades.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            FlexValue::Absent => Vec::new(),
            FlexValue::Array(values) => values
                .iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect(),
            FlexValue::Raw(raw) => {
                let raw = raw.trim();
                if raw.is_empty() {
                    return Vec::new();
                }
                match serde_json::from_str::<Vec<String>>(raw) {
                    Ok(values) => values
                        .into_iter()
                        .map(|v| v.trim().to_string())
                        .filter(|v| !v.is_empty())
                        .collect(),
                    Err(_) => vec![raw.to_string()],
                }
            }
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FlexValue::Absent)
    }
}

impl From<Vec<String>> for FlexValue {
    fn from(values: Vec<String>) -> Self {
        FlexValue::Array(values)
    }
}

impl From<&str> for FlexValue {
    fn from(raw: &str) -> Self {
        FlexValue::Raw(raw.to_string())
    }
}

/// The authoritative job record, as handed over by the relational layer.
///
/// Relation names (company, category, skills) arrive resolved, never as raw
/// foreign keys. Read-only to this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalJob {
    /// Unique identifier
    pub id: Uuid,

    /// Job title
    pub title: String,

    /// Salary range (monthly, in the platform currency)
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,

    /// Whether salary is negotiable
    #[serde(default)]
    pub salary_negotiable: bool,

    /// Employment type (full-time, part-time, ...)
    pub employment_type: Option<String>,

    /// Work modes (onsite, remote, hybrid, ...)
    #[serde(default)]
    pub work_modes: FlexValue,

    /// Experience levels (intern, junior, senior, ...)
    #[serde(default)]
    pub experience_levels: FlexValue,

    /// Address parts
    pub city: Option<String>,
    pub district: Option<String>,
    pub ward: Option<String>,
    pub street: Option<String>,

    /// Free-text full address; computed from the parts when absent
    pub location_full: Option<String>,

    /// Optional coordinates
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// Lifecycle status
    pub status: JobStatus,

    /// Application deadline
    pub deadline: Option<DateTime<Utc>>,

    /// Resolved skill names
    #[serde(default)]
    pub skills: Vec<String>,

    /// Resolved category name
    pub category: Option<String>,

    /// Owning company
    pub company_name: Option<String>,
    pub company_logo: Option<String>,
    #[serde(default)]
    pub company_industries: FlexValue,
    #[serde(default)]
    pub company_tech_stack: FlexValue,

    /// Timestamps
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CanonicalJob {
    /// Minimal active job, used as a base by callers and tests.
    pub fn new(id: Uuid, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            salary_min: None,
            salary_max: None,
            salary_negotiable: false,
            employment_type: None,
            work_modes: FlexValue::Absent,
            experience_levels: FlexValue::Absent,
            city: None,
            district: None,
            ward: None,
            street: None,
            location_full: None,
            latitude: None,
            longitude: None,
            status: JobStatus::Active,
            deadline: None,
            skills: Vec::new(),
            category: None,
            company_name: None,
            company_logo: None,
            company_industries: FlexValue::Absent,
            company_tech_stack: FlexValue::Absent,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flex_value_bare_string() {
        let value = FlexValue::Raw("remote".to_string());
        assert_eq!(value.to_vec(), vec!["remote".to_string()]);
    }

    #[test]
    fn test_flex_value_json_array_string() {
        let value = FlexValue::Raw(r#"["remote","hybrid"]"#.to_string());
        assert_eq!(
            value.to_vec(),
            vec!["remote".to_string(), "hybrid".to_string()]
        );
    }

    #[test]
    fn test_flex_value_absent() {
        assert!(FlexValue::Absent.to_vec().is_empty());
    }

    #[test]
    fn test_flex_value_invalid_json_falls_back() {
        let value = FlexValue::Raw(r#"["remote", broken"#.to_string());
        assert_eq!(value.to_vec(), vec![r#"["remote", broken"#.to_string()]);
    }

    #[test]
    fn test_flex_value_blank_entries_dropped() {
        let value = FlexValue::Array(vec!["remote".to_string(), "  ".to_string()]);
        assert_eq!(value.to_vec(), vec!["remote".to_string()]);
    }

    #[test]
    fn test_status_roundtrip() {
        assert_eq!("active".parse::<JobStatus>().unwrap(), JobStatus::Active);
        assert_eq!(JobStatus::Hidden.to_string(), "hidden");
        assert!(JobStatus::Active.is_searchable());
        assert!(!JobStatus::Closed.is_searchable());
    }
}
