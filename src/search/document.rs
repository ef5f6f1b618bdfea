//! Search document structure and index schema

use crate::search::analysis::{index_text, IT_TEXT_TOKENIZER};
use crate::search::geo::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tantivy::schema::*;
use tantivy::TantivyDocument;

/// Trait for documents that can be indexed and searched
pub trait SearchDocument {
    /// Convert to Tantivy document
    fn to_tantivy_doc(&self, schema: &Schema) -> TantivyDocument;

    /// Get document ID
    fn document_id(&self) -> String;
}

/// The denormalized, disposable projection of a canonical job.
///
/// Rebuildable from the canonical record at any time; never authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDocument {
    /// Job ID (canonical UUID, string form)
    pub id: String,

    /// Job title
    pub title: String,

    /// Salary range
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,

    /// Whether salary is negotiable
    pub negotiable: bool,

    /// Employment type, lower-cased controlled vocabulary
    pub employment_type: Option<String>,

    /// Work modes, lower-cased controlled vocabulary
    pub work_modes: Vec<String>,

    /// Experience levels, lower-cased controlled vocabulary
    pub experience_levels: Vec<String>,

    /// Address parts
    pub city: Option<String>,
    pub district: Option<String>,
    pub ward: Option<String>,
    pub street: Option<String>,

    /// Full address line
    pub location_full: Option<String>,

    /// Coordinates, present only when both latitude and longitude are known
    pub geo: Option<GeoPoint>,

    /// Lifecycle status string
    pub status: String,

    /// Application deadline
    pub deadline: Option<DateTime<Utc>>,

    /// Skill names
    pub skills: Vec<String>,

    /// Category name
    pub category: Option<String>,

    /// Owning company
    pub company_name: Option<String>,
    pub company_logo: Option<String>,
    pub company_industries: Vec<String>,
    pub company_tech_stack: Vec<String>,

    /// Completion inputs: deduplicated, non-blank, lower-cased
    pub suggest_inputs: Vec<String>,

    /// Timestamps
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SearchDocument for JobDocument {
    fn to_tantivy_doc(&self, schema: &Schema) -> TantivyDocument {
        let mut doc = TantivyDocument::new();

        // Full document payload, stored as JSON for hit materialization
        if let Ok(field) = schema.get_field("payload") {
            doc.add_text(field, serde_json::to_string(self).unwrap_or_default());
        }

        if let Ok(field) = schema.get_field("id") {
            doc.add_text(field, &self.id);
        }

        // Analyzed free-text fields get the variant-expanded form
        if let Ok(field) = schema.get_field("title") {
            doc.add_text(field, index_text(&self.title));
        }
        if let Ok(field) = schema.get_field("skills") {
            for skill in &self.skills {
                doc.add_text(field, index_text(skill));
            }
        }
        if let Ok(field) = schema.get_field("category") {
            if let Some(ref category) = self.category {
                doc.add_text(field, index_text(category));
            }
        }
        if let Ok(field) = schema.get_field("company_name") {
            if let Some(ref name) = self.company_name {
                doc.add_text(field, index_text(name));
            }
        }
        if let Ok(field) = schema.get_field("location_full") {
            if let Some(ref location) = self.location_full {
                doc.add_text(field, index_text(location));
            }
        }

        // Exact sub-fields for fields that are both searched and filtered
        if let Ok(field) = schema.get_field("skills_exact") {
            for skill in &self.skills {
                doc.add_text(field, skill);
            }
        }
        if let Ok(field) = schema.get_field("category_exact") {
            if let Some(ref category) = self.category {
                doc.add_text(field, category);
            }
        }

        // Exact-filter fields
        if let Ok(field) = schema.get_field("status") {
            doc.add_text(field, &self.status);
        }
        // Address filters are case-insensitive; the payload keeps display casing
        for (name, value) in [
            ("city", &self.city),
            ("district", &self.district),
            ("ward", &self.ward),
            ("street", &self.street),
        ] {
            if let (Ok(field), Some(value)) = (schema.get_field(name), value.as_ref()) {
                doc.add_text(field, value.to_lowercase());
            }
        }
        if let (Ok(field), Some(value)) = (
            schema.get_field("employment_type"),
            self.employment_type.as_ref(),
        ) {
            doc.add_text(field, value);
        }
        if let Ok(field) = schema.get_field("work_modes") {
            for mode in &self.work_modes {
                doc.add_text(field, mode);
            }
        }
        if let Ok(field) = schema.get_field("experience_levels") {
            for level in &self.experience_levels {
                doc.add_text(field, level);
            }
        }
        if let Ok(field) = schema.get_field("negotiable") {
            doc.add_bool(field, self.negotiable);
        }

        // Numeric and date fields
        if let Ok(field) = schema.get_field("salary_min") {
            if let Some(salary) = self.salary_min {
                doc.add_f64(field, salary);
            }
        }
        if let Ok(field) = schema.get_field("salary_max") {
            if let Some(salary) = self.salary_max {
                doc.add_f64(field, salary);
            }
        }
        if let Ok(field) = schema.get_field("deadline") {
            if let Some(deadline) = self.deadline {
                doc.add_date(
                    field,
                    tantivy::DateTime::from_timestamp_secs(deadline.timestamp()),
                );
            }
        }
        if let Ok(field) = schema.get_field("created_at") {
            doc.add_date(
                field,
                tantivy::DateTime::from_timestamp_secs(self.created_at.timestamp()),
            );
        }

        // Completion terms; raw tokenizer, so each input is one FST entry
        if let Ok(field) = schema.get_field("suggest") {
            for input in &self.suggest_inputs {
                doc.add_text(field, input);
            }
        }

        doc
    }

    fn document_id(&self) -> String {
        self.id.clone()
    }
}

/// Build the search schema for job documents.
///
/// Free-text fields are analyzed with the IT-domain tokenizer chain and kept
/// position-aware for phrase queries. Filter fields are raw strings. The full
/// document travels in a stored-only JSON payload field, so indexed fields
/// never need to be stored themselves.
pub fn build_job_schema() -> Schema {
    let mut schema_builder = Schema::builder();

    // Stored-only JSON payload
    let payload_opts = TextOptions::default().set_stored();
    schema_builder.add_text_field("payload", payload_opts);

    // ID - raw indexed for upsert-by-term, stored for convenience
    schema_builder.add_text_field("id", STRING | STORED);

    // Analyzed free-text fields (positions kept for phrase matching)
    let analyzed_indexing = TextFieldIndexing::default()
        .set_tokenizer(IT_TEXT_TOKENIZER)
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    let analyzed_opts = TextOptions::default().set_indexing_options(analyzed_indexing);

    schema_builder.add_text_field("title", analyzed_opts.clone());
    schema_builder.add_text_field("skills", analyzed_opts.clone());
    schema_builder.add_text_field("category", analyzed_opts.clone());
    schema_builder.add_text_field("company_name", analyzed_opts.clone());
    schema_builder.add_text_field("location_full", analyzed_opts);

    // Exact sub-fields for values that are both searched and filtered
    schema_builder.add_text_field("skills_exact", STRING);
    schema_builder.add_text_field("category_exact", STRING);

    // Exact-filter fields
    schema_builder.add_text_field("status", STRING);
    schema_builder.add_text_field("city", STRING);
    schema_builder.add_text_field("district", STRING);
    schema_builder.add_text_field("ward", STRING);
    schema_builder.add_text_field("street", STRING);
    schema_builder.add_text_field("work_modes", STRING);
    schema_builder.add_text_field("experience_levels", STRING);
    schema_builder.add_text_field("employment_type", STRING);
    schema_builder.add_bool_field("negotiable", INDEXED);

    // Range/sort fields
    schema_builder.add_f64_field("salary_min", INDEXED | FAST);
    schema_builder.add_f64_field("salary_max", INDEXED | FAST);
    schema_builder.add_date_field("deadline", INDEXED | FAST);
    schema_builder.add_date_field("created_at", INDEXED | FAST);

    // Completion field; raw tokenizer keeps whole inputs as dictionary terms
    let suggest_indexing = TextFieldIndexing::default()
        .set_tokenizer("raw")
        .set_index_option(IndexRecordOption::Basic);
    let suggest_opts = TextOptions::default().set_indexing_options(suggest_indexing);
    schema_builder.add_text_field("suggest", suggest_opts);

    schema_builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_building() {
        let schema = build_job_schema();
        assert!(schema.get_field("payload").is_ok());
        assert!(schema.get_field("id").is_ok());
        assert!(schema.get_field("title").is_ok());
        assert!(schema.get_field("skills_exact").is_ok());
        assert!(schema.get_field("status").is_ok());
        assert!(schema.get_field("salary_max").is_ok());
        assert!(schema.get_field("suggest").is_ok());
    }

    #[test]
    fn test_payload_roundtrip() {
        let doc = JobDocument {
            id: "a".to_string(),
            title: "Backend Engineer".to_string(),
            salary_min: Some(1000.0),
            salary_max: Some(2000.0),
            negotiable: false,
            employment_type: Some("full-time".to_string()),
            work_modes: vec!["remote".to_string()],
            experience_levels: vec!["senior".to_string()],
            city: Some("Hanoi".to_string()),
            district: None,
            ward: None,
            street: None,
            location_full: Some("Hanoi".to_string()),
            geo: Some(GeoPoint::new(21.0, 105.8)),
            status: "active".to_string(),
            deadline: None,
            skills: vec!["Rust".to_string()],
            category: Some("Software".to_string()),
            company_name: Some("Acme".to_string()),
            company_logo: None,
            company_industries: vec![],
            company_tech_stack: vec![],
            suggest_inputs: vec!["backend engineer".to_string()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&doc).unwrap();
        let back: JobDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
