//! Search request shape and engine query construction

use crate::search::analysis::{query_terms, query_text, split_trailing_js, tokenize, IT_TEXT_TOKENIZER};
use crate::search::error::{SearchError, SearchResult};
use crate::search::geo::GeoPoint;
use serde::{Deserialize, Serialize};
use std::ops::Bound;
use strum::{Display, EnumString};
use tantivy::query::{
    BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, PhrasePrefixQuery, PhraseQuery, Query,
    RangeQuery, TermQuery,
};
use tantivy::schema::{Field, IndexRecordOption, Schema};
use tantivy::tokenizer::TextAnalyzer;
use tantivy::{Index, Term};

// Relevance boosts, highest for the most precise signal.
const BOOST_TITLE_PHRASE: f32 = 10.0;
const BOOST_SKILLS_PHRASE: f32 = 8.0;
const BOOST_CATEGORY_PHRASE: f32 = 6.0;
const BOOST_VOCAB_EXACT: f32 = 5.0;
const BOOST_COMPANY_PHRASE: f32 = 4.0;
const BOOST_LOCATION_PHRASE: f32 = 3.0;
const BOOST_FUZZY: f32 = 2.0;
const BOOST_PREFIX_FALLBACK: f32 = 0.5;

/// Result ordering
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SearchSort {
    /// Creation time descending
    #[default]
    Newest,
    /// Maximum salary descending
    SalaryDesc,
    /// Minimum salary ascending
    SalaryAsc,
    /// Deadline ascending, creation time descending as tie-break
    DeadlineAsc,
    /// Geo distance ascending; only valid with a geo center
    Distance,
}

/// A validated, strongly-typed search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text keyword
    pub keyword: Option<String>,

    /// Exact-match location filters
    pub city: Option<String>,
    pub district: Option<String>,
    pub ward: Option<String>,
    pub street: Option<String>,

    /// Any-of filters over controlled vocabularies
    pub work_modes: Option<Vec<String>>,
    pub experience_levels: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,

    pub employment_type: Option<String>,
    pub negotiable: Option<bool>,
    pub category: Option<String>,

    /// Salary interval (overlap semantics, see build_salary_filters)
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,

    /// Geo radius post-filter
    pub geo: Option<GeoPoint>,
    pub radius_km: Option<f64>,

    /// Pagination, 1-based page
    pub page: usize,
    pub limit: usize,

    pub sort: SearchSort,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            keyword: None,
            city: None,
            district: None,
            ward: None,
            street: None,
            work_modes: None,
            experience_levels: None,
            skills: None,
            employment_type: None,
            negotiable: None,
            category: None,
            min_salary: None,
            max_salary: None,
            geo: None,
            radius_km: None,
            page: 1,
            limit: 20,
            sort: SearchSort::Newest,
        }
    }
}

impl SearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_work_modes(mut self, modes: Vec<impl Into<String>>) -> Self {
        self.work_modes = Some(modes.into_iter().map(|m| m.into()).collect());
        self
    }

    pub fn with_experience_levels(mut self, levels: Vec<impl Into<String>>) -> Self {
        self.experience_levels = Some(levels.into_iter().map(|l| l.into()).collect());
        self
    }

    pub fn with_skills(mut self, skills: Vec<impl Into<String>>) -> Self {
        self.skills = Some(skills.into_iter().map(|s| s.into()).collect());
        self
    }

    pub fn with_employment_type(mut self, employment_type: impl Into<String>) -> Self {
        self.employment_type = Some(employment_type.into());
        self
    }

    pub fn with_negotiable(mut self, negotiable: bool) -> Self {
        self.negotiable = Some(negotiable);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_salary_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_salary = min;
        self.max_salary = max;
        self
    }

    pub fn with_geo(mut self, center: GeoPoint, radius_km: f64) -> Self {
        self.geo = Some(center);
        self.radius_km = Some(radius_km);
        self
    }

    pub fn with_sort(mut self, sort: SearchSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Offset-based pagination start
    pub fn offset(&self) -> usize {
        (self.page.max(1) - 1) * self.limit.max(1)
    }
}

/// Builds tantivy queries out of search requests.
///
/// The geo radius never appears in the engine query; it is applied as a
/// post-filter over the scored candidates so relevance order is unaffected.
pub struct QueryBuilder {
    schema: Schema,
    index: Index,
}

impl QueryBuilder {
    pub fn new(schema: Schema, index: Index) -> Self {
        Self { schema, index }
    }

    /// Build the engine query: relevance should-clauses plus exact filters.
    pub fn build(&self, request: &SearchRequest) -> SearchResult<Box<dyn Query>> {
        let mut subqueries: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        if let Some(keyword) = request.keyword.as_deref().map(str::trim) {
            if !keyword.is_empty() {
                let relevance = self.build_keyword_clause(keyword)?;
                subqueries.push((Occur::Must, relevance));
            }
        }

        // Search never exposes non-active jobs
        subqueries.push((
            Occur::Must,
            self.term_filter("status", "active")?,
        ));

        for (field, value) in [
            ("city", &request.city),
            ("district", &request.district),
            ("ward", &request.ward),
            ("street", &request.street),
        ] {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                subqueries.push((Occur::Must, self.term_filter(field, &value.to_lowercase())?));
            }
        }

        if let Some(ref modes) = request.work_modes {
            if let Some(filter) = self.any_of_filter("work_modes", modes, true)? {
                subqueries.push((Occur::Must, filter));
            }
        }
        if let Some(ref levels) = request.experience_levels {
            if let Some(filter) = self.any_of_filter("experience_levels", levels, true)? {
                subqueries.push((Occur::Must, filter));
            }
        }
        if let Some(ref skills) = request.skills {
            if let Some(filter) = self.any_of_filter("skills_exact", skills, false)? {
                subqueries.push((Occur::Must, filter));
            }
        }
        if let Some(employment_type) = request
            .employment_type
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            subqueries.push((
                Occur::Must,
                self.term_filter("employment_type", &employment_type.to_lowercase())?,
            ));
        }
        if let Some(category) = request
            .category
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            subqueries.push((Occur::Must, self.term_filter("category_exact", category)?));
        }
        if let Some(negotiable) = request.negotiable {
            let field = self.field("negotiable")?;
            let term = Term::from_field_bool(field, negotiable);
            subqueries.push((
                Occur::Must,
                Box::new(TermQuery::new(term, IndexRecordOption::Basic)),
            ));
        }

        for filter in Self::build_salary_filters(request) {
            subqueries.push((Occur::Must, filter));
        }

        Ok(Box::new(BooleanQuery::from(subqueries)))
    }

    /// Interval-overlap salary semantics: a job matches when its salary
    /// range intersects the requested range, not when it is contained by it.
    fn build_salary_filters(request: &SearchRequest) -> Vec<Box<dyn Query>> {
        let mut filters: Vec<Box<dyn Query>> = Vec::new();

        if let Some(min) = request.min_salary {
            // job.salary_max >= requested_min
            filters.push(Box::new(RangeQuery::new_f64_bounds(
                "salary_max".to_string(),
                Bound::Included(min),
                Bound::Unbounded,
            )));
        }
        if let Some(max) = request.max_salary {
            // job.salary_min <= requested_max
            filters.push(Box::new(RangeQuery::new_f64_bounds(
                "salary_min".to_string(),
                Bound::Unbounded,
                Bound::Included(max),
            )));
        }

        filters
    }

    /// The disjunctive relevance clause for a keyword. At least one of the
    /// should-clauses must match.
    fn build_keyword_clause(&self, keyword: &str) -> SearchResult<Box<dyn Query>> {
        let mut analyzer = self.analyzer()?;
        let phrase_tokens = tokenize(&mut analyzer, &query_text(keyword));
        if phrase_tokens.is_empty() {
            return Err(SearchError::QueryBuildFailed(format!(
                "keyword '{}' produced no tokens",
                keyword
            )));
        }

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        let mut push = |boost: f32, query: Box<dyn Query>| {
            clauses.push((Occur::Should, Box::new(BoostQuery::new(query, boost))));
        };

        // Exact-phrase relevance, in priority order
        if let Some(q) = self.phrase_query("title", &phrase_tokens)? {
            push(BOOST_TITLE_PHRASE, q);
        }
        if let Some(q) = self.phrase_query("skills", &phrase_tokens)? {
            push(BOOST_SKILLS_PHRASE, q);
        }
        if let Some(q) = self.phrase_query("category", &phrase_tokens)? {
            push(BOOST_CATEGORY_PHRASE, q);
        }
        if let Some(q) = self.phrase_query("company_name", &phrase_tokens)? {
            push(BOOST_COMPANY_PHRASE, q);
        }
        if let Some(q) = self.phrase_query("location_full", &phrase_tokens)? {
            push(BOOST_LOCATION_PHRASE, q);
        }

        // Controlled vocabularies match the whole keyword, case-normalized
        let vocab = keyword.to_lowercase();
        push(BOOST_VOCAB_EXACT, self.term_filter("experience_levels", &vocab)?);
        push(BOOST_VOCAB_EXACT, self.term_filter("work_modes", &vocab)?);

        // Fuzzy multi-field match, single long tokens only: multi-word
        // keywords must match as a phrase to avoid over-matching
        let is_single_token = !keyword.trim().contains(char::is_whitespace);
        if is_single_token {
            let distance = Self::fuzzy_distance(keyword);
            let terms = query_terms(&mut analyzer, keyword);
            for field_name in ["title", "skills", "company_name", "category", "location_full"] {
                let field = self.field(field_name)?;
                for term_text in &terms {
                    let term = Term::from_field_text(field, term_text);
                    let query: Box<dyn Query> = if distance == 0 {
                        Box::new(TermQuery::new(term, IndexRecordOption::Basic))
                    } else {
                        Box::new(FuzzyTermQuery::new(term, distance, true))
                    };
                    push(BOOST_FUZZY, query);
                }
            }
            // Vocabulary fields participate without fuzziness
            for field_name in ["experience_levels", "work_modes"] {
                push(BOOST_FUZZY, self.term_filter(field_name, &vocab)?);
            }
        }

        // Low-boost prefix-phrase fallback; "reactjs" also tries "react js"
        let mut prefix_variants: Vec<Vec<String>> = vec![phrase_tokens.clone()];
        if let Some(split) = split_trailing_js(keyword) {
            let tokens = tokenize(&mut analyzer, &split);
            if !tokens.is_empty() && !prefix_variants.contains(&tokens) {
                prefix_variants.push(tokens);
            }
        }
        for tokens in &prefix_variants {
            for field_name in ["title", "skills", "category"] {
                if let Some(q) = self.prefix_query(field_name, tokens)? {
                    push(BOOST_PREFIX_FALLBACK, q);
                }
            }
        }

        Ok(Box::new(BooleanQuery::from(clauses)))
    }

    /// Edit-distance tolerance scales with token length.
    fn fuzzy_distance(keyword: &str) -> u8 {
        match keyword.trim().chars().count() {
            0..=3 => 0,
            4..=6 => 1,
            _ => 2,
        }
    }

    fn analyzer(&self) -> SearchResult<TextAnalyzer> {
        self.index
            .tokenizers()
            .get(IT_TEXT_TOKENIZER)
            .ok_or_else(|| {
                SearchError::QueryBuildFailed(format!(
                    "tokenizer '{}' is not registered",
                    IT_TEXT_TOKENIZER
                ))
            })
    }

    fn field(&self, name: &str) -> SearchResult<Field> {
        self.schema
            .get_field(name)
            .map_err(|_| SearchError::QueryBuildFailed(format!("unknown field '{}'", name)))
    }

    /// Exact term match against a raw string field.
    fn term_filter(&self, field_name: &str, value: &str) -> SearchResult<Box<dyn Query>> {
        let field = self.field(field_name)?;
        let term = Term::from_field_text(field, value);
        Ok(Box::new(TermQuery::new(term, IndexRecordOption::Basic)))
    }

    /// OR across the provided values; `None` when every value is blank.
    fn any_of_filter(
        &self,
        field_name: &str,
        values: &[String],
        lowercase: bool,
    ) -> SearchResult<Option<Box<dyn Query>>> {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for value in values {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let value = if lowercase {
                value.to_lowercase()
            } else {
                value.to_string()
            };
            clauses.push((Occur::Should, self.term_filter(field_name, &value)?));
        }
        if clauses.is_empty() {
            return Ok(None);
        }
        Ok(Some(Box::new(BooleanQuery::from(clauses))))
    }

    /// Phrase query over an analyzed field; a single token degrades to a
    /// term query since tantivy phrases need at least two terms.
    fn phrase_query(&self, field_name: &str, tokens: &[String]) -> SearchResult<Option<Box<dyn Query>>> {
        let field = self.field(field_name)?;
        match tokens.len() {
            0 => Ok(None),
            1 => {
                let term = Term::from_field_text(field, &tokens[0]);
                Ok(Some(Box::new(TermQuery::new(term, IndexRecordOption::Basic))))
            }
            _ => {
                let terms: Vec<Term> = tokens
                    .iter()
                    .map(|t| Term::from_field_text(field, t))
                    .collect();
                Ok(Some(Box::new(PhraseQuery::new(terms))))
            }
        }
    }

    /// Prefix-phrase query: all tokens exact, last token as prefix.
    fn prefix_query(&self, field_name: &str, tokens: &[String]) -> SearchResult<Option<Box<dyn Query>>> {
        let field = self.field(field_name)?;
        match tokens.len() {
            0 => Ok(None),
            1 => {
                let term = Term::from_field_text(field, &tokens[0]);
                Ok(Some(Box::new(FuzzyTermQuery::new_prefix(term, 0, true))))
            }
            _ => {
                let terms: Vec<Term> = tokens
                    .iter()
                    .map(|t| Term::from_field_text(field, t))
                    .collect();
                Ok(Some(Box::new(PhrasePrefixQuery::new(terms))))
            }
        }
    }
}
