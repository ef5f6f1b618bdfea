//! IT-domain text analysis
//!
//! The job corpus is full of vocabulary that a standard tokenizer mangles:
//! symbol-bearing names (`C++`, `C#`, `.NET`), dotted framework names
//! (`Node.js`, `Vue.js`) and compound spellings (`reactjs` vs `react js`).
//! Tantivy has token filters but no character filters, so the symbol and
//! compound handling happens here, on the text itself, applied the same way
//! at index time and at query time. The registered tokenizer chain then only
//! needs to split, lower-case and ASCII-fold.

use once_cell::sync::Lazy;
use regex::Regex;
use tantivy::tokenizer::{AsciiFoldingFilter, LowerCaser, SimpleTokenizer, TextAnalyzer};
use tantivy::Index;

/// Name of the analyzer registered for free-text job fields.
pub const IT_TEXT_TOKENIZER: &str = "it_text";

/// Symbol-bearing names rewritten to tokenizable word forms.
static SYMBOL_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (Regex::new(r"(?i)c\+\+").unwrap(), "cplusplus"),
        (Regex::new(r"(?i)c#").unwrap(), "csharp"),
        (Regex::new(r"(?i)f#").unwrap(), "fsharp"),
        (Regex::new(r"(?i)\.net\b").unwrap(), " dotnet"),
    ]
});

/// Literal abbreviation expansions, applied per lower-cased token.
static ABBREVIATIONS: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("ts", "typescript"),
    ("py", "python"),
    ("k8s", "kubernetes"),
];

/// Register the tokenizer chain used by the job schema. Safe to call more
/// than once; re-registration under the same name just replaces the entry.
pub fn register_tokenizers(index: &Index) {
    let analyzer = TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .filter(AsciiFoldingFilter)
        .build();
    index.tokenizers().register(IT_TEXT_TOKENIZER, analyzer);
}

/// Rewrite domain symbols into word forms: `C++ & C# on .NET` becomes
/// `cplusplus & csharp on dotnet`. Applied to both indexed text and keywords
/// so the two sides agree on vocabulary.
pub fn replace_symbols(text: &str) -> String {
    let mut out = text.to_string();
    for (pattern, replacement) in SYMBOL_PATTERNS.iter() {
        out = pattern.replace_all(&out, *replacement).into_owned();
    }
    out
}

/// Variants derived from one token: abbreviation expansions, split and
/// concatenated forms of dotted/hyphenated compounds, and the split form of
/// a trailing `js` suffix. The original token is not repeated here.
fn token_variants(token: &str) -> Vec<String> {
    let lower = token.to_lowercase();
    let mut variants = Vec::new();

    for (abbr, expansion) in ABBREVIATIONS {
        if lower == *abbr {
            variants.push((*expansion).to_string());
        }
    }

    let parts: Vec<&str> = lower
        .split(['.', '-', '_', '/'])
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() > 1 {
        // "node.js" -> "node", "js", "nodejs"
        for part in &parts {
            variants.push((*part).to_string());
        }
        variants.push(parts.concat());
    } else if let Some(split) = split_trailing_js(&lower) {
        // "reactjs" -> "react js"
        variants.extend(split.split_whitespace().map(str::to_string));
    }

    variants
}

/// Split a trailing `js` suffix off a single compound token:
/// `reactjs` -> `react js`. Returns `None` when the heuristic does not apply.
pub fn split_trailing_js(token: &str) -> Option<String> {
    let lower = token.trim().to_lowercase();
    if lower.len() > 3
        && lower.ends_with("js")
        && !lower.contains(char::is_whitespace)
        && lower.chars().all(|c| c.is_alphanumeric())
    {
        let stem = &lower[..lower.len() - 2];
        return Some(format!("{} js", stem));
    }
    None
}

/// Text as written to an analyzed index field: the symbol-normalized
/// original, with all derived variants appended after it. Appending (rather
/// than interleaving) keeps the primary token positions intact for phrase
/// matching while still making every variant a searchable term.
pub fn index_text(text: &str) -> String {
    let primary = replace_symbols(text);
    let tokens: Vec<&str> = primary.split_whitespace().collect();

    let mut variants: Vec<String> = Vec::new();
    for token in &tokens {
        variants.extend(token_variants(token));
    }
    // Concatenated form of "<word> js" pairs: "react js" also yields "reactjs"
    for pair in tokens.windows(2) {
        if pair[1].eq_ignore_ascii_case("js") {
            variants.push(format!("{}js", pair[0].to_lowercase()));
        }
    }

    variants.retain(|v| !tokens.iter().any(|t| t.eq_ignore_ascii_case(v)));
    variants.dedup();

    if variants.is_empty() {
        primary
    } else {
        format!("{} {}", primary, variants.join(" "))
    }
}

/// Symbol-normalized keyword text, without variant expansion. Phrase clauses
/// are built from this so their token sequence lines up with the primary
/// token stream of the indexed text.
pub fn query_text(text: &str) -> String {
    replace_symbols(text)
}

/// All terms a keyword should match on the term/fuzzy side: the analyzed
/// primary tokens plus every derived variant, deduplicated.
pub fn query_terms(analyzer: &mut TextAnalyzer, keyword: &str) -> Vec<String> {
    let normalized = query_text(keyword);
    let mut terms = tokenize(analyzer, &normalized);
    let variant_source: Vec<String> = normalized
        .split_whitespace()
        .flat_map(token_variants)
        .collect();
    for variant in variant_source {
        for term in tokenize(analyzer, &variant) {
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
    }
    terms
}

/// Run text through a tantivy analyzer and collect the token texts.
pub fn tokenize(analyzer: &mut TextAnalyzer, text: &str) -> Vec<String> {
    let mut stream = analyzer.token_stream(text);
    let mut tokens = Vec::new();
    while stream.advance() {
        tokens.push(stream.token().text.clone());
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_analyzer() -> TextAnalyzer {
        TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(LowerCaser)
            .filter(AsciiFoldingFilter)
            .build()
    }

    #[test]
    fn test_symbol_replacement() {
        assert_eq!(replace_symbols("C++ developer"), "cplusplus developer");
        assert_eq!(replace_symbols("C# and .NET"), "csharp and  dotnet");
        assert_eq!(replace_symbols("ASP.NET Core"), "ASP dotnet Core");
    }

    #[test]
    fn test_index_text_expands_dotted_names() {
        let text = index_text("Node.js Engineer");
        assert!(text.contains("Node.js Engineer"));
        assert!(text.contains("node"));
        assert!(text.contains("nodejs"));
    }

    #[test]
    fn test_index_text_splits_trailing_js() {
        let text = index_text("Reactjs Developer");
        assert!(text.contains("react"));
        assert!(text.contains("js"));
    }

    #[test]
    fn test_index_text_concatenates_js_pairs() {
        let text = index_text("React JS Developer");
        assert!(text.to_lowercase().contains("reactjs"));
    }

    #[test]
    fn test_split_trailing_js() {
        assert_eq!(split_trailing_js("reactjs").as_deref(), Some("react js"));
        assert_eq!(split_trailing_js("js"), None);
        assert_eq!(split_trailing_js("node js"), None);
        assert_eq!(split_trailing_js("java"), None);
    }

    #[test]
    fn test_query_terms_include_abbreviation_expansion() {
        let mut analyzer = test_analyzer();
        let terms = query_terms(&mut analyzer, "JS developer");
        assert!(terms.contains(&"js".to_string()));
        assert!(terms.contains(&"javascript".to_string()));
        assert!(terms.contains(&"developer".to_string()));
    }

    #[test]
    fn test_query_terms_nodejs_matches_split_form() {
        let mut analyzer = test_analyzer();
        let terms = query_terms(&mut analyzer, "nodejs");
        assert!(terms.contains(&"nodejs".to_string()));
        assert!(terms.contains(&"node".to_string()));
        assert!(terms.contains(&"js".to_string()));
    }

    #[test]
    fn test_tokenize_folds_ascii() {
        let mut analyzer = test_analyzer();
        let tokens = tokenize(&mut analyzer, "Hà Nội");
        assert_eq!(tokens, vec!["ha".to_string(), "noi".to_string()]);
    }
}
