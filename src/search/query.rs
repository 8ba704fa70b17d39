//! Query bodies and response parsing for the external search index.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::IndexError;
use crate::models::{Category, Question};

/// Shortest search text accepted, in characters after trimming.
pub const MIN_SEARCH_LENGTH: usize = 3;

/// One search against the index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub text: String,
    /// Tolerate typos (`fuzziness: AUTO`) instead of requiring every term.
    pub fuzzy: bool,
    pub category: Option<Category>,
    pub size: u32,
}

impl SearchRequest {
    /// Elasticsearch query DSL body.
    pub fn to_query(&self) -> Value {
        let matcher = if self.fuzzy {
            json!({ "query": self.text, "fuzziness": "AUTO" })
        } else {
            json!({ "query": self.text, "operator": "and" })
        };

        let mut bool_query = json!({
            "must": [{ "match": { "question": matcher } }],
        });
        if let Some(category) = self.category {
            bool_query["filter"] = json!([{ "term": { "question_type": category.label() } }]);
        }

        json!({
            "size": self.size,
            "query": { "bool": bool_query },
            "_source": ["pk"],
        })
    }
}

/// A ranked hit; only the id is used downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: i32,
    pub score: f64,
}

/// Document shape stored in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    pub pk: i32,
    /// Category label, matched by the `term` filter.
    pub question_type: String,
    pub question: String,
}

impl From<&Question> for IndexDocument {
    fn from(question: &Question) -> Self {
        Self {
            pk: question.id,
            question_type: question.category.label().to_string(),
            question: question.question.clone(),
        }
    }
}

/// Index settings and mapping: Russian stemming on question text.
pub fn index_definition() -> Value {
    json!({
        "settings": {
            "analysis": {
                "filter": {
                    "russian_stop": { "type": "stop", "stopwords": "_russian_" },
                    "russian_stemmer": { "type": "stemmer", "language": "russian" },
                },
                "analyzer": {
                    "ru": {
                        "tokenizer": "standard",
                        "filter": ["lowercase", "russian_stop", "russian_stemmer"],
                    },
                },
            },
        },
        "mappings": {
            "properties": {
                "pk": { "type": "integer" },
                "question_type": { "type": "keyword" },
                "question": { "type": "text", "analyzer": "ru" },
            },
        },
    })
}

/// Query matching every document, for clearing the index.
pub fn match_all() -> Value {
    json!({ "query": { "match_all": {} } })
}

/// Extract `(pk, score)` pairs from a `_search` response, best first.
pub fn parse_hits(body: &Value) -> Result<Vec<SearchHit>, IndexError> {
    let hits = body
        .pointer("/hits/hits")
        .and_then(Value::as_array)
        .ok_or_else(|| IndexError::Malformed("missing hits.hits".to_string()))?;

    hits.iter()
        .map(|hit| {
            let id = hit
                .pointer("/_source/pk")
                .and_then(Value::as_i64)
                .and_then(|pk| i32::try_from(pk).ok())
                .ok_or_else(|| IndexError::Malformed(format!("hit without pk: {}", hit)))?;
            let score = hit.get("_score").and_then(Value::as_f64).unwrap_or(0.0);
            Ok(SearchHit { id, score })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(fuzzy: bool, category: Option<Category>) -> SearchRequest {
        SearchRequest {
            text: "столица".to_string(),
            fuzzy,
            category,
            size: 10,
        }
    }

    #[test]
    fn test_fulltext_query_requires_all_terms() {
        let query = request(false, None).to_query();
        let matcher = &query["query"]["bool"]["must"][0]["match"]["question"];
        assert_eq!(matcher["operator"], "and");
        assert!(matcher.get("fuzziness").is_none());
        assert!(query["query"]["bool"].get("filter").is_none());
        assert_eq!(query["size"], 10);
    }

    #[test]
    fn test_fuzzy_query_with_category_filter() {
        let query = request(true, Some(Category::OwnGame)).to_query();
        let matcher = &query["query"]["bool"]["must"][0]["match"]["question"];
        assert_eq!(matcher["fuzziness"], "AUTO");
        assert_eq!(
            query["query"]["bool"]["filter"][0]["term"]["question_type"],
            "Своя игра"
        );
    }

    #[test]
    fn test_parse_hits_keeps_rank_order() {
        let body = json!({
            "hits": { "hits": [
                { "_score": 3.5, "_source": { "pk": 5 } },
                { "_score": 2.0, "_source": { "pk": 2 } },
                { "_score": 1.1, "_source": { "pk": 9 } },
            ]}
        });
        let ids: Vec<i32> = parse_hits(&body).unwrap().iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![5, 2, 9]);
    }

    #[test]
    fn test_parse_hits_rejects_garbage() {
        assert!(parse_hits(&json!({ "error": "boom" })).is_err());
        assert!(parse_hits(&json!({ "hits": { "hits": [{ "_source": {} }] } })).is_err());
        assert!(parse_hits(&json!({ "hits": { "hits": [] } })).unwrap().is_empty());
    }
}
