//! Clause types accumulated by the query builder.

use serde_json::{json, Map, Value};

use crate::errors::SearchIndexError;

/// Whether a clause is mandatory (`must`) or optional (`should`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    Must,
    Should,
}

impl Occurrence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Occurrence::Must => "must",
            Occurrence::Should => "should",
        }
    }
}

/// Analyzed match or exact phrase match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Match,
    MatchPhrase,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Match => "match",
            MatchKind::MatchPhrase => "match_phrase",
        }
    }
}

/// Options for `add_match_with` / `add_filter_with`.
///
/// ```
/// use catalog_search_repository::query::MatchOptions;
///
/// let options = MatchOptions::new().boost(2.0).mandatory().exact();
/// assert!(options.mandatory && options.exact);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    pub boost: f64,
    pub mandatory: bool,
    pub exact: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            boost: 1.0,
            mandatory: false,
            exact: false,
        }
    }
}

impl MatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = boost;
        self
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    pub fn occurrence(&self) -> Occurrence {
        if self.mandatory {
            Occurrence::Must
        } else {
            Occurrence::Should
        }
    }

    pub fn kind(&self) -> MatchKind {
        if self.exact {
            MatchKind::MatchPhrase
        } else {
            MatchKind::Match
        }
    }
}

/// A single clause inside a boolean query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryClause {
    /// `match` / `match_phrase` on one field.
    Match {
        field: String,
        query: String,
        boost: f64,
        kind: MatchKind,
    },
    /// Inclusive range; bounds are numbers or engine date-math strings.
    Range {
        field: String,
        gte: Value,
        lte: Value,
    },
}

impl QueryClause {
    /// Check the clause invariants: non-empty field and query, finite positive boost.
    pub fn validate(&self) -> Result<(), SearchIndexError> {
        match self {
            QueryClause::Match {
                field,
                query,
                boost,
                ..
            } => {
                if field.trim().is_empty() {
                    return Err(SearchIndexError::validation("Match field cannot be empty"));
                }
                if query.trim().is_empty() {
                    return Err(SearchIndexError::validation(format!(
                        "Match query for field '{}' cannot be empty",
                        field
                    )));
                }
                if !boost.is_finite() || *boost <= 0.0 {
                    return Err(SearchIndexError::validation(format!(
                        "Boost for field '{}' must be positive, got {}",
                        field, boost
                    )));
                }
                Ok(())
            }
            QueryClause::Range { field, .. } => {
                if field.trim().is_empty() {
                    return Err(SearchIndexError::validation("Range field cannot be empty"));
                }
                Ok(())
            }
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            QueryClause::Match {
                field,
                query,
                boost,
                kind,
            } => {
                let mut params = Map::new();
                params.insert(field.clone(), json!({ "query": query, "boost": boost }));
                let mut clause = Map::new();
                clause.insert(kind.as_str().to_string(), Value::Object(params));
                Value::Object(clause)
            }
            QueryClause::Range { field, gte, lte } => {
                let mut bounds = Map::new();
                bounds.insert(field.clone(), json!({ "gte": gte, "lte": lte }));
                json!({ "range": Value::Object(bounds) })
            }
        }
    }
}

/// Ordered `must` and `should` clause lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClauseSet {
    must: Vec<QueryClause>,
    should: Vec<QueryClause>,
}

impl ClauseSet {
    pub fn push(&mut self, occurrence: Occurrence, clause: QueryClause) {
        match occurrence {
            Occurrence::Must => self.must.push(clause),
            Occurrence::Should => self.should.push(clause),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty()
    }

    pub fn len(&self) -> usize {
        self.must.len() + self.should.len()
    }

    pub fn validate(&self) -> Result<(), SearchIndexError> {
        self.must
            .iter()
            .chain(self.should.iter())
            .try_for_each(QueryClause::validate)
    }

    /// Render as a bool-query body; empty lists are left out.
    pub fn to_json(&self) -> Map<String, Value> {
        let mut body = Map::new();
        for (occurrence, clauses) in [
            (Occurrence::Must, &self.must),
            (Occurrence::Should, &self.should),
        ] {
            if !clauses.is_empty() {
                body.insert(
                    occurrence.as_str().to_string(),
                    Value::Array(clauses.iter().map(QueryClause::to_json).collect()),
                );
            }
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn match_clause(field: &str, query: &str, boost: f64) -> QueryClause {
        QueryClause::Match {
            field: field.to_string(),
            query: query.to_string(),
            boost,
            kind: MatchKind::Match,
        }
    }

    #[test]
    fn test_match_clause_json() {
        let clause = match_clause("title", "dune", 2.5);
        assert_eq!(
            clause.to_json(),
            json!({ "match": { "title": { "query": "dune", "boost": 2.5 } } })
        );
    }

    #[test]
    fn test_phrase_clause_json() {
        let clause = QueryClause::Match {
            field: "title".to_string(),
            query: "case study".to_string(),
            boost: 1.0,
            kind: MatchKind::MatchPhrase,
        };
        assert!(clause.to_json()["match_phrase"]["title"].is_object());
    }

    #[test]
    fn test_clause_validation() {
        assert!(match_clause("title", "dune", 1.0).validate().is_ok());
        assert!(match_clause("", "dune", 1.0).validate().is_err());
        assert!(match_clause("title", "  ", 1.0).validate().is_err());
        assert!(match_clause("title", "dune", 0.0).validate().is_err());
        assert!(match_clause("title", "dune", -1.0).validate().is_err());
        assert!(match_clause("title", "dune", f64::NAN).validate().is_err());
    }

    #[test]
    fn test_clause_set_omits_empty_lists() {
        let mut set = ClauseSet::default();
        set.push(Occurrence::Should, match_clause("title", "dune", 1.0));

        let body = set.to_json();
        assert!(body.contains_key("should"));
        assert!(!body.contains_key("must"));
        assert_eq!(set.len(), 1);
    }
}
