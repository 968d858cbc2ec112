//! Fluent request builder.
//!
//! [`QueryBuilder`] accumulates match clauses, filters, sorts and pagination
//! and renders them into a single search request body. Rendering is pure;
//! [`QueryBuilder::take_request`] is the consuming step that renders and then
//! resets the builder to its defaults.

use catalog_search_shared::SortOrder;
use serde_json::{json, Map, Value};

use crate::errors::SearchIndexError;
use crate::query::clause::{ClauseSet, MatchOptions, Occurrence, QueryClause};

/// Default number of hits per request.
pub const DEFAULT_LIMIT: usize = 50;

/// Accumulates query state and renders it into a search request.
///
/// # Example
///
/// ```
/// use catalog_search_repository::query::{MatchOptions, QueryBuilder};
/// use catalog_search_shared::SortOrder;
///
/// let mut query = QueryBuilder::new();
/// query
///     .add_match("title", "casablanca")
///     .add_filter_with("genre", "drama", MatchOptions::new().mandatory())
///     .set_date_range_in_days("released_at", 7, 0)
///     .set_sort("released_at", SortOrder::Desc)
///     .set_limit(10);
///
/// let request = query.build().unwrap();
/// assert_eq!(request["size"], 10);
/// assert_eq!(request["sort"][0]["_score"]["order"], "desc");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    offset: usize,
    limit: usize,
    query: ClauseSet,
    filters: ClauseSet,
    sorts: Vec<(String, SortOrder)>,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
            query: ClauseSet::default(),
            filters: ClauseSet::default(),
            sorts: Vec::new(),
        }
    }
}

impl QueryBuilder {
    /// Create an empty builder with default pagination.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an optional, analyzed match clause with a boost of 1.0.
    pub fn add_match(&mut self, field: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.add_match_with(field, value, MatchOptions::default())
    }

    /// Add a match clause to `must` or `should`, as `match` or `match_phrase`.
    pub fn add_match_with(
        &mut self,
        field: impl Into<String>,
        value: impl Into<String>,
        options: MatchOptions,
    ) -> &mut Self {
        self.query
            .push(options.occurrence(), Self::match_clause(field, value, &options));
        self
    }

    /// Add an optional filter clause.
    ///
    /// Filters restrict the result set without contributing to the relevance score.
    pub fn add_filter(&mut self, field: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.add_filter_with(field, value, MatchOptions::default())
    }

    /// Add a filter clause with explicit options.
    pub fn add_filter_with(
        &mut self,
        field: impl Into<String>,
        value: impl Into<String>,
        options: MatchOptions,
    ) -> &mut Self {
        self.filters
            .push(options.occurrence(), Self::match_clause(field, value, &options));
        self
    }

    /// Require `field` to lie in `[low, high]` (inclusive).
    pub fn set_range(&mut self, field: impl Into<String>, low: i64, high: i64) -> &mut Self {
        self.query.push(
            Occurrence::Must,
            QueryClause::Range {
                field: field.into(),
                gte: json!(low),
                lte: json!(high),
            },
        );
        self
    }

    /// Require `field` to fall within a day-rounded window relative to now.
    ///
    /// The window starts `from_days` days ago and ends `to_days` days ago;
    /// `to_days == 0` means "up to today".
    pub fn set_date_range_in_days(
        &mut self,
        field: impl Into<String>,
        from_days: u32,
        to_days: u32,
    ) -> &mut Self {
        let end = if to_days == 0 {
            "now/d".to_string()
        } else {
            format!("now-{}d/d", to_days)
        };
        self.query.push(
            Occurrence::Must,
            QueryClause::Range {
                field: field.into(),
                gte: json!(format!("now-{}d/d", from_days)),
                lte: json!(end),
            },
        );
        self
    }

    /// Append a sort after the implicit relevance sort.
    pub fn set_sort(&mut self, field: impl Into<String>, order: SortOrder) -> &mut Self {
        self.sorts.push((field.into(), order));
        self
    }

    pub fn set_offset(&mut self, offset: usize) -> &mut Self {
        self.offset = offset;
        self
    }

    pub fn set_limit(&mut self, limit: usize) -> &mut Self {
        self.limit = limit;
        self
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn has_query_clauses(&self) -> bool {
        !self.query.is_empty()
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    pub fn has_sorts(&self) -> bool {
        !self.sorts.is_empty()
    }

    /// Render the accumulated state into a search request body.
    ///
    /// Does not modify the builder.
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` - `{ from, size, query?, sort }`
    /// * `Err(SearchIndexError::ValidationError)` - If the limit is zero or a clause is invalid
    pub fn build(&self) -> Result<Value, SearchIndexError> {
        if self.limit == 0 {
            return Err(SearchIndexError::validation(
                "Limit must be greater than zero",
            ));
        }
        self.query.validate()?;
        self.filters.validate()?;
        for (field, _) in &self.sorts {
            if field.trim().is_empty() {
                return Err(SearchIndexError::validation("Sort field cannot be empty"));
            }
        }

        let mut request = Map::new();
        request.insert("from".to_string(), json!(self.offset));
        request.insert("size".to_string(), json!(self.limit));

        if self.has_query_clauses() || self.has_filters() {
            let mut bool_query = self.query.to_json();
            if self.has_filters() {
                bool_query.insert(
                    "filter".to_string(),
                    json!({ "bool": Value::Object(self.filters.to_json()) }),
                );
            }
            request.insert(
                "query".to_string(),
                json!({ "bool": Value::Object(bool_query) }),
            );
        }

        request.insert("sort".to_string(), Value::Array(self.render_sorts()));

        Ok(Value::Object(request))
    }

    /// Render the request, then reset the builder to its defaults.
    ///
    /// The builder is reset even when rendering fails.
    pub fn take_request(&mut self) -> Result<Value, SearchIndexError> {
        let request = self.build();
        self.reset();
        request
    }

    /// Restore the defaults: offset 0, limit 50, no clauses, no sorts.
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }

    fn render_sorts(&self) -> Vec<Value> {
        let mut sorts = vec![json!({ "_score": { "order": "desc" } })];
        for (field, order) in &self.sorts {
            let mut clause = Map::new();
            clause.insert(field.clone(), json!({ "order": order.as_str() }));
            sorts.push(Value::Object(clause));
        }
        sorts
    }

    fn match_clause(
        field: impl Into<String>,
        value: impl Into<String>,
        options: &MatchOptions,
    ) -> QueryClause {
        QueryClause::Match {
            field: field.into(),
            query: value.into(),
            boost: options.boost,
            kind: options.kind(),
        }
    }
}
