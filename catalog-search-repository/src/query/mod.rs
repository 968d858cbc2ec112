//! Request parameter builder.
//!
//! Translates a small DSL (field matches, ranges, date windows, sort,
//! pagination, filters) into a structured search request.

mod builder;
mod clause;

pub use builder::{QueryBuilder, DEFAULT_LIMIT};
pub use clause::{ClauseSet, MatchKind, MatchOptions, Occurrence, QueryClause};
