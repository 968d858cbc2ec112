//! The indexable contract.
//!
//! Any record that can be written into a search index implements [`Indexable`].
//! The index name is never part of the record: callers pass it explicitly
//! alongside the records they want indexed.

use serde_json::Value;

/// A record that can be stored as a document in the search index.
///
/// Implementors provide the identifier under which the document is stored and
/// the JSON body that gets indexed. Types that want free-text searches to be
/// restricted to particular fields override [`Indexable::searchable_fields`];
/// the default is the empty set, which means "search every field".
///
/// # Example
///
/// ```
/// use catalog_search_shared::Indexable;
/// use serde_json::{json, Value};
///
/// struct Movie {
///     id: u64,
///     title: String,
/// }
///
/// impl Indexable for Movie {
///     fn document_id(&self) -> String {
///         self.id.to_string()
///     }
///
///     fn to_document(&self) -> Result<Value, serde_json::Error> {
///         Ok(json!({ "title": self.title }))
///     }
///
///     fn searchable_fields() -> &'static [&'static str] {
///         &["title"]
///     }
/// }
///
/// let movie = Movie { id: 7, title: "Dune".to_string() };
/// assert_eq!(movie.document_id(), "7");
/// assert_eq!(Movie::searchable_fields(), &["title"]);
/// ```
pub trait Indexable {
    /// Identifier of the document in the index.
    fn document_id(&self) -> String;

    /// The JSON body stored in the index.
    fn to_document(&self) -> Result<Value, serde_json::Error>;

    /// Fields used by free-text lookups. Empty means all fields.
    fn searchable_fields() -> &'static [&'static str]
    where
        Self: Sized,
    {
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Plain {
        id: u32,
    }

    impl Indexable for Plain {
        fn document_id(&self) -> String {
            format!("plain-{}", self.id)
        }

        fn to_document(&self) -> Result<Value, serde_json::Error> {
            Ok(json!({ "id": self.id }))
        }
    }

    #[test]
    fn test_default_searchable_fields_is_empty() {
        assert!(Plain::searchable_fields().is_empty());
    }

    #[test]
    fn test_document_id_and_body() {
        let record = Plain { id: 3 };
        assert_eq!(record.document_id(), "plain-3");
        assert_eq!(record.to_document().unwrap(), json!({ "id": 3 }));
    }
}
