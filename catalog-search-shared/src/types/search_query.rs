//! Query value types shared by the query builder and the record index.

use serde::{Deserialize, Serialize};

/// Direction of an explicit sort clause.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending order. This is the default.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortOrder {
    /// The keyword the engine expects in a sort clause.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Page-based pagination.
///
/// `per_page` is authoritative for the page size; pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub per_page: usize,
    pub page: usize,
}

impl Pagination {
    pub fn new(per_page: usize, page: usize) -> Self {
        Self { per_page, page }
    }

    /// Validate the pagination parameters.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.per_page == 0 {
            return Err("per_page must be greater than zero".to_string());
        }
        if self.page == 0 {
            return Err("page numbers start at 1".to_string());
        }
        if (self.page - 1).checked_mul(self.per_page).is_none() {
            return Err(format!(
                "page {} of {} hits is beyond the addressable range",
                self.page, self.per_page
            ));
        }
        Ok(())
    }

    /// Offset of the first hit on this page. Saturates when `validate` would fail.
    pub fn from(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// Number of hits on this page.
    pub fn size(&self) -> usize {
        self.per_page
    }
}
