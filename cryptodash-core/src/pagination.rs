use crate::error::DashError;
use serde::{Deserialize, Serialize};

/// Allowed page sizes for a list. The first entry is the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSizes(Vec<usize>);

impl PageSizes {
    pub fn new(sizes: Vec<usize>) -> Result<Self, DashError> {
        if sizes.is_empty() {
            return Err(DashError::Config(
                "at least one page size is required".to_string(),
            ));
        }
        if sizes.contains(&0) {
            return Err(DashError::Config("page size must be positive".to_string()));
        }
        Ok(PageSizes(sizes))
    }

    /// Single-size list, e.g. the home page top-10 table.
    pub fn fixed(size: usize) -> Self {
        PageSizes(vec![size.max(1)])
    }

    pub fn default_size(&self) -> usize {
        self.0[0]
    }

    pub fn contains(&self, size: usize) -> bool {
        self.0.contains(&size)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

impl Default for PageSizes {
    fn default() -> Self {
        PageSizes(vec![10, 15, 20])
    }
}

/// The client's current paging intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub page_index: usize,
    pub page_size: usize,
}

impl ListQuery {
    pub fn new(sizes: &PageSizes) -> Self {
        Self {
            page_index: 0,
            page_size: sizes.default_size(),
        }
    }
}

/// One request as sent to a data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page_index: usize,
    pub page_size: usize,
    pub sort_by: String,
}

impl PageRequest {
    pub fn from_query(query: &ListQuery, sort_by: &str) -> Self {
        Self {
            page_index: query.page_index,
            page_size: query.page_size,
            sort_by: sort_by.to_string(),
        }
    }
}

/// Wire shape of a paginated list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub total_elements: usize,
    pub total_pages: usize,
}

/// One fetched slice of a remote collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_index: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Build a page from a response to `request`. Totals are taken as reported.
    pub fn from_response(request: &PageRequest, response: PageResponse<T>) -> Self {
        let mut items = response.content;
        if items.len() > request.page_size {
            log::warn!(
                "data source returned {} items for page size {}, truncating",
                items.len(),
                request.page_size
            );
            items.truncate(request.page_size);
        }

        Self {
            items,
            page_index: request.page_index,
            page_size: request.page_size,
            total_items: response.total_elements,
            total_pages: response.total_pages,
        }
    }
}

/// Navigation state for a page of `total_items` records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page_index: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl PageWindow {
    pub fn can_go_prev(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_go_next(&self) -> bool {
        self.page_index + 1 < self.total_pages
    }

    /// Zero-based, end-exclusive range of rows covered by this page.
    pub fn row_range(&self) -> (usize, usize) {
        let start = self.page_index.saturating_mul(self.page_size).min(self.total_items);
        let end = start.saturating_add(self.page_size).min(self.total_items);
        (start, end)
    }

    /// "11-20 of 25" style label.
    pub fn displayed_rows_label(&self) -> String {
        let (start, end) = self.row_range();
        let (from, to) = if end > start { (start + 1, end) } else { (0, 0) };
        format!("{}-{} of {}", from, to, self.total_items)
    }
}
