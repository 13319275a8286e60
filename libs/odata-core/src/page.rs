use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageInfo {
    /// Opaque continuation token handed back by the server, if more items exist.
    pub next_cursor: Option<String>,
    pub limit: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    /// Create a new page with items and page info
    pub fn new(items: Vec<T>, page_info: PageInfo) -> Self {
        Self { items, page_info }
    }

    pub fn has_more(&self) -> bool {
        self.page_info.next_cursor.is_some()
    }
}

/// Request for one page: the first page has no cursor, later pages pass the
/// cursor from the previous `PageInfo`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub cursor: Option<String>,
    pub limit: u64,
}

impl PageRequest {
    pub fn first(limit: u64) -> Self {
        Self {
            cursor: None,
            limit,
        }
    }

    /// The request following `page`, or `None` when `page` was the last one.
    pub fn after<T>(page: &Page<T>) -> Option<Self> {
        page.page_info.next_cursor.as_ref().map(|c| Self {
            cursor: Some(c.clone()),
            limit: page.page_info.limit,
        })
    }
}
