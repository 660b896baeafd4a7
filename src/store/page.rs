use serde::{Deserialize, Serialize};

/// One page of a cursor-paginated listing.
///
/// `items` keeps backend key order. A present `next_cursor` means more
/// entities exist after this page; `None` means the listing is complete.
/// Pagination is not snapshot-isolated: concurrent creates and deletes
/// may or may not show up in later pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}
