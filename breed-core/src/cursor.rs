//! Page planning for the paginated breed listing.
//!
//! The persisted cursor holds the index of the last page that was fetched
//! and stored. The next request always asks for `cursor + 1`, and the cursor
//! is only moved to that page once the results are persisted.

use breed_types::PageCursor;

/// Number of breeds requested per page.
pub const PAGE_SIZE: u32 = 10;

/// Key under which the last fetched page is persisted.
pub const LAST_PAGE_KEY: &str = "last_page";

/// A single page request against the remote listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page size.
    pub limit: u32,
    /// Zero-based page index.
    pub page: i64,
}

impl PageRequest {
    /// Plan the request that follows the given cursor.
    pub fn after(cursor: PageCursor) -> Self {
        Self {
            limit: PAGE_SIZE,
            page: cursor.next().value(),
        }
    }

    /// The cursor to persist once this page has been stored.
    pub fn completed_cursor(&self) -> PageCursor {
        PageCursor::new(self.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_request_is_page_zero() {
        let req = PageRequest::after(PageCursor::NONE);
        assert_eq!(req, PageRequest { limit: 10, page: 0 });
    }

    #[test]
    fn request_follows_cursor() {
        let req = PageRequest::after(PageCursor::new(4));
        assert_eq!(req.page, 5);
        assert_eq!(req.limit, PAGE_SIZE);
    }

    #[test]
    fn completed_cursor_is_requested_page() {
        let req = PageRequest::after(PageCursor::new(2));
        assert_eq!(req.completed_cursor(), PageCursor::new(3));
    }
}
