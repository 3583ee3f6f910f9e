//! Page tracking for list endpoints.
//!
//! The houses API returns no total count alongside a page, so the end of the
//! list is only known once an empty page comes back.

/// Cursor over a paginated collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub loading_first_time: bool,
    pub reached_last_page: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new()
    }
}

impl Pagination {
    pub const FIRST_PAGE: u32 = 1;

    pub fn new() -> Self {
        Self {
            current_page: Self::FIRST_PAGE,
            loading_first_time: true,
            reached_last_page: false,
        }
    }

    /// Back to page one, as on a pull-to-refresh.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Records a successful page holding `item_count` items.
    pub fn advance(&mut self, item_count: usize) {
        self.current_page = self.current_page.saturating_add(1);
        self.reached_last_page = item_count == 0;
        self.loading_first_time = false;
    }

    /// Whether another `fetch(false)` would hit the network.
    pub fn has_more(&self) -> bool {
        !self.reached_last_page
    }
}
