//! Page arithmetic for list output.

/// Number of pages needed for `count` items at `page_size` per page.
///
/// # Examples
/// ```
/// use got_core::utils::data::total_pages;
/// assert_eq!(total_pages(444, 20), 23);
/// assert_eq!(total_pages(0, 20), 0);
/// ```
pub fn total_pages(count: u32, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

/// 1-based positions of the first and last item on `page`, given how many
/// items it actually holds. `None` for an empty page.
pub fn page_span(page: u32, page_size: u32, item_count: usize) -> Option<(u64, u64)> {
    if item_count == 0 || page == 0 {
        return None;
    }
    let start = u64::from(page - 1) * u64::from(page_size) + 1;
    Some((start, start + item_count as u64 - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(10, 0), 0);
    }

    #[test]
    fn test_page_span() {
        assert_eq!(page_span(1, 20, 20), Some((1, 20)));
        assert_eq!(page_span(3, 20, 4), Some((41, 44)));
        assert_eq!(page_span(2, 20, 0), None);
        assert_eq!(page_span(0, 20, 5), None);
    }
}
