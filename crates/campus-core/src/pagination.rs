//! Client-side pagination over a filtered view.
//!
//! Pages are 1-based. The paginator never adjusts the caller's page: when a
//! view shrinks under the current page, the owner of the page number must
//! reset it (see [`needs_reset`]). An out-of-range page yields no items.

use crate::defaults::PAGER_WIDTH;

/// One page of a view plus the metadata a pager needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    /// Index of the first item of this page within the view.
    pub start_index: usize,
    pub total_items: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    /// Page numbers to show in the pager control.
    pub fn page_numbers(&self) -> Vec<usize> {
        page_numbers(self.total_pages, self.current_page)
    }

    /// "Showing X–Y of Z" summary for this page.
    pub fn showing(&self) -> Showing {
        Showing::new(self.start_index, self.items.len(), self.total_items)
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// `max(1, ceil(len / page_size))`. A page size of 0 is treated as 1.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// Slice `view` into the page `current_page` (1-based; 0 is treated as 1).
pub fn paginate<T: Clone>(view: &[T], page_size: usize, current_page: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let current_page = current_page.max(1);
    let start_index = (current_page - 1).saturating_mul(page_size);
    let items = if start_index < view.len() {
        let end = start_index.saturating_add(page_size).min(view.len());
        view[start_index..end].to_vec()
    } else {
        Vec::new()
    };

    Page {
        items,
        current_page,
        total_pages: total_pages(view.len(), page_size),
        start_index,
        total_items: view.len(),
        page_size,
    }
}

/// Page numbers for a pager of width five.
///
/// All pages when there are at most five; the first five while the current
/// page is within the first three; the last five while it is within the last
/// three; otherwise the current page with two neighbours on each side.
pub fn page_numbers(total_pages: usize, current_page: usize) -> Vec<usize> {
    let width = PAGER_WIDTH;
    let half = width / 2;
    if total_pages <= width {
        (1..=total_pages).collect()
    } else if current_page <= half + 1 {
        (1..=width).collect()
    } else if current_page >= total_pages - half {
        (total_pages - width + 1..=total_pages).collect()
    } else {
        (current_page - half..=current_page + half).collect()
    }
}

/// True when `current_page` no longer exists for a view with `total_pages`.
pub fn needs_reset(total_pages: usize, current_page: usize) -> bool {
    current_page > total_pages || current_page == 0
}

/// "Showing X–Y of Z", 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Showing {
    pub from: usize,
    pub to: usize,
    pub total: usize,
}

impl Showing {
    pub fn new(start_index: usize, page_len: usize, total: usize) -> Self {
        if page_len == 0 {
            return Self {
                from: 0,
                to: 0,
                total,
            };
        }
        Self {
            from: start_index + 1,
            to: start_index + page_len,
            total,
        }
    }
}

impl std::fmt::Display for Showing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Showing {}–{} of {}", self.from, self.to, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_formula() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(5, 0), 5);
    }

    #[test]
    fn test_pages_partition_the_view() {
        for len in 0..40usize {
            for size in 1..12usize {
                let view: Vec<usize> = (0..len).collect();
                let pages = total_pages(len, size);
                assert_eq!(pages, std::cmp::max(1, len.div_ceil(size)));

                let joined: Vec<usize> = (1..=pages)
                    .flat_map(|p| paginate(&view, size, p).items)
                    .collect();
                assert_eq!(joined, view, "len={len} size={size}");
            }
        }
    }

    #[test]
    fn test_last_page_is_partial() {
        let view: Vec<u32> = (1..=25).collect();
        let page = paginate(&view, 10, 3);
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.start_index, 20);
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn test_out_of_range_page_is_empty_not_reset() {
        let view: Vec<u32> = (1..=6).collect();
        let page = paginate(&view, 10, 3);
        assert!(page.items.is_empty());
        assert_eq!(page.current_page, 3);
        assert_eq!(page.total_pages, 1);
        assert!(needs_reset(page.total_pages, page.current_page));
    }

    #[test]
    fn test_page_window_tie_breaks() {
        assert_eq!(page_numbers(12, 1), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_numbers(12, 12), vec![8, 9, 10, 11, 12]);
        assert_eq!(page_numbers(12, 6), vec![4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_page_window_edges() {
        assert_eq!(page_numbers(3, 2), vec![1, 2, 3]);
        assert_eq!(page_numbers(5, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_numbers(12, 3), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_numbers(12, 4), vec![2, 3, 4, 5, 6]);
        assert_eq!(page_numbers(12, 10), vec![8, 9, 10, 11, 12]);
        assert_eq!(page_numbers(12, 9), vec![7, 8, 9, 10, 11]);
        assert_eq!(page_numbers(6, 4), vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_showing_summary() {
        let view: Vec<u32> = (1..=25).collect();
        assert_eq!(paginate(&view, 10, 1).showing().to_string(), "Showing 1–10 of 25");
        assert_eq!(paginate(&view, 10, 3).showing().to_string(), "Showing 21–25 of 25");

        let empty: Vec<u32> = Vec::new();
        assert_eq!(paginate(&empty, 10, 1).showing().to_string(), "Showing 0–0 of 0");
    }

    #[test]
    fn test_zero_page_treated_as_first() {
        let view = vec!['a', 'b', 'c'];
        let page = paginate(&view, 2, 0);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.items, vec!['a', 'b']);
    }
}
