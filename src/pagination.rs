use std::ops::RangeInclusive;

pub const PAGE_SIZE: usize = 10;

/// 1-based page cursor over an in-memory result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current_page: usize,
    page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    /// One entry per page control, empty when there are no results.
    pub fn page_numbers(&self, total: usize) -> RangeInclusive<usize> {
        1..=self.page_count(total)
    }

    /// Items `[(page - 1) * size, page * size)`, clipped to the list.
    pub fn page_slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.current_page - 1) * self.page_size;
        if start >= items.len() {
            return &[];
        }
        let end = (start + self.page_size).min(items.len());
        &items[start..end]
    }

    /// Moves to `page` if it is one of the rendered controls.
    pub fn jump_to(&mut self, page: usize, total: usize) -> bool {
        if page == 0 || page > self.page_count(total) {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }
}
