use serde::Serialize;

/// Position of one page within an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// 1-based page number.
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub page_size: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Pagination {
    /// Locate page `number`; `None` when the page does not exist.
    ///
    /// Page 1 always exists, even for an empty result set.
    pub fn locate(number: u64, total: u64, page_size: u64) -> Option<Self> {
        let num_pages = total.div_ceil(page_size).max(1);
        if number == 0 || number > num_pages {
            return None;
        }
        Some(Self {
            number,
            num_pages,
            total,
            page_size,
            has_next: number < num_pages,
            has_previous: number > 1,
        })
    }

    /// Rows to skip before this page.
    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.page_size
    }
}
