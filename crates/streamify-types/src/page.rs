use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Default page size when a caller does not specify one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// A 1-based page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u64,
    page_size: u64,
}

impl PageRequest {
    /// Create a page request. Both `page` and `page_size` must be at least 1.
    pub fn new(page: u64, page_size: u64) -> Result<Self, TypeError> {
        if page == 0 {
            return Err(TypeError::InvalidPage("page must be at least 1".into()));
        }
        if page_size == 0 {
            return Err(TypeError::InvalidPage("page_size must be at least 1".into()));
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Number of records to skip.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Pagination metadata returned alongside a page of results.
///
/// All fields are zero when the result set is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub current_page: u64,
    pub page_size: u64,
    pub first_page: u64,
    pub last_page: u64,
    pub total_records: u64,
}

impl Metadata {
    pub fn calculate(total_records: u64, request: PageRequest) -> Self {
        if total_records == 0 {
            return Self::default();
        }
        Self {
            current_page: request.page,
            page_size: request.page_size,
            first_page: 1,
            last_page: total_records.div_ceil(request.page_size),
            total_records,
        }
    }
}

/// One page of a listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub metadata: Metadata,
}

impl<T> Page<T> {
    /// Cut `request`'s page out of an already filtered and sorted result set.
    pub fn slice(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(request.page_size).unwrap_or(usize::MAX);
        let items = all.into_iter().skip(offset).take(limit).collect();
        Self {
            items,
            metadata: Metadata::calculate(total, request),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_zero_page_and_size() {
        assert!(PageRequest::new(0, 10).is_err());
        assert!(PageRequest::new(1, 0).is_err());
        assert!(PageRequest::new(1, 1).is_ok());
    }

    #[test]
    fn default_is_first_page_of_ten() {
        let page = PageRequest::default();
        assert_eq!(page.page(), 1);
        assert_eq!(page.page_size(), 10);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn two_pages_over_fifteen_items_are_disjoint_and_complete() {
        let items: Vec<u32> = (1..=15).collect();

        let first = Page::slice(items.clone(), PageRequest::new(1, 10).unwrap());
        let second = Page::slice(items, PageRequest::new(2, 10).unwrap());

        assert_eq!(first.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(second.items, (11..=15).collect::<Vec<_>>());
        assert_eq!(first.metadata.last_page, 2);
        assert_eq!(first.metadata.total_records, 15);
        assert_eq!(second.metadata.current_page, second.metadata.last_page);
    }

    #[test]
    fn empty_result_has_zero_metadata() {
        let page: Page<u32> = Page::slice(Vec::new(), PageRequest::new(3, 5).unwrap());
        assert!(page.is_empty());
        assert_eq!(page.metadata, Metadata::default());
    }

    #[test]
    fn page_past_the_end_is_empty_but_keeps_totals() {
        let page = Page::slice(vec![1, 2, 3], PageRequest::new(5, 2).unwrap());
        assert!(page.is_empty());
        assert_eq!(page.metadata.current_page, 5);
        assert_eq!(page.metadata.last_page, 2);
    }

    #[test]
    fn metadata_serializes_snake_case() {
        let meta = Metadata::calculate(15, PageRequest::new(1, 10).unwrap());
        let value = serde_json::to_value(meta).unwrap();
        assert_eq!(value["current_page"], 1);
        assert_eq!(value["last_page"], 2);
        assert_eq!(value["total_records"], 15);
    }

    proptest! {
        #[test]
        fn walking_all_pages_visits_each_item_once(total in 0usize..200, size in 1u64..25) {
            let items: Vec<usize> = (0..total).collect();
            let last_page = Metadata::calculate(total as u64, PageRequest::new(1, size).unwrap()).last_page;

            let mut seen = Vec::new();
            for page in 1..=last_page.max(1) {
                let slice = Page::slice(items.clone(), PageRequest::new(page, size).unwrap());
                prop_assert!(slice.len() as u64 <= size);
                seen.extend(slice.items);
            }
            prop_assert_eq!(seen, items);
        }
    }
}
