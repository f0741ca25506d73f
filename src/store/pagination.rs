use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// Zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: usize,
    pub size: usize,
}

impl Page {
    /// A size of zero falls back to the default, anything above the maximum is clamped.
    pub fn new(page: usize, size: usize) -> Self {
        let size = match size {
            0 => DEFAULT_PAGE_SIZE,
            s => s.min(MAX_PAGE_SIZE),
        };
        Page { page, size }
    }

    /// Clamped to what SQLite accepts as an OFFSET.
    pub fn offset(&self) -> i64 {
        i64::try_from(self.page.saturating_mul(self.size)).unwrap_or(i64::MAX)
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::new(0, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total: usize,
}

impl<T> Paged<T> {
    pub fn new(items: Vec<T>, page: Page, total: usize) -> Self {
        Paged {
            items,
            page: page.page,
            size: page.size,
            total,
        }
    }

    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Paged<U>, E> {
        Ok(Paged {
            items: self.items.into_iter().map(f).collect::<Result<_, _>>()?,
            page: self.page,
            size: self.size,
            total: self.total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_is_defaulted_and_clamped() {
        assert_eq!(Page::new(0, 0).size, DEFAULT_PAGE_SIZE);
        assert_eq!(Page::new(0, 1000).size, MAX_PAGE_SIZE);
        assert_eq!(Page::new(3, 20).offset(), 60);
    }

    #[test]
    fn huge_offset_is_clamped() {
        assert_eq!(Page::new(usize::MAX, 10).offset(), i64::MAX);
        assert_eq!(Page::new(1_000_000_000_000_000_000, 100).offset(), i64::MAX);
    }

    #[test]
    fn try_map_keeps_paging_fields() {
        let paged = Paged::new(vec![1, 2], Page::new(1, 2), 4);
        let mapped: Paged<String> = paged
            .try_map(|i| Ok::<_, ()>(i.to_string()))
            .unwrap();
        assert_eq!(mapped.items, vec!["1", "2"]);
        assert_eq!((mapped.page, mapped.size, mapped.total), (1, 2, 4));
    }
}
