//! Pagination window for search results

/// Maximum rows a single search may return
pub const MAX_LIMIT: u32 = 500;

/// LIMIT/OFFSET window applied after ordering.
///
/// An offset only takes effect together with a limit; without a limit the
/// full ordered result is returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    limit: Option<u32>,
    offset: u32,
}

impl Pagination {
    /// Create a pagination window.
    ///
    /// - A limit of 0 means "no limit"
    /// - The limit is clamped to 500
    /// - The offset is dropped when there is no limit
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        match limit.filter(|l| *l > 0) {
            Some(limit) => Self {
                limit: Some(limit.min(MAX_LIMIT)),
                offset: offset.unwrap_or(0),
            },
            None => Self::unbounded(),
        }
    }

    /// No window: every matching row.
    pub fn unbounded() -> Self {
        Self {
            limit: None,
            offset: 0,
        }
    }

    /// SQL LIMIT value, if any.
    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// SQL OFFSET value, if it has an effect.
    pub fn offset(&self) -> Option<u32> {
        self.limit.and(Some(self.offset)).filter(|o| *o > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_and_offset() {
        let p = Pagination::new(Some(2), Some(2));
        assert_eq!(p.limit(), Some(2));
        assert_eq!(p.offset(), Some(2));
    }

    #[test]
    fn offset_without_limit_has_no_effect() {
        let p = Pagination::new(None, Some(10));
        assert_eq!(p.limit(), None);
        assert_eq!(p.offset(), None);
        assert_eq!(p, Pagination::unbounded());
    }

    #[test]
    fn zero_limit_is_unbounded() {
        assert_eq!(Pagination::new(Some(0), Some(3)), Pagination::unbounded());
    }

    #[test]
    fn zero_offset_is_omitted() {
        assert_eq!(Pagination::new(Some(5), Some(0)).offset(), None);
    }

    #[test]
    fn clamps_limit() {
        assert_eq!(Pagination::new(Some(10_000), None).limit(), Some(MAX_LIMIT));
    }
}
