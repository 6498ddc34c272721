//! Pagination helpers for list endpoints.

/// Normalized page/limit pair built from untrusted query input.
#[derive(Clone, Copy, Debug)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page, clamped to 1..=100
    pub limit: u32,
}

impl Pagination {
    /// Build from raw query numbers: page floors at 1, limit clamps to 1..=100.
    pub fn clamped(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(1).min(u32::MAX as i64) as u32,
            limit: limit.clamp(1, 100) as u32,
        }
    }

    /// Convert to a 0-based page index plus page size for the store.
    pub fn normalize(self) -> (u64, u64) {
        let page = self.page.max(1);
        let limit = self.limit.clamp(1, 100);
        ((page - 1) as u64, limit as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

#[cfg(test)]
mod tests {
    use super::Pagination;

    #[test]
    fn clamped_floors_page_at_one() {
        let p = Pagination::clamped(-5, 10);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 10);
    }

    #[test]
    fn clamped_bounds_limit() {
        assert_eq!(Pagination::clamped(1, 0).limit, 1);
        assert_eq!(Pagination::clamped(1, 1000).limit, 100);
    }

    #[test]
    fn normalize_is_zero_based() {
        let (idx, per) = Pagination::clamped(3, 10).normalize();
        assert_eq!(idx, 2);
        assert_eq!(per, 10);
    }

    #[test]
    fn default_values_match_list_contract() {
        let d = Pagination::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.limit, 20);
    }
}
