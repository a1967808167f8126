use serde::Deserialize;

/// Raw `GET /comments` query string. Values stay strings so that a malformed
/// number can be reported with the parameter name.
#[derive(Debug, Deserialize, Default)]
pub struct CommentsQuery {
    pub parent: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// A paginated request over the closure below `parent_id`.
///
/// `parent_id == None` pages over every top-level comment and its replies.
/// `limit == 0` means "use the caller's default page size".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub parent_id: Option<i64>,
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Resolves the `(limit, offset)` window for this request.
    ///
    /// Pages below 1 are treated as page 1.
    pub fn window(&self, default_limit: i64) -> (i64, i64) {
        let limit = if self.limit == 0 {
            default_limit
        } else {
            self.limit
        };
        let page = self.page.max(1);
        (limit, (page - 1).saturating_mul(limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page: i64, limit: i64) -> Pagination {
        Pagination {
            parent_id: None,
            page,
            limit,
        }
    }

    #[test]
    fn second_page_skips_one_page() {
        assert_eq!(page(2, 10).window(25), (10, 10));
    }

    #[test]
    fn zero_limit_uses_default() {
        assert_eq!(page(3, 0).window(7), (7, 14));
    }

    #[test]
    fn non_positive_pages_clamp_to_first() {
        assert_eq!(page(0, 5).window(10), (5, 0));
        assert_eq!(page(-4, 5).window(10), (5, 0));
    }

    #[test]
    fn huge_page_does_not_overflow() {
        assert_eq!(page(i64::MAX, 10).window(10), (10, i64::MAX));
    }
}
