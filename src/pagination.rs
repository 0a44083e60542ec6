use serde::{Deserialize, Serialize};

use crate::config::PaginationConfig;
use crate::error::ApiError;

/// Raw pagination query parameters as they arrive on the wire.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// Validated pagination parameters. `page` is 1-based; `size` is bounded by
/// the configured maximum.
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub page: i64,
    pub size: i64,
}

impl PageParams {
    pub fn from_query(query: PageQuery, config: &PaginationConfig) -> Result<Self, ApiError> {
        let page = query.page.unwrap_or(1);
        let size = query.size.unwrap_or(config.default_size);

        if page < 1 {
            return Err(ApiError::bad_request("page must be >= 1"));
        }
        if size < 1 {
            return Err(ApiError::bad_request("size must be >= 1"));
        }

        Ok(Self {
            page,
            size: size.min(config.max_size),
        })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.size
    }
}

/// One page of results plus the totals the frontends paginate with.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub size: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, params: PageParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            size: params.size,
            total_pages: (total + params.size - 1) / params.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PaginationConfig {
        PaginationConfig {
            default_size: 10,
            max_size: 100,
        }
    }

    #[test]
    fn defaults_apply_when_unset() {
        let params = PageParams::from_query(PageQuery::default(), &config()).unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.size, 10);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn size_is_capped_at_max() {
        let query = PageQuery {
            page: Some(3),
            size: Some(500),
        };
        let params = PageParams::from_query(query, &config()).unwrap();
        assert_eq!(params.size, 100);
        assert_eq!(params.offset(), 200);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let query = PageQuery {
            page: Some(0),
            size: None,
        };
        assert!(PageParams::from_query(query, &config()).is_err());

        let query = PageQuery {
            page: None,
            size: Some(-1),
        };
        assert!(PageParams::from_query(query, &config()).is_err());
    }

    #[test]
    fn total_pages_rounds_up() {
        let params = PageParams { page: 1, size: 10 };
        assert_eq!(Paginated::<i32>::new(vec![], 0, params).total_pages, 0);
        assert_eq!(Paginated::<i32>::new(vec![], 10, params).total_pages, 1);
        assert_eq!(Paginated::<i32>::new(vec![], 11, params).total_pages, 2);
        assert_eq!(Paginated::<i32>::new(vec![], 95, params).total_pages, 10);
    }
}
