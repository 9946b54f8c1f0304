use sea_orm::{
    DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait, QuerySelect, Select,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

pub const DEFAULT_PAGE_SIZE: u64 = 25;
pub const MAX_PAGE_SIZE: u64 = 100;

/// `?page=&limit=` as sent by the admin frontend. Pages are 1-based.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PageQuery {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> ApiResult<u64> {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if limit == 0 {
            return Err(ApiError::validation("limit must be positive"));
        }
        if limit > MAX_PAGE_SIZE {
            return Err(ApiError::validation(format!(
                "limit cannot exceed {}",
                MAX_PAGE_SIZE
            )));
        }
        Ok(limit)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        Self {
            data,
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

/// Counts the filtered query, then fetches one page of it.
pub async fn fetch_page<E>(
    db: &DatabaseConnection,
    query: Select<E>,
    page: &PageQuery,
) -> ApiResult<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
{
    let page_no = page.page();
    let limit = page.limit()?;
    let total = query.clone().count(db).await?;
    let rows = query
        .limit(limit)
        .offset((page_no - 1) * limit)
        .all(db)
        .await?;
    Ok(Page::new(rows, total, page_no, limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        let page = Page::new(vec![1, 2, 3], 7, 1, 3);
        assert_eq!(page.total_pages, 3);
        let page = Page::new(Vec::<i32>::new(), 0, 1, 25);
        assert_eq!(page.total_pages, 0);
        let page = Page::new(vec![1], 100, 4, 25);
        assert_eq!(page.total_pages, 4);
    }

    #[test]
    fn limit_is_bounded() {
        let q = PageQuery {
            page: None,
            limit: Some(500),
        };
        assert!(q.limit().is_err());
        let q = PageQuery {
            page: None,
            limit: Some(0),
        };
        assert!(q.limit().is_err());
        let q = PageQuery::default();
        assert_eq!(q.limit().unwrap(), DEFAULT_PAGE_SIZE);
        assert_eq!(q.page(), 1);
    }
}
