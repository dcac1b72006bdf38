use serde::Serialize;

use crate::api::extractors::pagination::Pagination;

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub size: usize,
    pub pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: Pagination) -> Self {
        let limit = pagination.limit.max(1);
        Self {
            size: items.len(),
            items,
            total,
            page: pagination.skip / limit + 1,
            pages: (total + limit - 1) / limit,
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
