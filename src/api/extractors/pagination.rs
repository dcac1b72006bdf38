use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;

use crate::error::AppError;

pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 1000;

/// Query keys consumed by [`Pagination`], excluded from column filters.
pub const PAGINATION_KEYS: &[&str] = &["skip", "limit"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub skip: i64,
    pub limit: i64,
}

#[derive(Deserialize)]
struct PageParams {
    skip: Option<i64>,
    limit: Option<i64>,
}

impl Pagination {
    pub fn new(skip: Option<i64>, limit: Option<i64>) -> Result<Self, AppError> {
        let skip = skip.unwrap_or(0);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if skip < 0 {
            return Err(AppError::Validation("skip must be zero or greater".into()));
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::Validation(format!("limit must be between 1 and {}", MAX_LIMIT)));
        }
        Ok(Self { skip, limit })
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Pagination {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PageParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        Pagination::new(params.skip, params.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_absent() {
        assert_eq!(Pagination::new(None, None).unwrap(), Pagination { skip: 0, limit: 100 });
    }

    #[test]
    fn bounds_are_enforced() {
        assert!(Pagination::new(Some(-1), None).is_err());
        assert!(Pagination::new(None, Some(0)).is_err());
        assert!(Pagination::new(None, Some(1001)).is_err());
        assert!(Pagination::new(Some(5), Some(1000)).is_ok());
    }
}
