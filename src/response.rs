//! Response shaping: camelCase JSON bodies and optional list pagination.

use crate::case::value_keys_to_camel_case_recursive;
use crate::error::{AppError, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Query parameters of the list endpoint. A negative `page` returns the full array.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    -1
}

fn default_page_size() -> i64 {
    20
}

impl Default for PageParams {
    fn default() -> Self {
        PageParams {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PageParams {
    pub fn is_paged(&self) -> bool {
        self.page >= 0
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: i64,
    pub page_size: i64,
}

/// Cut one zero-indexed page out of `items`. Pages past the end are empty.
pub fn paginate<T>(items: Vec<T>, params: &PageParams) -> Result<Page<T>, AppError> {
    if params.page_size < 1 {
        return Err(AppError::BadRequest("pageSize must be at least 1".into()));
    }
    let total = items.len();
    let skip = usize::try_from(params.page)
        .unwrap_or(0)
        .saturating_mul(params.page_size as usize);
    let items = items
        .into_iter()
        .skip(skip)
        .take(params.page_size as usize)
        .collect();
    Ok(Page {
        items,
        total,
        page: params.page,
        page_size: params.page_size,
    })
}

/// Serialize a stored value for the client: snake_case storage keys become camelCase.
pub fn to_api_value<S: Serialize>(value: &S) -> Result<Value, AppError> {
    let mut v = serde_json::to_value(value).map_err(StoreError::from)?;
    value_keys_to_camel_case_recursive(&mut v);
    Ok(v)
}
