//! Pagination response models.

use serde::Serialize;

use crate::models::Pagination;

/// Paginated list response
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    pub success: bool,
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, pagination: Pagination) -> Self {
        Self {
            success: true,
            data,
            total,
            page: pagination.page,
            page_size: pagination.page_size,
            total_pages: pagination.total_pages(total),
        }
    }
}

/// Page of users, returned inside the `data` envelope
#[derive(Debug, Serialize)]
pub struct UserPage<T: Serialize> {
    pub total: u64,
    pub page: u64,
    pub size: u64,
    pub pages: u64,
    pub list: Vec<T>,
}
