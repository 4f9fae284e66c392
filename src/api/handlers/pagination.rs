//! Page/limit resolution for list endpoints.
//!
//! Bad input never fails a request: a non-numeric or zero `page` becomes 1 and
//! any `limit` outside [`ALLOWED_LIMITS`] becomes the configured default.

use serde::Serialize;

pub const ALLOWED_LIMITS: [u32; 4] = [5, 10, 20, 50];
pub const DEFAULT_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    default_limit: u32,
}

impl PaginationConfig {
    /// # Errors
    /// Returns an error if `default_limit` is not one of [`ALLOWED_LIMITS`].
    pub fn new(default_limit: u32) -> Result<Self, String> {
        if ALLOWED_LIMITS.contains(&default_limit) {
            Ok(Self { default_limit })
        } else {
            Err(format!(
                "page limit must be one of {ALLOWED_LIMITS:?}, got {default_limit}"
            ))
        }
    }

    #[must_use]
    pub const fn default_limit(&self) -> u32 {
        self.default_limit
    }

    /// Resolve raw query values into a page window.
    #[must_use]
    pub fn resolve(&self, page: Option<&str>, limit: Option<&str>) -> Page {
        let page = page
            .and_then(|value| value.trim().parse::<u32>().ok())
            .filter(|value| *value >= 1)
            .unwrap_or(1);
        let limit = limit
            .and_then(|value| value.trim().parse::<u32>().ok())
            .filter(|value| ALLOWED_LIMITS.contains(value))
            .unwrap_or(self.default_limit);
        Page { page, limit }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }

    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

impl<T> Paginated<T> {
    #[must_use]
    pub fn new(items: Vec<T>, page: Page, total: i64) -> Self {
        Self {
            items,
            page: page.page,
            limit: page.limit,
            total,
        }
    }
}
