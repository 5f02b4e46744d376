//! Query filters and page-window computation shared by the count and list queries.

use serde::Serialize;

use crate::error::ValidationError;

/// Narrowing criteria for listing courses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilters {
    pub name: Option<String>,
}

impl CourseFilters {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()) }
    }

    /// `LIKE` pattern for a case-insensitive substring match on `name`,
    /// or `None` when no name predicate applies.
    ///
    /// `%`, `_` and `\` in the input are escaped; the query must use `ESCAPE '\'`.
    pub fn name_pattern(&self) -> Option<String> {
        let name = self.name.as_deref().filter(|n| !n.is_empty())?;
        let mut pattern = String::with_capacity(name.len() + 2);
        pattern.push('%');
        for c in search_key(name).chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        Some(pattern)
    }
}

/// Case-folded form of a course name, stored in `name_search` and used to
/// build filter patterns so both sides fold the same way.
pub fn search_key(name: &str) -> String {
    name.to_lowercase()
}

/// Page-size policy, validated once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageConfig {
    default_limit: i64,
    max_limit: i64,
}

impl PageConfig {
    /// Parses the externally supplied default and maximum page sizes.
    pub fn parse(default_limit: &str, max_limit: &str) -> Result<Self, ValidationError> {
        let default = parse_positive(default_limit)
            .ok_or_else(|| ValidationError::InvalidDefaultLimit(default_limit.to_string()))?;
        let max = parse_positive(max_limit)
            .ok_or_else(|| ValidationError::InvalidMaxLimit(max_limit.to_string()))?;

        Ok(Self {
            default_limit: default.min(max),
            max_limit: max,
        })
    }

    pub fn default_limit(&self) -> i64 {
        self.default_limit
    }

    pub fn max_limit(&self) -> i64 {
        self.max_limit
    }
}

fn parse_positive(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|v| *v > 0)
}

/// Pagination metadata returned with a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Meta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub page_count: i64,
}

impl Meta {
    /// Computes the page window for `page`/`limit` over `total` matching rows.
    ///
    /// `limit <= 0` falls back to the configured default and anything above the
    /// configured maximum is capped. `page <= 0` is page 1.
    pub fn new(page: i64, limit: i64, total: i64, config: &PageConfig) -> Self {
        let limit = if limit <= 0 {
            config.default_limit
        } else {
            limit.min(config.max_limit)
        };
        let page = page.max(1);
        let total = total.max(0);
        let page_count = total / limit + i64::from(total % limit != 0);

        Self {
            page,
            limit,
            total,
            page_count,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }
}
