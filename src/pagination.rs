use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 100;

/// Raw query string for list endpoints. Everything is optional and lenient.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub all: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    Title,
    CreatedAt,
    UpdatedAt,
}

impl SortColumn {
    /// Unknown names fall back to `created_at`, so the value is safe to splice into SQL.
    pub fn parse(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some("id") => SortColumn::Id,
            Some("title") => SortColumn::Title,
            Some("updated_at") | Some("updatedAt") => SortColumn::UpdatedAt,
            _ => SortColumn::CreatedAt,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::Title => "title",
            SortColumn::CreatedAt => "created_at",
            SortColumn::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub per_page: i64,
    pub sort_by: SortColumn,
    pub sort_order: SortOrder,
    pub all: bool,
}

impl PageParams {
    pub fn from_query(query: &PageQuery) -> Self {
        let positive = |raw: Option<&String>, default: i64| {
            raw.and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };

        let sort_order = match query.sort_order.as_deref().map(str::to_lowercase).as_deref() {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        };

        Self {
            page: positive(query.page.as_ref(), 1),
            per_page: positive(query.per_page.as_ref(), DEFAULT_PER_PAGE).min(MAX_PER_PAGE),
            sort_by: SortColumn::parse(query.sort_by.as_deref()),
            sort_order,
            all: query
                .all
                .as_deref()
                .is_some_and(|v| v.eq_ignore_ascii_case("true")),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn order_clause(&self) -> String {
        format!("{} {}", self.sort_by.as_sql(), self.sort_order.as_sql())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub has_next: bool,
    pub has_previous: bool,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl PageMeta {
    pub fn build(total: i64, params: &PageParams) -> Self {
        if params.all {
            return Self {
                has_next: false,
                has_previous: false,
                page: 1,
                per_page: total,
                total,
            };
        }

        Self {
            has_next: total > params.page.saturating_mul(params.per_page),
            has_previous: params.page > 1 && params.offset() < total,
            page: params.page,
            per_page: params.per_page,
            total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}
