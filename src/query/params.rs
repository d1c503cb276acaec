use std::str::FromStr;

use chrono::{NaiveDate, SecondsFormat};
use serde::{Deserialize, Serialize};

use crate::{
    model::entity::TransactionStatus,
    query::codec::{QsMap, QsSchema, QsValue},
};

static DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(()),
        }
    }
}

/// Per-screen pagination rules: allowed page sizes and sortable columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationOptions {
    rows_per_page: Vec<u32>,
    sortable: Vec<String>,
}

impl PaginationOptions {
    pub fn new<I, S>(rows_per_page: &[u32], sortable: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows_per_page: rows_per_page.to_vec(),
            sortable: sortable.into_iter().map(Into::into).collect(),
        }
    }

    pub fn rows_per_page(&self) -> &[u32] {
        &self.rows_per_page
    }

    pub fn sortable(&self) -> &[String] {
        &self.sortable
    }

    pub fn default_limit(&self) -> u32 {
        self.rows_per_page.first().copied().unwrap_or(10)
    }
}

/// Fields shared by every list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: u32,
    pub limit: u32,
    pub search: String,
    pub sort: Option<String>,
    pub direction: SortDirection,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self::with_limit(10)
    }
}

impl PaginationParams {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            search: String::new(),
            sort: None,
            direction: SortDirection::Desc,
        }
    }

    pub fn sorted_by<S: Into<String>>(mut self, key: S, direction: SortDirection) -> Self {
        self.sort = Some(key.into());
        self.direction = direction;
        self
    }

    /// Clicking a column header: ascending first, then flips.
    pub fn toggle_sort(&mut self, key: &str) {
        let is_asc = self.sort.as_deref() == Some(key) && self.direction == SortDirection::Asc;
        self.sort = Some(key.to_string());
        self.direction = if is_asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
    }

    fn write_map(&self, map: &mut QsMap) {
        map.insert("page", QsValue::from(self.page));
        map.insert("limit", QsValue::from(self.limit));
        map.insert("search", QsValue::from(self.search.as_str()));
        if let Some(sort) = &self.sort {
            map.insert("sort", QsValue::from(sort.as_str()));
        }
        map.insert("direction", QsValue::from(self.direction.as_str()));
    }

    fn read_map(map: &QsMap) -> Self {
        let defaults = Self::default();
        Self {
            page: number(map, "page").map_or(defaults.page, |n| n as u32),
            limit: number(map, "limit").map_or(defaults.limit, |n| n as u32),
            search: text(map, "search").unwrap_or_default(),
            sort: text(map, "sort"),
            direction: text(map, "direction")
                .and_then(|d| d.parse().ok())
                .unwrap_or(defaults.direction),
        }
    }
}

pub fn pagination_schema(options: &PaginationOptions) -> QsSchema {
    let rows = options.rows_per_page.clone();
    let schema = QsSchema::new()
        .number("page", Some(1))
        .validate(|v| v.as_number().is_some_and(|n| n >= 1 && n <= i64::from(u32::MAX)))
        .number("limit", Some(i64::from(options.default_limit())))
        .validate(move |v| {
            v.as_number().is_some_and(|n| {
                if rows.is_empty() {
                    n >= 1 && n <= i64::from(u32::MAX)
                } else {
                    rows.iter().any(|r| i64::from(*r) == n)
                }
            })
        })
        .text("search", Some(""));

    let schema = if options.sortable.is_empty() {
        schema.text("sort", None)
    } else {
        schema.one_of("sort", options.sortable.iter().cloned(), None)
    };

    schema.one_of("direction", ["asc", "desc"], Some("desc"))
}

/// Typed list parameters that can travel through a query string.
pub trait QueryParams: Sized + Clone + PartialEq + Send + Sync + 'static {
    fn schema(options: &PaginationOptions) -> QsSchema;

    fn to_map(&self) -> QsMap;

    fn from_map(map: &QsMap) -> Self;

    /// Pairs sent to the backend: every defined field, page and limit included.
    fn to_request_pairs(&self) -> Vec<(String, String)> {
        self.to_map()
            .into_iter()
            .filter(|(_, v)| !matches!(v, QsValue::Text(s) if s.is_empty()))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn decode(raw: &str, options: &PaginationOptions) -> Self {
        Self::from_map(&Self::schema(options).decode(raw))
    }

    /// URL form: only non-default fields.
    fn encode(&self, options: &PaginationOptions) -> String {
        Self::schema(options).encode(&self.to_map())
    }

    fn sanitize(&self, options: &PaginationOptions) -> Self {
        Self::from_map(&Self::schema(options).sanitize(&self.to_map()))
    }
}

pub trait HasPagination {
    fn pagination(&self) -> &PaginationParams;
    fn pagination_mut(&mut self) -> &mut PaginationParams;
}

impl QueryParams for PaginationParams {
    fn schema(options: &PaginationOptions) -> QsSchema {
        pagination_schema(options)
    }

    fn to_map(&self) -> QsMap {
        let mut map = QsMap::new();
        self.write_map(&mut map);
        map
    }

    fn from_map(map: &QsMap) -> Self {
        Self::read_map(map)
    }
}

impl HasPagination for PaginationParams {
    fn pagination(&self) -> &PaginationParams {
        self
    }

    fn pagination_mut(&mut self) -> &mut PaginationParams {
        self
    }
}

pub type CategoryListParams = PaginationParams;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CourseListParams {
    pub pagination: PaginationParams,
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

impl QueryParams for CourseListParams {
    fn schema(options: &PaginationOptions) -> QsSchema {
        pagination_schema(options)
            .text("category", Some(""))
            .number("minPrice", None)
            .validate(non_negative)
            .number("maxPrice", None)
            .validate(non_negative)
    }

    fn to_map(&self) -> QsMap {
        let mut map = self.pagination.to_map();
        map.insert(
            "category",
            QsValue::from(self.category.clone().unwrap_or_default()),
        );
        if let Some(min) = self.min_price {
            map.insert("minPrice", QsValue::Number(min));
        }
        if let Some(max) = self.max_price {
            map.insert("maxPrice", QsValue::Number(max));
        }
        map
    }

    fn from_map(map: &QsMap) -> Self {
        Self {
            pagination: PaginationParams::read_map(map),
            category: text(map, "category"),
            min_price: number(map, "minPrice"),
            max_price: number(map, "maxPrice"),
        }
    }
}

impl HasPagination for CourseListParams {
    fn pagination(&self) -> &PaginationParams {
        &self.pagination
    }

    fn pagination_mut(&mut self) -> &mut PaginationParams {
        &mut self.pagination
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LessonListParams {
    pub pagination: PaginationParams,
    pub course: String,
}

impl LessonListParams {
    /// Every lesson of a course in `order` sequence.
    pub fn ordered_for<S: Into<String>>(course: S) -> Self {
        Self {
            pagination: PaginationParams::with_limit(100).sorted_by("order", SortDirection::Asc),
            course: course.into(),
        }
    }
}

impl QueryParams for LessonListParams {
    fn schema(options: &PaginationOptions) -> QsSchema {
        pagination_schema(options).text("course", Some(""))
    }

    fn to_map(&self) -> QsMap {
        let mut map = self.pagination.to_map();
        map.insert("course", QsValue::from(self.course.as_str()));
        map
    }

    fn from_map(map: &QsMap) -> Self {
        Self {
            pagination: PaginationParams::read_map(map),
            course: text(map, "course").unwrap_or_default(),
        }
    }
}

impl HasPagination for LessonListParams {
    fn pagination(&self) -> &PaginationParams {
        &self.pagination
    }

    fn pagination_mut(&mut self) -> &mut PaginationParams {
        &mut self.pagination
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionListParams {
    pub pagination: PaginationParams,
    pub status: Option<TransactionStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl QueryParams for TransactionListParams {
    fn schema(options: &PaginationOptions) -> QsSchema {
        pagination_schema(options)
            .one_of("status", TransactionStatus::ALL.map(|s| s.as_str()), None)
            .text("startDate", None)
            .validate(is_date)
            .text("endDate", None)
            .validate(is_date)
    }

    fn to_map(&self) -> QsMap {
        let mut map = self.pagination.to_map();
        if let Some(status) = self.status {
            map.insert("status", QsValue::from(status.as_str()));
        }
        if let Some(start) = self.start_date {
            map.insert("startDate", QsValue::from(start.format(DATE_FORMAT).to_string()));
        }
        if let Some(end) = self.end_date {
            map.insert("endDate", QsValue::from(end.format(DATE_FORMAT).to_string()));
        }
        map
    }

    fn from_map(map: &QsMap) -> Self {
        Self {
            pagination: PaginationParams::read_map(map),
            status: text(map, "status").and_then(|s| s.parse().ok()),
            start_date: text(map, "startDate").and_then(|d| parse_date(&d)),
            end_date: text(map, "endDate").and_then(|d| parse_date(&d)),
        }
    }

    /// Date filters widen to the whole day: start at 00:00:00.000, end at
    /// 23:59:59.999 (UTC).
    fn to_request_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .pagination
            .to_request_pairs();

        if let Some(status) = self.status {
            pairs.push(("status".into(), status.as_str().into()));
        }
        if let Some(start) = self.start_date.and_then(|d| d.and_hms_milli_opt(0, 0, 0, 0)) {
            pairs.push((
                "startDate".into(),
                start.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true),
            ));
        }
        if let Some(end) = self.end_date.and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999)) {
            pairs.push((
                "endDate".into(),
                end.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true),
            ));
        }
        pairs
    }
}

impl HasPagination for TransactionListParams {
    fn pagination(&self) -> &PaginationParams {
        &self.pagination
    }

    fn pagination_mut(&mut self) -> &mut PaginationParams {
        &mut self.pagination
    }
}

fn number(map: &QsMap, key: &str) -> Option<i64> {
    map.get(key).and_then(QsValue::as_number)
}

fn text(map: &QsMap, key: &str) -> Option<String> {
    map.get(key)
        .and_then(QsValue::as_text)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn non_negative(v: &QsValue) -> bool {
    v.as_number().is_some_and(|n| n >= 0)
}

fn is_date(v: &QsValue) -> bool {
    v.as_text().and_then(parse_date).is_some()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}
