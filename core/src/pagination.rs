//! Page and cursor addressing for list endpoints.
//!
//! # Design
//! Outbound, a caller's paging intent (`Paging`) becomes query parameters or
//! JSON body fields. Inbound, an envelope's `Metadata` becomes a
//! `PaginationState` that says whether another page exists and how to ask for
//! it. Cursors are opaque tokens shuttled back to the server unchanged, and
//! results are never re-ordered here.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::Error;

pub const PAGE_PARAM: &str = "page";
pub const PER_PAGE_PARAM: &str = "perPage";
pub const CURSOR_PARAM: &str = "cursor";

/// What page the caller wants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Paging {
    /// Let the server pick.
    #[default]
    Default,
    /// 1-based page number with an optional page size.
    Page { page: u32, per_page: Option<u32> },
    /// Opaque token from a previous response.
    Cursor(String),
}

impl Paging {
    pub fn page(page: u32, per_page: u32) -> Result<Self, Error> {
        if per_page == 0 {
            return Err(Error::InvalidPaging("page size must be at least 1".to_string()));
        }
        if page == 0 {
            return Err(Error::InvalidPaging("pages are numbered from 1".to_string()));
        }
        Ok(Paging::Page {
            page,
            per_page: Some(per_page),
        })
    }

    /// A page number with the server's default page size.
    pub fn page_number(page: u32) -> Result<Self, Error> {
        if page == 0 {
            return Err(Error::InvalidPaging("pages are numbered from 1".to_string()));
        }
        Ok(Paging::Page { page, per_page: None })
    }

    pub fn cursor(token: impl Into<String>) -> Result<Self, Error> {
        let token = token.into();
        if token.is_empty() {
            return Err(Error::InvalidPaging("cursor must not be empty".to_string()));
        }
        Ok(Paging::Cursor(token))
    }

    /// Paging intent as JSON fields, for endpoints that take it in a body.
    pub fn body_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        match self {
            Paging::Default => {}
            Paging::Page { page, per_page } => {
                fields.insert(PAGE_PARAM.to_string(), Value::from(*page));
                if let Some(per_page) = per_page {
                    fields.insert(PER_PAGE_PARAM.to_string(), Value::from(*per_page));
                }
            }
            Paging::Cursor(token) => {
                fields.insert(CURSOR_PARAM.to_string(), Value::String(token.clone()));
            }
        }
        fields
    }
}

/// Outbound query parameters for the requested page.
pub fn resolve_page(paging: &Paging) -> Vec<(String, String)> {
    match paging {
        Paging::Default => Vec::new(),
        Paging::Page { page, per_page } => {
            let mut params = vec![(PAGE_PARAM.to_string(), page.to_string())];
            if let Some(per_page) = per_page {
                params.push((PER_PAGE_PARAM.to_string(), per_page.to_string()));
            }
            params
        }
        Paging::Cursor(token) => vec![(CURSOR_PARAM.to_string(), token.clone())],
    }
}

/// Pagination block of a list envelope. Every key is optional; an empty
/// object is kept as present. Counts sent as whole floats (`1.0`) are read
/// as integers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, deserialize_with = "count", skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "count", skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u64>,
    #[serde(default, deserialize_with = "count", skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, deserialize_with = "count", skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_cursor: Option<String>,
}

impl Metadata {
    /// The wire object, with only the keys that are set.
    pub fn to_json(&self) -> Value {
        let counts = [
            ("page", self.page),
            ("perPage", self.per_page),
            ("total", self.total),
            ("totalPages", self.total_pages),
        ];
        let cursors = [
            ("nextCursor", &self.next_cursor),
            ("previousCursor", &self.previous_cursor),
        ];

        let mut object = Map::new();
        for (key, count) in counts {
            if let Some(count) = count {
                object.insert(key.to_string(), Value::from(count));
            }
        }
        for (key, cursor) in cursors {
            if let Some(cursor) = cursor {
                object.insert(key.to_string(), Value::String(cursor.clone()));
            }
        }
        Value::Object(object)
    }
}

fn count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    number
        .as_u64()
        .or_else(|| {
            number
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f < u64::MAX as f64)
                .map(|f| f as u64)
        })
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("expected a non-negative whole number, found {number}")))
}

/// Where a response sits in its collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    pub requested: Paging,
    /// Total item count, when the service declares it.
    pub total: Option<u64>,
    pub next: Option<Paging>,
    pub previous: Option<Paging>,
}

impl PaginationState {
    pub fn single_page(requested: &Paging) -> Self {
        Self {
            requested: requested.clone(),
            total: None,
            next: None,
            previous: None,
        }
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// Read paging information out of envelope metadata.
///
/// Missing metadata means a single page with nothing further.
pub fn extract_paging(metadata: Option<&Metadata>, requested: &Paging) -> PaginationState {
    let Some(metadata) = metadata else {
        return PaginationState::single_page(requested);
    };

    let (requested_page, requested_size) = match requested {
        Paging::Page { page, per_page } => (Some(u64::from(*page)), per_page.map(u64::from)),
        _ => (None, None),
    };
    let current = metadata.page.or(requested_page);
    let per_page = metadata.per_page.or(requested_size);

    let next = match non_empty(&metadata.next_cursor) {
        Some(token) => Some(Paging::Cursor(token.to_string())),
        None => current
            .filter(|page| has_page_after(*page, per_page, metadata))
            .and_then(|page| page_paging(page + 1, per_page)),
    };

    let previous = match non_empty(&metadata.previous_cursor) {
        Some(token) => Some(Paging::Cursor(token.to_string())),
        None => current
            .filter(|page| *page > 1)
            .and_then(|page| page_paging(page - 1, per_page)),
    };

    PaginationState {
        requested: requested.clone(),
        total: metadata.total,
        next,
        previous,
    }
}

fn has_page_after(page: u64, per_page: Option<u64>, metadata: &Metadata) -> bool {
    if let Some(total_pages) = metadata.total_pages {
        return page < total_pages;
    }
    match (per_page, metadata.total) {
        (Some(per_page), Some(total)) => page.checked_mul(per_page).is_some_and(|seen| seen < total),
        _ => false,
    }
}

fn page_paging(page: u64, per_page: Option<u64>) -> Option<Paging> {
    let page = u32::try_from(page).ok().filter(|p| *p > 0)?;
    let per_page = match per_page {
        Some(size) => Some(u32::try_from(size).ok()?),
        None => None,
    };
    Some(Paging::Page { page, per_page })
}

fn non_empty(token: &Option<String>) -> Option<&str> {
    token.as_deref().filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn metadata(value: Value) -> Metadata {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn default_paging_adds_no_parameters() {
        assert!(resolve_page(&Paging::Default).is_empty());
        assert!(Paging::Default.body_fields().is_empty());
    }

    #[test]
    fn page_paging_becomes_page_and_size() {
        let params = resolve_page(&Paging::page(2, 50).unwrap());
        assert_eq!(
            params,
            vec![
                ("page".to_string(), "2".to_string()),
                ("perPage".to_string(), "50".to_string())
            ]
        );
        assert_eq!(
            Value::Object(Paging::page(2, 50).unwrap().body_fields()),
            json!({"page": 2, "perPage": 50})
        );
    }

    #[test]
    fn cursor_paging_passes_token_through() {
        let params = resolve_page(&Paging::cursor("abc==").unwrap());
        assert_eq!(params, vec![("cursor".to_string(), "abc==".to_string())]);
    }

    #[rstest]
    #[case::zero_page(Paging::page(0, 10))]
    #[case::zero_size(Paging::page(1, 0))]
    #[case::empty_cursor(Paging::cursor(""))]
    fn invalid_paging_is_rejected(#[case] paging: Result<Paging, Error>) {
        assert!(matches!(paging, Err(Error::InvalidPaging(_))));
    }

    #[test]
    fn no_metadata_means_no_further_page() {
        let state = extract_paging(None, &Paging::Default);
        assert!(!state.has_next());
        assert!(state.total.is_none());
        assert!(state.previous.is_none());
    }

    #[test]
    fn empty_metadata_means_no_further_page() {
        let state = extract_paging(Some(&Metadata::default()), &Paging::Default);
        assert!(!state.has_next());
    }

    #[test]
    fn next_cursor_wins() {
        let meta = metadata(json!({"page": 1, "totalPages": 1, "nextCursor": "t2"}));
        let state = extract_paging(Some(&meta), &Paging::Default);
        assert_eq!(state.next, Some(Paging::Cursor("t2".to_string())));
    }

    #[test]
    fn empty_next_cursor_is_ignored() {
        let meta = metadata(json!({"nextCursor": ""}));
        assert!(!extract_paging(Some(&meta), &Paging::Default).has_next());
    }

    #[rstest]
    #[case::more_pages(json!({"page": 1, "perPage": 10, "totalPages": 3}), Some(2))]
    #[case::last_page(json!({"page": 3, "perPage": 10, "totalPages": 3}), None)]
    #[case::by_total(json!({"page": 1, "perPage": 10, "total": 11}), Some(2))]
    #[case::exact_total(json!({"page": 2, "perPage": 10, "total": 20}), None)]
    #[case::no_total(json!({"page": 1, "perPage": 10}), None)]
    fn next_page_from_counts(#[case] meta: Value, #[case] expected: Option<u32>) {
        let state = extract_paging(Some(&metadata(meta)), &Paging::Default);
        let next_page = state.next.map(|p| match p {
            Paging::Page { page, per_page } => {
                assert_eq!(per_page, Some(10));
                page
            }
            other => panic!("unexpected paging {other:?}"),
        });
        assert_eq!(next_page, expected);
    }

    #[test]
    fn requested_page_fills_missing_metadata() {
        let meta = metadata(json!({"total": 45}));
        let state = extract_paging(Some(&meta), &Paging::page(4, 10).unwrap());
        assert_eq!(state.total, Some(45));
        assert_eq!(state.next, Some(Paging::Page { page: 5, per_page: Some(10) }));
        assert_eq!(state.previous, Some(Paging::Page { page: 3, per_page: Some(10) }));
    }

    #[test]
    fn previous_cursor_is_exposed() {
        let meta = metadata(json!({"previousCursor": "t0"}));
        let state = extract_paging(Some(&meta), &Paging::cursor("t1").unwrap());
        assert_eq!(state.previous, Some(Paging::Cursor("t0".to_string())));
        assert_eq!(state.requested, Paging::Cursor("t1".to_string()));
    }

    #[test]
    fn metadata_serializes_only_present_keys() {
        let meta = metadata(json!({"page": 1, "total": 3}));
        assert_eq!(serde_json::to_value(&meta).unwrap(), json!({"page": 1, "total": 3}));
        assert_eq!(meta.to_json(), json!({"page": 1, "total": 3}));
    }

    #[test]
    fn metadata_to_json_keeps_cursors() {
        let meta = metadata(json!({"perPage": 5, "nextCursor": "n", "previousCursor": "p"}));
        assert_eq!(meta.to_json(), json!({"perPage": 5, "nextCursor": "n", "previousCursor": "p"}));
    }

    #[test]
    fn whole_float_counts_are_integers() {
        let meta = metadata(json!({"page": 1.0, "perPage": 10.0, "total": 25.0, "totalPages": 3.0}));
        assert_eq!(meta.page, Some(1));
        assert_eq!(meta.total_pages, Some(3));

        let state = extract_paging(Some(&meta), &Paging::Default);
        assert_eq!(state.next, Some(Paging::Page { page: 2, per_page: Some(10) }));
    }

    #[rstest]
    #[case::fraction(json!({"page": 1.5}))]
    #[case::negative(json!({"total": -1}))]
    #[case::text(json!({"page": "1"}))]
    fn invalid_counts_are_rejected(#[case] meta: Value) {
        assert!(serde_json::from_value::<Metadata>(meta).is_err());
    }

    #[test]
    fn null_counts_are_unset() {
        let meta = metadata(json!({"page": null}));
        assert!(meta.page.is_none());
    }
}
