//! Offset and page based pagination for list endpoints.
//!
//! `limit` is clamped to 1..=100 (default 10). When `page` is supplied it
//! wins over `offset`.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query strings arrive as text; an empty value means "not supplied".
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.trim().parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Metadata attached to every paginated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Total number of matching items
    pub total: i64,
    /// Limit that was applied
    pub limit: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    /// Whether more items exist after this window
    pub has_more: bool,
}

impl PaginationMeta {
    pub fn new(total: i64, params: &PaginationParams) -> Self {
        let limit = params.limit();
        let offset = params.offset();
        Self {
            total,
            limit,
            offset: Some(offset),
            page: params.page(),
            has_more: offset.saturating_add(limit) < total,
        }
    }
}

#[derive(Debug, Clone, Default, Hash, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Maximum number of items to return (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    /// Number of items to skip (ignored when `page` is set)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub offset: Option<i64>,
    /// Page number, 1-indexed
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
}

impl PaginationParams {
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        match self.page {
            Some(page) => (page.max(1) - 1).saturating_mul(self.limit()),
            None => self.offset.unwrap_or(0).max(0),
        }
    }

    #[must_use]
    pub fn page(&self) -> Option<i64> {
        self.page.map(|p| p.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(limit: Option<i64>, offset: Option<i64>, page: Option<i64>) -> PaginationParams {
        PaginationParams {
            limit,
            offset,
            page,
        }
    }

    #[test]
    fn test_defaults() {
        let p = PaginationParams::default();
        assert_eq!(p.limit(), 10);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.page(), None);
    }

    #[test]
    fn test_limit_is_clamped() {
        for (input, expected) in [(0, 1), (-3, 1), (1, 1), (55, 55), (100, 100), (250, 100)] {
            assert_eq!(params(Some(input), None, None).limit(), expected);
        }
    }

    #[test]
    fn test_negative_offset_becomes_zero() {
        assert_eq!(params(None, Some(-20), None).offset(), 0);
    }

    #[test]
    fn test_page_takes_precedence_over_offset() {
        let p = params(Some(20), Some(5), Some(3));
        assert_eq!(p.offset(), 40);
        assert_eq!(p.page(), Some(3));

        let p = params(Some(20), None, Some(-1));
        assert_eq!(p.offset(), 0);
        assert_eq!(p.page(), Some(1));
    }

    #[test]
    fn test_huge_page_and_offset_saturate() {
        let p = params(Some(100), None, Some(i64::MAX));
        assert_eq!(p.offset(), i64::MAX);
        assert!(!PaginationMeta::new(5, &p).has_more);

        let p = params(None, Some(i64::MAX), None);
        assert_eq!(p.offset(), i64::MAX);
        assert!(!PaginationMeta::new(5, &p).has_more);
    }

    #[test]
    fn test_meta_has_more() {
        let meta = PaginationMeta::new(25, &params(Some(10), Some(10), None));
        assert!(meta.has_more);
        assert_eq!(meta.offset, Some(10));

        let meta = PaginationMeta::new(25, &params(Some(10), Some(20), None));
        assert!(!meta.has_more);

        let meta = PaginationMeta::new(0, &PaginationParams::default());
        assert!(!meta.has_more);
    }

    #[test]
    fn test_deserialize_query_strings() {
        let p: PaginationParams = serde_json::from_str(r#"{"limit":"25","offset":"50"}"#).unwrap();
        assert_eq!(p.limit(), 25);
        assert_eq!(p.offset(), 50);

        let p: PaginationParams = serde_json::from_str(r#"{"limit":"","page":""}"#).unwrap();
        assert_eq!(p.limit(), 10);
        assert_eq!(p.page(), None);

        assert!(serde_json::from_str::<PaginationParams>(r#"{"limit":"ten"}"#).is_err());
    }

    #[test]
    fn test_meta_omits_absent_page() {
        let meta = PaginationMeta::new(3, &PaginationParams::default());
        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains(r#""total":3"#));
        assert!(!json.contains("page"));
    }
}
