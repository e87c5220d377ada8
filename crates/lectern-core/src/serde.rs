use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Treats `?field=` as absent instead of failing UUID parsing.
pub fn deserialize_optional_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => Uuid::parse_str(s.trim())
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Same treatment for free-text filters: blank means no filter.
pub fn deserialize_optional_trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Query-string booleans: `true`/`false`/`1`/`0`, blank means absent.
pub fn deserialize_optional_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some("true") | Some("1") => Ok(Some(true)),
        Some("false") | Some("0") => Ok(Some(false)),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid boolean '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Filter {
        #[serde(default, deserialize_with = "deserialize_optional_uuid")]
        course_id: Option<Uuid>,
        #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
        search: Option<String>,
        #[serde(default, deserialize_with = "deserialize_optional_bool")]
        active: Option<bool>,
    }

    #[test]
    fn test_bool_strings() {
        let f: Filter = serde_json::from_str(r#"{"active":"1"}"#).unwrap();
        assert_eq!(f.active, Some(true));
        let f: Filter = serde_json::from_str(r#"{"active":"false"}"#).unwrap();
        assert_eq!(f.active, Some(false));
        let f: Filter = serde_json::from_str(r#"{"active":""}"#).unwrap();
        assert_eq!(f.active, None);
        assert!(serde_json::from_str::<Filter>(r#"{"active":"maybe"}"#).is_err());
    }

    #[test]
    fn test_blank_values_are_none() {
        let f: Filter = serde_json::from_str(r#"{"course_id":"","search":"   "}"#).unwrap();
        assert!(f.course_id.is_none());
        assert!(f.search.is_none());
    }

    #[test]
    fn test_values_are_parsed() {
        let id = Uuid::new_v4();
        let json = format!(r#"{{"course_id":"{id}","search":" math "}}"#);
        let f: Filter = serde_json::from_str(&json).unwrap();
        assert_eq!(f.course_id, Some(id));
        assert_eq!(f.search.as_deref(), Some("math"));
    }

    #[test]
    fn test_invalid_uuid_fails() {
        assert!(serde_json::from_str::<Filter>(r#"{"course_id":"nope"}"#).is_err());
    }
}
