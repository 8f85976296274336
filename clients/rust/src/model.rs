use serde::Deserialize;

/// Error payload returned by the backend on non-2xx responses. Any other
/// fields are ignored.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// `serde(with = ...)` helpers for ISO-8601 timestamps with fractional
/// seconds, e.g. `2024-05-01T09:30:00.125Z`.
///
/// ```
/// use chrono::{DateTime, Utc};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Session {
///     #[serde(with = "api_client::model::iso8601")]
///     expires_at: DateTime<Utc>,
/// }
///
/// let s: Session = serde_json::from_str(r#"{"expires_at":"2024-05-01T09:30:00.125Z"}"#).unwrap();
/// assert_eq!(s.expires_at.timestamp_subsec_millis(), 125);
/// ```
pub mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::de::{self, Deserializer};
    use serde::{Deserialize, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Parses an RFC 3339 timestamp that carries a fractional-seconds part.
    pub fn parse(input: &str) -> Result<DateTime<Utc>, String> {
        let time = input
            .split_once(['T', 't'])
            .map(|(_, t)| t)
            .ok_or_else(|| format!("missing time component in `{input}`"))?;
        if !time.contains('.') {
            return Err(format!("missing fractional seconds in `{input}`"));
        }
        DateTime::parse_from_rfc3339(input)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| format!("invalid timestamp `{input}`: {e}"))
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::de::{self, Deserializer};
        use serde::{Deserialize, Serializer};

        pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(v) => serializer.serialize_some(&super::format(v)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw).map(Some).map_err(de::Error::custom),
                None => Ok(None),
            }
        }
    }
}
