use time::{Date, OffsetDateTime, format_description::FormatItem, macros::format_description};

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

// Zoho timestamps carry a numeric offset without a colon, e.g. 2013-11-18T02:17:40-0800
const DATETIME_FORMAT: &[FormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]"
);

/// Parse a `YYYY-MM-DD` date. A trailing time component is ignored.
pub fn parse_date(date_str: &str) -> Result<Date, String> {
    let date_part = date_str.split('T').next().unwrap_or(date_str);
    Date::parse(date_part, DATE_FORMAT).map_err(|e| format!("Failed to parse date '{date_str}': {e}"))
}

/// Parse a Zoho timestamp, falling back to RFC 3339.
pub fn parse_datetime(datetime_str: &str) -> Result<OffsetDateTime, String> {
    if let Ok(dt) = OffsetDateTime::parse(datetime_str, DATETIME_FORMAT) {
        return Ok(dt);
    }

    let rfc3339 = time::format_description::well_known::Rfc3339;
    OffsetDateTime::parse(datetime_str, &rfc3339)
        .map_err(|e| format!("Failed to parse datetime '{datetime_str}': {e}"))
}

pub mod zoho_date_format {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use time::Date;

    use super::{DATE_FORMAT, parse_date};

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = date.format(DATE_FORMAT).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_date(&s).map_err(serde::de::Error::custom)
    }
}

/// Optional dates; Zoho sends `""` for unset dates.
pub mod zoho_date_format_option {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use time::Date;

    use super::{DATE_FORMAT, parse_date};

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => {
                let s = date.format(DATE_FORMAT).map_err(serde::ser::Error::custom)?;
                serializer.serialize_some(&s)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => parse_date(&s).map(Some).map_err(serde::de::Error::custom),
        }
    }
}

/// Optional timestamps such as `created_time`.
pub mod zoho_datetime_format_option {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use time::OffsetDateTime;

    use super::{DATETIME_FORMAT, parse_datetime};

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(datetime: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match datetime {
            Some(datetime) => {
                let s = datetime
                    .format(DATETIME_FORMAT)
                    .map_err(serde::ser::Error::custom)?;
                serializer.serialize_some(&s)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => parse_datetime(&s).map(Some).map_err(serde::de::Error::custom),
        }
    }
}
