use crate::error::Issue;
use chrono::NaiveDate;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::Serializer;

const DATE_FORMAT: &str = "%Y%m%d";

pub fn parse_date(s: &str) -> Result<NaiveDate, Issue> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| Issue::InvalidValue {
        value: s.to_owned(),
        expected: "date (YYYYMMDD)".to_owned(),
    })
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s: &str = Deserialize::deserialize(deserializer)?;
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(serde::de::Error::custom)
}

pub fn serialize_date<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_date(date))
}

pub fn deserialize_option_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<&str>::deserialize(deserializer)?
        .map(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(serde::de::Error::custom));
    match s {
        Some(Ok(s)) => Ok(Some(s)),
        Some(Err(e)) => Err(e),
        None => Ok(None),
    }
}

pub fn serialize_option_date<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match date {
        None => serializer.serialize_none(),
        Some(d) => serialize_date(d, serializer),
    }
}

pub fn parse_time_impl(h: &str, m: &str, s: &str) -> Result<u32, std::num::ParseIntError> {
    let hours: u32 = h.parse()?;
    let minutes: u32 = m.parse()?;
    let seconds: u32 = s.parse()?;
    Ok(hours * 3600 + minutes * 60 + seconds)
}

/// Parses a `H:MM:SS` or `HH:MM:SS` time into seconds after midnight
///
/// Hours can go past 24 for trips running after midnight
pub fn parse_time(s: &str) -> Result<u32, Issue> {
    let invalid = || Issue::InvalidValue {
        value: s.to_owned(),
        expected: "time (HH:MM:SS)".to_owned(),
    };
    let t = s.trim();
    let len = t.len();
    if !t.is_ascii()
        || !(7..=8).contains(&len)
        || &t[len - 3..len - 2] != ":"
        || &t[len - 6..len - 5] != ":"
    {
        return Err(invalid());
    }
    let sec = &t[len - 2..];
    let min = &t[len - 5..len - 3];
    let hour = &t[..len - 6];
    parse_time_impl(hour, min, sec).map_err(|_| invalid())
}

pub fn format_time(time: u32) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        time / 3600,
        time % 3600 / 60,
        time % 60
    )
}

pub fn deserialize_time<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let s: &str = Deserialize::deserialize(deserializer)?;
    parse_time(s).map_err(de::Error::custom)
}

pub fn serialize_time<S>(time: &u32, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_time(*time))
}

pub fn deserialize_optional_time<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<&str> = Deserialize::deserialize(deserializer)?;

    match s {
        None => Ok(None),
        Some(t) => parse_time(t).map(Some).map_err(de::Error::custom),
    }
}

pub fn serialize_optional_time<S>(time: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match time {
        None => serializer.serialize_none(),
        Some(t) => serialize_time(t, serializer),
    }
}

#[test]
fn test_serialize_time() {
    #[derive(Serialize, Deserialize)]
    struct Test {
        #[serde(
            deserialize_with = "deserialize_time",
            serialize_with = "serialize_time"
        )]
        time: u32,
    }
    let data_in = r#"{"time":"25:01:01"}"#;
    let parsed: Test = serde_json::from_str(data_in).unwrap();
    assert_eq!(25 * 3600 + 60 + 1, parsed.time);
    assert_eq!(data_in, serde_json::to_string(&parsed).unwrap());
}

#[test]
fn test_parse_time() {
    assert_eq!(Ok(7 * 3600 + 5 * 60), parse_time("7:05:00"));
    assert_eq!(Ok(7 * 3600 + 5 * 60), parse_time("07:05:00"));
    assert!(parse_time("7h05").is_err());
    assert!(parse_time("07-05-00").is_err());
    assert!(parse_time("午前7時00").is_err());
}

#[test]
fn test_parse_date() {
    assert_eq!(
        Ok(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()),
        parse_date("20240401")
    );
    assert!(parse_date("2024-04-01").is_err());
    assert_eq!("20240401", format_date(&NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
}
