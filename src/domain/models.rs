use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Discrete age filter applied by the remote collection.
///
/// The wire value of each bracket is what the endpoint expects in the
/// `age` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AgeBracket {
    /// No age restriction
    #[default]
    All,
    /// Ages 0 through 18
    UpTo18,
    /// Ages 19 through 30
    From19To30,
    /// Ages 31 through 50
    From31To50,
    /// Ages 51 and over
    Over50,
}

impl AgeBracket {
    /// Every bracket in display order.
    pub const ALL: [AgeBracket; 5] = [
        AgeBracket::All,
        AgeBracket::UpTo18,
        AgeBracket::From19To30,
        AgeBracket::From31To50,
        AgeBracket::Over50,
    ];

    pub fn wire_value(self) -> &'static str {
        match self {
            AgeBracket::All => "ALL",
            AgeBracket::UpTo18 => "0-18",
            AgeBracket::From19To30 => "19-30",
            AgeBracket::From31To50 => "31-50",
            AgeBracket::Over50 => "51+",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeBracket::All => "All Ages",
            other => other.wire_value(),
        }
    }

    /// Parses a wire value. The empty string is accepted as `All`.
    pub fn parse(value: &str) -> Option<AgeBracket> {
        match value.trim() {
            "" => Some(AgeBracket::All),
            v if v.eq_ignore_ascii_case("all") => Some(AgeBracket::All),
            v => Self::ALL.into_iter().find(|b| b.wire_value() == v),
        }
    }

    /// The bracket after this one, wrapping around.
    pub fn next(self) -> AgeBracket {
        let idx = self.index();
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// The bracket before this one, wrapping around.
    pub fn previous(self) -> AgeBracket {
        let idx = self.index();
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|b| *b == self).unwrap_or(0)
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The three query dimensions sent with every fetch.
///
/// # Examples
///
/// ```
/// use custview::domain::{AgeBracket, QueryState};
///
/// let query = QueryState::default();
/// assert_eq!(query.search_term, "");
/// assert_eq!(query.age_bracket, AgeBracket::All);
/// assert_eq!(query.page, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    /// Free-text search, sent verbatim
    pub search_term: String,
    /// Age filter
    pub age_bracket: AgeBracket,
    /// One-based page number
    pub page: u32,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            age_bracket: AgeBracket::All,
            page: 1,
        }
    }
}

impl QueryState {
    /// Query parameters in the order the endpoint documents them.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("search", self.search_term.clone()),
            ("age", self.age_bracket.wire_value().to_string()),
            ("page", self.page.to_string()),
        ]
    }
}

/// A single customer row as served by the collection endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub name: String,
    #[serde(
        rename = "dob",
        alias = "dateOfBirth",
        deserialize_with = "deserialize_date"
    )]
    pub date_of_birth: NaiveDate,
    pub email: String,
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
}

/// Successful response body of `GET /customer`.
#[derive(Debug, Clone, Deserialize)]
pub struct PageResponse {
    pub data: Vec<Record>,
}

/// Accepts either a plain `YYYY-MM-DD` date or an RFC 3339 timestamp.
fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(trimmed).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}
