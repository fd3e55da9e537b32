//! Book instance (physical copy) model and loan status

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Availability of a book instance.
///
/// Persisted and exposed as a one-character code (`d`, `o`, `a`, `r`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum LoanStatus {
    #[default]
    #[serde(rename = "d")]
    Maintenance,
    #[serde(rename = "o")]
    OnLoan,
    #[serde(rename = "a")]
    Available,
    #[serde(rename = "r")]
    Reserved,
}

impl LoanStatus {
    pub const ALL: [LoanStatus; 4] = [
        LoanStatus::Maintenance,
        LoanStatus::OnLoan,
        LoanStatus::Available,
        LoanStatus::Reserved,
    ];

    /// One-character code, as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "d",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl TryFrom<char> for LoanStatus {
    type Error = String;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'd' => Ok(LoanStatus::Maintenance),
            'o' => Ok(LoanStatus::OnLoan),
            'a' => Ok(LoanStatus::Available),
            'r' => Ok(LoanStatus::Reserved),
            other => Err(format!("Invalid loan status code: {:?}", other)),
        }
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim_end().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => LoanStatus::try_from(c),
            _ => Err(format!("Invalid loan status code: {:?}", s)),
        }
    }
}

// Stored in a CHAR(1) column
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Book instance row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
    pub status: LoanStatus,
}

impl BookInstance {
    /// A copy is overdue once its due date has passed.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_back.map(|due| due < today).unwrap_or(false)
    }
}

/// Book instance joined with its book title, for loan lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstanceWithTitle {
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub book_title: Option<String>,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
    pub borrower_username: Option<String>,
    pub status: LoanStatus,
    #[sqlx(default)]
    pub is_overdue: bool,
}

impl BookInstanceWithTitle {
    pub fn with_overdue(mut self, today: NaiveDate) -> Self {
        self.is_overdue = self.due_back.map(|due| due < today).unwrap_or(false);
        self
    }
}

impl std::fmt::Display for BookInstanceWithTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) - {}",
            self.book_title.as_deref().unwrap_or(""),
            self.id,
            self.status
        )
    }
}

/// Register a new physical copy of a book
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookInstance {
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1-200 characters"))]
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
    /// Defaults to maintenance
    pub status: Option<LoanStatus>,
}

/// Librarian edit of a copy. Replaces status, borrower and due date; any
/// status may be set.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
pub struct UpdateBookInstance {
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1-200 characters"))]
    pub imprint: String,
    #[serde(default)]
    pub due_back: Option<NaiveDate>,
    #[serde(default)]
    pub borrower_id: Option<i32>,
    pub status: LoanStatus,
}

/// Renewal form submission
#[derive(Debug, Deserialize, ToSchema)]
pub struct RenewBookInstance {
    /// New due date (YYYY-MM-DD), at most 4 weeks from today
    pub renewal_date: NaiveDate,
}

/// Renewal form, pre-populated with a proposed date
#[derive(Debug, Serialize, ToSchema)]
pub struct RenewalForm {
    pub book_instance: BookInstanceWithTitle,
    pub proposed_renewal_date: NaiveDate,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
}

/// Pagination query for loan lists
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LoanQuery {
    pub page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(due_back: Option<NaiveDate>) -> BookInstance {
        BookInstance {
            id: Uuid::new_v4(),
            book_id: Some(1),
            imprint: "Penguin, 1999".to_string(),
            due_back,
            borrower_id: None,
            status: LoanStatus::OnLoan,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_codes() {
        for status in LoanStatus::ALL {
            assert_eq!(status.as_str().len(), 1);
            assert_eq!(status.as_str().parse::<LoanStatus>(), Ok(status));
            assert_eq!(serde_json::to_value(status).unwrap(), status.as_str());
        }
        assert_eq!(LoanStatus::default(), LoanStatus::Maintenance);
        assert_eq!("o".parse::<LoanStatus>(), Ok(LoanStatus::OnLoan));
        assert!("x".parse::<LoanStatus>().is_err());
        assert!("oa".parse::<LoanStatus>().is_err());
    }

    #[test]
    fn test_padded_char_column_decodes() {
        // CHAR(n) values come back blank-padded
        assert_eq!("o ".parse::<LoanStatus>(), Ok(LoanStatus::OnLoan));
        assert_eq!("a   ".parse::<LoanStatus>(), Ok(LoanStatus::Available));
        assert!(" o".parse::<LoanStatus>().is_err());
        assert!("".parse::<LoanStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_as_code() {
        assert_eq!(serde_json::to_string(&LoanStatus::Available).unwrap(), "\"a\"");
        let status: LoanStatus = serde_json::from_str("\"r\"").unwrap();
        assert_eq!(status, LoanStatus::Reserved);
    }

    #[test]
    fn test_is_overdue() {
        let today = date(2025, 1, 1);
        assert!(instance(Some(date(2024, 12, 31))).is_overdue(today));
        assert!(!instance(Some(today)).is_overdue(today));
        assert!(!instance(Some(date(2025, 1, 2))).is_overdue(today));
        assert!(!instance(None).is_overdue(today));
    }

    #[test]
    fn test_display() {
        let id = Uuid::nil();
        let item = BookInstanceWithTitle {
            id,
            book_id: Some(1),
            book_title: Some("Dune".to_string()),
            imprint: "Ace".to_string(),
            due_back: None,
            borrower_id: None,
            borrower_username: None,
            status: LoanStatus::OnLoan,
            is_overdue: false,
        };
        assert_eq!(item.to_string(), format!("Dune ({}) - On loan", id));
    }
}
