//! Activity kind enum.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown activity kind.
#[derive(thiserror::Error, Debug, Clone)]
#[error("unknown activity kind: {0}")]
pub struct ActivityKindError(pub String);

/// The kind of a logged activity.
///
/// Stored as lowercase text in the database. New activities default to
/// [`ActivityKind::Note`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    /// Free-form note.
    #[default]
    Note,
    /// Phone call.
    Call,
    /// Email sent or received.
    Email,
    /// Meeting held or scheduled.
    Meeting,
    /// Task to follow up on.
    Task,
}

impl ActivityKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 5] = [Self::Note, Self::Call, Self::Email, Self::Meeting, Self::Task];

    /// The lowercase text representation stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Call => "call",
            Self::Email => "email",
            Self::Meeting => "meeting",
            Self::Task => "task",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ActivityKind {
    type Err = ActivityKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "note" => Ok(Self::Note),
            "call" => Ok(Self::Call),
            "email" => Ok(Self::Email),
            "meeting" => Ok(Self::Meeting),
            "task" => Ok(Self::Task),
            other => Err(ActivityKindError(other.to_owned())),
        }
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ActivityKind {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ActivityKind {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ActivityKind {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_note() {
        assert_eq!(ActivityKind::default(), ActivityKind::Note);
    }

    #[test]
    fn test_parse_all_kinds() {
        for kind in ActivityKind::ALL {
            let parsed: ActivityKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_parse_unknown() {
        let err = "fax".parse::<ActivityKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown activity kind: fax");
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&ActivityKind::Meeting).unwrap();
        assert_eq!(json, "\"meeting\"");

        let back: ActivityKind = serde_json::from_str("\"call\"").unwrap();
        assert_eq!(back, ActivityKind::Call);
    }
}
