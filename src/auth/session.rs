//! Defines the session stored in the auth cookie and how to serialize/deserialize it.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

mod datetime_format {
    //! Specifies how to serialize a [time::OffsetDateTime] in a custom format that
    //! avoids serialisations with datetimes containing midnight.
    //!
    //! The default serializer for [time::OffsetDateTime] will serialize
    //! "00:00:00.000000" as "0:00:00.0" and the deserializer would error out
    //! because it expects the hours to be two digits, not one.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// Date time format for the session times, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
    const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = dt
            .format(DATE_TIME_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&s, DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Proof that the user entered the app password.
///
/// Created at log-in, validated by the auth middleware and handed to protected
/// route handlers through the request extensions.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    #[serde(with = "datetime_format")]
    pub started_at: OffsetDateTime,

    #[serde(with = "datetime_format")]
    pub expires_at: OffsetDateTime,
}

impl Session {
    /// Start a session now that lasts for `duration`.
    pub fn start(duration: Duration) -> Self {
        let started_at = OffsetDateTime::now_utc();

        Self {
            started_at,
            expires_at: started_at.saturating_add(duration),
        }
    }

    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }

    /// The session with its expiry pushed back to `now + duration`, unless it
    /// already expires later than that.
    pub fn extended(self, now: OffsetDateTime, duration: Duration) -> Self {
        Self {
            expires_at: self.expires_at.max(now.saturating_add(duration)),
            ..self
        }
    }
}
