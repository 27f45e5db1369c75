// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt;

use jiff::Timestamp;

pub type TimestampMillis = i64;

/// An _UTC_ timestamp with truncated millisecond precision.
#[derive(Clone, Debug, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UtcDateTimeMs {
    unix_timestamp_millis: TimestampMillis,
}

impl UtcDateTimeMs {
    #[must_use]
    pub const fn from_unix_timestamp_millis(unix_timestamp_millis: TimestampMillis) -> Self {
        Self {
            unix_timestamp_millis,
        }
    }

    #[must_use]
    pub const fn unix_timestamp_millis(&self) -> TimestampMillis {
        self.unix_timestamp_millis
    }

    #[must_use]
    pub fn from_timestamp(timestamp: &Timestamp) -> Self {
        Self::from_unix_timestamp_millis(timestamp.as_millisecond())
    }

    #[must_use]
    #[expect(clippy::missing_panics_doc, reason = "should never panic")]
    pub fn to_timestamp(&self) -> Timestamp {
        Timestamp::from_millisecond(self.unix_timestamp_millis).expect("valid timestamp")
    }

    #[must_use]
    pub fn now() -> Self {
        Self::from_unix_timestamp_millis(Timestamp::now().as_millisecond())
    }
}

impl From<Timestamp> for UtcDateTimeMs {
    fn from(from: Timestamp) -> Self {
        Self::from_timestamp(&from)
    }
}

impl From<UtcDateTimeMs> for Timestamp {
    fn from(from: UtcDateTimeMs) -> Self {
        from.to_timestamp()
    }
}

impl fmt::Display for UtcDateTimeMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_timestamp().fmt(f)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for UtcDateTimeMs {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_timestamp().serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for UtcDateTimeMs {
    fn deserialize<D>(deserializer: D) -> Result<UtcDateTimeMs, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Timestamp::deserialize(deserializer).map(Into::into)
    }
}
