// crates/core/src/types.rs
use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Current unix timestamp in seconds. Used for server-managed fields.
pub fn now_ts() -> i64 {
    Utc::now().timestamp()
}

/// Parse a wire time-of-day string. Only `"HH:MM"` is accepted.
pub fn parse_hhmm(value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| ValidationError::InvalidTime {
        value: value.to_string(),
    })
}

/// Format a time-of-day as the wire `"HH:MM"` string.
pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Serde adapter for `NaiveTime` fields carried as `"HH:MM"` on the wire.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&super::format_hhmm(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(de)?;
        super::parse_hhmm(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for optional `"HH:MM"` fields (partial updates).
pub mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, ser: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => ser.serialize_some(&super::format_hhmm(*t)),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(de)?;
        raw.map(|s| super::parse_hhmm(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Day of week a recurring template fires on.
/// Wire format is the lowercase English name ("monday", "tuesday", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub fn from_date(date: NaiveDate) -> Self {
        match date.weekday() {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }
}

/// Temporal status of a session, ordered by how far the session has
/// progressed. The deduplicator relies on this total order:
/// Upcoming < On-going < Finished.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum SessionStatus {
    #[default]
    Upcoming,
    #[serde(rename = "On-going")]
    OnGoing,
    Finished,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "Upcoming",
            Self::OnGoing => "On-going",
            Self::Finished => "Finished",
        }
    }

    /// Parse the wire/storage name back into a status.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Upcoming" => Some(Self::Upcoming),
            "On-going" => Some(Self::OnGoing),
            "Finished" => Some(Self::Finished),
            _ => None,
        }
    }
}

/// Attendance outcome recorded for one player at one occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

/// One player's attendance mark, embedded in a session's attendance map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub status: AttendanceStatus,
    pub marked_at: i64,
    pub marked_by: String,
}

/// A player's attribute snapshot. Every field is optional: absent means
/// "not tracked yet", and absent fields carry no weight in the overall
/// rating (see `rating`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shooting: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positioning: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ball_control: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crossing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_points: Option<f64>,
}

impl AttributeSnapshot {
    pub fn is_empty(&self) -> bool {
        self.shooting.is_none()
            && self.pace.is_none()
            && self.positioning.is_none()
            && self.passing.is_none()
            && self.ball_control.is_none()
            && self.crossing.is_none()
            && self.session_rating.is_none()
            && self.overall.is_none()
            && self.training_points.is_none()
    }
}

/// Metrics recorded for one player at one occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetrics {
    pub attributes: AttributeSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_rating: Option<f64>,
    pub recorded_at: i64,
}

/// One dated entry in a player's append-only performance history.
///
/// Ratings arrive in three historical shapes: a `sessionRating` on the
/// entry, a bare `rating` on the entry, or a `sessionRating` nested in
/// the attribute snapshot. `rating::usable_rating` resolves them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceEntry {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<AttributeSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// A player's stored performance record. `overall_rating` and
/// `average_performance` are derived on read, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPerformanceRecord {
    pub player_id: String,
    #[serde(default)]
    pub attributes: AttributeSnapshot,
    #[serde(default)]
    pub performance_history: Vec<PerformanceEntry>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl PlayerPerformanceRecord {
    pub fn new(player_id: impl Into<String>) -> Self {
        let now = now_ts();
        Self {
            player_id: player_id.into(),
            attributes: AttributeSnapshot::default(),
            performance_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// The read view of a player's performance with derived fields attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPerformance {
    pub player_id: String,
    pub attributes: AttributeSnapshot,
    pub performance_history: Vec<PerformanceEntry>,
    pub overall_rating: f64,
    pub average_performance: f64,
}

/// A training session: either a recurring template or a concrete dated
/// occurrence.
///
/// Templates carry `is_recurring = true` plus the weekday set and end
/// date; they are never scheduled directly. Occurrences carry
/// `parent_session_id` back to their template (informational only) and
/// never carry recurrence fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub academy_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub coaches: Vec<String>,
    #[serde(default)]
    pub players: Vec<String>,
    #[serde(default)]
    pub attendance: HashMap<String, AttendanceEntry>,
    #[serde(default)]
    pub player_metrics: HashMap<String, SessionMetrics>,
    #[serde(default)]
    pub status: SessionStatus,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub selected_days: BTreeSet<Weekday>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_session_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Session {
    pub fn new(
        academy_id: impl Into<String>,
        name: impl Into<String>,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        let now = now_ts();
        Self {
            id: Uuid::new_v4().to_string(),
            academy_id: academy_id.into(),
            name: name.into(),
            category: None,
            date,
            start_time,
            end_time,
            coaches: Vec::new(),
            players: Vec::new(),
            attendance: HashMap::new(),
            player_metrics: HashMap::new(),
            status: SessionStatus::Upcoming,
            is_recurring: false,
            selected_days: BTreeSet::new(),
            recurring_end_date: None,
            parent_session_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_coaches(mut self, coaches: Vec<String>) -> Self {
        self.coaches = coaches;
        self
    }

    pub fn with_players(mut self, players: Vec<String>) -> Self {
        self.players = players;
        self
    }

    /// Turn this session into a recurring template.
    pub fn recurring(mut self, days: BTreeSet<Weekday>, until: NaiveDate) -> Self {
        self.is_recurring = true;
        self.selected_days = days;
        self.recurring_end_date = Some(until);
        self
    }

    /// Templates define a recurrence; everything else is a schedulable
    /// occurrence (including one-off sessions created without a template).
    pub fn is_template(&self) -> bool {
        self.is_recurring
    }

    /// The deduplication key: calendar slot within one academy.
    pub fn occurrence_key(&self) -> (NaiveDate, NaiveTime, NaiveTime) {
        (self.date, self.start_time, self.end_time)
    }

    /// Field-level checks shared by create and update paths.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.academy_id.trim().is_empty() {
            return Err(ValidationError::empty("academyId"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty("name"));
        }
        if self.end_time < self.start_time {
            return Err(ValidationError::EndBeforeStart {
                start: self.start_time,
                end: self.end_time,
            });
        }
        Ok(())
    }
}

/// One page of an academy's session list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPage {
    pub sessions: Vec<Session>,
    pub page: u32,
    pub total: u64,
}
