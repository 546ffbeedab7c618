// crates/core/src/status.rs
//! Temporal classification of sessions.
//!
//! A session is On-going from the first instant of its start time
//! through the last instant of its end time — inclusive on both ends.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::types::{Session, SessionStatus};

/// Classify where `now` falls relative to a scheduled window.
///
/// Session times are naive wall-clock values for the academy's single
/// deployment timezone; they are anchored in UTC for comparison.
pub fn classify(
    now: DateTime<Utc>,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> SessionStatus {
    let starts_at = date.and_time(start).and_utc();
    let ends_at = date.and_time(end).and_utc();

    if now < starts_at {
        SessionStatus::Upcoming
    } else if now <= ends_at {
        SessionStatus::OnGoing
    } else {
        SessionStatus::Finished
    }
}

/// Reclassify an occurrence in place. Templates are left untouched —
/// they are never scheduled, so temporal status is meaningless for them.
pub fn refresh_status(session: &mut Session, now: DateTime<Utc>) {
    if session.is_template() {
        return;
    }
    session.status = classify(now, session.date, session.start_time, session.end_time);
}
