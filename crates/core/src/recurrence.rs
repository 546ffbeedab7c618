// crates/core/src/recurrence.rs
//! Expansion of recurring templates into dated occurrences.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::types::{now_ts, Session, SessionStatus, Weekday};

/// Expand a recurring template into independent occurrences, one per
/// selected weekday between the template's date and its recurrence end
/// date, both inclusive.
///
/// The template itself is never part of the output. Non-recurring input,
/// an empty weekday set, a missing end date, or an end date before the
/// template date all yield an empty list.
pub fn expand_template(template: &Session) -> Vec<Session> {
    if !template.is_recurring || template.selected_days.is_empty() {
        return Vec::new();
    }
    let Some(until) = template.recurring_end_date else {
        return Vec::new();
    };
    if until < template.date {
        return Vec::new();
    }

    let mut seen: HashSet<NaiveDate> = HashSet::new();
    let mut occurrences = Vec::new();
    let mut day = template.date;
    loop {
        if template.selected_days.contains(&Weekday::from_date(day)) && seen.insert(day) {
            occurrences.push(occurrence_on(template, day));
        }
        if day >= until {
            break;
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break, // calendar overflow
        }
    }

    debug!(
        template_id = %template.id,
        from = %template.date,
        until = %until,
        count = occurrences.len(),
        "expanded recurring template"
    );
    occurrences
}

/// One fresh occurrence for `date`: new identity, Upcoming, empty
/// attendance and metrics, recurrence fields cleared, the rest copied
/// from the template.
fn occurrence_on(template: &Session, date: NaiveDate) -> Session {
    let now = now_ts();
    Session {
        id: Uuid::new_v4().to_string(),
        date,
        status: SessionStatus::Upcoming,
        attendance: HashMap::new(),
        player_metrics: HashMap::new(),
        is_recurring: false,
        selected_days: BTreeSet::new(),
        recurring_end_date: None,
        parent_session_id: Some(template.id.clone()),
        created_at: now,
        updated_at: now,
        ..template.clone()
    }
}
