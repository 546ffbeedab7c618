// crates/core/src/dedup.rs
//! Occurrence deduplication.
//!
//! Re-running expansion (template edits, concurrent saves) produces
//! candidates that collide on the same calendar slot. This pass keeps
//! exactly one session per (date, start, end) key, never regressing a
//! session that has already progressed past Upcoming.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use crate::types::Session;

/// The calendar slot that identifies an occurrence within one academy.
pub type OccurrenceKey = (NaiveDate, NaiveTime, NaiveTime);

/// Collapse colliding occurrences to one winner per key.
///
/// Callers scope `candidates` to a single academy and to occurrences
/// only (templates have no slot to collide on). Merge rule: the more
/// temporally advanced status wins; on a tie, the most recently
/// supplied candidate (later in the input) wins. Output is sorted by
/// key so repeated runs produce identical listings.
pub fn dedupe_occurrences(candidates: Vec<Session>) -> Vec<Session> {
    let input_len = candidates.len();
    let mut winners: HashMap<OccurrenceKey, Session> = HashMap::with_capacity(input_len);

    for candidate in candidates {
        let key = candidate.occurrence_key();
        match winners.get(&key) {
            // The held session is further along; the newcomer loses.
            Some(held) if held.status > candidate.status => {}
            _ => {
                winners.insert(key, candidate);
            }
        }
    }

    let mut deduped: Vec<Session> = winners.into_values().collect();
    deduped.sort_by_key(Session::occurrence_key);

    if deduped.len() != input_len {
        debug!(
            input = input_len,
            kept = deduped.len(),
            "collapsed colliding occurrences"
        );
    }
    deduped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::expand_template;
    use crate::types::{SessionStatus, Weekday};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn occurrence(day: u32, status: SessionStatus) -> Session {
        let mut s = Session::new("acad-1", "U12 Training", d(day), t(10, 0), t(11, 0));
        s.status = status;
        s
    }

    #[test]
    fn test_distinct_slots_all_survive() {
        let input = vec![
            occurrence(1, SessionStatus::Finished),
            occurrence(3, SessionStatus::Upcoming),
            occurrence(2, SessionStatus::OnGoing),
        ];
        let out = dedupe_occurrences(input);
        assert_eq!(out.len(), 3);
        // Sorted by slot.
        let dates: Vec<NaiveDate> = out.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![d(1), d(2), d(3)]);
    }

    #[test]
    fn test_finished_never_loses_to_upcoming() {
        let finished = occurrence(1, SessionStatus::Finished);
        let finished_id = finished.id.clone();
        let out = dedupe_occurrences(vec![finished, occurrence(1, SessionStatus::Upcoming)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].status, SessionStatus::Finished);
        assert_eq!(out[0].id, finished_id);
    }

    #[test]
    fn test_more_advanced_newcomer_replaces_holder() {
        let out = dedupe_occurrences(vec![
            occurrence(1, SessionStatus::Upcoming),
            occurrence(1, SessionStatus::OnGoing),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].status, SessionStatus::OnGoing);
    }

    #[test]
    fn test_equal_status_prefers_most_recently_supplied() {
        let first = occurrence(1, SessionStatus::Upcoming);
        let second = occurrence(1, SessionStatus::Upcoming);
        let second_id = second.id.clone();
        let out = dedupe_occurrences(vec![first, second]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, second_id);
    }

    #[test]
    fn test_different_times_on_same_date_are_different_slots() {
        let morning = occurrence(1, SessionStatus::Upcoming);
        let mut evening = occurrence(1, SessionStatus::Upcoming);
        evening.start_time = t(18, 0);
        evening.end_time = t(19, 0);
        let out = dedupe_occurrences(vec![morning, evening]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(dedupe_occurrences(Vec::new()).is_empty());
    }

    #[test]
    fn test_idempotent_with_repeated_expansion() {
        let template = Session::new("acad-1", "U12 Training", d(1), t(10, 0), t(11, 0))
            .recurring(
                BTreeSet::from([Weekday::Monday, Weekday::Wednesday]),
                d(31),
            );

        let once = dedupe_occurrences(expand_template(&template));

        let mut both = expand_template(&template);
        both.extend(expand_template(&template));
        let twice = dedupe_occurrences(both);

        let once_keys: Vec<OccurrenceKey> = once.iter().map(Session::occurrence_key).collect();
        let twice_keys: Vec<OccurrenceKey> = twice.iter().map(Session::occurrence_key).collect();
        assert_eq!(once_keys, twice_keys);
        assert_eq!(once.len(), 10);
    }

    proptest! {
        /// Expanding any template twice and deduplicating the union keeps
        /// exactly the slots of a single expansion.
        #[test]
        fn prop_double_expansion_dedupes_to_single(
            start_offset in 0u32..60,
            span in 0u32..90,
            day_bits in 1u8..128,
        ) {
            let from = d(1) + chrono::Days::new(start_offset as u64);
            let until = from + chrono::Days::new(span as u64);
            let all_days = [
                Weekday::Monday,
                Weekday::Tuesday,
                Weekday::Wednesday,
                Weekday::Thursday,
                Weekday::Friday,
                Weekday::Saturday,
                Weekday::Sunday,
            ];
            let days: BTreeSet<Weekday> = all_days
                .iter()
                .enumerate()
                .filter(|(i, _)| day_bits & (1 << i) != 0)
                .map(|(_, day)| *day)
                .collect();

            let template = Session::new("acad-1", "T", from, t(10, 0), t(11, 0))
                .recurring(days, until);

            let once = dedupe_occurrences(expand_template(&template));
            let mut union = expand_template(&template);
            union.extend(expand_template(&template));
            let twice = dedupe_occurrences(union);

            let once_keys: Vec<OccurrenceKey> =
                once.iter().map(Session::occurrence_key).collect();
            let twice_keys: Vec<OccurrenceKey> =
                twice.iter().map(Session::occurrence_key).collect();
            prop_assert_eq!(once_keys, twice_keys);
        }
    }
}
