// crates/core/src/error.rs
use chrono::NaiveTime;
use thiserror::Error;

/// Errors raised while validating session input before it reaches storage.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid time of day {value:?}: expected \"HH:MM\"")]
    InvalidTime { value: String },

    #[error("Session end {end} is before its start {start}")]
    EndBeforeStart { start: NaiveTime, end: NaiveTime },

    #[error("Required field {field:?} is empty")]
    EmptyField { field: &'static str },

    #[error("Session {id} is a recurring template, not a scheduled occurrence")]
    TemplateNotSchedulable { id: String },

    #[error("Player {player_id} is not assigned to session {session_id}")]
    PlayerNotAssigned {
        session_id: String,
        player_id: String,
    },
}

impl ValidationError {
    pub fn empty(field: &'static str) -> Self {
        Self::EmptyField { field }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_time_display() {
        let err = ValidationError::InvalidTime {
            value: "25:99".to_string(),
        };
        assert!(err.to_string().contains("25:99"));
        assert!(err.to_string().contains("HH:MM"));
    }

    #[test]
    fn test_end_before_start_display() {
        let err = ValidationError::EndBeforeStart {
            start: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        };
        assert!(err.to_string().contains("11:00:00"));
        assert!(err.to_string().contains("10:00:00"));
    }

    #[test]
    fn test_empty_field_display() {
        let err = ValidationError::empty("academyId");
        assert!(err.to_string().contains("academyId"));
    }
}
