/// Inline SQL migrations for the pitchside database schema.
///
/// We use simple inline migrations rather than sqlx migration files
/// because the schema is small and self-contained.
pub const MIGRATIONS: &[&str] = &[
    // Migration 1: sessions table. Templates and occurrences share it;
    // map- and list-shaped fields are stored as JSON text.
    r#"
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    academy_id TEXT NOT NULL,
    name TEXT NOT NULL,
    category TEXT,
    date TEXT NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    coaches TEXT NOT NULL DEFAULT '[]',
    players TEXT NOT NULL DEFAULT '[]',
    attendance TEXT NOT NULL DEFAULT '{}',
    player_metrics TEXT NOT NULL DEFAULT '{}',
    status TEXT NOT NULL DEFAULT 'Upcoming',
    is_recurring BOOLEAN NOT NULL DEFAULT 0,
    selected_days TEXT NOT NULL DEFAULT '[]',
    recurring_end_date TEXT,
    parent_session_id TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
"#,
    // Migration 2: sessions indexes
    r#"
CREATE INDEX IF NOT EXISTS idx_sessions_academy_date ON sessions(academy_id, date, start_time);
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_sessions_parent ON sessions(parent_session_id);
"#,
    // Migration 3: players table (performance records)
    r#"
CREATE TABLE IF NOT EXISTS players (
    id TEXT PRIMARY KEY,
    attributes TEXT NOT NULL DEFAULT '{}',
    performance_history TEXT NOT NULL DEFAULT '[]',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
"#,
];
