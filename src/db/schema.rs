//! SQL schema definitions

pub const SCHEMA: &str = r#"
-- Therapy sessions, one per profile
CREATE TABLE IF NOT EXISTS therapy_sessions (
    id TEXT PRIMARY KEY,
    profile TEXT NOT NULL UNIQUE,
    start_date TEXT NOT NULL,
    maintenance_dose INTEGER NOT NULL,
    reminder_time TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Daily dose records, one per session and calendar day
CREATE TABLE IF NOT EXISTS doses (
    id TEXT PRIMARY KEY,
    therapy_session_id TEXT NOT NULL,
    date TEXT NOT NULL,
    taken INTEGER NOT NULL DEFAULT 0,
    dose_count INTEGER,
    concentration TEXT,
    notes TEXT,
    prescribed_clicks INTEGER,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (therapy_session_id, date),
    FOREIGN KEY (therapy_session_id) REFERENCES therapy_sessions(id) ON DELETE CASCADE
);

-- Side effects attached to a dose record
CREATE TABLE IF NOT EXISTS side_effects (
    id TEXT PRIMARY KEY,
    dose_record_id TEXT NOT NULL,
    date TEXT NOT NULL,
    kind TEXT NOT NULL,
    severity TEXT NOT NULL,
    description TEXT,
    created_at TEXT NOT NULL,
    FOREIGN KEY (dose_record_id) REFERENCES doses(id) ON DELETE CASCADE
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_doses_session_date ON doses(therapy_session_id, date);
CREATE INDEX IF NOT EXISTS idx_side_effects_dose ON side_effects(dose_record_id);
"#;
