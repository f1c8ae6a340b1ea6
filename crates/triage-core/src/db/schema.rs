//! SQLite schema definition.

/// Visit log schema. Every statement is create-if-absent, so applying it to an
/// existing database leaves stored visits untouched.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Patient Visits (Append-Only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,        -- never reused
    name TEXT NOT NULL,
    age INTEGER NOT NULL CHECK (age >= 1),
    gender TEXT NOT NULL,
    contact_info TEXT NOT NULL DEFAULT '',
    symptoms TEXT NOT NULL DEFAULT '',           -- comma-joined symptom names
    predicted_disease TEXT NOT NULL,
    visit_date TEXT NOT NULL                     -- YYYY-MM-DD or YYYY-MM-DD HH:MM:SS
);

CREATE INDEX IF NOT EXISTS idx_patients_name_visit ON patients(name, visit_date);

-- Visits are never edited or removed
CREATE TRIGGER IF NOT EXISTS patients_no_update BEFORE UPDATE ON patients
BEGIN
    SELECT RAISE(ABORT, 'Visit records are immutable');
END;

CREATE TRIGGER IF NOT EXISTS patients_no_delete BEFORE DELETE ON patients
BEGIN
    SELECT RAISE(ABORT, 'Visit records cannot be deleted');
END;
"#;
