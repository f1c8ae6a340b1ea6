//! Visit log database operations.

use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{split_symptoms, NewVisit, VisitRecord, VisitTimestamp};

const VISIT_COLUMNS: &str = r#"
    id, name, age, gender, contact_info, symptoms, predicted_disease, visit_date
"#;

impl Database {
    /// Append a visit and return its assigned identifier.
    ///
    /// The visit timestamp defaults to the current local time.
    pub fn insert_visit(&self, visit: &NewVisit) -> DbResult<i64> {
        if visit.age == 0 {
            return Err(DbError::Constraint("age must be at least 1".into()));
        }

        let visit_date = visit.visit_date.unwrap_or_else(VisitTimestamp::now);

        self.conn.execute(
            r#"
            INSERT INTO patients (
                name, age, gender, contact_info, symptoms, predicted_disease, visit_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                visit.name,
                visit.age,
                visit.gender.as_str(),
                visit.contact_info,
                visit.symptoms_text(),
                visit.predicted_disease,
                visit_date.to_string(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, visit_date = %visit_date, "visit recorded");
        Ok(id)
    }

    /// All visits for an exact (case-sensitive) name, most recent first.
    ///
    /// Visits sharing a timestamp are ordered by identifier, newest first.
    pub fn visits_by_name(&self, name: &str) -> DbResult<Vec<VisitRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {}
            FROM patients
            WHERE name = ?
            ORDER BY visit_date DESC, id DESC
            "#,
            VISIT_COLUMNS
        ))?;

        let rows = stmt.query_map([name], row_to_visit)?;
        let visits = rows.collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(count = visits.len(), "visit history loaded");
        Ok(visits)
    }

    /// Get a visit by identifier.
    pub fn get_visit(&self, id: i64) -> DbResult<Option<VisitRecord>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE id = ?", VISIT_COLUMNS),
                [id],
                row_to_visit,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Total number of stored visits.
    pub fn count_visits(&self) -> DbResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Highest identifier assigned so far, if any.
    pub fn last_visit_id(&self) -> DbResult<Option<i64>> {
        let id: Option<i64> = self
            .conn
            .query_row("SELECT MAX(id) FROM patients", [], |row| row.get(0))?;
        Ok(id)
    }
}

fn row_to_visit(row: &Row<'_>) -> rusqlite::Result<VisitRecord> {
    let gender: String = row.get(3)?;
    let symptoms: String = row.get(5)?;
    let visit_date: String = row.get(7)?;

    Ok(VisitRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        gender: gender
            .parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?,
        contact_info: row.get(4)?,
        symptoms: split_symptoms(&symptoms),
        predicted_disease: row.get(6)?,
        visit_date: visit_date
            .parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn visit(name: &str, date: &str) -> NewVisit {
        NewVisit::new(
            name,
            30,
            Gender::Male,
            "j@x.com",
            vec!["fever".into(), "cough".into(), "fatigue".into()],
            "Flu",
        )
        .with_visit_date(date.parse::<VisitTimestamp>().unwrap())
    }

    #[test]
    fn test_insert_and_query() {
        let db = setup_db();

        let id = db.insert_visit(&visit("John Doe", "2024-12-21")).unwrap();

        let visits = db.visits_by_name("John Doe").unwrap();
        assert_eq!(visits.len(), 1);

        let record = &visits[0];
        assert_eq!(record.id, id);
        assert_eq!(record.name, "John Doe");
        assert_eq!(record.age, 30);
        assert_eq!(record.gender, Gender::Male);
        assert_eq!(record.contact_info, "j@x.com");
        assert_eq!(record.symptoms_display(), "fever, cough, fatigue");
        assert_eq!(record.predicted_disease, "Flu");
        assert_eq!(record.visit_date.to_string(), "2024-12-21");
    }

    #[test]
    fn test_query_orders_most_recent_first() {
        let db = setup_db();

        db.insert_visit(&visit("Ann", "2024-01-05")).unwrap();
        db.insert_visit(&visit("Ann", "2024-03-01 08:00:00")).unwrap();
        db.insert_visit(&visit("Ann", "2023-11-30")).unwrap();
        db.insert_visit(&visit("Ann", "2024-03-01")).unwrap();

        let dates: Vec<String> = db
            .visits_by_name("Ann")
            .unwrap()
            .iter()
            .map(|v| v.visit_date.to_string())
            .collect();

        assert_eq!(
            dates,
            vec!["2024-03-01 08:00:00", "2024-03-01", "2024-01-05", "2023-11-30"]
        );
    }

    #[test]
    fn test_same_timestamp_newest_id_first() {
        let db = setup_db();

        let first = db.insert_visit(&visit("Ann", "2024-01-05")).unwrap();
        let second = db.insert_visit(&visit("Ann", "2024-01-05")).unwrap();

        let ids: Vec<i64> = db
            .visits_by_name("Ann")
            .unwrap()
            .iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn test_query_is_exact_match() {
        let db = setup_db();

        db.insert_visit(&visit("John Doe", "2024-12-21")).unwrap();
        db.insert_visit(&visit("John", "2024-12-21")).unwrap();
        db.insert_visit(&visit("john doe", "2024-12-21")).unwrap();

        let visits = db.visits_by_name("John Doe").unwrap();
        assert_eq!(visits.len(), 1);
        assert!(visits.iter().all(|v| v.name == "John Doe"));

        assert!(db.visits_by_name("Jane").unwrap().is_empty());
        assert!(db.visits_by_name("John%").unwrap().is_empty());
    }

    #[test]
    fn test_ids_strictly_increase() {
        let db = setup_db();

        let mut last = db.last_visit_id().unwrap().unwrap_or(0);
        for i in 0..5 {
            let id = db.insert_visit(&visit(&format!("P{}", i), "2024-01-01")).unwrap();
            assert!(id > last);
            last = id;
        }
        assert_eq!(db.count_visits().unwrap(), 5);
        assert_eq!(db.last_visit_id().unwrap(), Some(last));
    }

    #[test]
    fn test_default_timestamp_is_now() {
        let db = setup_db();

        let new_visit = NewVisit::new("Ann", 41, Gender::Female, "", vec![], "Flu");
        let id = db.insert_visit(&new_visit).unwrap();

        let stored = db.get_visit(id).unwrap().unwrap();
        assert!(matches!(stored.visit_date, VisitTimestamp::DateTime(_)));
        assert_eq!(stored.visit_date.date(), chrono::Local::now().date_naive());
        assert!(stored.symptoms.is_empty());
    }

    #[test]
    fn test_zero_age_rejected() {
        let db = setup_db();

        let mut new_visit = visit("Baby", "2024-01-01");
        new_visit.age = 0;

        assert!(matches!(
            db.insert_visit(&new_visit),
            Err(DbError::Constraint(_))
        ));
        assert_eq!(db.count_visits().unwrap(), 0);
    }

    #[test]
    fn test_unvalidated_symptoms_stored_verbatim() {
        let db = setup_db();

        let new_visit = NewVisit::new(
            "Ann",
            41,
            Gender::Other,
            "",
            vec!["not_in_vocabulary".into(), "high_fever".into()],
            "Flu",
        );
        let id = db.insert_visit(&new_visit).unwrap();

        let stored = db.get_visit(id).unwrap().unwrap();
        assert_eq!(stored.symptoms, vec!["not_in_vocabulary", "high_fever"]);
    }

    #[test]
    fn test_get_missing_visit() {
        let db = setup_db();
        assert!(db.get_visit(42).unwrap().is_none());
        assert_eq!(db.last_visit_id().unwrap(), None);
    }
}
