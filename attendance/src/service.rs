use std::collections::HashMap;

use chrono::{Days, NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use record_sort::{locate, sort, SortOrder};

use crate::{
    error::ServiceError,
    model::{
        AttendanceEntry, AttendanceRow, AttendanceStatus, AttendanceSummary, NewStudent, Stats,
        Student,
    },
    store::Store,
};

/// Student fields a listing may be sorted by. Anything else keeps storage order.
pub const SORTABLE_STUDENT_FIELDS: [&str; 3] = ["name", "roll_number", "class"];

/// How far back an attendance summary looks.
pub const SUMMARY_WINDOW_DAYS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Service<S> {
    store: S,
}

impl<S: Store> Service<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Filters students whose name, roll number or class contains `search`
    /// (ignoring case), then sorts them by `sort_by` when it is sortable.
    pub fn list_students(
        &self,
        search: &str,
        sort_by: &str,
        order: SortOrder,
    ) -> Result<Vec<Student>, ServiceError> {
        let mut students = self.store.students()?;

        if !search.is_empty() {
            let needle = search.to_lowercase();
            students.retain(|student| {
                [&student.name, &student.roll_number, &student.class]
                    .iter()
                    .any(|value| value.to_lowercase().contains(&needle))
            });
        }

        if !SORTABLE_STUDENT_FIELDS.contains(&sort_by) {
            debug!("`{}` is not sortable, keeping storage order", sort_by);
            return Ok(students);
        }

        Ok(sort(students, sort_by, order)?)
    }

    /// Runs the binary-probe locator over every student.
    pub fn locate_students(&self, key: &str, query: &str) -> Result<Vec<Student>, ServiceError> {
        let students = self.store.students()?;
        Ok(locate(students, key, query)?)
    }

    pub fn add_student(
        &self,
        student: NewStudent,
        created_at: NaiveDateTime,
    ) -> Result<Student, ServiceError> {
        if let Some(field) = student.blank_field() {
            return Err(ServiceError::BadClientData(format!(
                "`{field}` must not be blank"
            )));
        }

        let student = self.store.insert_student(student, created_at)?;
        info!(
            "added student {} ({})",
            student.student_id, student.roll_number
        );
        Ok(student)
    }

    /// Entries for `date` joined with their students, ordered by student id.
    pub fn attendance_on(&self, date: NaiveDate) -> Result<Vec<AttendanceRow>, ServiceError> {
        let students = self
            .store
            .students()?
            .into_iter()
            .map(|student| (student.student_id, student))
            .collect::<HashMap<_, _>>();

        let rows = self
            .store
            .attendance_on(date)?
            .into_iter()
            .filter_map(|entry| match students.get(&entry.student_id) {
                Some(student) => Some(AttendanceRow::new(entry, student)),
                None => {
                    warn!(
                        "skipping attendance on {} for unknown student {}",
                        entry.date, entry.student_id
                    );
                    None
                }
            })
            .collect::<Vec<_>>();

        Ok(sort(rows, "student_id", SortOrder::Ascending)?)
    }

    pub fn mark_attendance(&self, entry: AttendanceEntry) -> Result<(), ServiceError> {
        if self.store.student(entry.student_id)?.is_none() {
            return Err(ServiceError::NotFound);
        }

        info!(
            "marking student {} {} on {}",
            entry.student_id, entry.status, entry.date
        );
        self.store.upsert_attendance(entry)?;
        Ok(())
    }

    /// Every entry of a student, newest first.
    pub fn student_history(&self, student_id: u32) -> Result<Vec<AttendanceEntry>, ServiceError> {
        let entries = self.store.attendance_for(student_id)?;
        Ok(sort(entries, "date", SortOrder::Descending)?)
    }

    /// Status counts over entries dated within [`SUMMARY_WINDOW_DAYS`] before
    /// `today` or later.
    pub fn attendance_summary(
        &self,
        student_id: u32,
        today: NaiveDate,
    ) -> Result<AttendanceSummary, ServiceError> {
        let student = self
            .store
            .student(student_id)?
            .ok_or(ServiceError::NotFound)?;

        let since = today
            .checked_sub_days(Days::new(SUMMARY_WINDOW_DAYS))
            .unwrap_or(NaiveDate::MIN);
        let statuses = self
            .store
            .attendance_for(student_id)?
            .into_iter()
            .filter(|entry| entry.date >= since)
            .map(|entry| entry.status)
            .collect::<Vec<_>>();

        if statuses.is_empty() {
            warn!("no attendance for student {} since {}", student_id, since);
            return Err(ServiceError::NotFound);
        }

        let count = |status: AttendanceStatus| statuses.iter().filter(|s| **s == status).count();
        let present = count(AttendanceStatus::Present);
        let total = statuses.len();

        Ok(AttendanceSummary {
            student_id,
            name: student.name,
            present,
            absent: count(AttendanceStatus::Absent),
            late: count(AttendanceStatus::Late),
            total,
            attendance_percentage: present as f64 / total as f64 * 100.0,
        })
    }

    pub fn stats(&self, today: NaiveDate) -> Result<Stats, ServiceError> {
        let total_students = self.store.students()?.len();
        let today_entries = self.store.attendance_on(today)?;
        let count = |status: AttendanceStatus| {
            today_entries
                .iter()
                .filter(|entry| entry.status == status)
                .count()
        };

        Ok(Stats {
            total_students,
            present_today: count(AttendanceStatus::Present),
            absent_today: count(AttendanceStatus::Absent),
        })
    }
}
