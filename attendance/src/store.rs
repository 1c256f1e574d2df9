use std::{
    collections::BTreeMap,
    fs, io,
    path::Path,
    sync::{Arc, RwLock},
};

use anyhow::{anyhow, Context};
use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::model::{AttendanceEntry, NewStudent, Student};

/// Storage the service reads records from and writes them to.
///
/// Every call acquires whatever it needs from the backing storage and
/// releases it before returning.
pub trait Store {
    fn students(&self) -> anyhow::Result<Vec<Student>>;

    fn student(&self, student_id: u32) -> anyhow::Result<Option<Student>>;

    /// Stores a new student under the next free id.
    fn insert_student(
        &self,
        student: NewStudent,
        created_at: NaiveDateTime,
    ) -> anyhow::Result<Student>;

    fn attendance_for(&self, student_id: u32) -> anyhow::Result<Vec<AttendanceEntry>>;

    fn attendance_on(&self, date: NaiveDate) -> anyhow::Result<Vec<AttendanceEntry>>;

    /// Inserts the entry, or replaces the status and remarks of the entry
    /// already stored for the same student and date.
    fn upsert_attendance(&self, entry: AttendanceEntry) -> anyhow::Result<()>;
}

/// In-memory tables, saved to and restored from a JSON snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Tables>>,
}

#[derive(Debug, Default)]
struct Tables {
    next_student_id: u32,
    students: BTreeMap<u32, Student>,
    attendance: BTreeMap<(u32, NaiveDate), AttendanceEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A missing file yields an empty store.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no snapshot at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read {}", path.display()))
            }
        };

        let snapshot: Snapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;

        Ok(Self {
            inner: Arc::new(RwLock::new(Tables::from(snapshot))),
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let snapshot = self.with_tables(|tables| Snapshot::from(tables))?;
        let content =
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    fn with_tables<T, F>(&self, f: F) -> anyhow::Result<T>
    where
        F: FnOnce(&Tables) -> T,
    {
        let tables = self
            .inner
            .read()
            .map_err(|_| anyhow!("attendance tables lock is poisoned"))?;
        Ok(f(&*tables))
    }

    fn with_tables_mut<T, F>(&self, f: F) -> anyhow::Result<T>
    where
        F: FnOnce(&mut Tables) -> T,
    {
        let mut tables = self
            .inner
            .write()
            .map_err(|_| anyhow!("attendance tables lock is poisoned"))?;
        Ok(f(&mut *tables))
    }
}

impl Store for MemoryStore {
    fn students(&self) -> anyhow::Result<Vec<Student>> {
        self.with_tables(|tables| tables.students.values().cloned().collect())
    }

    fn student(&self, student_id: u32) -> anyhow::Result<Option<Student>> {
        self.with_tables(|tables| tables.students.get(&student_id).cloned())
    }

    fn insert_student(
        &self,
        student: NewStudent,
        created_at: NaiveDateTime,
    ) -> anyhow::Result<Student> {
        self.with_tables_mut(|tables| {
            tables.next_student_id += 1;
            let student = Student {
                student_id: tables.next_student_id,
                name: student.name,
                roll_number: student.roll_number,
                class: student.class,
                email: student.email,
                created_at,
            };
            tables
                .students
                .insert(student.student_id, student.clone());
            student
        })
    }

    fn attendance_for(&self, student_id: u32) -> anyhow::Result<Vec<AttendanceEntry>> {
        self.with_tables(|tables| {
            tables
                .attendance
                .values()
                .filter(|entry| entry.student_id == student_id)
                .cloned()
                .collect()
        })
    }

    fn attendance_on(&self, date: NaiveDate) -> anyhow::Result<Vec<AttendanceEntry>> {
        self.with_tables(|tables| {
            tables
                .attendance
                .values()
                .filter(|entry| entry.date == date)
                .cloned()
                .collect()
        })
    }

    fn upsert_attendance(&self, entry: AttendanceEntry) -> anyhow::Result<()> {
        self.with_tables_mut(|tables| {
            tables
                .attendance
                .insert((entry.student_id, entry.date), entry);
        })
    }
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    students: Vec<Student>,
    attendance: Vec<AttendanceEntry>,
}

impl From<&Tables> for Snapshot {
    fn from(tables: &Tables) -> Self {
        Self {
            students: tables.students.values().cloned().collect(),
            attendance: tables.attendance.values().cloned().collect(),
        }
    }
}

impl From<Snapshot> for Tables {
    fn from(snapshot: Snapshot) -> Self {
        let next_student_id = snapshot
            .students
            .iter()
            .map(|student| student.student_id)
            .max()
            .unwrap_or_default();

        Self {
            next_student_id,
            students: snapshot
                .students
                .into_iter()
                .map(|student| (student.student_id, student))
                .collect(),
            attendance: snapshot
                .attendance
                .into_iter()
                .map(|entry| ((entry.student_id, entry.date), entry))
                .collect(),
        }
    }
}
