use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use derive_more::Display;
use record_sort::{FieldValue, Record};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: u32,
    pub name: String,
    pub roll_number: String,
    pub class: String,
    pub email: String,
    pub created_at: NaiveDateTime,
}

impl Record for Student {
    fn field(&self, key: &str) -> Option<FieldValue> {
        let value = match key {
            "student_id" => self.student_id.into(),
            "name" => self.name.as_str().into(),
            "roll_number" => self.roll_number.as_str().into(),
            "class" => self.class.as_str().into(),
            "email" => self.email.as_str().into(),
            "created_at" => self.created_at.into(),
            _ => return None,
        };
        Some(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub roll_number: String,
    pub class: String,
    pub email: String,
}

impl NewStudent {
    /// Returns the name of the first blank field, if any.
    pub fn blank_field(&self) -> Option<&'static str> {
        [
            ("name", &self.name),
            ("roll_number", &self.roll_number),
            ("class", &self.class),
            ("email", &self.email),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[display(fmt = "unknown attendance status `{}`", _0)]
pub struct ParseStatusError(String);

impl std::error::Error for ParseStatusError {}

impl FromStr for AttendanceStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "late" => Ok(AttendanceStatus::Late),
            _ => Err(ParseStatusError(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub student_id: u32,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub remarks: String,
}

impl Record for AttendanceEntry {
    fn field(&self, key: &str) -> Option<FieldValue> {
        let value = match key {
            "student_id" => self.student_id.into(),
            "date" => self.date.into(),
            "status" => self.status.to_string().into(),
            "remarks" => self.remarks.as_str().into(),
            _ => return None,
        };
        Some(value)
    }
}

/// An attendance entry joined with the student it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRow {
    #[serde(flatten)]
    pub entry: AttendanceEntry,
    pub name: String,
    pub roll_number: String,
    pub class: String,
}

impl AttendanceRow {
    pub fn new(entry: AttendanceEntry, student: &Student) -> Self {
        Self {
            entry,
            name: student.name.clone(),
            roll_number: student.roll_number.clone(),
            class: student.class.clone(),
        }
    }
}

impl Record for AttendanceRow {
    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "name" => Some(self.name.as_str().into()),
            "roll_number" => Some(self.roll_number.as_str().into()),
            "class" => Some(self.class.as_str().into()),
            _ => self.entry.field(key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub student_id: u32,
    pub name: String,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub total: usize,
    pub attendance_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_students: usize,
    pub present_today: usize,
    pub absent_today: usize,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use record_sort::{FieldValue, Record};
    use rstest::rstest;

    use super::{AttendanceEntry, AttendanceRow, AttendanceStatus, NewStudent, Student};

    fn student() -> Student {
        Student {
            student_id: 4,
            name: "Grace Hopper".to_string(),
            roll_number: "R-104".to_string(),
            class: "10A".to_string(),
            email: "grace@example.com".to_string(),
            created_at: NaiveDate::from_ymd_opt(2024, 1, 8)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        }
    }

    fn entry() -> AttendanceEntry {
        AttendanceEntry {
            student_id: 4,
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            status: AttendanceStatus::Late,
            remarks: "bus".to_string(),
        }
    }

    #[rstest]
    #[case("student_id", Some(FieldValue::Integer(4)))]
    #[case("name", Some(FieldValue::from("Grace Hopper")))]
    #[case("class", Some(FieldValue::from("10A")))]
    #[case("created_at", Some(FieldValue::from(student().created_at)))]
    #[case("status", None)]
    fn test_student_fields(#[case] key: &str, #[case] expected: Option<FieldValue>) {
        assert_eq!(student().field(key), expected);
    }

    #[test]
    fn test_joined_row_fields() {
        let row = AttendanceRow::new(entry(), &student());

        assert_eq!(row.field("name"), Some(FieldValue::from("Grace Hopper")));
        assert_eq!(row.field("status"), Some(FieldValue::from("Late")));
        assert_eq!(
            row.field("date").map(|value| value.to_string()),
            Some("2024-02-01".to_string())
        );
        assert_eq!(row.field("email"), None);
    }

    #[test]
    fn test_joined_row_serializes_flat() {
        let row = AttendanceRow::new(entry(), &student());

        let json = serde_json::to_value(&row).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "student_id": 4,
                "date": "2024-02-01",
                "status": "Late",
                "remarks": "bus",
                "name": "Grace Hopper",
                "roll_number": "R-104",
                "class": "10A"
            })
        );
    }

    #[rstest]
    #[case("present", Some(AttendanceStatus::Present))]
    #[case("Absent", Some(AttendanceStatus::Absent))]
    #[case("LATE", Some(AttendanceStatus::Late))]
    #[case("excused", None)]
    fn test_parsing_status(#[case] input: &str, #[case] expected: Option<AttendanceStatus>) {
        assert_eq!(input.parse::<AttendanceStatus>().ok(), expected);
    }

    #[test]
    fn test_blank_fields_are_detected() {
        let mut student = NewStudent {
            name: "Ada".to_string(),
            roll_number: "R-1".to_string(),
            class: "9C".to_string(),
            email: "ada@example.com".to_string(),
        };
        assert_eq!(student.blank_field(), None);

        student.class = "  ".to_string();
        assert_eq!(student.blank_field(), Some("class"));
    }
}
