use std::path::PathBuf;

use anyhow::Context;
use attendance::{
    model::{AttendanceEntry, AttendanceStatus, NewStudent},
    MemoryStore, Service,
};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use log::info;
use record_sort::SortOrder;
use serde::Serialize;
use serde_json::{json, Value};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let service = Service::new(MemoryStore::load(&args.data)?);

    let outcome = run(&service, args.command)?;
    if outcome.mutated {
        service.store().save(&args.data)?;
        info!("saved snapshot to {}", args.data.display());
    }

    let output =
        serde_json::to_string_pretty(&outcome.body).context("Failed to serialize the output")?;
    println!("{output}");

    Ok(())
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON snapshot holding students and attendance
    #[arg(long, env = "ATTENDANCE_DATA", default_value = "attendance.json")]
    data: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(subcommand)]
    Students(StudentsCommand),
    #[command(subcommand)]
    Attendance(AttendanceCommand),
    /// Student count and today's present/absent totals
    Stats {
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

#[derive(Subcommand, Debug)]
enum StudentsCommand {
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "name")]
        sort_by: String,
        #[arg(long, default_value_t = SortOrder::Ascending)]
        order: SortOrder,
    },
    /// Binary-probe lookup; may miss matches a full scan would find
    Locate {
        #[arg(long)]
        key: String,
        #[arg(long, default_value = "")]
        query: String,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        roll_number: String,
        #[arg(long)]
        class: String,
        #[arg(long)]
        email: String,
    },
}

#[derive(Subcommand, Debug)]
enum AttendanceCommand {
    On {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Mark {
        #[arg(long)]
        student_id: u32,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        status: AttendanceStatus,
        #[arg(long, default_value = "")]
        remarks: String,
    },
    History {
        #[arg(long)]
        student_id: u32,
    },
    Summary {
        #[arg(long)]
        student_id: u32,
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

struct Outcome {
    body: Value,
    mutated: bool,
}

impl Outcome {
    fn read(body: impl Serialize) -> anyhow::Result<Self> {
        let body = serde_json::to_value(body).context("Failed to serialize the result")?;
        Ok(Self {
            body,
            mutated: false,
        })
    }

    fn write(body: Value) -> anyhow::Result<Self> {
        Ok(Self {
            body,
            mutated: true,
        })
    }
}

fn run(service: &Service<MemoryStore>, command: Command) -> anyhow::Result<Outcome> {
    let today = Local::now().date_naive();

    match command {
        Command::Students(StudentsCommand::List {
            search,
            sort_by,
            order,
        }) => Outcome::read(service.list_students(&search, &sort_by, order)?),
        Command::Students(StudentsCommand::Locate { key, query }) => {
            Outcome::read(service.locate_students(&key, &query)?)
        }
        Command::Students(StudentsCommand::Add {
            name,
            roll_number,
            class,
            email,
        }) => {
            let student = service.add_student(
                NewStudent {
                    name,
                    roll_number,
                    class,
                    email,
                },
                Local::now().naive_local(),
            )?;
            Outcome::write(json!({
                "message": "Student added successfully",
                "student": student,
            }))
        }
        Command::Attendance(AttendanceCommand::On { date }) => {
            Outcome::read(service.attendance_on(date.unwrap_or(today))?)
        }
        Command::Attendance(AttendanceCommand::Mark {
            student_id,
            date,
            status,
            remarks,
        }) => {
            service.mark_attendance(AttendanceEntry {
                student_id,
                date: date.unwrap_or(today),
                status,
                remarks,
            })?;
            Outcome::write(json!({ "message": "Attendance marked successfully" }))
        }
        Command::Attendance(AttendanceCommand::History { student_id }) => {
            Outcome::read(service.student_history(student_id)?)
        }
        Command::Attendance(AttendanceCommand::Summary { student_id, today: day }) => {
            Outcome::read(service.attendance_summary(student_id, day.unwrap_or(today))?)
        }
        Command::Stats { today: day } => Outcome::read(service.stats(day.unwrap_or(today))?),
    }
}
