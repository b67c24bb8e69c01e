use crate::config::{AppConfig, SeedMode};
use crate::model::{
    Assignment, AssignmentStatus, AssignmentSubmission, Exam, ExamResult, ExamType, Student,
    SubmissionStatus,
};
use crate::store::Snapshot;
use anyhow::Context;
use std::path::Path;

pub fn initial_snapshot(cfg: &AppConfig) -> anyhow::Result<Snapshot> {
    if let Some(path) = cfg.seed_file.as_deref() {
        return load_snapshot_file(path);
    }
    Ok(match cfg.seed {
        SeedMode::Mock => mock_snapshot(),
        SeedMode::Empty => Snapshot::default(),
    })
}

pub fn load_snapshot_file(path: &Path) -> anyhow::Result<Snapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read seed file {}", path.to_string_lossy()))?;
    let snapshot: Snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("invalid seed file {}", path.to_string_lossy()))?;
    snapshot
        .validate()
        .with_context(|| format!("inconsistent seed file {}", path.to_string_lossy()))?;
    Ok(snapshot)
}

#[allow(clippy::too_many_arguments)]
fn student(
    id: &str,
    name: &str,
    email: &str,
    grade: &str,
    section: &str,
    roll_no: &str,
    contact_number: &str,
    address: &str,
    date_of_birth: &str,
    gender: &str,
) -> Student {
    Student {
        id: id.into(),
        name: name.into(),
        email: email.into(),
        grade: grade.into(),
        section: section.into(),
        roll_no: roll_no.into(),
        contact_number: contact_number.into(),
        address: address.into(),
        date_of_birth: date_of_birth.into(),
        gender: gender.into(),
    }
}

fn assignment(
    id: &str,
    title: &str,
    subject: &str,
    description: &str,
    due_date: &str,
    total_marks: u32,
    assigned_to: &[&str],
) -> Assignment {
    Assignment {
        id: id.into(),
        title: title.into(),
        subject: subject.into(),
        description: description.into(),
        due_date: due_date.into(),
        status: AssignmentStatus::Upcoming,
        total_marks,
        assigned_to: assigned_to.iter().map(|s| s.to_string()).collect(),
    }
}

fn exam(
    id: &str,
    name: &str,
    subject: &str,
    date: &str,
    total_marks: u32,
    exam_type: ExamType,
) -> Exam {
    Exam {
        id: id.into(),
        name: name.into(),
        subject: subject.into(),
        date: date.into(),
        total_marks,
        exam_type,
    }
}

#[allow(clippy::too_many_arguments)]
fn result(
    id: &str,
    exam_id: &str,
    student_id: &str,
    student_name: &str,
    obtained_marks: f64,
    percentage: f64,
    grade: &str,
    remarks: &str,
) -> ExamResult {
    ExamResult {
        id: id.into(),
        exam_id: exam_id.into(),
        student_id: student_id.into(),
        student_name: student_name.into(),
        obtained_marks,
        percentage,
        grade: grade.into(),
        remarks: remarks.into(),
    }
}

/// Demo roster the dashboard ships with. Stored grades are kept exactly as
/// entered, including the legacy "B+" labels.
pub fn mock_snapshot() -> Snapshot {
    let students = vec![
        student(
            "1",
            "John Doe",
            "john.doe@example.com",
            "10",
            "A",
            "10A01",
            "123-456-7890",
            "123 Main St, Anytown",
            "2005-05-15",
            "Male",
        ),
        student(
            "2",
            "Jane Smith",
            "jane.smith@example.com",
            "10",
            "A",
            "10A02",
            "123-456-7891",
            "456 Oak St, Anytown",
            "2005-08-22",
            "Female",
        ),
        student(
            "3",
            "Michael Johnson",
            "michael.johnson@example.com",
            "10",
            "B",
            "10B01",
            "123-456-7892",
            "789 Pine St, Anytown",
            "2005-03-10",
            "Male",
        ),
        student(
            "4",
            "Emily Brown",
            "emily.brown@example.com",
            "10",
            "B",
            "10B02",
            "123-456-7893",
            "101 Elm St, Anytown",
            "2005-11-27",
            "Female",
        ),
        student(
            "5",
            "David Wilson",
            "david.wilson@example.com",
            "11",
            "A",
            "11A01",
            "123-456-7894",
            "202 Cedar St, Anytown",
            "2004-07-14",
            "Male",
        ),
    ];

    let assignments = vec![
        assignment(
            "1",
            "Math Problem Set",
            "Mathematics",
            "Complete problems 1-20 from Chapter 5",
            "2025-05-25",
            50,
            &["1", "2", "3", "4", "5"],
        ),
        assignment(
            "2",
            "Science Lab Report",
            "Science",
            "Write a lab report for the plant growth experiment",
            "2025-05-28",
            100,
            &["1", "2", "3", "4", "5"],
        ),
        assignment(
            "3",
            "History Essay",
            "History",
            "Write a 1000-word essay on the Industrial Revolution",
            "2025-06-05",
            75,
            &["1", "2", "5"],
        ),
        assignment(
            "4",
            "English Book Report",
            "English",
            "Write a book report on 'To Kill a Mockingbird'",
            "2025-06-10",
            60,
            &["3", "4", "5"],
        ),
    ];

    let submissions = vec![
        AssignmentSubmission {
            id: "1".into(),
            assignment_id: "1".into(),
            student_id: "1".into(),
            student_name: "John Doe".into(),
            submission_date: "2025-05-24".into(),
            status: SubmissionStatus::Graded,
            obtained_marks: Some(45.0),
            feedback: Some("Excellent work. Clear presentation of solutions.".into()),
        },
        AssignmentSubmission {
            id: "2".into(),
            assignment_id: "1".into(),
            student_id: "2".into(),
            student_name: "Jane Smith".into(),
            submission_date: "2025-05-23".into(),
            status: SubmissionStatus::Graded,
            obtained_marks: Some(48.0),
            feedback: Some("Outstanding! All problems correctly solved.".into()),
        },
        AssignmentSubmission {
            id: "3".into(),
            assignment_id: "2".into(),
            student_id: "1".into(),
            student_name: "John Doe".into(),
            submission_date: "2025-05-27".into(),
            status: SubmissionStatus::Pending,
            obtained_marks: None,
            feedback: None,
        },
    ];

    let exams = vec![
        exam("1", "Mid-Term Mathematics", "Mathematics", "2025-05-15", 100, ExamType::Midterm),
        exam("2", "Science Quiz 1", "Science", "2025-05-10", 50, ExamType::Quiz),
        exam("3", "English Literature Test", "English", "2025-05-18", 75, ExamType::Midterm),
        exam("4", "History Midterm", "History", "2025-05-20", 100, ExamType::Midterm),
    ];

    let exam_results = vec![
        result("1", "1", "1", "John Doe", 85.0, 85.0, "A", "Excellent performance"),
        result("2", "1", "2", "Jane Smith", 92.0, 92.0, "A+", "Outstanding"),
        result("3", "1", "3", "Michael Johnson", 78.0, 78.0, "B+", "Good work"),
        result("4", "1", "4", "Emily Brown", 88.0, 88.0, "A", "Very good"),
        result("5", "2", "1", "John Doe", 42.0, 84.0, "B+", "Good performance"),
        result("6", "2", "2", "Jane Smith", 46.0, 92.0, "A+", "Excellent"),
    ];

    Snapshot {
        students,
        exams,
        exam_results,
        assignments,
        submissions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(prefix: &str, body: &str) -> std::path::PathBuf {
        let p = std::env::temp_dir().join(format!("{}-{}.json", prefix, uuid::Uuid::new_v4()));
        std::fs::write(&p, body).expect("write temp file");
        p
    }

    #[test]
    fn mock_snapshot_is_consistent() {
        let s = mock_snapshot();
        s.validate().expect("unique ids");
        assert_eq!(s.students.len(), 5);
        assert_eq!(s.exams.len(), 4);
        assert_eq!(s.exam_results.len(), 6);
        assert_eq!(s.assignments.len(), 4);
        assert_eq!(s.submissions.len(), 3);
        assert!(s
            .exam_results
            .iter()
            .all(|r| s.exam(&r.exam_id).is_some() && s.student(&r.student_id).is_some()));
    }

    #[test]
    fn seed_file_round_trips_through_loader() {
        let body = serde_json::to_string(&mock_snapshot()).expect("serialize");
        let p = temp_file("edutrack-seed", &body);
        let loaded = load_snapshot_file(&p).expect("load");
        assert_eq!(loaded, mock_snapshot());
        let _ = std::fs::remove_file(p);
    }

    #[test]
    fn seed_file_with_duplicate_ids_is_rejected() {
        let p = temp_file(
            "edutrack-seed-dup",
            r#"{"exams":[
                {"id":"1","name":"A","subject":"S","date":"2025-01-01",
                 "totalMarks":10,"examType":"quiz"},
                {"id":"1","name":"B","subject":"S","date":"2025-01-02",
                 "totalMarks":10,"examType":"final"}
            ]}"#,
        );
        let err = load_snapshot_file(&p).expect_err("duplicate");
        assert!(format!("{err:#}").contains("duplicate exam id"));
        let _ = std::fs::remove_file(p);
    }
}
