use crate::calc;
use crate::model::{
    Assignment, AssignmentStatus, AssignmentSubmission, Exam, ExamResult, ExamType, Student,
    SubmissionStatus,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Read access to the current entity collections.
pub trait DataSource {
    fn students(&self) -> &[Student];
    fn exams(&self) -> &[Exam];
    fn exam_results(&self) -> &[ExamResult];
    fn assignments(&self) -> &[Assignment];
    fn submissions(&self) -> &[AssignmentSubmission];
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid {field}: {message}")]
    InvalidField { field: &'static str, message: String },

    #[error("submission already graded: {0}")]
    AlreadyGraded(String),

    #[error("duplicate {entity} id: {id}")]
    DuplicateId { entity: &'static str, id: String },
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "not_found",
            StoreError::InvalidField { .. } => "bad_params",
            StoreError::AlreadyGraded(_) => "already_graded",
            StoreError::DuplicateId { .. } => "duplicate_id",
        }
    }

    fn not_found(entity: &'static str, id: &str) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        StoreError::InvalidField {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub students: Vec<Student>,
    pub exams: Vec<Exam>,
    pub exam_results: Vec<ExamResult>,
    pub assignments: Vec<Assignment>,
    pub submissions: Vec<AssignmentSubmission>,
}

impl DataSource for Snapshot {
    fn students(&self) -> &[Student] {
        &self.students
    }
    fn exams(&self) -> &[Exam] {
        &self.exams
    }
    fn exam_results(&self) -> &[ExamResult] {
        &self.exam_results
    }
    fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }
    fn submissions(&self) -> &[AssignmentSubmission] {
        &self.submissions
    }
}

fn check_unique<'a, I>(entity: &'static str, ids: I) -> Result<(), StoreError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(StoreError::DuplicateId {
                entity,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

impl Snapshot {
    /// Ids must be unique within each collection. References between
    /// collections are not checked.
    pub fn validate(&self) -> Result<(), StoreError> {
        check_unique("student", self.students.iter().map(|s| s.id.as_str()))?;
        check_unique("exam", self.exams.iter().map(|e| e.id.as_str()))?;
        check_unique("result", self.exam_results.iter().map(|r| r.id.as_str()))?;
        check_unique("assignment", self.assignments.iter().map(|a| a.id.as_str()))?;
        check_unique("submission", self.submissions.iter().map(|s| s.id.as_str()))?;
        Ok(())
    }

    pub fn student(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn exam(&self, id: &str) -> Option<&Exam> {
        self.exams.iter().find(|e| e.id == id)
    }

    pub fn assignment(&self, id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub grade: String,
    pub section: String,
    pub roll_no: String,
    pub contact_number: String,
    pub address: String,
    pub date_of_birth: String,
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub grade: Option<String>,
    pub section: Option<String>,
    pub roll_no: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewExam {
    pub name: String,
    pub subject: String,
    pub date: String,
    pub total_marks: Option<u32>,
    pub exam_type: ExamType,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExamPatch {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub date: Option<String>,
    pub total_marks: Option<u32>,
    pub exam_type: Option<ExamType>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResult {
    pub exam_id: String,
    pub student_id: String,
    pub obtained_marks: f64,
    #[serde(default)]
    pub remarks: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResultPatch {
    pub obtained_marks: Option<f64>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewAssignment {
    pub title: String,
    pub subject: String,
    pub description: String,
    pub due_date: String,
    pub status: AssignmentStatus,
    pub total_marks: Option<u32>,
    pub assigned_to: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AssignmentPatch {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<AssignmentStatus>,
    pub total_marks: Option<u32>,
    pub assigned_to: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    pub assignment_id: String,
    pub student_id: String,
    pub submission_date: String,
}

#[derive(Debug, Clone)]
pub enum Action {
    CreateStudent { id: String, student: NewStudent },
    UpdateStudent { id: String, patch: StudentPatch },
    DeleteStudent { id: String },
    CreateExam { id: String, exam: NewExam },
    UpdateExam { id: String, patch: ExamPatch },
    DeleteExam { id: String },
    RecordResult { id: String, result: NewResult },
    UpdateResult { id: String, patch: ResultPatch },
    DeleteResult { id: String },
    CreateAssignment { id: String, assignment: NewAssignment },
    UpdateAssignment { id: String, patch: AssignmentPatch },
    DeleteAssignment { id: String },
    CreateSubmission { id: String, submission: NewSubmission },
    GradeSubmission {
        id: String,
        obtained_marks: f64,
        feedback: Option<String>,
    },
    DeleteSubmission { id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Applied {
    Created { id: String },
    Updated { id: String },
    /// `cascaded` counts dependent rows removed alongside the target.
    Deleted { id: String, cascaded: usize },
}

fn require_positive(field: &'static str, v: u32) -> Result<u32, StoreError> {
    if v == 0 {
        return Err(StoreError::invalid(field, "must be greater than 0"));
    }
    Ok(v)
}

fn score(obtained_marks: f64, total_marks: u32) -> (f64, String) {
    let (pct, grade) = calc::score(obtained_marks, f64::from(total_marks));
    (pct, grade.as_str().to_string())
}

fn position<T>(
    items: &[T],
    entity: &'static str,
    id: &str,
    key: impl Fn(&T) -> &str,
) -> Result<usize, StoreError> {
    items
        .iter()
        .position(|it| key(it) == id)
        .ok_or_else(|| StoreError::not_found(entity, id))
}

/// Applies one action to `state` and returns the next snapshot. `state` is
/// never modified; on error nothing changes.
pub fn reduce(state: &Snapshot, action: Action) -> Result<(Snapshot, Applied), StoreError> {
    let mut next = state.clone();
    let applied = match action {
        Action::CreateStudent { id, student } => {
            let name = student.name.trim().to_string();
            if name.is_empty() {
                return Err(StoreError::invalid("name", "must not be empty"));
            }
            next.students.push(Student {
                id: id.clone(),
                name,
                email: student.email,
                grade: student.grade,
                section: student.section,
                roll_no: student.roll_no,
                contact_number: student.contact_number,
                address: student.address,
                date_of_birth: student.date_of_birth,
                gender: student.gender.unwrap_or_else(|| "Male".to_string()),
            });
            Applied::Created { id }
        }
        Action::UpdateStudent { id, patch } => {
            let idx = position(&next.students, "student", &id, |s| s.id.as_str())?;
            let s = &mut next.students[idx];
            if let Some(v) = patch.name {
                let v = v.trim().to_string();
                if v.is_empty() {
                    return Err(StoreError::invalid("name", "must not be empty"));
                }
                s.name = v;
            }
            if let Some(v) = patch.email {
                s.email = v;
            }
            if let Some(v) = patch.grade {
                s.grade = v;
            }
            if let Some(v) = patch.section {
                s.section = v;
            }
            if let Some(v) = patch.roll_no {
                s.roll_no = v;
            }
            if let Some(v) = patch.contact_number {
                s.contact_number = v;
            }
            if let Some(v) = patch.address {
                s.address = v;
            }
            if let Some(v) = patch.date_of_birth {
                s.date_of_birth = v;
            }
            if let Some(v) = patch.gender {
                s.gender = v;
            }
            Applied::Updated { id }
        }
        Action::DeleteStudent { id } => {
            let idx = position(&next.students, "student", &id, |s| s.id.as_str())?;
            next.students.remove(idx);
            Applied::Deleted { id, cascaded: 0 }
        }
        Action::CreateExam { id, exam } => {
            let total_marks = require_positive("totalMarks", exam.total_marks.unwrap_or(100))?;
            next.exams.push(Exam {
                id: id.clone(),
                name: exam.name,
                subject: exam.subject,
                date: exam.date,
                total_marks,
                exam_type: exam.exam_type,
            });
            Applied::Created { id }
        }
        Action::UpdateExam { id, patch } => {
            let idx = position(&next.exams, "exam", &id, |e| e.id.as_str())?;
            let e = &mut next.exams[idx];
            if let Some(v) = patch.name {
                e.name = v;
            }
            if let Some(v) = patch.subject {
                e.subject = v;
            }
            if let Some(v) = patch.date {
                e.date = v;
            }
            if let Some(v) = patch.exam_type {
                e.exam_type = v;
            }
            if let Some(v) = patch.total_marks {
                let total_marks = require_positive("totalMarks", v)?;
                if total_marks != e.total_marks {
                    e.total_marks = total_marks;
                    for r in next.exam_results.iter_mut().filter(|r| r.exam_id == id) {
                        (r.percentage, r.grade) = score(r.obtained_marks, total_marks);
                    }
                }
            }
            Applied::Updated { id }
        }
        Action::DeleteExam { id } => {
            let idx = position(&next.exams, "exam", &id, |e| e.id.as_str())?;
            next.exams.remove(idx);
            let before = next.exam_results.len();
            next.exam_results.retain(|r| r.exam_id != id);
            let cascaded = before - next.exam_results.len();
            Applied::Deleted { id, cascaded }
        }
        Action::RecordResult { id, result } => {
            let exam = state
                .exam(&result.exam_id)
                .ok_or_else(|| StoreError::not_found("exam", &result.exam_id))?;
            let student = state
                .student(&result.student_id)
                .ok_or_else(|| StoreError::not_found("student", &result.student_id))?;
            let (percentage, grade) = score(result.obtained_marks, exam.total_marks);
            next.exam_results.push(ExamResult {
                id: id.clone(),
                exam_id: exam.id.clone(),
                student_id: student.id.clone(),
                student_name: student.name.clone(),
                obtained_marks: result.obtained_marks,
                percentage,
                grade,
                remarks: result.remarks,
            });
            Applied::Created { id }
        }
        Action::UpdateResult { id, patch } => {
            let idx = position(&next.exam_results, "result", &id, |r| r.id.as_str())?;
            if let Some(marks) = patch.obtained_marks {
                let r = &next.exam_results[idx];
                let total_marks = state
                    .exam(&r.exam_id)
                    .map(|e| e.total_marks)
                    .ok_or_else(|| StoreError::not_found("exam", &r.exam_id))?;
                let r = &mut next.exam_results[idx];
                r.obtained_marks = marks;
                (r.percentage, r.grade) = score(marks, total_marks);
            }
            if let Some(v) = patch.remarks {
                next.exam_results[idx].remarks = v;
            }
            Applied::Updated { id }
        }
        Action::DeleteResult { id } => {
            let idx = position(&next.exam_results, "result", &id, |r| r.id.as_str())?;
            next.exam_results.remove(idx);
            Applied::Deleted { id, cascaded: 0 }
        }
        Action::CreateAssignment { id, assignment } => {
            let total_marks =
                require_positive("totalMarks", assignment.total_marks.unwrap_or(100))?;
            next.assignments.push(Assignment {
                id: id.clone(),
                title: assignment.title,
                subject: assignment.subject,
                description: assignment.description,
                due_date: assignment.due_date,
                status: assignment.status,
                total_marks,
                assigned_to: assignment.assigned_to,
            });
            Applied::Created { id }
        }
        Action::UpdateAssignment { id, patch } => {
            let idx = position(&next.assignments, "assignment", &id, |a| a.id.as_str())?;
            let a = &mut next.assignments[idx];
            if let Some(v) = patch.title {
                a.title = v;
            }
            if let Some(v) = patch.subject {
                a.subject = v;
            }
            if let Some(v) = patch.description {
                a.description = v;
            }
            if let Some(v) = patch.due_date {
                a.due_date = v;
            }
            if let Some(v) = patch.status {
                a.status = v;
            }
            if let Some(v) = patch.total_marks {
                a.total_marks = require_positive("totalMarks", v)?;
            }
            if let Some(v) = patch.assigned_to {
                a.assigned_to = v;
            }
            Applied::Updated { id }
        }
        Action::DeleteAssignment { id } => {
            let idx = position(&next.assignments, "assignment", &id, |a| a.id.as_str())?;
            next.assignments.remove(idx);
            let before = next.submissions.len();
            next.submissions.retain(|s| s.assignment_id != id);
            let cascaded = before - next.submissions.len();
            Applied::Deleted { id, cascaded }
        }
        Action::CreateSubmission { id, submission } => {
            let assignment = state
                .assignment(&submission.assignment_id)
                .ok_or_else(|| StoreError::not_found("assignment", &submission.assignment_id))?;
            let student = state
                .student(&submission.student_id)
                .ok_or_else(|| StoreError::not_found("student", &submission.student_id))?;
            next.submissions.push(AssignmentSubmission {
                id: id.clone(),
                assignment_id: assignment.id.clone(),
                student_id: student.id.clone(),
                student_name: student.name.clone(),
                submission_date: submission.submission_date,
                status: SubmissionStatus::Pending,
                obtained_marks: None,
                feedback: None,
            });
            Applied::Created { id }
        }
        Action::GradeSubmission {
            id,
            obtained_marks,
            feedback,
        } => {
            let idx = position(&next.submissions, "submission", &id, |s| s.id.as_str())?;
            let s = &mut next.submissions[idx];
            if s.status == SubmissionStatus::Graded {
                return Err(StoreError::AlreadyGraded(id));
            }
            s.status = SubmissionStatus::Graded;
            s.obtained_marks = Some(obtained_marks);
            s.feedback = feedback;
            Applied::Updated { id }
        }
        Action::DeleteSubmission { id } => {
            let idx = position(&next.submissions, "submission", &id, |s| s.id.as_str())?;
            next.submissions.remove(idx);
            Applied::Deleted { id, cascaded: 0 }
        }
    };
    Ok((next, applied))
}
