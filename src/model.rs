use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub grade: String,
    pub section: String,
    pub roll_no: String,
    pub contact_number: String,
    pub address: String,
    pub date_of_birth: String,
    pub gender: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamType {
    Quiz,
    #[default]
    Midterm,
    Final,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: String,
    pub name: String,
    pub subject: String,
    pub date: String,
    pub total_marks: u32,
    pub exam_type: ExamType,
}

/// `student_name`, `percentage` and `grade` are captured when the result is
/// recorded. The name is never refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub id: String,
    pub exam_id: String,
    pub student_id: String,
    pub student_name: String,
    pub obtained_marks: f64,
    pub percentage: f64,
    pub grade: String,
    #[serde(default)]
    pub remarks: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    #[default]
    Upcoming,
    Ongoing,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub description: String,
    pub due_date: String,
    pub status: AssignmentStatus,
    pub total_marks: u32,
    #[serde(default)]
    pub assigned_to: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Graded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentSubmission {
    pub id: String,
    pub assignment_id: String,
    pub student_id: String,
    pub student_name: String,
    pub submission_date: String,
    pub status: SubmissionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obtained_marks: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

impl Student {
    pub fn matches_search(&self, needle_lower: &str) -> bool {
        contains_ci(&self.name, needle_lower)
            || contains_ci(&self.email, needle_lower)
            || contains_ci(&self.roll_no, needle_lower)
    }
}

impl Exam {
    pub fn matches_search(&self, needle_lower: &str) -> bool {
        contains_ci(&self.name, needle_lower) || contains_ci(&self.subject, needle_lower)
    }
}

impl Assignment {
    pub fn matches_search(&self, needle_lower: &str) -> bool {
        contains_ci(&self.title, needle_lower) || contains_ci(&self.subject, needle_lower)
    }
}
