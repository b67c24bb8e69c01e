use crate::model::{
    Assignment, AssignmentStatus, AssignmentSubmission, Exam, ExamResult, Student,
    SubmissionStatus,
};
use crate::store::DataSource;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

pub const DEFAULT_TOP_PERFORMERS: usize = 5;

/// Two-decimal rounding, half away from zero (`f64::round` semantics).
pub fn round_off_2_decimals(x: f64) -> f64 {
    let scaled = x * 100.0;
    if !scaled.is_finite() {
        return x;
    }
    scaled.round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Bucket order used by the distribution chart, best first.
    pub const ALL: [Grade; 6] = [Grade::APlus, Grade::A, Grade::B, Grade::C, Grade::D, Grade::F];

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    pub fn parse(label: &str) -> Option<Grade> {
        Grade::ALL.into_iter().find(|g| g.as_str() == label)
    }

    /// 0 is the best tier.
    fn tier(self) -> usize {
        Grade::ALL.iter().position(|g| *g == self).unwrap_or(Grade::ALL.len() - 1)
    }
}

/// NaN and negatives fall through to F. Nothing is clamped above 100.
pub fn grade(percentage: f64) -> Grade {
    if percentage >= 90.0 {
        Grade::APlus
    } else if percentage >= 80.0 {
        Grade::A
    } else if percentage >= 70.0 {
        Grade::B
    } else if percentage >= 60.0 {
        Grade::C
    } else if percentage >= 50.0 {
        Grade::D
    } else {
        Grade::F
    }
}

/// Unrounded share of `total_marks`. Returns 0 when `total_marks` is not
/// positive or the ratio overflows.
pub fn raw_percentage(obtained_marks: f64, total_marks: f64) -> f64 {
    if total_marks <= 0.0 {
        return 0.0;
    }
    let pct = obtained_marks / total_marks * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

pub fn percentage(obtained_marks: f64, total_marks: f64) -> f64 {
    round_off_2_decimals(raw_percentage(obtained_marks, total_marks))
}

/// Stored percentage and grade for a mark. The grade comes from the
/// unrounded value so 89.996% stays an A.
pub fn score(obtained_marks: f64, total_marks: f64) -> (f64, Grade) {
    let raw = raw_percentage(obtained_marks, total_marks);
    (round_off_2_decimals(raw), grade(raw))
}

fn mean(sum: f64, n: usize) -> f64 {
    if n > 0 {
        sum / (n as f64)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CalcError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CalcError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPerformance {
    pub subject: String,
    pub exam: String,
    pub average: f64,
    pub total_marks: u32,
    pub percentage_of_total: f64,
}

pub fn subject_performance(exams: &[Exam], results: &[ExamResult]) -> Vec<SubjectPerformance> {
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for r in results {
        let e = sums.entry(r.exam_id.as_str()).or_insert((0.0, 0));
        e.0 += r.obtained_marks;
        e.1 += 1;
    }

    exams
        .iter()
        .map(|exam| {
            let (sum, n) = sums.get(exam.id.as_str()).copied().unwrap_or((0.0, 0));
            let avg = mean(sum, n);
            SubjectPerformance {
                subject: exam.subject.clone(),
                exam: exam.name.clone(),
                average: round_off_2_decimals(avg),
                total_marks: exam.total_marks,
                percentage_of_total: percentage(avg, f64::from(exam.total_marks)),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeBucket {
    pub grade: Grade,
    pub count: usize,
    pub percentage_share: f64,
}

/// Buckets by each result's stored grade label. Labels outside the six tiers
/// still count toward the denominator.
pub fn grade_distribution(results: &[ExamResult]) -> Vec<GradeBucket> {
    let mut counts = [0usize; 6];
    for r in results {
        if let Some(g) = Grade::parse(r.grade.trim()) {
            counts[g.tier()] += 1;
        }
    }
    let total = results.len();
    Grade::ALL
        .iter()
        .zip(counts)
        .map(|(g, count)| GradeBucket {
            grade: *g,
            count,
            percentage_share: if total > 0 {
                round_off_2_decimals(100.0 * count as f64 / total as f64)
            } else {
                0.0
            },
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPerformer {
    pub id: String,
    pub name: String,
    pub average_percentage: f64,
}

/// Students without results rank with 0. Ties keep roster order.
pub fn top_performers(
    students: &[Student],
    results: &[ExamResult],
    limit: usize,
) -> Vec<TopPerformer> {
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for r in results {
        let e = sums.entry(r.student_id.as_str()).or_insert((0.0, 0));
        e.0 += r.percentage;
        e.1 += 1;
    }

    let mut ranked: Vec<TopPerformer> = students
        .iter()
        .map(|s| {
            let (sum, n) = sums.get(s.id.as_str()).copied().unwrap_or((0.0, 0));
            TopPerformer {
                id: s.id.clone(),
                name: s.name.clone(),
                average_percentage: round_off_2_decimals(mean(sum, n)),
            }
        })
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| {
        b.average_percentage
            .partial_cmp(&a.average_percentage)
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(limit);
    ranked
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpectedBasis {
    /// Every student is expected to submit every assignment.
    #[default]
    Roster,
    /// Only the students listed in each assignment's `assignedTo`.
    AssignedTo,
}

pub fn parse_expected_basis(raw: Option<&serde_json::Value>) -> Result<ExpectedBasis, CalcError> {
    let Some(raw) = raw else {
        return Ok(ExpectedBasis::default());
    };
    if raw.is_null() {
        return Ok(ExpectedBasis::default());
    }
    match raw.as_str().map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("roster") => Ok(ExpectedBasis::Roster),
        Some("assignedto") => Ok(ExpectedBasis::AssignedTo),
        _ => Err(CalcError::new(
            "bad_params",
            "basis must be one of: roster, assignedTo",
        )
        .with_details(serde_json::json!({ "basis": raw }))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionStatusSummary {
    pub basis: ExpectedBasis,
    pub total_expected: usize,
    pub submitted_count: usize,
    /// Negative when submissions outnumber the expected count.
    pub pending_count: i64,
    pub on_time_count: usize,
    pub late_count: usize,
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, compared by calendar day.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let t = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(t, "%Y-%m-%d") {
        return Some(d);
    }
    DateTime::parse_from_rfc3339(t).ok().map(|dt| dt.date_naive())
}

pub fn assignment_submission_status(
    assignments: &[Assignment],
    students: &[Student],
    submissions: &[AssignmentSubmission],
    basis: ExpectedBasis,
) -> SubmissionStatusSummary {
    let total_expected = match basis {
        ExpectedBasis::Roster => assignments.len() * students.len(),
        ExpectedBasis::AssignedTo => assignments.iter().map(|a| a.assigned_to.len()).sum(),
    };
    let submitted_count = submissions.len();

    let due_by_id: HashMap<&str, Option<NaiveDate>> = assignments
        .iter()
        .map(|a| (a.id.as_str(), parse_calendar_date(&a.due_date)))
        .collect();
    let on_time_count = submissions
        .iter()
        .filter(|s| {
            let Some(Some(due)) = due_by_id.get(s.assignment_id.as_str()) else {
                return false;
            };
            parse_calendar_date(&s.submission_date)
                .map(|d| d <= *due)
                .unwrap_or(false)
        })
        .count();

    SubmissionStatusSummary {
        basis,
        total_expected,
        submitted_count,
        pending_count: total_expected as i64 - submitted_count as i64,
        on_time_count,
        late_count: submitted_count - on_time_count,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamBreakdownRow {
    pub result_id: String,
    pub student_id: String,
    pub name: String,
    pub marks: f64,
    pub percentage: f64,
    pub grade: String,
}

pub fn exam_breakdown(exam_id: &str, results: &[ExamResult]) -> Vec<ExamBreakdownRow> {
    results
        .iter()
        .filter(|r| r.exam_id == exam_id)
        .map(|r| ExamBreakdownRow {
            result_id: r.id.clone(),
            student_id: r.student_id.clone(),
            name: r.student_name.clone(),
            marks: r.obtained_marks,
            percentage: r.percentage,
            grade: r.grade.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_students: usize,
    pub active_assignments: usize,
    pub total_exams: usize,
    pub pending_submissions: usize,
    pub graded_submissions: usize,
    pub average_percentage: f64,
}

pub fn dashboard_summary<S: DataSource + ?Sized>(source: &S) -> DashboardSummary {
    let results = source.exam_results();
    let sum: f64 = results.iter().map(|r| r.percentage).sum();
    let graded_submissions = source
        .submissions()
        .iter()
        .filter(|s| s.status == SubmissionStatus::Graded)
        .count();
    DashboardSummary {
        total_students: source.students().len(),
        active_assignments: source
            .assignments()
            .iter()
            .filter(|a| a.status != AssignmentStatus::Completed)
            .count(),
        total_exams: source.exams().len(),
        pending_submissions: source.submissions().len() - graded_submissions,
        graded_submissions,
        average_percentage: round_off_2_decimals(mean(sum, results.len())),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsOverview {
    pub subject_performance: Vec<SubjectPerformance>,
    pub grade_distribution: Vec<GradeBucket>,
    pub top_performers: Vec<TopPerformer>,
    pub submission_status: SubmissionStatusSummary,
}

pub fn compute_overview<S: DataSource + ?Sized>(
    source: &S,
    limit: usize,
    basis: ExpectedBasis,
) -> AnalyticsOverview {
    AnalyticsOverview {
        subject_performance: subject_performance(source.exams(), source.exam_results()),
        grade_distribution: grade_distribution(source.exam_results()),
        top_performers: top_performers(source.students(), source.exam_results(), limit),
        submission_status: assignment_submission_status(
            source.assignments(),
            source.students(),
            source.submissions(),
            basis,
        ),
    }
}
