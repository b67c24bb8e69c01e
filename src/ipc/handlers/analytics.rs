use crate::calc;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{optional_limit, required_f64, required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn parse_basis(req: &Request) -> Result<calc::ExpectedBasis, serde_json::Value> {
    calc::parse_expected_basis(req.params.get("basis"))
        .map_err(|e| err(&req.id, &e.code, e.message, e.details))
}

fn to_json<T: serde::Serialize>(
    req: &Request,
    value: &T,
) -> Result<serde_json::Value, serde_json::Value> {
    serde_json::to_value(value).map_err(|e| err(&req.id, "serialize_failed", e.to_string(), None))
}

fn handle_grade(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let pct = match required_f64(req, "percentage") {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(&req.id, json!({ "grade": calc::grade(pct).as_str() }))
}

fn handle_percentage(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let obtained = match required_f64(req, "obtainedMarks") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let total = match required_f64(req, "totalMarks") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let (pct, grade) = calc::score(obtained, total);
    ok(&req.id, json!({ "percentage": pct, "grade": grade.as_str() }))
}

fn handle_subject_performance(state: &mut AppState, req: &Request) -> serde_json::Value {
    let s = &state.snapshot;
    let rows = calc::subject_performance(&s.exams, &s.exam_results);
    match to_json(req, &rows) {
        Ok(rows) => ok(&req.id, json!({ "rows": rows })),
        Err(e) => e,
    }
}

fn handle_grade_distribution(state: &mut AppState, req: &Request) -> serde_json::Value {
    let buckets = calc::grade_distribution(&state.snapshot.exam_results);
    match to_json(req, &buckets) {
        Ok(buckets) => ok(
            &req.id,
            json!({ "totalResults": state.snapshot.exam_results.len(), "buckets": buckets }),
        ),
        Err(e) => e,
    }
}

fn handle_top_performers(state: &mut AppState, req: &Request) -> serde_json::Value {
    let limit = match optional_limit(req, state.top_performers_limit) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let s = &state.snapshot;
    let performers = calc::top_performers(&s.students, &s.exam_results, limit);
    match to_json(req, &performers) {
        Ok(performers) => ok(&req.id, json!({ "limit": limit, "performers": performers })),
        Err(e) => e,
    }
}

fn handle_submission_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    let basis = match parse_basis(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let s = &state.snapshot;
    let summary =
        calc::assignment_submission_status(&s.assignments, &s.students, &s.submissions, basis);
    match to_json(req, &summary) {
        Ok(v) => ok(&req.id, v),
        Err(e) => e,
    }
}

fn handle_exam_breakdown(state: &mut AppState, req: &Request) -> serde_json::Value {
    let exam_id = match required_str(req, "examId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(exam) = state.snapshot.exam(&exam_id) else {
        return err(
            &req.id,
            "not_found",
            "exam not found",
            Some(json!({ "examId": exam_id })),
        );
    };
    let rows = calc::exam_breakdown(&exam_id, &state.snapshot.exam_results);
    match to_json(req, &rows) {
        Ok(rows) => ok(&req.id, json!({ "exam": exam, "rows": rows })),
        Err(e) => e,
    }
}

fn handle_overview(state: &mut AppState, req: &Request) -> serde_json::Value {
    let limit = match optional_limit(req, state.top_performers_limit) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let basis = match parse_basis(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let overview = calc::compute_overview(&state.snapshot, limit, basis);
    match to_json(req, &overview) {
        Ok(v) => ok(&req.id, v),
        Err(e) => e,
    }
}

fn handle_dashboard_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let summary = calc::dashboard_summary(&state.snapshot);
    match to_json(req, &summary) {
        Ok(v) => ok(&req.id, v),
        Err(e) => e,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "analytics.grade" => Some(handle_grade(state, req)),
        "analytics.percentage" => Some(handle_percentage(state, req)),
        "analytics.subjectPerformance" => Some(handle_subject_performance(state, req)),
        "analytics.gradeDistribution" => Some(handle_grade_distribution(state, req)),
        "analytics.topPerformers" => Some(handle_top_performers(state, req)),
        "analytics.submissionStatus" => Some(handle_submission_status(state, req)),
        "analytics.examBreakdown" => Some(handle_exam_breakdown(state, req)),
        "analytics.overview" => Some(handle_overview(state, req)),
        "dashboard.summary" => Some(handle_dashboard_summary(state, req)),
        _ => None,
    }
}
