use crate::ipc::error::ok;
use crate::ipc::helpers::{
    dispatch, optional_str, parse_params, required_f64, required_str, search_needle,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{Assignment, AssignmentSubmission};
use crate::store::{Action, AssignmentPatch, NewAssignment, NewSubmission};
use serde_json::json;
use uuid::Uuid;

fn handle_assignments_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let needle = match search_needle(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let assignments: Vec<&Assignment> = state
        .snapshot
        .assignments
        .iter()
        .filter(|a| needle.as_deref().map(|n| a.matches_search(n)).unwrap_or(true))
        .collect();
    ok(&req.id, json!({ "assignments": assignments }))
}

fn handle_assignments_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let assignment: NewAssignment = match parse_params(req, None) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let action = Action::CreateAssignment {
        id: Uuid::new_v4().to_string(),
        assignment,
    };
    dispatch(state, req, action, "assignmentId")
}

fn handle_assignments_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match required_str(req, "assignmentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let patch: AssignmentPatch = match parse_params(req, Some("patch")) {
        Ok(v) => v,
        Err(e) => return e,
    };
    dispatch(state, req, Action::UpdateAssignment { id, patch }, "assignmentId")
}

fn handle_assignments_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match required_str(req, "assignmentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    dispatch(state, req, Action::DeleteAssignment { id }, "assignmentId")
}

fn handle_submissions_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let assignment_id = match optional_str(req, "assignmentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let submissions: Vec<&AssignmentSubmission> = state
        .snapshot
        .submissions
        .iter()
        .filter(|s| {
            assignment_id
                .as_deref()
                .map(|id| s.assignment_id == id)
                .unwrap_or(true)
        })
        .collect();
    ok(&req.id, json!({ "submissions": submissions }))
}

fn handle_submissions_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let submission: NewSubmission = match parse_params(req, None) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let action = Action::CreateSubmission {
        id: Uuid::new_v4().to_string(),
        submission,
    };
    dispatch(state, req, action, "submissionId")
}

fn handle_submissions_grade(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match required_str(req, "submissionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let obtained_marks = match required_f64(req, "obtainedMarks") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let feedback = match optional_str(req, "feedback") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let action = Action::GradeSubmission {
        id,
        obtained_marks,
        feedback,
    };
    dispatch(state, req, action, "submissionId")
}

fn handle_submissions_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match required_str(req, "submissionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    dispatch(state, req, Action::DeleteSubmission { id }, "submissionId")
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assignments.list" => Some(handle_assignments_list(state, req)),
        "assignments.create" => Some(handle_assignments_create(state, req)),
        "assignments.update" => Some(handle_assignments_update(state, req)),
        "assignments.delete" => Some(handle_assignments_delete(state, req)),
        "submissions.list" => Some(handle_submissions_list(state, req)),
        "submissions.create" => Some(handle_submissions_create(state, req)),
        "submissions.grade" => Some(handle_submissions_grade(state, req)),
        "submissions.delete" => Some(handle_submissions_delete(state, req)),
        _ => None,
    }
}
