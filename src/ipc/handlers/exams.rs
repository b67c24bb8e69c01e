use crate::ipc::error::ok;
use crate::ipc::helpers::{
    dispatch, optional_str, parse_params, required_str, search_needle,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{Exam, ExamResult};
use crate::store::{Action, ExamPatch, NewExam, NewResult, ResultPatch};
use serde_json::json;
use uuid::Uuid;

fn handle_exams_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let needle = match search_needle(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let exams: Vec<&Exam> = state
        .snapshot
        .exams
        .iter()
        .filter(|e| needle.as_deref().map(|n| e.matches_search(n)).unwrap_or(true))
        .collect();
    ok(&req.id, json!({ "exams": exams }))
}

fn handle_exams_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let exam: NewExam = match parse_params(req, None) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let action = Action::CreateExam {
        id: Uuid::new_v4().to_string(),
        exam,
    };
    dispatch(state, req, action, "examId")
}

fn handle_exams_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match required_str(req, "examId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let patch: ExamPatch = match parse_params(req, Some("patch")) {
        Ok(v) => v,
        Err(e) => return e,
    };
    dispatch(state, req, Action::UpdateExam { id, patch }, "examId")
}

fn handle_exams_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match required_str(req, "examId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    dispatch(state, req, Action::DeleteExam { id }, "examId")
}

fn handle_results_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let exam_id = match optional_str(req, "examId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let results: Vec<&ExamResult> = state
        .snapshot
        .exam_results
        .iter()
        .filter(|r| exam_id.as_deref().map(|id| r.exam_id == id).unwrap_or(true))
        .collect();
    ok(&req.id, json!({ "results": results }))
}

fn handle_results_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let result: NewResult = match parse_params(req, None) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let action = Action::RecordResult {
        id: Uuid::new_v4().to_string(),
        result,
    };
    dispatch(state, req, action, "resultId")
}

fn handle_results_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match required_str(req, "resultId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let patch: ResultPatch = match parse_params(req, Some("patch")) {
        Ok(v) => v,
        Err(e) => return e,
    };
    dispatch(state, req, Action::UpdateResult { id, patch }, "resultId")
}

fn handle_results_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match required_str(req, "resultId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    dispatch(state, req, Action::DeleteResult { id }, "resultId")
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "exams.list" => Some(handle_exams_list(state, req)),
        "exams.create" => Some(handle_exams_create(state, req)),
        "exams.update" => Some(handle_exams_update(state, req)),
        "exams.delete" => Some(handle_exams_delete(state, req)),
        "results.list" => Some(handle_results_list(state, req)),
        "results.create" => Some(handle_results_create(state, req)),
        "results.update" => Some(handle_results_update(state, req)),
        "results.delete" => Some(handle_results_delete(state, req)),
        _ => None,
    }
}
