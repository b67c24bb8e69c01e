use crate::ipc::error::ok;
use crate::ipc::helpers::{dispatch, parse_params, required_str, search_needle};
use crate::ipc::types::{AppState, Request};
use crate::model::Student;
use crate::store::{Action, NewStudent, StudentPatch};
use serde_json::json;
use uuid::Uuid;

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let needle = match search_needle(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let students: Vec<&Student> = state
        .snapshot
        .students
        .iter()
        .filter(|s| needle.as_deref().map(|n| s.matches_search(n)).unwrap_or(true))
        .collect();
    ok(&req.id, json!({ "students": students }))
}

fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student: NewStudent = match parse_params(req, None) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let action = Action::CreateStudent {
        id: Uuid::new_v4().to_string(),
        student,
    };
    dispatch(state, req, action, "studentId")
}

fn handle_students_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let patch: StudentPatch = match parse_params(req, Some("patch")) {
        Ok(v) => v,
        Err(e) => return e,
    };
    dispatch(state, req, Action::UpdateStudent { id, patch }, "studentId")
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    dispatch(state, req, Action::DeleteStudent { id }, "studentId")
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.create" => Some(handle_students_create(state, req)),
        "students.update" => Some(handle_students_update(state, req)),
        "students.delete" => Some(handle_students_delete(state, req)),
        _ => None,
    }
}
