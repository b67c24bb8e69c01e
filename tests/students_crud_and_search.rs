mod test_support;

use serde_json::json;
use test_support::{array, request_err, request_ok, spawn_sidecar, str_of};

#[test]
fn student_create_update_delete_roundtrip() {
    let mut sc = spawn_sidecar();

    let created = request_ok(
        &mut sc,
        "1",
        "students.create",
        json!({
            "name": "  Ada Lovelace ",
            "email": "ada@example.com",
            "grade": "11",
            "section": "B",
            "rollNo": "11B07"
        }),
    );
    let student_id = str_of(&created, "studentId").to_string();

    let listed = request_ok(&mut sc, "2", "students.list", json!({ "search": "11b07" }));
    let rows = array(&listed, "students");
    assert_eq!(rows.len(), 1);
    assert_eq!(str_of(&rows[0], "name"), "Ada Lovelace");
    assert_eq!(str_of(&rows[0], "gender"), "Male");
    assert_eq!(str_of(&rows[0], "contactNumber"), "");

    let _ = request_ok(
        &mut sc,
        "3",
        "students.update",
        json!({ "studentId": student_id.clone(), "patch": { "section": "C", "gender": "Female" } }),
    );
    let listed = request_ok(&mut sc, "4", "students.list", json!({ "search": "ada" }));
    let row = &array(&listed, "students")[0];
    assert_eq!(str_of(row, "section"), "C");
    assert_eq!(str_of(row, "gender"), "Female");
    assert_eq!(str_of(row, "email"), "ada@example.com");

    let _ = request_ok(&mut sc, "5", "students.delete", json!({ "studentId": student_id.clone() }));
    let listed = request_ok(&mut sc, "6", "students.list", json!({}));
    assert_eq!(array(&listed, "students").len(), 5);

    let code = request_err(&mut sc, "7", "students.delete", json!({ "studentId": student_id }));
    assert_eq!(code, "not_found");
}

#[test]
fn student_validation_errors() {
    let mut sc = spawn_sidecar();
    let code = request_err(&mut sc, "1", "students.create", json!({ "name": "   " }));
    assert_eq!(code, "bad_params");

    let code = request_err(&mut sc, "2", "students.update", json!({ "studentId": "1" }));
    assert_eq!(code, "bad_params");

    let code = request_err(
        &mut sc,
        "3",
        "students.update",
        json!({ "studentId": "1", "patch": { "nickname": "JD" } }),
    );
    assert_eq!(code, "bad_params");
}

#[test]
fn renamed_student_keeps_stale_result_names_but_ranks_by_new_name() {
    let mut sc = spawn_sidecar();
    let _ = request_ok(
        &mut sc,
        "1",
        "students.update",
        json!({ "studentId": "2", "patch": { "name": "Jane Smith-Park" } }),
    );
    let results = request_ok(&mut sc, "2", "results.list", json!({ "examId": "1" }));
    let jane = array(&results, "results")
        .iter()
        .find(|r| str_of(r, "studentId") == "2")
        .cloned()
        .expect("jane result");
    assert_eq!(str_of(&jane, "studentName"), "Jane Smith");

    let top = request_ok(&mut sc, "3", "analytics.topPerformers", json!({ "limit": 1 }));
    assert_eq!(str_of(&array(&top, "performers")[0], "name"), "Jane Smith-Park");
}

#[test]
fn deleted_student_drops_out_of_rankings_only() {
    let mut sc = spawn_sidecar();
    let _ = request_ok(&mut sc, "1", "students.delete", json!({ "studentId": "2" }));
    let top = request_ok(&mut sc, "2", "analytics.topPerformers", json!({}));
    let ids: Vec<&str> = array(&top, "performers").iter().map(|t| str_of(t, "id")).collect();
    assert_eq!(ids, vec!["4", "1", "3", "5"]);

    let dist = request_ok(&mut sc, "3", "analytics.gradeDistribution", json!({}));
    assert_eq!(dist.get("totalResults").and_then(|v| v.as_u64()), Some(6));
}

#[test]
fn search_matches_the_term_as_typed() {
    let mut sc = spawn_sidecar();
    let plain = request_ok(&mut sc, "1", "students.list", json!({ "search": "JOHN" }));
    let ids: Vec<&str> = array(&plain, "students").iter().map(|s| str_of(s, "id")).collect();
    assert_eq!(ids, vec!["1", "3"]);

    // "John Doe" does not contain " john"; only "Michael Johnson" does.
    let padded = request_ok(&mut sc, "2", "students.list", json!({ "search": " john" }));
    let ids: Vec<&str> = array(&padded, "students").iter().map(|s| str_of(s, "id")).collect();
    assert_eq!(ids, vec!["3"]);

    let empty = request_ok(&mut sc, "3", "students.list", json!({ "search": "" }));
    assert_eq!(array(&empty, "students").len(), 5);
}
