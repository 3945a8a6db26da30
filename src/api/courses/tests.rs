use axum::http::{Method, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::test_support;

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(test_support::json_request(method, uri, Some(token), body))
        .await
        .expect("response");
    let status = response.status();
    if status == StatusCode::NO_CONTENT {
        return (status, Value::Null);
    }
    (status, test_support::read_json(response).await)
}

fn lesson_body() -> Value {
    json!({
        "title": "Ownership",
        "description": "Moves and borrows",
        "video_path": "lessons/ownership.mp4",
        "slides_path": "lessons/ownership.pdf"
    })
}

#[tokio::test]
async fn second_lesson_is_rejected() {
    let ctx = test_support::setup_test_context().await;
    let (course, token) =
        test_support::course_with_instructor(ctx.state.db(), ctx.state.settings()).await;
    let uri = format!("/api/v1/courses/{}/lesson", course.id);

    let (status, lesson) = send(&ctx.app, Method::POST, &uri, &token, Some(lesson_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(lesson["course_id"], course.id.as_str());

    let (status, body) = send(&ctx.app, Method::POST, &uri, &token, Some(lesson_body())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], 422);
}

#[tokio::test]
async fn only_course_managers_add_content() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let (course, _) = test_support::course_with_instructor(db, ctx.state.settings()).await;
    let outsider = test_support::insert_user(db, "mallory", "mallory-pass").await;
    let token = test_support::bearer_token(&outsider.id, ctx.state.settings());

    let (status, _) = send(
        &ctx.app,
        Method::POST,
        &format!("/api/v1/courses/{}/lesson", course.id),
        &token,
        Some(lesson_body()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unpublished_courses_are_hidden_from_students() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let (course, instructor_token) =
        test_support::course_with_instructor(db, ctx.state.settings()).await;
    let learner = test_support::insert_user(db, "ivy", "ivy-pass").await;
    let token = test_support::bearer_token(&learner.id, ctx.state.settings());

    let (status, body) = send(&ctx.app, Method::GET, "/api/v1/courses", &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 0);

    let own_uri = format!("/api/v1/courses?instructor_id={}", course.instructor_id);
    let (status, body) = send(&ctx.app, Method::GET, &own_uri, &instructor_token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 1);
    assert_eq!(body["items"][0]["slug"], "rust-101");
}

#[tokio::test]
async fn duplicate_exam_conflicts() {
    let ctx = test_support::setup_test_context().await;
    let (course, token) =
        test_support::course_with_instructor(ctx.state.db(), ctx.state.settings()).await;
    let uri = format!("/api/v1/courses/{}/exam", course.id);
    let body = json!({ "title": "Final", "exam_date": "2025-06-01T09:30:00Z" });

    let (status, exam) = send(&ctx.app, Method::POST, &uri, &token, Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(exam["status"], "not_taken");

    let (status, detail) = send(&ctx.app, Method::POST, &uri, &token, Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(detail["detail"], "Exam for this course already exists");
}

#[tokio::test]
async fn graded_course_yields_final_grade_and_certificate() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let settings = ctx.state.settings();
    let app = &ctx.app;
    let (course, instructor) = test_support::course_with_instructor(db, settings).await;
    let learner = test_support::insert_user(db, "ada", "ada-pass").await;
    let student = test_support::insert_student(db, &learner).await;
    test_support::enroll(db, &student, &course).await;
    let token = test_support::bearer_token(&learner.id, settings);
    let course_uri = format!("/api/v1/courses/{}", course.id);

    let (status, _) =
        send(app, Method::POST, &format!("{course_uri}/lesson"), &instructor, Some(lesson_body()))
            .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, quiz) = send(app, Method::POST, &format!("{course_uri}/quiz"), &instructor, None).await;
    assert_eq!(status, StatusCode::CREATED);
    let quiz_id = quiz["id"].as_str().expect("quiz id").to_string();
    let (status, exam) = send(
        app,
        Method::POST,
        &format!("{course_uri}/exam"),
        &instructor,
        Some(json!({ "title": "Final", "exam_date": "2025-06-01T09:30:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let exam_id = exam["id"].as_str().expect("exam id").to_string();

    let mut assignment_ids = Vec::new();
    for title in ["Borrowing", "Lifetimes"] {
        let (status, assignment) = send(
            app,
            Method::POST,
            &format!("{course_uri}/assignments"),
            &token,
            Some(json!({ "title": title, "content": "answer" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(assignment["status"], "submitted");
        assignment_ids.push(assignment["id"].as_str().expect("assignment id").to_string());
    }

    let (status, progress) =
        send(app, Method::GET, &format!("{course_uri}/progress"), &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["all_assignments_graded"], false);
    assert_eq!(progress["complete"], false);
    assert_eq!(progress["final_grade"], 0.0);

    for (id, grade) in assignment_ids.iter().zip([80.0, 90.0]) {
        let (status, graded) = send(
            app,
            Method::PATCH,
            &format!("/api/v1/assignments/{id}"),
            &instructor,
            Some(json!({ "grade": grade })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(graded["status"], "graded");
    }

    let (status, _) = send(
        app,
        Method::POST,
        &format!("/api/v1/quizzes/{quiz_id}/results"),
        &instructor,
        Some(json!({ "student_id": student.id, "score": 70 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, scored) = send(
        app,
        Method::POST,
        &format!("/api/v1/exams/{exam_id}/scores"),
        &instructor,
        Some(json!({ "student_id": student.id, "score": 60.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(scored["key"], format!("exam_{exam_id}"));

    let certificate_uri = format!("{course_uri}/certificate");
    let (status, _) = send(app, Method::POST, &certificate_uri, &token, Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        app,
        Method::PATCH,
        &format!("/api/v1/exams/{exam_id}"),
        &instructor,
        Some(json!({ "status": "graded" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, progress) =
        send(app, Method::GET, &format!("{course_uri}/progress"), &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["assignment_average"], 85.0);
    assert_eq!(progress["final_grade"], 75.0);
    assert_eq!(progress["complete"], true);

    let (status, stored) =
        send(app, Method::POST, &format!("{course_uri}/final-grade"), &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["final_grade"], 75.0);

    let (status, certificate) =
        send(app, Method::POST, &certificate_uri, &token, Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(certificate["student_photo"], "students/photo.png");

    let (status, _) = send(app, Method::POST, &certificate_uri, &token, Some(json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn quiz_attempt_is_scored_against_answers() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let settings = ctx.state.settings();
    let app = &ctx.app;
    let (course, instructor) = test_support::course_with_instructor(db, settings).await;
    let learner = test_support::insert_user(db, "alan", "alan-pass").await;
    let student = test_support::insert_student(db, &learner).await;
    test_support::enroll(db, &student, &course).await;
    let token = test_support::bearer_token(&learner.id, settings);
    let course_uri = format!("/api/v1/courses/{}", course.id);

    send(app, Method::POST, &format!("{course_uri}/lesson"), &instructor, Some(lesson_body())).await;
    let (_, quiz) = send(app, Method::POST, &format!("{course_uri}/quiz"), &instructor, None).await;
    let quiz_id = quiz["id"].as_str().expect("quiz id").to_string();

    let mut question_ids = Vec::new();
    for (text, correct) in [("Who owns a moved value?", "B"), ("Is &mut exclusive?", "A")] {
        let (status, question) = send(
            app,
            Method::POST,
            &format!("{course_uri}/quiz/questions"),
            &instructor,
            Some(json!({
                "text": text,
                "choice_a": "a",
                "choice_b": "b",
                "choice_c": "c",
                "choice_d": "d",
                "correct_choice": correct
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        question_ids.push(question["id"].as_str().expect("question id").to_string());
    }

    let (status, quiz) = send(app, Method::GET, &format!("{course_uri}/quiz"), &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(quiz["questions"][0].get("correct_choice").is_none());

    let (status, result) = send(
        app,
        Method::POST,
        &format!("/api/v1/quizzes/{quiz_id}/attempts"),
        &token,
        Some(json!({ "answers": { (question_ids[0].clone()): "B", (question_ids[1].clone()): "C" } })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(result["score"], 50);

    let (status, detail) = send(
        app,
        Method::POST,
        &format!("/api/v1/quizzes/{quiz_id}/attempts"),
        &token,
        Some(json!({ "answers": { (question_ids[0].clone()): "B", (question_ids[1].clone()): "A" } })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(detail["detail"], "Quiz has already been attempted");

    let (status, grades) =
        send(app, Method::GET, &format!("/api/v1/students/{}/grades", student.id), &token, None)
            .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grades[format!("quiz_{quiz_id}")], 50.0);
}

#[tokio::test]
async fn unenrolled_student_cannot_submit_attempt_or_claim_certificate() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let settings = ctx.state.settings();
    let app = &ctx.app;
    let (course, instructor) = test_support::course_with_instructor(db, settings).await;
    let learner = test_support::insert_user(db, "eve", "eve-pass").await;
    test_support::insert_student(db, &learner).await;
    let token = test_support::bearer_token(&learner.id, settings);
    let course_uri = format!("/api/v1/courses/{}", course.id);

    send(app, Method::POST, &format!("{course_uri}/lesson"), &instructor, Some(lesson_body())).await;
    let (_, quiz) = send(app, Method::POST, &format!("{course_uri}/quiz"), &instructor, None).await;
    let quiz_id = quiz["id"].as_str().expect("quiz id").to_string();
    let (_, question) = send(
        app,
        Method::POST,
        &format!("{course_uri}/quiz/questions"),
        &instructor,
        Some(json!({
            "text": "Is &mut exclusive?",
            "choice_a": "yes",
            "choice_b": "no",
            "choice_c": "sometimes",
            "choice_d": "never",
            "correct_choice": "A"
        })),
    )
    .await;
    let question_id = question["id"].as_str().expect("question id").to_string();
    let (_, exam) = send(
        app,
        Method::POST,
        &format!("{course_uri}/exam"),
        &instructor,
        Some(json!({ "title": "Final", "exam_date": "2025-06-01T09:30:00Z" })),
    )
    .await;
    let exam_id = exam["id"].as_str().expect("exam id").to_string();
    let (status, _) = send(
        app,
        Method::PATCH,
        &format!("/api/v1/exams/{exam_id}"),
        &instructor,
        Some(json!({ "status": "graded" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, detail) = send(
        app,
        Method::POST,
        &format!("{course_uri}/assignments"),
        &token,
        Some(json!({ "title": "Borrowing", "content": "answer" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(detail["detail"], "Student is not enrolled in this course");

    let (status, _) = send(
        app,
        Method::POST,
        &format!("/api/v1/quizzes/{quiz_id}/attempts"),
        &token,
        Some(json!({ "answers": { (question_id): "A" } })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) =
        send(app, Method::POST, &format!("{course_uri}/certificate"), &token, Some(json!({}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn empty_course_is_vacuously_graded_with_zero_grade() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let settings = ctx.state.settings();
    let (course, _) = test_support::course_with_instructor(db, settings).await;
    let learner = test_support::insert_user(db, "grace", "grace-pass").await;
    test_support::insert_student(db, &learner).await;
    let token = test_support::bearer_token(&learner.id, settings);

    let (status, body) = send(
        &ctx.app,
        Method::GET,
        &format!("/api/v1/courses/{}/eligibility", course.id),
        &token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["all_assignments_graded"], true);
    assert_eq!(body["exam_taken_and_graded"], false);
    assert_eq!(body["final_grade"], 0.0);
}
