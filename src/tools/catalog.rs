//! The fixed Canvas tool catalog
//!
//! Twelve read-only tools, registered in the order clients see them from
//! `tools/list`. Handlers receive the shared Canvas client per call and
//! return plain JSON payloads; the dispatcher wraps them for the wire.

use super::{handler, ToolDescriptor, ToolRegistry};
use crate::canvas::{CanvasClient, Grades};
use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Due-date window for `get_upcoming_assignments`
const UPCOMING_WINDOW_DAYS: i64 = 7;

/// Build the registry with every catalog tool. Called once at startup;
/// registration failures are configuration bugs and abort the process.
pub fn build_registry() -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();

    registry.register(
        ToolDescriptor::new(
            "list_courses",
            "Get all active Canvas courses for the authenticated user",
            json!({"type": "object", "properties": {}}),
        ),
        handler(|canvas, _arguments| async move {
            let courses = canvas.list_courses().await?;
            Ok(serde_json::to_value(courses)?)
        }),
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_assignments",
            "Get assignments for a specific Canvas course",
            json!({
                "type": "object",
                "properties": {
                    "course_id": {"type": "number", "description": "Canvas course ID"}
                },
                "required": ["course_id"]
            }),
        ),
        handler(|canvas, arguments| async move {
            let course_id = id_argument(&arguments, "course_id");
            let assignments = canvas.list_assignments(course_id).await?;
            Ok(serde_json::to_value(assignments)?)
        }),
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_upcoming_assignments",
            "Get upcoming assignments across all courses with due dates in the next 7 days",
            json!({"type": "object", "properties": {}}),
        ),
        handler(|canvas, _arguments| async move { upcoming_across_courses(canvas).await }),
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_grades",
            "Get current grades for a Canvas course, including assignment scores and overall grade",
            json!({
                "type": "object",
                "properties": {
                    "course_id": {"type": "number", "description": "Canvas course ID"}
                },
                "required": ["course_id"]
            }),
        ),
        handler(|canvas, arguments| async move {
            let course_id = id_argument(&arguments, "course_id");
            course_grades(canvas, course_id).await
        }),
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_user_profile",
            "Get the authenticated user's Canvas profile information including name, email, and avatar",
            json!({"type": "object", "properties": {}}),
        ),
        handler(|canvas, _arguments| async move {
            let profile = canvas.user_profile().await?;
            Ok(serde_json::to_value(profile)?)
        }),
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_modules",
            "Get all modules for a specific Canvas course",
            json!({
                "type": "object",
                "properties": {
                    "course_id": {"type": "number", "description": "Canvas course ID"}
                },
                "required": ["course_id"]
            }),
        ),
        handler(|canvas, arguments| async move {
            let course_id = id_argument(&arguments, "course_id");
            let modules = canvas.list_modules(course_id).await?;
            Ok(serde_json::to_value(modules)?)
        }),
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_announcements",
            "Get recent announcements for a specific Canvas course",
            json!({
                "type": "object",
                "properties": {
                    "course_id": {"type": "number", "description": "Canvas course ID"}
                },
                "required": ["course_id"]
            }),
        ),
        handler(|canvas, arguments| async move {
            let course_id = id_argument(&arguments, "course_id");
            let announcements = canvas.list_announcements(course_id).await?;
            Ok(serde_json::to_value(announcements)?)
        }),
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_discussions",
            "Get discussion topics for a specific Canvas course",
            json!({
                "type": "object",
                "properties": {
                    "course_id": {"type": "number", "description": "Canvas course ID"}
                },
                "required": ["course_id"]
            }),
        ),
        handler(|canvas, arguments| async move {
            let course_id = id_argument(&arguments, "course_id");
            let discussions = canvas.list_discussions(course_id).await?;
            Ok(serde_json::to_value(discussions)?)
        }),
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_calendar_events",
            "Get upcoming calendar events for the authenticated user across all courses",
            json!({"type": "object", "properties": {}}),
        ),
        handler(|canvas, _arguments| async move {
            let events = canvas.upcoming_events().await?;
            Ok(serde_json::to_value(events)?)
        }),
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_todo_items",
            "Get todo items (assignments needing attention) for the user",
            json!({"type": "object", "properties": {}}),
        ),
        handler(|canvas, _arguments| async move {
            let items = canvas.todo_items().await?;
            Ok(serde_json::to_value(items)?)
        }),
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_quizzes",
            "Get all quizzes for a specific Canvas course",
            json!({
                "type": "object",
                "properties": {
                    "course_id": {"type": "number", "description": "Canvas course ID"}
                },
                "required": ["course_id"]
            }),
        ),
        handler(|canvas, arguments| async move {
            let course_id = id_argument(&arguments, "course_id");
            let quizzes = canvas.list_quizzes(course_id).await?;
            Ok(serde_json::to_value(quizzes)?)
        }),
    )?;

    registry.register(
        ToolDescriptor::new(
            "get_submission_status",
            "Check submission status for a specific assignment in a course",
            json!({
                "type": "object",
                "properties": {
                    "course_id": {"type": "number", "description": "Canvas course ID"},
                    "assignment_id": {"type": "number", "description": "Assignment ID"}
                },
                "required": ["course_id", "assignment_id"]
            }),
        ),
        handler(|canvas, arguments| async move {
            let course_id = id_argument(&arguments, "course_id");
            let assignment_id = id_argument(&arguments, "assignment_id");
            let submission = canvas.own_submission(course_id, assignment_id).await?;
            Ok(serde_json::to_value(submission)?)
        }),
    )?;

    Ok(registry)
}

/// Extract a numeric id argument. Validation has already guaranteed presence
/// and type for required parameters; non-integral values truncate.
fn id_argument(arguments: &Value, name: &str) -> i64 {
    let value = arguments.get(name);
    value
        .and_then(Value::as_i64)
        .or_else(|| value.and_then(Value::as_f64).map(|f| f as i64))
        .unwrap_or_default()
}

/// Walk every active course and collect assignments due within the window,
/// sorted by due date.
async fn upcoming_across_courses(canvas: Arc<CanvasClient>) -> Result<Value> {
    #[derive(Serialize)]
    struct UpcomingAssignment {
        course_id: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        course_name: Option<String>,
        assignment_id: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        due_at: DateTime<Utc>,
        #[serde(skip_serializing_if = "Option::is_none")]
        points_possible: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        html_url: Option<String>,
    }

    let horizon = Utc::now() + Duration::days(UPCOMING_WINDOW_DAYS);
    let mut upcoming = Vec::new();

    for course in canvas.list_courses().await? {
        for assignment in canvas.upcoming_assignments(course.id).await? {
            let Some(due_at) = assignment.due_at else {
                continue;
            };
            if due_at > horizon {
                continue;
            }
            upcoming.push(UpcomingAssignment {
                course_id: course.id,
                course_name: course.name.clone(),
                assignment_id: assignment.id,
                name: assignment.name,
                due_at,
                points_possible: assignment.points_possible,
                html_url: assignment.html_url,
            });
        }
    }

    upcoming.sort_by_key(|a| a.due_at);
    Ok(serde_json::to_value(upcoming)?)
}

/// Combine the caller's enrollment grade summary with per-assignment scores.
async fn course_grades(canvas: Arc<CanvasClient>, course_id: i64) -> Result<Value> {
    #[derive(Serialize)]
    struct AssignmentScore {
        assignment_id: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        points_possible: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        due_at: Option<DateTime<Utc>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        score: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        grade: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        submitted_at: Option<DateTime<Utc>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        workflow_state: Option<String>,
    }

    let enrollments = canvas.list_enrollments(course_id).await?;
    let assignments = canvas.assignments_with_submissions(course_id).await?;

    let overall: Vec<Grades> = enrollments.into_iter().filter_map(|e| e.grades).collect();
    let scores: Vec<AssignmentScore> = assignments
        .into_iter()
        .map(|a| {
            let submission = a.submission;
            AssignmentScore {
                assignment_id: a.id,
                name: a.name,
                points_possible: a.points_possible,
                due_at: a.due_at,
                score: submission.as_ref().and_then(|s| s.score),
                grade: submission.as_ref().and_then(|s| s.grade.clone()),
                submitted_at: submission.as_ref().and_then(|s| s.submitted_at),
                workflow_state: submission.and_then(|s| s.workflow_state),
            }
        })
        .collect();

    Ok(json!({
        "course_id": course_id,
        "overall": overall,
        "assignments": scores,
    }))
}
