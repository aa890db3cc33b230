//! Canvas REST API client
//!
//! Thin read-only wrapper over the Canvas endpoints the tool catalog needs.
//! Every request carries the shared bearer credential and fetches a single
//! page (`per_page=50`); there is no retrying and no caching.

pub mod types;

use crate::config::Config;
use crate::error::{CanvasMcpError, Result};
use serde::de::DeserializeOwned;

pub use types::{
    Assignment, Course, DiscussionTopic, Enrollment, Grades, Module, Quiz, Submission, TodoItem,
    TopicAuthor, UpcomingEvent, UserProfile,
};

/// Page size for list endpoints
const PER_PAGE: u32 = 50;

/// Canvas API client
pub struct CanvasClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CanvasClient {
    /// Create a new client from server configuration
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.api_base().to_string(),
            api_key: config.canvas_api_key.clone(),
        }
    }

    /// Core GET helper: bearer auth, page-size query, typed deserialization.
    /// Non-2xx responses become `Upstream { status, body }`.
    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .query(&[("per_page", PER_PAGE.to_string())])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CanvasMcpError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }

    /// Courses the caller is actively enrolled in
    pub async fn list_courses(&self) -> Result<Vec<Course>> {
        self.get(
            "/api/v1/courses",
            &[("enrollment_state", "active".to_string())],
        )
        .await
    }

    /// All assignments in a course
    pub async fn list_assignments(&self, course_id: i64) -> Result<Vec<Assignment>> {
        self.get(&format!("/api/v1/courses/{}/assignments", course_id), &[])
            .await
    }

    /// Assignments in the course's "upcoming" due-date bucket
    pub async fn upcoming_assignments(&self, course_id: i64) -> Result<Vec<Assignment>> {
        self.get(
            &format!("/api/v1/courses/{}/assignments", course_id),
            &[("bucket", "upcoming".to_string())],
        )
        .await
    }

    /// Assignments with the caller's submission attached to each
    pub async fn assignments_with_submissions(&self, course_id: i64) -> Result<Vec<Assignment>> {
        self.get(
            &format!("/api/v1/courses/{}/assignments", course_id),
            &[("include[]", "submission".to_string())],
        )
        .await
    }

    /// The caller's enrollments in a course, with grade summaries
    pub async fn list_enrollments(&self, course_id: i64) -> Result<Vec<Enrollment>> {
        self.get(
            &format!("/api/v1/courses/{}/enrollments", course_id),
            &[("user_id", "self".to_string())],
        )
        .await
    }

    /// The caller's own profile
    pub async fn user_profile(&self) -> Result<UserProfile> {
        self.get("/api/v1/users/self/profile", &[]).await
    }

    /// Content modules in a course
    pub async fn list_modules(&self, course_id: i64) -> Result<Vec<Module>> {
        self.get(&format!("/api/v1/courses/{}/modules", course_id), &[])
            .await
    }

    /// Announcements for a course (discussion topics flagged as announcements)
    pub async fn list_announcements(&self, course_id: i64) -> Result<Vec<DiscussionTopic>> {
        self.get(
            &format!("/api/v1/courses/{}/discussion_topics", course_id),
            &[("only_announcements", "true".to_string())],
        )
        .await
    }

    /// Discussion topics in a course
    pub async fn list_discussions(&self, course_id: i64) -> Result<Vec<DiscussionTopic>> {
        self.get(
            &format!("/api/v1/courses/{}/discussion_topics", course_id),
            &[],
        )
        .await
    }

    /// The caller's upcoming calendar events and due dates
    pub async fn upcoming_events(&self) -> Result<Vec<UpcomingEvent>> {
        self.get("/api/v1/users/self/upcoming_events", &[]).await
    }

    /// The caller's todo list
    pub async fn todo_items(&self) -> Result<Vec<TodoItem>> {
        self.get("/api/v1/users/self/todo", &[]).await
    }

    /// Quizzes in a course
    pub async fn list_quizzes(&self, course_id: i64) -> Result<Vec<Quiz>> {
        self.get(&format!("/api/v1/courses/{}/quizzes", course_id), &[])
            .await
    }

    /// The caller's own submission for one assignment
    pub async fn own_submission(&self, course_id: i64, assignment_id: i64) -> Result<Submission> {
        self.get(
            &format!(
                "/api/v1/courses/{}/assignments/{}/submissions/self",
                course_id, assignment_id
            ),
            &[],
        )
        .await
    }
}
