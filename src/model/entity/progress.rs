use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ApiResult};
use crate::model::entity::Lesson;
use crate::model::{DataResponse, MessageResponse, ResourceType, ResourceTyped};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    #[serde(flatten)]
    lesson: Lesson,
    is_completed: bool,
}

impl LessonProgress {
    pub fn lesson(&self) -> &Lesson {
        &self.lesson
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }
}

/// Server-computed completion summary for one course and one viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    course: String,
    percentage: f64,
    total_lessons: u32,
    completed_lessons: u32,
    #[serde(default)]
    lessons: Vec<LessonProgress>,
}

impl ResourceTyped for CourseProgress {
    fn get_resource_type() -> ResourceType {
        ResourceType::Progress
    }
}

impl CourseProgress {
    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn total_lessons(&self) -> u32 {
        self.total_lessons
    }

    pub fn completed_lessons(&self) -> u32 {
        self.completed_lessons
    }

    pub fn lessons(&self) -> &[LessonProgress] {
        &self.lessons
    }

    pub fn is_completed(&self, lesson_id: &str) -> bool {
        self.lessons
            .iter()
            .any(|l| l.lesson.id() == lesson_id && l.is_completed)
    }

    /// Applies a confirmed completion locally. Returns `false` when the lesson
    /// is unknown or was already completed.
    pub fn mark_completed(&mut self, lesson_id: &str) -> bool {
        let Some(entry) = self
            .lessons
            .iter_mut()
            .find(|l| l.lesson.id() == lesson_id && !l.is_completed)
        else {
            return false;
        };

        entry.is_completed = true;
        self.completed_lessons = (self.completed_lessons + 1).min(self.total_lessons);
        self.percentage = if self.total_lessons == 0 {
            0.0
        } else {
            (f64::from(self.completed_lessons) * 100.0 / f64::from(self.total_lessons)).round()
        };
        true
    }

    pub async fn fetch(client: &ApiClient, course_id: &str) -> ApiResult<Self> {
        let resource = Self::get_resource_type();
        let path = [resource.path(), "course", course_id];
        let progress: DataResponse<Self> = client.get(resource, &path, &[]).await?;
        Ok(progress.data)
    }

    pub async fn complete_lesson(client: &ApiClient, lesson_id: &str) -> ApiResult<MessageResponse> {
        let resource = Self::get_resource_type();
        let path = [resource.path(), "lesson", lesson_id, "complete"];
        client.send_empty(resource, Method::POST, &path).await
    }
}
