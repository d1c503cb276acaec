use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::{
    api::{ApiClient, ApiResult},
    error::AppResult,
    model::entity::{CourseProgress, Lesson, sort_by_order},
    state::StateError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonState {
    NotStarted,
    /// Currently viewed and not yet completed.
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Completed,
    /// Nothing was sent; the lesson was already complete.
    AlreadyCompleted,
}

/// Progress endpoints the tracker depends on.
#[async_trait]
pub trait ProgressApi: Send + Sync {
    async fn complete_lesson(&self, lesson_id: &str) -> ApiResult<()>;

    async fn course_progress(&self, course_id: &str) -> ApiResult<CourseProgress>;
}

#[async_trait]
impl ProgressApi for ApiClient {
    async fn complete_lesson(&self, lesson_id: &str) -> ApiResult<()> {
        CourseProgress::complete_lesson(self, lesson_id).await?;
        Ok(())
    }

    async fn course_progress(&self, course_id: &str) -> ApiResult<CourseProgress> {
        CourseProgress::fetch(self, course_id).await
    }
}

/// Ordered lessons of one course plus the viewer's completion state.
#[derive(Debug, Clone)]
pub struct LessonProgressTracker {
    course_id: String,
    lessons: Vec<Lesson>,
    current: usize,
    completed: BTreeSet<String>,
    progress: Option<CourseProgress>,
}

impl LessonProgressTracker {
    pub fn new<S: Into<String>>(
        course_id: S,
        lessons: Vec<Lesson>,
        progress: Option<CourseProgress>,
    ) -> Self {
        let mut tracker = Self {
            course_id: course_id.into(),
            lessons: sort_by_order(lessons),
            current: 0,
            completed: BTreeSet::new(),
            progress: None,
        };
        tracker.apply_progress(progress);
        tracker
    }

    fn apply_progress(&mut self, progress: Option<CourseProgress>) {
        if let Some(progress) = &progress {
            self.completed = progress
                .lessons()
                .iter()
                .filter(|l| l.is_completed())
                .map(|l| l.lesson().id().to_string())
                .collect();
        }
        self.progress = progress;
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn progress(&self) -> Option<&CourseProgress> {
        self.progress.as_ref()
    }

    /// Server-computed completion percentage, 0 until progress is known.
    pub fn percentage(&self) -> f64 {
        self.progress.as_ref().map_or(0.0, CourseProgress::percentage)
    }

    pub fn current(&self) -> Option<&Lesson> {
        self.lessons.get(self.current)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Selects a lesson by id; unknown ids fall back to the first lesson.
    pub fn select(&mut self, lesson_id: Option<&str>) -> Option<&Lesson> {
        self.current = lesson_id
            .and_then(|id| self.lessons.iter().position(|l| l.id() == id))
            .unwrap_or(0);
        self.current()
    }

    pub fn previous(&self) -> Option<&Lesson> {
        self.current.checked_sub(1).and_then(|i| self.lessons.get(i))
    }

    pub fn next(&self) -> Option<&Lesson> {
        self.lessons.get(self.current + 1)
    }

    pub fn go_previous(&mut self) -> bool {
        if self.previous().is_some() {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    pub fn go_next(&mut self) -> bool {
        if self.next().is_some() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    pub fn is_completed(&self, lesson_id: &str) -> bool {
        self.completed.contains(lesson_id)
    }

    pub fn lesson_state(&self, lesson_id: &str) -> LessonState {
        if self.is_completed(lesson_id) {
            LessonState::Completed
        } else if self.current().is_some_and(|l| l.id() == lesson_id) {
            LessonState::InProgress
        } else {
            LessonState::NotStarted
        }
    }

    /// Marks the current lesson complete. A completed lesson is left as is
    /// without contacting the backend.
    #[tracing::instrument(skip_all, fields(course = %self.course_id))]
    pub async fn mark_complete<A: ProgressApi + ?Sized>(
        &mut self,
        api: &A,
    ) -> AppResult<CompletionOutcome> {
        let lesson_id = self
            .current()
            .map(|l| l.id().to_string())
            .ok_or(StateError::NoCurrentLesson)?;

        if self.is_completed(&lesson_id) {
            tracing::debug!(lesson = %lesson_id, "lesson already completed");
            return Ok(CompletionOutcome::AlreadyCompleted);
        }

        api.complete_lesson(&lesson_id).await?;
        tracing::info!(lesson = %lesson_id, "lesson completed");

        match api.course_progress(&self.course_id).await {
            Ok(progress) => self.apply_progress(Some(progress)),
            Err(e) => {
                tracing::warn!(error = %e, "progress refresh failed, applying completion locally");
                if let Some(progress) = &mut self.progress {
                    progress.mark_completed(&lesson_id);
                }
            }
        }
        self.completed.insert(lesson_id);

        Ok(CompletionOutcome::Completed)
    }
}
