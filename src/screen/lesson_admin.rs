//! Lesson management for one course: the ordered list plus create, edit and
//! delete. Every change reloads the list from the backend.

use crate::{
    api::ApiClient,
    error::AppResult,
    form::{LessonForm, submit_form},
    model::{ResourceTyped, entity::Lesson},
    notify::Notifier,
    screen::delete_with_notice,
};

#[derive(Debug, Clone)]
pub struct LessonAdmin {
    client: ApiClient,
    course_id: String,
    lessons: Vec<Lesson>,
}

impl LessonAdmin {
    #[tracing::instrument(skip(client))]
    pub async fn load(client: &ApiClient, course_id: &str) -> AppResult<Self> {
        let lessons = Lesson::all_by_course(client, course_id).await?;
        Ok(Self {
            client: client.clone(),
            course_id: course_id.to_string(),
            lessons,
        })
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    /// Sorted by `order`.
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub async fn reload(&mut self) -> AppResult<()> {
        self.lessons = Lesson::all_by_course(&self.client, &self.course_id).await?;
        Ok(())
    }

    /// Empty dialog, ordered after the current last lesson.
    pub fn new_form(&self) -> LessonForm {
        LessonForm::new(self.course_id.as_str(), &self.lessons)
    }

    pub fn edit_form(&self, lesson_id: &str) -> Option<LessonForm> {
        self.lessons
            .iter()
            .find(|l| l.id() == lesson_id)
            .map(LessonForm::edit)
    }

    pub async fn submit(&mut self, form: LessonForm, notifier: &dyn Notifier) -> AppResult<Lesson> {
        let saved = submit_form(&self.client, form, notifier).await?;
        self.reload().await?;
        Ok(saved)
    }

    #[tracing::instrument(skip(self, notifier), fields(course = %self.course_id))]
    pub async fn delete(&mut self, lesson_id: &str, notifier: &dyn Notifier) -> AppResult<()> {
        delete_with_notice(&self.client, Lesson::get_resource_type(), lesson_id, notifier).await?;
        self.reload().await
    }
}
