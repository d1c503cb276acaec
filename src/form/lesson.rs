use async_trait::async_trait;

use crate::{
    api::{ApiClient, ApiResult},
    form::{EntityForm, ValidationErrors},
    model::{
        CrudResource, SuccessResponse,
        entity::{Lesson, LessonCreate, LessonUpdate},
    },
};

#[derive(Debug, Clone, Default)]
pub struct LessonForm {
    id: Option<String>,
    course: String,
    pub title: String,
    pub content: String,
    pub order: Option<i32>,
}

impl LessonForm {
    /// New lessons go after the existing ones by default.
    pub fn new<S: Into<String>>(course: S, existing: &[Lesson]) -> Self {
        Self {
            course: course.into(),
            order: Some(existing.len() as i32 + 1),
            ..Self::default()
        }
    }

    pub fn edit(lesson: &Lesson) -> Self {
        Self {
            id: Some(lesson.id().to_string()),
            course: lesson.course().to_string(),
            title: lesson.title().to_string(),
            content: lesson.content().to_string(),
            order: Some(lesson.order()),
        }
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }
}

#[async_trait]
impl EntityForm for LessonForm {
    type Output = Lesson;

    const FAILURE_MESSAGE: &'static str = "Failed to save lesson";

    fn success_message(&self) -> &'static str {
        if self.is_edit() {
            "Lesson updated successfully"
        } else {
            "Lesson created successfully"
        }
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("title", &self.title, "Title is required");
        errors.require("content", &self.content, "Content is required");
        match self.order {
            None => errors.add("order", "Order is required"),
            Some(order) if order < 0 => errors.add("order", "Order must be at least 0"),
            Some(_) => {}
        }
        errors.into_result()
    }

    async fn send(self, client: &ApiClient) -> ApiResult<SuccessResponse<Lesson>> {
        let order = self.order.unwrap_or_default();
        match self.id {
            Some(id) => {
                let update = LessonUpdate {
                    title: Some(self.title),
                    content: Some(self.content),
                    order: Some(order),
                };
                Lesson::update(client, &id, update).await
            }
            None => {
                let create = LessonCreate {
                    course: self.course,
                    title: self.title,
                    content: self.content,
                    order,
                };
                Lesson::create(client, create).await
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::state::progress::test::lesson;

    #[test]
    fn new_lesson_is_ordered_last() {
        let existing = [lesson("l1", 1), lesson("l2", 2)];
        let form = LessonForm::new("c1", &existing);
        assert_eq!(form.order, Some(3));
        assert_eq!(form.course(), "c1");
    }

    #[test]
    fn required_fields() {
        let mut form = LessonForm::new("c1", &[]);
        form.order = None;
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("title"), Some("Title is required"));
        assert_eq!(errors.get("content"), Some("Content is required"));
        assert_eq!(errors.get("order"), Some("Order is required"));
    }
}
