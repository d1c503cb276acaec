use crate::{
    api::{ApiClient, ApiError},
    error::AppResult,
    model::{
        CrudResource,
        entity::{Course, CourseProgress, Lesson, Transaction},
    },
    notify::{Notification, Notifier},
    session::{LOGIN_ROUTE, Session},
    state::{EnrollAction, EnrollButton, EnrollmentStatus, enroll, enroll_action, enroll_button},
};

#[derive(Debug, Clone)]
pub enum EnrollClick {
    Redirect(&'static str),
    Enrolled(Transaction),
}

/// A course page: the course, its ordered lessons, and the viewer's progress
/// when they have any.
#[derive(Debug, Clone)]
pub struct CourseDetail {
    course: Course,
    lessons: Vec<Lesson>,
    progress: Option<CourseProgress>,
}

impl CourseDetail {
    #[tracing::instrument(skip(client, session))]
    pub async fn load(client: &ApiClient, session: &Session, course_id: &str) -> AppResult<Self> {
        let progress = async {
            if !session.is_authenticated() {
                return Ok::<_, ApiError>(None);
            }
            match CourseProgress::fetch(client, course_id).await {
                Ok(progress) => Ok(Some(progress)),
                Err(e) => {
                    tracing::debug!(error = %e, "no progress for this viewer");
                    Ok(None)
                }
            }
        };

        let (course, lessons, progress) = tokio::try_join!(
            Course::find_by_id(client, course_id),
            Lesson::all_by_course(client, course_id),
            progress
        )?;

        Ok(Self {
            course,
            lessons,
            progress,
        })
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn progress(&self) -> Option<&CourseProgress> {
        self.progress.as_ref()
    }

    pub fn is_lesson_completed(&self, lesson_id: &str) -> bool {
        self.progress
            .as_ref()
            .is_some_and(|p| p.is_completed(lesson_id))
    }

    pub fn enrollment_status(&self) -> EnrollmentStatus {
        self.course.enrollment_status()
    }

    pub fn enroll_button(&self, session: &Session) -> EnrollButton {
        enroll_button(session.role(), self.enrollment_status())
    }

    /// Guests are sent to login; viewers get a pending transaction. A refused
    /// click is reported through `notifier` before the error is returned.
    pub async fn click_enroll(
        &mut self,
        client: &ApiClient,
        session: &Session,
        notifier: &dyn Notifier,
    ) -> AppResult<EnrollClick> {
        let action = match enroll_action(session, self.enrollment_status()) {
            Ok(action) => action,
            Err(e) => {
                tracing::debug!(error = %e, "enroll click refused");
                notifier.notify(Notification::failure(e.to_string()));
                return Err(e.into());
            }
        };

        match action {
            EnrollAction::RedirectToLogin => Ok(EnrollClick::Redirect(LOGIN_ROUTE)),
            EnrollAction::CreateTransaction => {
                let transaction = enroll(client, &mut self.course, notifier).await?;
                Ok(EnrollClick::Enrolled(transaction))
            }
        }
    }
}
