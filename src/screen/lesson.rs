use crate::{
    api::{ApiClient, ApiError},
    error::{AppError, AppResult},
    model::{
        CrudResource,
        entity::{Course, CourseProgress, Lesson},
    },
    notify::{Notification, Notifier},
    state::{CompletionOutcome, LessonProgressTracker, ProgressApi},
};

pub static MARK_COMPLETE_FAILURE: &str = "Failed to mark lesson as complete";

pub enum LessonScreen {
    /// Paid and not purchased: go back to the course page.
    Locked { redirect: String },
    Ready(LessonViewer),
}

pub struct LessonViewer {
    course: Course,
    tracker: LessonProgressTracker,
}

impl LessonScreen {
    #[tracing::instrument(skip(client))]
    pub async fn open(
        client: &ApiClient,
        course_id: &str,
        lesson_id: Option<&str>,
    ) -> AppResult<Self> {
        let progress = async {
            Ok::<_, ApiError>(CourseProgress::fetch(client, course_id).await.ok())
        };
        let (course, lessons, progress) = tokio::try_join!(
            Course::find_by_id(client, course_id),
            Lesson::all_by_course(client, course_id),
            progress
        )?;

        if course.is_locked() {
            tracing::info!("course is locked, redirecting to its page");
            return Ok(Self::Locked {
                redirect: format!("/courses/{course_id}"),
            });
        }

        let mut tracker = LessonProgressTracker::new(course_id, lessons, progress);
        tracker.select(lesson_id);
        Ok(Self::Ready(LessonViewer { course, tracker }))
    }
}

impl LessonViewer {
    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn tracker(&self) -> &LessonProgressTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut LessonProgressTracker {
        &mut self.tracker
    }

    /// Route that opens `lesson`.
    pub fn lesson_route(&self, lesson: &Lesson) -> String {
        format!("/courses/{}/lessons/{}", self.course.id(), lesson.id())
    }

    pub async fn mark_complete<A: ProgressApi + ?Sized>(
        &mut self,
        api: &A,
        notifier: &dyn Notifier,
    ) -> AppResult<CompletionOutcome> {
        match self.tracker.mark_complete(api).await {
            Ok(CompletionOutcome::Completed) => {
                notifier.notify(Notification::success("Lesson marked as complete"));
                Ok(CompletionOutcome::Completed)
            }
            Ok(CompletionOutcome::AlreadyCompleted) => Ok(CompletionOutcome::AlreadyCompleted),
            Err(AppError::ApiError(e)) => {
                notifier.notify(Notification::from_api_error(&e, MARK_COMPLETE_FAILURE));
                Err(e.into())
            }
            Err(e) => {
                notifier.notify(Notification::failure(e.to_string()));
                Err(e)
            }
        }
    }
}
