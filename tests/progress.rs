mod common;

use common::*;
use kelas::{
    api::ApiClient,
    form::{LessonForm, submit_form},
    model::entity::Lesson,
    screen::{CourseDetail, LessonAdmin, LessonScreen, LessonViewer, lesson::MARK_COMPLETE_FAILURE},
    session::Session,
    state::{CompletionOutcome, LessonState, ProgressApi},
};

async fn open(client: &ApiClient, course: &str) -> LessonViewer {
    match LessonScreen::open(client, course, None).await.unwrap() {
        LessonScreen::Ready(viewer) => viewer,
        LessonScreen::Locked { redirect } => panic!("unexpected redirect to {redirect}"),
    }
}

#[tokio::test]
async fn marking_complete_is_idempotent() {
    let backend = MockBackend::spawn().await;
    let category = backend.seed_category("Code");
    let course = backend.seed_course("Free intro", 0, &category);
    let second = backend.seed_lesson(&course, "Second", 2);
    let first = backend.seed_lesson(&course, "First", 1);
    let (client, _session) = backend.user().await;
    let notifier = RecordingNotifier::default();

    let mut viewer = open(&client, &course).await;
    assert_eq!(viewer.tracker().current().map(Lesson::id), Some(first.as_str()));
    assert_eq!(viewer.tracker().lesson_state(&first), LessonState::InProgress);
    assert_eq!(viewer.tracker().percentage(), 0.0);

    let outcome = viewer.mark_complete(&client, &notifier).await.unwrap();
    assert_eq!(outcome, CompletionOutcome::Completed);
    assert_eq!(notifier.last().unwrap().message, "Lesson marked as complete");
    assert_eq!(viewer.tracker().percentage(), 50.0);
    assert_eq!(viewer.tracker().lesson_state(&first), LessonState::Completed);

    let again = viewer.mark_complete(&client, &notifier).await.unwrap();
    assert_eq!(again, CompletionOutcome::AlreadyCompleted);
    assert_eq!(backend.db().complete_calls, 1);
    assert_eq!(notifier.count(), 1);

    assert!(viewer.tracker_mut().go_next());
    assert_eq!(
        viewer.lesson_route(viewer.tracker().current().unwrap()),
        format!("/courses/{course}/lessons/{second}")
    );
    viewer.mark_complete(&client, &notifier).await.unwrap();
    assert_eq!(viewer.tracker().percentage(), 100.0);
    assert!(!viewer.tracker_mut().go_next());

    // Reopening picks the server-side state back up.
    let viewer = open(&client, &course).await;
    assert!(viewer.tracker().is_completed(&first));
    assert!(viewer.tracker().is_completed(&second));
}

#[tokio::test]
async fn guests_cannot_complete_lessons() {
    let backend = MockBackend::spawn().await;
    let category = backend.seed_category("Code");
    let course = backend.seed_course("Free intro", 0, &category);
    backend.seed_lesson(&course, "Only", 1);
    let client = backend.client();
    let notifier = RecordingNotifier::default();

    let mut viewer = open(&client, &course).await;
    assert!(viewer.tracker().progress().is_none());
    assert!(viewer.mark_complete(&client, &notifier).await.is_err());

    let failure = notifier.last().unwrap();
    assert!(!failure.is_success());
    assert_eq!(failure.message, "Unauthorized");
    assert_ne!(failure.message, MARK_COMPLETE_FAILURE);
    assert!(client.course_progress(&course).await.unwrap_err().is_unauthorized());
}

#[tokio::test]
async fn new_lessons_are_appended_in_order() {
    let backend = MockBackend::spawn().await;
    let category = backend.seed_category("Code");
    let course = backend.seed_course("Rust", 150_000, &category);
    backend.seed_lesson(&course, "Basics", 1);
    backend.seed_lesson(&course, "Ownership", 2);
    let (admin, session) = backend.admin().await;
    let notifier = RecordingNotifier::default();

    let detail = CourseDetail::load(&admin, &session, &course)
        .await
        .unwrap();
    let mut form = LessonForm::new(course.as_str(), detail.lessons());
    form.title = "Traits".into();
    form.content = "Shared behaviour".into();
    let lesson = submit_form(&admin, form, &notifier).await.unwrap();
    assert_eq!(lesson.order(), 3);
    assert_eq!(notifier.last().unwrap().message, "Lesson created successfully");

    let detail = CourseDetail::load(&admin, &Session::guest(), &course)
        .await
        .unwrap();
    let titles: Vec<_> = detail.lessons().iter().map(Lesson::title).collect();
    assert_eq!(titles, ["Basics", "Ownership", "Traits"]);
}

#[tokio::test]
async fn lesson_admin_reloads_after_each_change() {
    let backend = MockBackend::spawn().await;
    let category = backend.seed_category("Code");
    let course = backend.seed_course("Rust", 150_000, &category);
    backend.seed_lesson(&course, "Ownership", 2);
    backend.seed_lesson(&course, "Basics", 1);
    let (admin, _session) = backend.admin().await;
    let notifier = RecordingNotifier::default();

    let mut lessons = LessonAdmin::load(&admin, &course).await.unwrap();
    let titles = |screen: &LessonAdmin| -> Vec<String> {
        screen.lessons().iter().map(|l| l.title().to_string()).collect()
    };
    assert_eq!(titles(&lessons), ["Basics", "Ownership"]);

    let mut form = lessons.new_form();
    assert_eq!(form.order, Some(3));
    form.title = "Traits".into();
    form.content = "Shared behaviour".into();
    lessons.submit(form, &notifier).await.unwrap();
    assert_eq!(titles(&lessons), ["Basics", "Ownership", "Traits"]);

    let basics = lessons.lessons()[0].id().to_string();
    let mut form = lessons.edit_form(&basics).unwrap();
    form.title = "Getting started".into();
    form.order = Some(4);
    lessons.submit(form, &notifier).await.unwrap();
    assert_eq!(notifier.last().unwrap().message, "Lesson updated successfully");
    assert_eq!(titles(&lessons), ["Ownership", "Traits", "Getting started"]);

    let traits = lessons.lessons()[1].id().to_string();
    lessons.delete(&traits, &notifier).await.unwrap();
    assert_eq!(notifier.last().unwrap().message, "Lesson deleted successfully");
    assert_eq!(titles(&lessons), ["Ownership", "Getting started"]);
    assert_eq!(notifier.count(), 3);

    let mut form = lessons.new_form();
    form.title = String::new();
    assert!(lessons.submit(form, &notifier).await.is_err());
    assert_eq!(lessons.lessons().len(), 2);
    assert_eq!(notifier.count(), 3);
}
