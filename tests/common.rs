//! In-memory stand-in for the course marketplace backend.
//!
//! Every test spawns its own `MockBackend` on an ephemeral port; the server is
//! shut down when the backend goes out of scope.

#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard},
};

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use kelas::{
    api::ApiClient,
    form::LoginForm,
    notify::{Notification, Notifier},
    session::Session,
};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@kelas.test";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const USER_EMAIL: &str = "sari@kelas.test";
pub const USER_PASSWORD: &str = "secret123";

const SESSION_COOKIE: &str = "kelas_session";

#[derive(Debug, Default)]
pub struct Db {
    users: Vec<Value>,
    passwords: HashMap<String, String>,
    sessions: HashMap<String, String>,
    pub categories: Vec<Value>,
    courses: Vec<Value>,
    lessons: Vec<Value>,
    transactions: Vec<Value>,
    completions: HashSet<(String, String)>,
    pub complete_calls: usize,
    pub request_ids: Vec<String>,
}

type Backend = Arc<Mutex<Db>>;

pub struct MockBackend {
    addr: SocketAddr,
    db: Backend,
    shutdown: CancellationToken,
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl MockBackend {
    pub async fn spawn() -> Self {
        let db: Backend = Arc::new(Mutex::new(Db::seeded()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = CancellationToken::new();

        let app = router(db.clone());
        let token = shutdown.clone();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(token.cancelled_owned())
                .await
                .unwrap();
        });

        Self { addr, db, shutdown }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Fresh client with its own cookie jar.
    pub fn client(&self) -> ApiClient {
        ApiClient::with_base_url(&self.base_url()).unwrap()
    }

    pub fn db(&self) -> MutexGuard<'_, Db> {
        self.db.lock().unwrap()
    }

    pub async fn login(&self, email: &str, password: &str) -> (ApiClient, Session) {
        let client = self.client();
        let mut session = Session::guest();
        let request = LoginForm::new(email, password).into_request().unwrap();
        session.login(&client, request).await.unwrap();
        (client, session)
    }

    pub async fn admin(&self) -> (ApiClient, Session) {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    pub async fn user(&self) -> (ApiClient, Session) {
        self.login(USER_EMAIL, USER_PASSWORD).await
    }

    /// Inserts a course directly, bypassing the API.
    pub fn seed_course(&self, title: &str, price: i64, category: &str) -> String {
        let id = new_id();
        let now = now();
        self.db().courses.push(json!({
            "_id": id, "title": title, "description": format!("About {title}"),
            "instructor": "Budi", "price": price, "category": category,
            "thumbnailUrl": "", "goals": ["learn"], "createdAt": now, "updatedAt": now
        }));
        id
    }

    pub fn seed_lesson(&self, course: &str, title: &str, order: i64) -> String {
        let id = new_id();
        let now = now();
        self.db().lessons.push(json!({
            "_id": id, "course": course, "title": title, "content": format!("{title} content"),
            "order": order, "createdAt": now, "updatedAt": now
        }));
        id
    }

    pub fn seed_category(&self, name: &str) -> String {
        let id = new_id();
        let now = now();
        self.db().categories.push(json!({
            "_id": id, "name": name, "createdAt": now, "updatedAt": now
        }));
        id
    }
}

/// Collects notifications for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn last(&self) -> Option<Notification> {
        self.seen.lock().unwrap().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

impl Db {
    fn seeded() -> Self {
        let mut db = Self::default();
        for (name, email, password, role) in [
            ("Admin", ADMIN_EMAIL, ADMIN_PASSWORD, "admin"),
            ("Sari", USER_EMAIL, USER_PASSWORD, "user"),
        ] {
            let id = new_id();
            db.users.push(json!({
                "_id": id, "avatarUrl": "", "name": name, "email": email, "role": role
            }));
            db.passwords.insert(email.to_string(), password.to_string());
        }
        db
    }

    fn viewer(&self, headers: &HeaderMap) -> Option<Value> {
        let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
        let token = cookies
            .split(';')
            .filter_map(|c| c.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, value)| value)?;
        let user_id = self.sessions.get(token)?;
        self.users.iter().find(|u| u["_id"] == *user_id).cloned()
    }

    fn course_for(&self, course: &Value, viewer: Option<&Value>) -> Value {
        let mut course = course.clone();
        if let Some(category) = self
            .categories
            .iter()
            .find(|c| c["_id"] == course["category"])
        {
            course["category"] = category.clone();
        }
        if let Some(viewer) = viewer {
            let latest = self
                .transactions
                .iter()
                .rev()
                .find(|t| t["user"]["_id"] == viewer["_id"] && t["course"]["_id"] == course["_id"]);
            if let Some(tx) = latest {
                course["transactionStatus"] = tx["status"].clone();
                course["isPurchased"] = json!(tx["status"] == "success");
            } else {
                course["isPurchased"] = json!(false);
            }
        }
        course
    }

    fn progress(&self, user_id: &str, course_id: &str) -> Value {
        let mut lessons: Vec<Value> = self
            .lessons
            .iter()
            .filter(|l| l["course"] == course_id)
            .cloned()
            .collect();
        lessons.sort_by_key(|l| l["order"].as_i64().unwrap_or_default());

        let mut completed = 0;
        for lesson in &mut lessons {
            let id = lesson["_id"].as_str().unwrap_or_default().to_string();
            let done = self.completions.contains(&(user_id.to_string(), id));
            completed += usize::from(done);
            lesson["isCompleted"] = json!(done);
        }
        let total = lessons.len();
        let percentage = if total == 0 {
            0.0
        } else {
            (completed as f64 * 100.0 / total as f64).round()
        };
        json!({
            "course": course_id, "percentage": percentage, "totalLessons": total,
            "completedLessons": completed, "lessons": lessons
        })
    }
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn message(status: StatusCode, text: &str) -> Response {
    reply(status, json!({ "message": text }))
}

fn unauthorized() -> Response {
    message(StatusCode::UNAUTHORIZED, "Unauthorized")
}

fn forbidden() -> Response {
    message(StatusCode::FORBIDDEN, "Forbidden: admin access required")
}

fn not_found(what: &str) -> Response {
    message(StatusCode::NOT_FOUND, &format!("{what} not found"))
}

/// Applies search / sort / page / limit and wraps the result in the list envelope.
fn paginate(mut items: Vec<Value>, q: &HashMap<String, String>, search_field: &str) -> Response {
    if let Some(search) = q.get("search").filter(|s| !s.is_empty()) {
        let needle = search.to_lowercase();
        items.retain(|i| {
            i[search_field]
                .as_str()
                .is_some_and(|s| s.to_lowercase().contains(&needle))
        });
    }
    if let Some(sort) = q.get("sort") {
        items.sort_by(|a, b| match (a[sort].as_f64(), b[sort].as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => a[sort].to_string().cmp(&b[sort].to_string()),
        });
        if q.get("direction").map(String::as_str) != Some("asc") {
            items.reverse();
        }
    }

    let page: usize = q.get("page").and_then(|p| p.parse().ok()).unwrap_or(1).max(1);
    let limit: usize = q.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10).max(1);
    let total = items.len();
    let last_page = total.div_ceil(limit).max(1);
    let data: Vec<Value> = items.into_iter().skip((page - 1) * limit).take(limit).collect();

    reply(
        StatusCode::OK,
        json!({ "data": data, "meta": { "total": total, "lastPage": last_page, "page": page } }),
    )
}

fn router(db: Backend) -> Router {
    Router::new()
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/auth/me", get(me))
        .route("/api/v1/categories", get(list_categories).post(create_category))
        .route(
            "/api/v1/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/api/v1/courses", get(list_courses).post(create_course))
        .route("/api/v1/courses/my", get(my_courses))
        .route("/api/v1/courses/stats", get(stats))
        .route(
            "/api/v1/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/api/v1/lessons", get(list_lessons).post(create_lesson))
        .route(
            "/api/v1/lessons/{id}",
            get(get_lesson).put(update_lesson).delete(delete_lesson),
        )
        .route("/api/v1/progress/course/{id}", get(course_progress))
        .route("/api/v1/progress/lesson/{id}/complete", post(complete_lesson))
        .route("/api/v1/transactions", get(list_transactions).post(create_transaction))
        .route("/api/v1/transactions/my", get(my_transactions))
        .route("/api/v1/transactions/check/{course}", get(check_transaction))
        .route("/api/v1/transactions/{id}", get(get_transaction))
        .route("/api/v1/transactions/{id}/status", patch(update_transaction_status))
        .layer(middleware::from_fn_with_state(db.clone(), record_request_id))
        .with_state(db)
}

async fn record_request_id(State(db): State<Backend>, request: Request, next: Next) -> Response {
    if let Some(id) = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
    {
        db.lock().unwrap().request_ids.push(id.to_string());
    }
    next.run(request).await
}

async fn login(State(db): State<Backend>, Json(body): Json<Value>) -> Response {
    let mut db = db.lock().unwrap();
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    if db.passwords.get(email).map(String::as_str) != Some(password) {
        return message(StatusCode::UNAUTHORIZED, "Invalid email or password");
    }
    let Some(user) = db.users.iter().find(|u| u["email"] == email).cloned() else {
        return message(StatusCode::UNAUTHORIZED, "Invalid email or password");
    };

    let token = new_id();
    let user_id = user["_id"].as_str().unwrap_or_default().to_string();
    db.sessions.insert(token.clone(), user_id);

    let mut response = reply(StatusCode::OK, json!({ "message": "Login successful", "data": user }));
    let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly");
    response
        .headers_mut()
        .insert(header::SET_COOKIE, HeaderValue::from_str(&cookie).unwrap());
    response
}

async fn logout(State(db): State<Backend>, headers: HeaderMap) -> Response {
    let mut db = db.lock().unwrap();
    if let Some(viewer) = db.viewer(&headers) {
        db.sessions.retain(|_, user| viewer["_id"] != *user);
    }
    message(StatusCode::OK, "Logout successful")
}

async fn me(State(db): State<Backend>, headers: HeaderMap) -> Response {
    let db = db.lock().unwrap();
    match db.viewer(&headers) {
        Some(user) => reply(StatusCode::OK, json!({ "data": user })),
        None => unauthorized(),
    }
}

fn require_admin(db: &Db, headers: &HeaderMap) -> Result<Value, Response> {
    match db.viewer(headers) {
        None => Err(unauthorized()),
        Some(user) if user["role"] != "admin" => Err(forbidden()),
        Some(user) => Ok(user),
    }
}

async fn list_categories(
    State(db): State<Backend>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let db = db.lock().unwrap();
    paginate(db.categories.clone(), &q, "name")
}

async fn create_category(
    State(db): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut db = db.lock().unwrap();
    if let Err(response) = require_admin(&db, &headers) {
        return response;
    }
    let Some(name) = body["name"].as_str().filter(|n| !n.is_empty()) else {
        return message(StatusCode::UNPROCESSABLE_ENTITY, "Name is required");
    };

    let now = now();
    let mut category = json!({ "_id": new_id(), "name": name, "createdAt": now, "updatedAt": now });
    if let Some(description) = body["description"].as_str() {
        category["description"] = json!(description);
    }
    db.categories.push(category.clone());
    reply(
        StatusCode::CREATED,
        json!({ "message": "Category created", "data": category }),
    )
}

async fn get_category(State(db): State<Backend>, Path(id): Path<String>) -> Response {
    let db = db.lock().unwrap();
    match db.categories.iter().find(|c| c["_id"] == id) {
        Some(category) => reply(StatusCode::OK, json!({ "data": category })),
        None => not_found("Category"),
    }
}

async fn update_category(
    State(db): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut db = db.lock().unwrap();
    if let Err(response) = require_admin(&db, &headers) {
        return response;
    }
    let Some(category) = db.categories.iter_mut().find(|c| c["_id"] == id) else {
        return not_found("Category");
    };
    for key in ["name", "description"] {
        if let Some(value) = body.get(key) {
            category[key] = value.clone();
        }
    }
    category["updatedAt"] = json!(now());
    let category = category.clone();
    reply(StatusCode::OK, json!({ "message": "Category updated", "data": category }))
}

async fn delete_category(
    State(db): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut db = db.lock().unwrap();
    if let Err(response) = require_admin(&db, &headers) {
        return response;
    }
    let before = db.categories.len();
    db.categories.retain(|c| c["_id"] != id);
    if db.categories.len() == before {
        return not_found("Category");
    }
    message(StatusCode::OK, "Category deleted successfully")
}

async fn list_courses(
    State(db): State<Backend>,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let db = db.lock().unwrap();
    let viewer = db.viewer(&headers);
    let min = q.get("minPrice").and_then(|p| p.parse::<i64>().ok());
    let max = q.get("maxPrice").and_then(|p| p.parse::<i64>().ok());
    let category = q.get("category").filter(|c| !c.is_empty());

    let courses = db
        .courses
        .iter()
        .filter(|c| category.is_none_or(|cat| c["category"] == *cat))
        .filter(|c| min.is_none_or(|m| c["price"].as_i64().unwrap_or_default() >= m))
        .filter(|c| max.is_none_or(|m| c["price"].as_i64().unwrap_or_default() <= m))
        .map(|c| db.course_for(c, viewer.as_ref()))
        .collect();
    paginate(courses, &q, "title")
}

async fn my_courses(
    State(db): State<Backend>,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let db = db.lock().unwrap();
    let Some(viewer) = db.viewer(&headers) else {
        return unauthorized();
    };
    let user_id = viewer["_id"].as_str().unwrap_or_default();
    let courses = db
        .courses
        .iter()
        .map(|c| db.course_for(c, Some(&viewer)))
        .filter(|c| c["isPurchased"] == true)
        .map(|mut c| {
            let course_id = c["_id"].as_str().unwrap_or_default().to_string();
            c["completedLessonsCount"] = db.progress(user_id, &course_id)["completedLessons"].clone();
            c
        })
        .collect();
    paginate(courses, &q, "title")
}

async fn stats(State(db): State<Backend>, headers: HeaderMap) -> Response {
    let db = db.lock().unwrap();
    let Some(viewer) = db.viewer(&headers) else {
        return unauthorized();
    };
    let user_id = viewer["_id"].as_str().unwrap_or_default();
    let purchased: Vec<Value> = db
        .courses
        .iter()
        .map(|c| db.course_for(c, Some(&viewer)))
        .filter(|c| c["isPurchased"] == true)
        .collect();
    let completed = purchased
        .iter()
        .filter(|c| {
            let p = db.progress(user_id, c["_id"].as_str().unwrap_or_default());
            p["totalLessons"].as_u64() > Some(0) && p["totalLessons"] == p["completedLessons"]
        })
        .count();
    let transactions = db
        .transactions
        .iter()
        .filter(|t| t["user"]["_id"] == viewer["_id"])
        .count();

    reply(
        StatusCode::OK,
        json!({ "data": {
            "totalCourses": purchased.len(),
            "completedCourses": completed,
            "totalTransactions": transactions
        }}),
    )
}

async fn get_course(
    State(db): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let db = db.lock().unwrap();
    let viewer = db.viewer(&headers);
    match db.courses.iter().find(|c| c["_id"] == id) {
        Some(course) => reply(
            StatusCode::OK,
            json!({ "data": db.course_for(course, viewer.as_ref()) }),
        ),
        None => not_found("Course"),
    }
}

/// Reads the multipart course form into a JSON patch.
async fn course_fields(mut multipart: Multipart) -> Value {
    let mut fields = json!({});
    let mut goals = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "thumbnail" => {
                let file_name = field.file_name().unwrap_or("thumb").to_string();
                let _ = field.bytes().await.unwrap();
                fields["thumbnailUrl"] = json!(format!("/uploads/{file_name}"));
            }
            "goals[]" => goals.push(json!(field.text().await.unwrap())),
            "price" => {
                let price: i64 = field.text().await.unwrap().parse().unwrap_or(-1);
                fields["price"] = json!(price);
            }
            _ => fields[name.as_str()] = json!(field.text().await.unwrap()),
        }
    }
    if !goals.is_empty() {
        fields["goals"] = json!(goals);
    }
    fields
}

async fn create_course(
    State(db): State<Backend>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let fields = course_fields(multipart).await;
    let mut db = db.lock().unwrap();
    if let Err(response) = require_admin(&db, &headers) {
        return response;
    }
    if fields["price"].as_i64().is_none_or(|p| p < 0) {
        return message(StatusCode::UNPROCESSABLE_ENTITY, "Price must be at least 0");
    }

    let now = now();
    let mut course = json!({
        "_id": new_id(), "thumbnailUrl": "", "goals": [], "createdAt": now, "updatedAt": now
    });
    if let (Some(course), Some(fields)) = (course.as_object_mut(), fields.as_object()) {
        course.extend(fields.clone());
    }
    db.courses.push(course.clone());
    let course = db.course_for(&course, None);
    reply(
        StatusCode::CREATED,
        json!({ "message": "Course created", "data": course }),
    )
}

async fn update_course(
    State(db): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Response {
    let fields = course_fields(multipart).await;
    let mut db = db.lock().unwrap();
    if let Err(response) = require_admin(&db, &headers) {
        return response;
    }
    let Some(course) = db.courses.iter_mut().find(|c| c["_id"] == id) else {
        return not_found("Course");
    };
    if let (Some(course), Some(fields)) = (course.as_object_mut(), fields.as_object()) {
        course.extend(fields.clone());
    }
    course["updatedAt"] = json!(now());
    let course = course.clone();
    let course = db.course_for(&course, None);
    reply(StatusCode::OK, json!({ "message": "Course updated", "data": course }))
}

async fn delete_course(
    State(db): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut db = db.lock().unwrap();
    if let Err(response) = require_admin(&db, &headers) {
        return response;
    }
    let before = db.courses.len();
    db.courses.retain(|c| c["_id"] != id);
    if db.courses.len() == before {
        return not_found("Course");
    }
    db.lessons.retain(|l| l["course"] != id);
    message(StatusCode::OK, "Course deleted successfully")
}

async fn list_lessons(
    State(db): State<Backend>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let db = db.lock().unwrap();
    let lessons = db
        .lessons
        .iter()
        .filter(|l| q.get("course").is_none_or(|c| l["course"] == *c))
        .cloned()
        .collect();
    paginate(lessons, &q, "title")
}

async fn create_lesson(
    State(db): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut db = db.lock().unwrap();
    if let Err(response) = require_admin(&db, &headers) {
        return response;
    }
    let now = now();
    let lesson = json!({
        "_id": new_id(), "course": body["course"], "title": body["title"],
        "content": body["content"], "order": body["order"], "createdAt": now, "updatedAt": now
    });
    db.lessons.push(lesson.clone());
    reply(StatusCode::CREATED, json!({ "message": "Lesson created", "data": lesson }))
}

async fn get_lesson(State(db): State<Backend>, Path(id): Path<String>) -> Response {
    let db = db.lock().unwrap();
    match db.lessons.iter().find(|l| l["_id"] == id) {
        Some(lesson) => reply(StatusCode::OK, json!({ "data": lesson })),
        None => not_found("Lesson"),
    }
}

async fn update_lesson(
    State(db): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut db = db.lock().unwrap();
    if let Err(response) = require_admin(&db, &headers) {
        return response;
    }
    let Some(lesson) = db.lessons.iter_mut().find(|l| l["_id"] == id) else {
        return not_found("Lesson");
    };
    for key in ["title", "content", "order"] {
        if let Some(value) = body.get(key) {
            lesson[key] = value.clone();
        }
    }
    let lesson = lesson.clone();
    reply(StatusCode::OK, json!({ "message": "Lesson updated", "data": lesson }))
}

async fn delete_lesson(
    State(db): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut db = db.lock().unwrap();
    if let Err(response) = require_admin(&db, &headers) {
        return response;
    }
    db.lessons.retain(|l| l["_id"] != id);
    message(StatusCode::OK, "Lesson deleted successfully")
}

async fn course_progress(
    State(db): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let db = db.lock().unwrap();
    let Some(viewer) = db.viewer(&headers) else {
        return unauthorized();
    };
    let progress = db.progress(viewer["_id"].as_str().unwrap_or_default(), &id);
    reply(StatusCode::OK, json!({ "data": progress }))
}

async fn complete_lesson(
    State(db): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut db = db.lock().unwrap();
    let Some(viewer) = db.viewer(&headers) else {
        return unauthorized();
    };
    if !db.lessons.iter().any(|l| l["_id"] == id) {
        return not_found("Lesson");
    }
    db.complete_calls += 1;
    let user_id = viewer["_id"].as_str().unwrap_or_default().to_string();
    db.completions.insert((user_id, id));
    message(StatusCode::OK, "Lesson marked as completed")
}

async fn list_transactions(
    State(db): State<Backend>,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let db = db.lock().unwrap();
    if let Err(response) = require_admin(&db, &headers) {
        return response;
    }
    let transactions = db
        .transactions
        .iter()
        .filter(|t| q.get("status").is_none_or(|s| t["status"] == *s))
        .cloned()
        .collect();
    paginate(transactions, &q, "paymentMethod")
}

async fn my_transactions(
    State(db): State<Backend>,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let db = db.lock().unwrap();
    let Some(viewer) = db.viewer(&headers) else {
        return unauthorized();
    };
    let transactions = db
        .transactions
        .iter()
        .filter(|t| t["user"]["_id"] == viewer["_id"])
        .cloned()
        .collect();
    paginate(transactions, &q, "paymentMethod")
}

async fn check_transaction(
    State(db): State<Backend>,
    headers: HeaderMap,
    Path(course): Path<String>,
) -> Response {
    let db = db.lock().unwrap();
    let Some(viewer) = db.viewer(&headers) else {
        return unauthorized();
    };
    let latest = db
        .transactions
        .iter()
        .rev()
        .find(|t| t["user"]["_id"] == viewer["_id"] && t["course"]["_id"] == course)
        .cloned();
    reply(StatusCode::OK, json!({ "data": latest }))
}

async fn get_transaction(
    State(db): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let db = db.lock().unwrap();
    if db.viewer(&headers).is_none() {
        return unauthorized();
    }
    match db.transactions.iter().find(|t| t["_id"] == id) {
        Some(tx) => reply(StatusCode::OK, json!({ "data": tx })),
        None => not_found("Transaction"),
    }
}

async fn create_transaction(
    State(db): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut db = db.lock().unwrap();
    let Some(viewer) = db.viewer(&headers) else {
        return unauthorized();
    };
    let Some(course) = db.courses.iter().find(|c| c["_id"] == body["course"]).cloned() else {
        return not_found("Course");
    };
    let open = db.transactions.iter().any(|t| {
        t["user"]["_id"] == viewer["_id"]
            && t["course"]["_id"] == course["_id"]
            && t["status"] != "failed"
    });
    if open {
        return message(StatusCode::BAD_REQUEST, "You already enrolled in this course");
    }

    let now = now();
    let tx = json!({
        "_id": new_id(), "user": viewer, "course": course, "amount": course["price"],
        "status": "pending", "paymentMethod": body["paymentMethod"],
        "createdAt": now, "updatedAt": now
    });
    db.transactions.push(tx.clone());
    reply(StatusCode::CREATED, json!({ "message": "Transaction created", "data": tx }))
}

async fn update_transaction_status(
    State(db): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut db = db.lock().unwrap();
    if let Err(response) = require_admin(&db, &headers) {
        return response;
    }
    let Some(tx) = db.transactions.iter_mut().find(|t| t["_id"] == id) else {
        return not_found("Transaction");
    };
    tx["status"] = body["status"].clone();
    tx["updatedAt"] = json!(now());
    let tx = tx.clone();
    reply(StatusCode::OK, json!({ "message": "Transaction updated", "data": tx }))
}
