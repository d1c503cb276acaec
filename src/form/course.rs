use async_trait::async_trait;

use crate::{
    api::{ApiClient, ApiResult},
    form::{EntityForm, ValidationErrors},
    model::{
        CrudResource, SuccessResponse,
        entity::{Course, CourseCreate},
    },
    utils::files::{MAX_UPLOAD_BYTES, Upload},
};

#[derive(Debug, Clone, Default)]
pub struct CourseForm {
    id: Option<String>,
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub price: Option<i64>,
    pub category: String,
    pub goals: Vec<String>,
    /// Optional on update: the current thumbnail is kept when none is picked.
    pub thumbnail: Option<Upload>,
}

impl CourseForm {
    /// A new form starts with one empty goal row.
    pub fn new() -> Self {
        Self {
            goals: vec![String::new()],
            ..Self::default()
        }
    }

    pub fn edit(course: &Course) -> Self {
        Self {
            id: Some(course.id().to_string()),
            title: course.title().to_string(),
            description: course.description().to_string(),
            instructor: course.instructor().to_string(),
            price: Some(course.price()),
            category: course.category().id().to_string(),
            goals: course.goals().to_vec(),
            thumbnail: None,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    pub fn add_goal(&mut self) {
        self.goals.push(String::new());
    }

    pub fn remove_goal(&mut self, index: usize) {
        if index < self.goals.len() {
            self.goals.remove(index);
        }
    }

    fn into_request(self) -> (Option<String>, CourseCreate) {
        let request = CourseCreate {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            instructor: self.instructor.trim().to_string(),
            price: self.price.unwrap_or_default(),
            category: self.category,
            goals: self.goals.into_iter().map(|g| g.trim().to_string()).collect(),
            thumbnail: self.thumbnail,
        };
        (self.id, request)
    }
}

#[async_trait]
impl EntityForm for CourseForm {
    type Output = Course;

    const FAILURE_MESSAGE: &'static str = "Failed to save course";

    fn success_message(&self) -> &'static str {
        if self.is_edit() {
            "Course updated successfully"
        } else {
            "Course created successfully"
        }
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("title", &self.title, "Title is required");
        errors.require("description", &self.description, "Description is required");
        errors.require("instructor", &self.instructor, "Instructor is required");
        match self.price {
            None => errors.add("price", "Price is required"),
            Some(price) if price < 0 => errors.add("price", "Price must be at least 0"),
            Some(_) => {}
        }
        errors.require("category", &self.category, "Category is required");

        if self.goals.is_empty() {
            errors.add("goals", "At least one goal is required");
        }
        for (i, goal) in self.goals.iter().enumerate() {
            errors.require(&format!("goals[{i}]"), goal, "Goal content is required");
        }

        if let Some(thumbnail) = &self.thumbnail {
            if !thumbnail.is_image() {
                errors.add("thumbnail", "File format not supported");
            } else if thumbnail.size() > MAX_UPLOAD_BYTES {
                errors.add("thumbnail", "Maximum file size is 2MB");
            }
        }

        errors.into_result()
    }

    async fn send(self, client: &ApiClient) -> ApiResult<SuccessResponse<Course>> {
        match self.into_request() {
            (Some(id), request) => Course::update(client, &id, request).await,
            (None, request) => Course::create(client, request).await,
        }
    }
}
