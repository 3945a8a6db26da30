use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::pagination::default_limit;
use crate::core::time::format_primitive;
use crate::db::models::{Category, Course, Lesson, Question, Quiz};
use crate::db::types::ChoiceLetter;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CategoryCreate {
    #[validate(length(min = 1, max = 100, message = "name must be 1..100 characters"))]
    pub(crate) name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CategoryResponse {
    pub(crate) id: String,
    pub(crate) name: String,
}

impl CategoryResponse {
    pub(crate) fn from_db(category: Category) -> Self {
        Self { id: category.id, name: category.name }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CourseCreate {
    #[serde(alias = "categoryId")]
    pub(crate) category_id: String,
    /// Defaults to the caller's own instructor profile.
    #[serde(default)]
    #[serde(alias = "instructorId")]
    pub(crate) instructor_id: Option<String>,
    #[validate(length(min = 1, max = 200, message = "title must be 1..200 characters"))]
    pub(crate) title: String,
    #[validate(length(min = 1, max = 50, message = "slug must be 1..50 characters"))]
    pub(crate) slug: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(alias = "priceCents")]
    #[validate(range(min = 0, message = "price_cents must be non-negative"))]
    pub(crate) price_cents: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CourseUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "title must be 1..200 characters"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[serde(alias = "priceCents")]
    #[validate(range(min = 0, message = "price_cents must be non-negative"))]
    pub(crate) price_cents: Option<i64>,
    #[serde(default)]
    #[serde(alias = "isApproved")]
    pub(crate) is_approved: Option<bool>,
    #[serde(default)]
    #[serde(alias = "isPublished")]
    pub(crate) is_published: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CourseListQuery {
    #[serde(default)]
    pub(crate) skip: i64,
    #[serde(default = "default_limit")]
    pub(crate) limit: i64,
    #[serde(default)]
    pub(crate) category_id: Option<String>,
    #[serde(default)]
    pub(crate) instructor_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseResponse {
    pub(crate) id: String,
    pub(crate) category_id: String,
    pub(crate) instructor_id: String,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) description: String,
    pub(crate) price_cents: i64,
    pub(crate) is_approved: bool,
    pub(crate) is_published: bool,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl CourseResponse {
    pub(crate) fn from_db(course: Course) -> Self {
        Self {
            id: course.id,
            category_id: course.category_id,
            instructor_id: course.instructor_id,
            title: course.title,
            slug: course.slug,
            description: course.description,
            price_cents: course.price_cents,
            is_approved: course.is_approved,
            is_published: course.is_published,
            created_at: format_primitive(course.created_at),
            updated_at: format_primitive(course.updated_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct LessonCreate {
    #[validate(length(min = 1, max = 200, message = "title must be 1..200 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(alias = "videoPath")]
    #[validate(length(min = 1, max = 255, message = "video_path must be 1..255 characters"))]
    pub(crate) video_path: String,
    #[serde(alias = "slidesPath")]
    #[validate(length(min = 1, max = 255, message = "slides_path must be 1..255 characters"))]
    pub(crate) slides_path: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LessonResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) video_path: String,
    pub(crate) slides_path: String,
    pub(crate) created_at: String,
}

impl LessonResponse {
    pub(crate) fn from_db(lesson: Lesson) -> Self {
        Self {
            id: lesson.id,
            course_id: lesson.course_id,
            title: lesson.title,
            description: lesson.description,
            video_path: lesson.video_path,
            slides_path: lesson.slides_path,
            created_at: format_primitive(lesson.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizResponse {
    pub(crate) id: String,
    pub(crate) lesson_id: String,
    pub(crate) questions: Vec<QuestionResponse>,
    pub(crate) created_at: String,
}

impl QuizResponse {
    pub(crate) fn from_db(quiz: Quiz, questions: Vec<QuestionResponse>) -> Self {
        Self {
            id: quiz.id,
            lesson_id: quiz.lesson_id,
            questions,
            created_at: format_primitive(quiz.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionCreate {
    #[validate(length(min = 1, max = 255, message = "text must be 1..255 characters"))]
    pub(crate) text: String,
    #[validate(length(min = 1, max = 255, message = "choice_a must be 1..255 characters"))]
    pub(crate) choice_a: String,
    #[validate(length(min = 1, max = 255, message = "choice_b must be 1..255 characters"))]
    pub(crate) choice_b: String,
    #[validate(length(min = 1, max = 255, message = "choice_c must be 1..255 characters"))]
    pub(crate) choice_c: String,
    #[validate(length(min = 1, max = 255, message = "choice_d must be 1..255 characters"))]
    pub(crate) choice_d: String,
    #[serde(alias = "correctChoice")]
    pub(crate) correct_choice: ChoiceLetter,
    #[serde(default)]
    #[serde(alias = "orderIndex")]
    #[validate(range(min = 0, message = "order_index must be non-negative"))]
    pub(crate) order_index: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) text: String,
    pub(crate) choice_a: String,
    pub(crate) choice_b: String,
    pub(crate) choice_c: String,
    pub(crate) choice_d: String,
    /// Only revealed to the course's instructor and admins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) correct_choice: Option<ChoiceLetter>,
    pub(crate) order_index: i32,
}

impl QuestionResponse {
    pub(crate) fn from_db(question: Question, reveal_answer: bool) -> Self {
        Self {
            id: question.id,
            text: question.text,
            choice_a: question.choice_a,
            choice_b: question.choice_b,
            choice_c: question.choice_c,
            choice_d: question.choice_d,
            correct_choice: reveal_answer.then_some(question.correct_choice),
            order_index: question.order_index,
        }
    }
}
