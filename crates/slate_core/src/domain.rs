//! crates/slate_core/src/domain.rs
//!
//! Defines the core entity types for the application.
//! Entities carry no store identity: the document key stays inside the store
//! adapters and never appears in these structs or their JSON form.

use serde::{Deserialize, Serialize};

/// A course offered on the platform. Parent of `Lecture`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Course {
    pub title: String,
    pub description: Option<String>,
    pub instructor: String,
    pub thumbnail_url: Option<String>,
    /// Progress if enrolled, always within `0..=100`.
    #[serde(default)]
    pub progress_percent: u8,
}

/// A single lecture inside a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Lecture {
    /// Parent course id as string.
    pub course_id: String,
    pub title: String,
    /// Display position, starting at 1. Not guaranteed unique or contiguous.
    pub order: u32,
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub pdf_attached: bool,
    pub pdf_url: Option<String>,
}

/// A generated summary of a lecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Summary {
    /// Lecture id as string.
    pub lecture_id: String,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    pub word_count: u32,
    pub content: String,
}

// Used throughout the lecture listing endpoint. Summaries are not filtered by lecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LectureListing {
    pub lectures: Vec<Lecture>,
    pub summaries: Vec<Summary>,
}

/// The input half of a chat exchange. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub context: Option<String>,
}

/// The output half of a chat exchange. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ChatResponse {
    pub reply: String,
    #[serde(default)]
    pub sources: Option<Vec<String>>,
}

/// Liveness snapshot of the document store, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StoreStatus {
    pub available: bool,
    pub collections: Vec<String>,
}

pub(crate) const DEFAULT_DURATION_MINUTES: u32 = 10;
pub(crate) const DEFAULT_MODEL_NAME: &str = "mock-gpt";

fn default_duration_minutes() -> u32 {
    DEFAULT_DURATION_MINUTES
}

fn default_model_name() -> String {
    DEFAULT_MODEL_NAME.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn course_json_uses_field_names_and_nulls_for_absent_optionals() {
        let course = Course {
            title: "Rust".to_string(),
            description: None,
            instructor: "Ferris".to_string(),
            thumbnail_url: None,
            progress_percent: 0,
        };

        let value = serde_json::to_value(&course).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "Rust",
                "description": null,
                "instructor": "Ferris",
                "thumbnail_url": null,
                "progress_percent": 0
            })
        );
        assert!(value.get("_id").is_none());
    }

    #[test]
    fn course_round_trips_and_defaults_progress_when_omitted() {
        let course = Course {
            title: "Systems".to_string(),
            description: Some("Kernels and allocators".to_string()),
            instructor: "Ferris".to_string(),
            thumbnail_url: Some("https://cdn.example/systems.png".to_string()),
            progress_percent: 100,
        };
        let text = serde_json::to_string(&course).unwrap();
        let parsed: Course = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, course);

        let sparse: Course =
            serde_json::from_value(json!({"title": "Rust", "instructor": "Ferris"})).unwrap();
        assert_eq!(sparse.progress_percent, 0);
        assert!(sparse.description.is_none());
        assert!(sparse.thumbnail_url.is_none());
    }

    #[test]
    fn lecture_round_trips_through_json() {
        let lecture = Lecture {
            course_id: "c1".to_string(),
            title: "Ownership".to_string(),
            order: 3,
            duration_minutes: 45,
            pdf_attached: true,
            pdf_url: Some("https://cdn.example/ownership.pdf".to_string()),
        };

        let text = serde_json::to_string(&lecture).unwrap();
        let parsed: Lecture = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, lecture);
    }

    #[test]
    fn summary_round_trips_and_defaults_model_name_when_omitted() {
        let summary = Summary {
            lecture_id: "l1".to_string(),
            model_name: "gpt-4o".to_string(),
            word_count: 12,
            content: "Borrowing rules.".to_string(),
        };
        let parsed: Summary =
            serde_json::from_value(serde_json::to_value(&summary).unwrap()).unwrap();
        assert_eq!(parsed, summary);

        let omitted: Summary =
            serde_json::from_value(json!({"lecture_id": "l1", "word_count": 1, "content": "x"}))
                .unwrap();
        assert_eq!(omitted.model_name, "mock-gpt");
    }

    #[test]
    fn chat_request_context_is_optional() {
        let request: ChatRequest = serde_json::from_value(json!({"message": "hi"})).unwrap();
        assert_eq!(request.context, None);
    }
}
