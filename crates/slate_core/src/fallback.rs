//! crates/slate_core/src/fallback.rs
//!
//! Fixed demonstration content served when a collection has no real data
//! or the store cannot be reached. The sets are constant for a given
//! `FALLBACK_VERSION`; only the lecture set depends on its parameters.

use crate::domain::{Course, Lecture, Summary};
use crate::schema::Entity;

/// Bumped whenever any demo set below changes.
pub const FALLBACK_VERSION: u32 = 1;

/// Course id stamped on demo lectures when the caller names none.
pub const DEMO_COURSE_ID: &str = "demo-course";

/// Inputs that shape a fallback set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackParams {
    pub course_id: Option<String>,
}

impl FallbackParams {
    pub fn for_course(course_id: impl Into<String>) -> Self {
        Self { course_id: Some(course_id.into()) }
    }
}

/// An entity with a demonstration set.
pub trait Fallback: Entity {
    fn fallback(params: &FallbackParams) -> Vec<Self>;
}

/// The demo set for `E`. Same parameters, same entities, same order.
pub fn fallback_for<E: Fallback>(params: &FallbackParams) -> Vec<E> {
    E::fallback(params)
}

impl Fallback for Course {
    fn fallback(_params: &FallbackParams) -> Vec<Self> {
        vec![
            Course {
                title: "Intro to Machine Learning".to_string(),
                description: Some("Foundations and practical ML projects".to_string()),
                instructor: "Dr. Rivera".to_string(),
                thumbnail_url: Some("https://images.unsplash.com/photo-1551033406-611cf9a28f67?w=800&q=80&auto=format&fit=crop".to_string()),
                progress_percent: 42,
            },
            Course {
                title: "Modern Web Development".to_string(),
                description: Some("React, APIs, and cloud-native patterns".to_string()),
                instructor: "Alex Kim".to_string(),
                thumbnail_url: Some("https://images.unsplash.com/photo-1518779578993-ec3579fee39f?w=800&q=80&auto=format&fit=crop".to_string()),
                progress_percent: 75,
            },
            Course {
                title: "Data Visualization".to_string(),
                description: Some("Tell stories with data using D3 and Tableau".to_string()),
                instructor: "Priya Natarajan".to_string(),
                thumbnail_url: Some("https://images.unsplash.com/photo-1515879218367-8466d910aaa4?w=800&q=80&auto=format&fit=crop".to_string()),
                progress_percent: 10,
            },
        ]
    }
}

impl Fallback for Lecture {
    /// Every demo lecture carries the requested course id.
    fn fallback(params: &FallbackParams) -> Vec<Self> {
        let course_id = params.course_id.as_deref().unwrap_or(DEMO_COURSE_ID);
        vec![
            Lecture {
                course_id: course_id.to_string(),
                title: "Lecture 1: Introduction".to_string(),
                order: 1,
                duration_minutes: 12,
                pdf_attached: true,
                pdf_url: Some("#".to_string()),
            },
            Lecture {
                course_id: course_id.to_string(),
                title: "Lecture 2: Core Concepts".to_string(),
                order: 2,
                duration_minutes: 18,
                pdf_attached: false,
                pdf_url: None,
            },
        ]
    }
}

impl Fallback for Summary {
    fn fallback(_params: &FallbackParams) -> Vec<Self> {
        vec![Summary {
            lecture_id: "1".to_string(),
            model_name: "mock-gpt-4o-mini".to_string(),
            word_count: 124,
            content: "This lecture introduces the course structure and key outcomes...".to_string(),
        }]
    }
}
