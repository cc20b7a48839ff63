//! crates/slate_core/src/normalizer.rs
//!
//! Turns raw store documents into validated entities.

use tracing::warn;

use crate::ports::{RawDocument, STORE_ID_FIELD};
use crate::schema::Entity;

/// Validates each raw document as an `E`, in input order.
///
/// The store key is removed before validation. A document that fails its
/// schema is logged and dropped; its siblings are unaffected.
pub fn normalize<E: Entity>(raw_docs: &[RawDocument]) -> Vec<E> {
    raw_docs
        .iter()
        .filter_map(|raw| {
            let mut doc = raw.clone();
            let store_id = doc.remove(STORE_ID_FIELD);
            match E::validate(&doc) {
                Ok(entity) => Some(entity),
                Err(e) => {
                    warn!(
                        collection = E::COLLECTION,
                        store_id = ?store_id,
                        "Dropping malformed document: {}",
                        e
                    );
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Course, Lecture};
    use serde_json::{json, Value};

    fn raw(value: Value) -> RawDocument {
        value.as_object().cloned().unwrap()
    }

    fn course_batch() -> Vec<RawDocument> {
        vec![
            raw(json!({"_id": "a1", "title": "First", "instructor": "A", "progress_percent": 5})),
            raw(json!({"_id": "a2", "title": "Broken", "progress_percent": 150})),
            raw(json!({"_id": "a3", "title": "Third", "instructor": "C"})),
        ]
    }

    #[test]
    fn valid_documents_keep_their_values_and_lose_the_store_id() {
        let courses: Vec<Course> = normalize(&course_batch()[..1]);
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].title, "First");
        assert_eq!(courses[0].instructor, "A");
        assert_eq!(courses[0].progress_percent, 5);

        let value = serde_json::to_value(&courses[0]).unwrap();
        assert!(value.get("_id").is_none());
    }

    #[test]
    fn malformed_documents_are_dropped_without_affecting_siblings() {
        let courses: Vec<Course> = normalize(&course_batch());
        let titles: Vec<&str> = courses.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Third"]);
    }

    #[test]
    fn normalizing_twice_yields_identical_output() {
        let batch = course_batch();
        let first: Vec<Course> = normalize(&batch);
        let second: Vec<Course> = normalize(&batch);
        assert_eq!(first, second);
    }

    #[test]
    fn documents_are_checked_against_the_requested_entity() {
        let lectures: Vec<Lecture> = normalize(&course_batch());
        assert!(lectures.is_empty());
    }

    #[test]
    fn object_store_ids_are_stripped_too() {
        let batch = vec![raw(json!({
            "_id": {"$oid": "65f0c0ffee"},
            "course_id": "c1",
            "title": "Intro",
            "order": 1
        }))];
        let lectures: Vec<Lecture> = normalize(&batch);
        assert_eq!(lectures.len(), 1);
        assert_eq!(lectures[0].course_id, "c1");
    }
}
