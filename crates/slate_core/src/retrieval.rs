//! crates/slate_core/src/retrieval.rs
//!
//! The entry point callers use to read entities: query the store, normalize
//! what comes back, and fall back to demo content when nothing usable is left.
//!
//! Reads never fail for "not found" or "store down"; both degrade to demo
//! data. Real and demo entities are never mixed in one result.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::domain::{Course, Lecture, LectureListing, StoreStatus, Summary};
use crate::fallback::{fallback_for, Fallback, FallbackParams};
use crate::filter::Filter;
use crate::normalizer::normalize;
use crate::ports::{DocumentStore, PortError, PortResult, QueryOutcome, RawDocument};
use crate::schema::EntityKind;

/// Upper bound for any single read.
pub const MAX_QUERY_LIMIT: usize = 100;
pub const DEFAULT_COURSE_LIMIT: usize = 20;
pub const LECTURE_LIMIT: usize = 100;
pub const SUMMARY_LIMIT: usize = 100;
/// How many collection names `store_status` reports.
pub const STATUS_COLLECTION_LIMIT: usize = 10;

#[derive(Clone)]
pub struct RetrievalService {
    store: Arc<dyn DocumentStore>,
}

impl RetrievalService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Lists courses, or the demo course set when none are usable.
    pub async fn list_courses(&self, limit: usize) -> Vec<Course> {
        let limit = limit.clamp(1, MAX_QUERY_LIMIT);
        self.fetch_or_fallback(&Filter::empty(), limit, &FallbackParams::default())
            .await
    }

    /// Lists a course's lectures together with every stored summary.
    ///
    /// Summaries are not narrowed to the returned lectures; callers join on
    /// `lecture_id`. The two fallbacks are decided independently.
    pub async fn list_lectures(&self, course_id: &str) -> LectureListing {
        let params = FallbackParams::for_course(course_id);
        let lecture_filter = Filter::eq("course_id", course_id);
        let summary_filter = Filter::empty();
        let (lectures, summaries) = futures::join!(
            self.fetch_or_fallback::<Lecture>(&lecture_filter, LECTURE_LIMIT, &params),
            self.fetch_or_fallback::<Summary>(&summary_filter, SUMMARY_LIMIT, &params),
        );
        LectureListing { lectures, summaries }
    }

    /// A filtered read over any entity collection, serialized to JSON objects.
    ///
    /// Only the filter shape can fail; everything else follows the read policy.
    pub async fn query_collection(
        &self,
        kind: EntityKind,
        filter: Value,
        limit: usize,
    ) -> PortResult<Vec<Value>> {
        let filter = Filter::parse(filter)?;
        let limit = limit.clamp(1, MAX_QUERY_LIMIT);
        let params = FallbackParams {
            course_id: filter
                .get("course_id")
                .and_then(Value::as_str)
                .map(str::to_string),
        };

        match kind {
            EntityKind::Course => {
                to_json(self.fetch_or_fallback::<Course>(&filter, limit, &params).await)
            }
            EntityKind::Lecture => {
                to_json(self.fetch_or_fallback::<Lecture>(&filter, limit, &params).await)
            }
            EntityKind::Summary => {
                to_json(self.fetch_or_fallback::<Summary>(&filter, limit, &params).await)
            }
        }
    }

    /// Pass-through write. Unlike reads, failures reach the caller.
    pub async fn insert_document(
        &self,
        collection: &str,
        document: RawDocument,
    ) -> PortResult<String> {
        let id = self.store.insert(collection, document).await?;
        info!(collection, id = %id, "Document inserted");
        Ok(id)
    }

    pub async fn store_status(&self) -> StoreStatus {
        let available = self.store.is_available().await;
        let mut collections = if available {
            self.store.list_collections().await
        } else {
            Vec::new()
        };
        collections.truncate(STATUS_COLLECTION_LIMIT);
        StoreStatus { available, collections }
    }

    async fn fetch_or_fallback<E: Fallback>(
        &self,
        filter: &Filter,
        limit: usize,
        params: &FallbackParams,
    ) -> Vec<E> {
        let outcome = self.store.fetch(E::COLLECTION, filter, limit).await;
        let reason = match outcome {
            QueryOutcome::Found(raw_docs) => {
                let entities = normalize::<E>(&raw_docs);
                if !entities.is_empty() {
                    debug!(collection = E::COLLECTION, count = entities.len(), "Serving stored entities");
                    return entities;
                }
                "no valid documents"
            }
            QueryOutcome::Empty => "no documents",
            QueryOutcome::Unavailable => "store unavailable",
        };
        debug!(collection = E::COLLECTION, reason, "Serving demo entities");
        fallback_for::<E>(params)
    }
}

fn to_json<E: serde::Serialize>(entities: Vec<E>) -> PortResult<Vec<Value>> {
    entities
        .iter()
        .map(|e| serde_json::to_value(e).map_err(|e| PortError::Unexpected(e.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use serde_json::json;

    fn raw(value: Value) -> RawDocument {
        value.as_object().cloned().unwrap()
    }

    async fn service_with(docs: Vec<(&str, Value)>) -> RetrievalService {
        let store = Arc::new(InMemoryStore::new());
        for (collection, doc) in docs {
            store.insert(collection, raw(doc)).await.unwrap();
        }
        RetrievalService::new(store)
    }

    fn demo_titles(courses: &[Course]) -> Vec<&str> {
        courses.iter().map(|c| c.title.as_str()).collect()
    }

    #[tokio::test]
    async fn empty_store_serves_the_demo_courses_every_time() {
        let service = service_with(vec![]).await;
        let first = service.list_courses(DEFAULT_COURSE_LIMIT).await;
        let second = service.list_courses(DEFAULT_COURSE_LIMIT).await;
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
        assert_eq!(
            demo_titles(&first),
            vec!["Intro to Machine Learning", "Modern Web Development", "Data Visualization"]
        );
    }

    #[tokio::test]
    async fn unavailable_store_serves_the_demo_courses() {
        let service = RetrievalService::new(Arc::new(InMemoryStore::closed()));
        assert_eq!(service.list_courses(20).await.len(), 3);
    }

    #[tokio::test]
    async fn malformed_course_is_dropped_and_demo_data_is_not_merged() {
        let service = service_with(vec![
            ("course", json!({"title": "Real Course", "instructor": "Ada"})),
            ("course", json!({"title": "No Instructor"})),
        ])
        .await;

        let courses = service.list_courses(20).await;
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].title, "Real Course");
    }

    #[tokio::test]
    async fn only_malformed_courses_degrade_to_demo_data() {
        let service = service_with(vec![("course", json!({"title": "No Instructor"}))]).await;
        assert_eq!(service.list_courses(20).await.len(), 3);
    }

    #[tokio::test]
    async fn course_limit_is_clamped() {
        let docs = (0..120)
            .map(|i| ("course", json!({"title": format!("C{}", i), "instructor": "X"})))
            .collect();
        let service = service_with(docs).await;
        assert_eq!(service.list_courses(500).await.len(), MAX_QUERY_LIMIT);
        assert_eq!(service.list_courses(0).await.len(), 1);
    }

    #[tokio::test]
    async fn demo_lectures_follow_the_requested_course() {
        let service = service_with(vec![]).await;

        let abc = service.list_lectures("abc").await;
        assert_eq!(abc.lectures.len(), 2);
        assert!(abc.lectures.iter().all(|l| l.course_id == "abc"));
        assert_eq!(abc.summaries.len(), 1);

        let xyz = service.list_lectures("xyz").await;
        assert!(xyz.lectures.iter().all(|l| l.course_id == "xyz"));
    }

    #[tokio::test]
    async fn lecture_and_summary_fallbacks_are_independent() {
        let service = service_with(vec![
            ("lecture", json!({"course_id": "c1", "title": "Real", "order": 1})),
            ("summary", json!({"lecture_id": "other", "word_count": 5, "content": "stored"})),
        ])
        .await;

        let listing = service.list_lectures("c1").await;
        assert_eq!(listing.lectures.len(), 1);
        assert_eq!(listing.lectures[0].title, "Real");
        assert_eq!(listing.summaries.len(), 1);
        assert_eq!(listing.summaries[0].content, "stored");

        // Another course has no lectures but still sees every stored summary.
        let listing = service.list_lectures("c2").await;
        assert_eq!(listing.lectures.len(), 2);
        assert!(listing.lectures.iter().all(|l| l.course_id == "c2"));
        assert_eq!(listing.summaries[0].content, "stored");
    }

    #[tokio::test]
    async fn stored_lectures_with_no_summaries_get_demo_summaries() {
        let service = service_with(vec![(
            "lecture",
            json!({"course_id": "c1", "title": "Real", "order": 1}),
        )])
        .await;

        let listing = service.list_lectures("c1").await;
        assert_eq!(listing.lectures[0].title, "Real");
        assert_eq!(listing.summaries[0].model_name, "mock-gpt-4o-mini");
    }

    #[tokio::test]
    async fn query_collection_rejects_malformed_filters() {
        let service = service_with(vec![]).await;
        let result = service
            .query_collection(EntityKind::Lecture, json!({"order": {"$gt": 1}}), 10)
            .await;
        assert!(matches!(result, Err(PortError::MalformedFilter(_))));
    }

    #[tokio::test]
    async fn query_collection_filters_and_stamps_fallbacks() {
        let service = service_with(vec![
            ("lecture", json!({"course_id": "c1", "title": "One", "order": 1})),
            ("lecture", json!({"course_id": "c1", "title": "Two", "order": 2})),
        ])
        .await;

        let found = service
            .query_collection(EntityKind::Lecture, json!({"course_id": "c1", "order": 2}), 10)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["title"], json!("Two"));
        assert!(found[0].get("_id").is_none());

        let demo = service
            .query_collection(EntityKind::Lecture, json!({"course_id": "zzz"}), 10)
            .await
            .unwrap();
        assert_eq!(demo.len(), 2);
        assert!(demo.iter().all(|l| l["course_id"] == json!("zzz")));
    }

    #[tokio::test]
    async fn insert_is_fault_transparent() {
        let service = RetrievalService::new(Arc::new(InMemoryStore::closed()));
        let result = service
            .insert_document("course", raw(json!({"title": "T", "instructor": "I"})))
            .await;
        assert!(matches!(result, Err(PortError::StoreUnavailable)));
    }

    #[tokio::test]
    async fn inserted_documents_are_served_back() {
        let service = service_with(vec![]).await;
        service
            .insert_document("course", raw(json!({"title": "Fresh", "instructor": "I"})))
            .await
            .unwrap();
        assert_eq!(demo_titles(&service.list_courses(20).await), vec!["Fresh"]);
    }

    #[tokio::test]
    async fn store_status_reports_collections_only_when_available() {
        let service = service_with(vec![("course", json!({"title": "A", "instructor": "B"}))]).await;
        let status = service.store_status().await;
        assert!(status.available);
        assert_eq!(status.collections, vec!["course".to_string()]);

        service.store().close().await;
        let status = service.store_status().await;
        assert!(!status.available);
        assert!(status.collections.is_empty());
    }
}
