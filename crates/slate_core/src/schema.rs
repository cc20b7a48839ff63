//! crates/slate_core/src/schema.rs
//!
//! Declarative field tables for each stored entity and the validation that
//! turns a raw document into an entity.
//!
//! Each collection is named after its entity in lowercase (`Course` -> `course`).
//! Bounded integers are rejected when out of range; nothing is clamped.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::domain::{Course, Lecture, Summary, DEFAULT_DURATION_MINUTES, DEFAULT_MODEL_NAME};
use crate::filter::json_kind;
use crate::ports::RawDocument;

//=========================================================================================
// Validation Errors
//=========================================================================================

/// Why a raw document could not become an entity. Always names the field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{collection}.{field} is required")]
    Missing {
        collection: &'static str,
        field: &'static str,
    },
    #[error("{collection}.{field} must be {expected}, got {found}")]
    WrongType {
        collection: &'static str,
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("{collection}.{field} = {value} is outside {range}")]
    OutOfRange {
        collection: &'static str,
        field: &'static str,
        value: String,
        range: String,
    },
    #[error("{collection}.{field} is inconsistent: {reason}")]
    Inconsistent {
        collection: &'static str,
        field: &'static str,
        reason: &'static str,
    },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field, .. }
            | Self::WrongType { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::Inconsistent { field, .. } => field,
        }
    }
}

//=========================================================================================
// Field Specifications
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer { min: i64, max: Option<i64> },
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Text(&'static str),
    Integer(i64),
    Boolean(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
    Default(DefaultValue),
}

/// One field of an entity: its name, type, bounds, and what happens when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, presence: Presence::Required }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, presence: Presence::Optional }
    }

    pub const fn defaulted(name: &'static str, kind: FieldKind, default: DefaultValue) -> Self {
        Self { name, kind, presence: Presence::Default(default) }
    }
}

/// A stored entity type with a schema and a collection.
pub trait Entity: Sized + Serialize + DeserializeOwned + Send + 'static {
    const COLLECTION: &'static str;

    fn fields() -> &'static [FieldSpec];

    /// Checks `raw` against the schema and builds the entity with defaults applied.
    fn validate(raw: &RawDocument) -> Result<Self, ValidationError>;
}

/// The stored entity collections, for callers that dispatch on a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Course,
    Lecture,
    Summary,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [Self::Course, Self::Lecture, Self::Summary];

    pub fn from_collection(collection: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.collection() == collection)
    }

    pub fn collection(self) -> &'static str {
        match self {
            Self::Course => Course::COLLECTION,
            Self::Lecture => Lecture::COLLECTION,
            Self::Summary => Summary::COLLECTION,
        }
    }

    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::Course => Course::fields(),
            Self::Lecture => Lecture::fields(),
            Self::Summary => Summary::fields(),
        }
    }
}

//=========================================================================================
// Field Reader
//=========================================================================================

/// Reads typed values out of a raw document according to `FieldSpec`s.
struct Fields<'a> {
    collection: &'static str,
    raw: &'a RawDocument,
}

impl<'a> Fields<'a> {
    fn new(collection: &'static str, raw: &'a RawDocument) -> Self {
        Self { collection, raw }
    }

    /// The present, non-null value for `spec`, or `None`. Errors if required and absent.
    fn present(&self, spec: &FieldSpec) -> Result<Option<&'a Value>, ValidationError> {
        match self.raw.get(spec.name).filter(|v| !v.is_null()) {
            Some(value) => Ok(Some(value)),
            None if spec.presence == Presence::Required => Err(ValidationError::Missing {
                collection: self.collection,
                field: spec.name,
            }),
            None => Ok(None),
        }
    }

    fn wrong_type(&self, spec: &FieldSpec, expected: &'static str, found: &Value) -> ValidationError {
        ValidationError::WrongType {
            collection: self.collection,
            field: spec.name,
            expected,
            found: json_kind(found),
        }
    }

    fn optional_text(&self, spec: &FieldSpec) -> Result<Option<String>, ValidationError> {
        match self.present(spec)? {
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.wrong_type(spec, "a string", other)),
            None => match spec.presence {
                Presence::Default(DefaultValue::Text(default)) => Ok(Some(default.to_string())),
                _ => Ok(None),
            },
        }
    }

    fn text(&self, spec: &FieldSpec) -> Result<String, ValidationError> {
        self.optional_text(spec)?.ok_or(ValidationError::Missing {
            collection: self.collection,
            field: spec.name,
        })
    }

    fn boolean(&self, spec: &FieldSpec) -> Result<bool, ValidationError> {
        match self.present(spec)? {
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(self.wrong_type(spec, "a boolean", other)),
            None => match spec.presence {
                Presence::Default(DefaultValue::Boolean(default)) => Ok(default),
                _ => Err(ValidationError::Missing {
                    collection: self.collection,
                    field: spec.name,
                }),
            },
        }
    }

    /// Reads a bounded integer and narrows it to `T`.
    fn integer<T: TryFrom<i64>>(&self, spec: &FieldSpec) -> Result<T, ValidationError> {
        let FieldKind::Integer { min, max } = spec.kind else {
            return Err(ValidationError::Inconsistent {
                collection: self.collection,
                field: spec.name,
                reason: "field is not declared as an integer",
            });
        };

        let value = match self.present(spec)? {
            Some(value) => self.integral(spec, value)?,
            None => match spec.presence {
                Presence::Default(DefaultValue::Integer(default)) => default,
                _ => {
                    return Err(ValidationError::Missing {
                        collection: self.collection,
                        field: spec.name,
                    })
                }
            },
        };

        let out_of_range = || ValidationError::OutOfRange {
            collection: self.collection,
            field: spec.name,
            value: value.to_string(),
            range: match max {
                Some(max) => format!("[{}, {}]", min, max),
                None => format!("[{}, ..)", min),
            },
        };
        if value < min || max.is_some_and(|max| value > max) {
            return Err(out_of_range());
        }
        T::try_from(value).map_err(|_| out_of_range())
    }

    /// Accepts JSON integers and integral floats; stores often keep numbers as doubles.
    fn integral(&self, spec: &FieldSpec, value: &Value) -> Result<i64, ValidationError> {
        let Value::Number(number) = value else {
            return Err(self.wrong_type(spec, "an integer", value));
        };
        if let Some(n) = number.as_i64() {
            return Ok(n);
        }
        if let Some(n) = number.as_u64() {
            return Err(ValidationError::OutOfRange {
                collection: self.collection,
                field: spec.name,
                value: n.to_string(),
                range: "a 64-bit signed integer".to_string(),
            });
        }
        // `i64::MAX as f64` rounds up to 2^63, which is already out of range.
        match number.as_f64() {
            Some(f) if f.fract() != 0.0 => Err(self.wrong_type(spec, "an integer", value)),
            Some(f) if f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
            Some(f) if f.is_finite() => Err(ValidationError::OutOfRange {
                collection: self.collection,
                field: spec.name,
                value: value.to_string(),
                range: "a 64-bit signed integer".to_string(),
            }),
            _ => Err(self.wrong_type(spec, "an integer", value)),
        }
    }
}

//=========================================================================================
// Entity Schemas
//=========================================================================================

mod course_fields {
    use super::*;

    pub const TITLE: FieldSpec = FieldSpec::required("title", FieldKind::Text);
    pub const DESCRIPTION: FieldSpec = FieldSpec::optional("description", FieldKind::Text);
    pub const INSTRUCTOR: FieldSpec = FieldSpec::required("instructor", FieldKind::Text);
    pub const THUMBNAIL_URL: FieldSpec = FieldSpec::optional("thumbnail_url", FieldKind::Text);
    pub const PROGRESS_PERCENT: FieldSpec = FieldSpec::defaulted(
        "progress_percent",
        FieldKind::Integer { min: 0, max: Some(100) },
        DefaultValue::Integer(0),
    );

    pub const ALL: &[FieldSpec] = &[TITLE, DESCRIPTION, INSTRUCTOR, THUMBNAIL_URL, PROGRESS_PERCENT];
}

impl Entity for Course {
    const COLLECTION: &'static str = "course";

    fn fields() -> &'static [FieldSpec] {
        course_fields::ALL
    }

    fn validate(raw: &RawDocument) -> Result<Self, ValidationError> {
        use course_fields::*;
        let f = Fields::new(Self::COLLECTION, raw);
        Ok(Course {
            title: f.text(&TITLE)?,
            description: f.optional_text(&DESCRIPTION)?,
            instructor: f.text(&INSTRUCTOR)?,
            thumbnail_url: f.optional_text(&THUMBNAIL_URL)?,
            progress_percent: f.integer(&PROGRESS_PERCENT)?,
        })
    }
}

mod lecture_fields {
    use super::*;

    pub const COURSE_ID: FieldSpec = FieldSpec::required("course_id", FieldKind::Text);
    pub const TITLE: FieldSpec = FieldSpec::required("title", FieldKind::Text);
    pub const ORDER: FieldSpec =
        FieldSpec::required("order", FieldKind::Integer { min: 1, max: None });
    pub const DURATION_MINUTES: FieldSpec = FieldSpec::defaulted(
        "duration_minutes",
        FieldKind::Integer { min: 0, max: None },
        DefaultValue::Integer(DEFAULT_DURATION_MINUTES as i64),
    );
    pub const PDF_ATTACHED: FieldSpec =
        FieldSpec::defaulted("pdf_attached", FieldKind::Boolean, DefaultValue::Boolean(false));
    pub const PDF_URL: FieldSpec = FieldSpec::optional("pdf_url", FieldKind::Text);

    pub const ALL: &[FieldSpec] =
        &[COURSE_ID, TITLE, ORDER, DURATION_MINUTES, PDF_ATTACHED, PDF_URL];
}

impl Entity for Lecture {
    const COLLECTION: &'static str = "lecture";

    fn fields() -> &'static [FieldSpec] {
        lecture_fields::ALL
    }

    fn validate(raw: &RawDocument) -> Result<Self, ValidationError> {
        use lecture_fields::*;
        let f = Fields::new(Self::COLLECTION, raw);
        let lecture = Lecture {
            course_id: f.text(&COURSE_ID)?,
            title: f.text(&TITLE)?,
            order: f.integer(&ORDER)?,
            duration_minutes: f.integer(&DURATION_MINUTES)?,
            pdf_attached: f.boolean(&PDF_ATTACHED)?,
            pdf_url: f.optional_text(&PDF_URL)?,
        };

        // The attachment flag and the URL must agree.
        let has_url = lecture.pdf_url.as_deref().is_some_and(|url| !url.is_empty());
        match (lecture.pdf_attached, has_url) {
            (true, false) => Err(ValidationError::Inconsistent {
                collection: Self::COLLECTION,
                field: PDF_URL.name,
                reason: "pdf_attached is true but no pdf_url is set",
            }),
            (false, true) => Err(ValidationError::Inconsistent {
                collection: Self::COLLECTION,
                field: PDF_URL.name,
                reason: "pdf_url is set but pdf_attached is false",
            }),
            _ => Ok(lecture),
        }
    }
}

mod summary_fields {
    use super::*;

    pub const LECTURE_ID: FieldSpec = FieldSpec::required("lecture_id", FieldKind::Text);
    pub const MODEL_NAME: FieldSpec = FieldSpec::defaulted(
        "model_name",
        FieldKind::Text,
        DefaultValue::Text(DEFAULT_MODEL_NAME),
    );
    pub const WORD_COUNT: FieldSpec =
        FieldSpec::required("word_count", FieldKind::Integer { min: 0, max: None });
    pub const CONTENT: FieldSpec = FieldSpec::required("content", FieldKind::Text);

    pub const ALL: &[FieldSpec] = &[LECTURE_ID, MODEL_NAME, WORD_COUNT, CONTENT];
}

impl Entity for Summary {
    const COLLECTION: &'static str = "summary";

    fn fields() -> &'static [FieldSpec] {
        summary_fields::ALL
    }

    fn validate(raw: &RawDocument) -> Result<Self, ValidationError> {
        use summary_fields::*;
        let f = Fields::new(Self::COLLECTION, raw);
        Ok(Summary {
            lecture_id: f.text(&LECTURE_ID)?,
            model_name: f.text(&MODEL_NAME)?,
            word_count: f.integer(&WORD_COUNT)?,
            content: f.text(&CONTENT)?,
        })
    }
}
