//! Typed entity models.
//!
//! The collection engine works on [`Record`]s so one implementation serves
//! every screen. These structs are the typed view of the same data, used
//! where code needs real fields (public listings, CLI output, tests). They
//! round-trip through [`Record`] with serde; `_id` is accepted on input.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::entity::{EntityDescriptor, EntityKind};
use crate::error::Result;
use crate::media::RemoteMedia;
use crate::record::{Record, RecordId};

/// A typed entity bound to its descriptor.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync {
    const KIND: EntityKind;

    fn descriptor() -> &'static EntityDescriptor {
        Self::KIND.descriptor()
    }

    fn id(&self) -> Option<&RecordId>;

    fn to_record(&self) -> Result<Record> {
        Record::encode(self)
    }

    fn from_record(record: &Record) -> Result<Self> {
        record.decode()
    }
}

macro_rules! impl_entity {
    ($ty:ty, $kind:expr) => {
        impl Entity for $ty {
            const KIND: EntityKind = $kind;

            fn id(&self) -> Option<&RecordId> {
                self.id.as_ref()
            }
        }
    };
}

/// Question and answer shown on course and university pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// One section of a course syllabus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyllabusSection {
    pub title: String,
    #[serde(default)]
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<f64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub syllabus: Vec<SyllabusSection>,
    #[serde(default)]
    pub faqs: Vec<FaqEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<RemoteMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Admission details nested in a university record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct University {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking: Option<u32>,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub programs: Vec<String>,
    #[serde(default)]
    pub faqs: Vec<FaqEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission: Option<Admission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<RemoteMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campus_image: Option<RemoteMedia>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<RemoteMedia>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub email: String,
    /// Network name to profile URL.
    #[serde(default)]
    pub socials: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<RemoteMedia>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub course: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<RemoteMedia>,
}

/// Follow-up state of a consultation request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsultationStatus {
    #[default]
    Pending,
    Completed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consultation {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: ConsultationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPerformer {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub exam: String,
    /// Free text: "98.5 percentile", "AIR 112".
    #[serde(default)]
    pub score: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub university: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<RemoteMedia>,
}

/// Previous-year question paper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPaper {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub title: String,
    #[serde(default)]
    pub exam: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<RemoteMedia>,
}

/// Newsletter subscriber.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscribed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImatUniversity {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<RemoteMedia>,
}

impl_entity!(Course, EntityKind::Course);
impl_entity!(University, EntityKind::University);
impl_entity!(Blog, EntityKind::Blog);
impl_entity!(TeamMember, EntityKind::TeamMember);
impl_entity!(Testimonial, EntityKind::Testimonial);
impl_entity!(Consultation, EntityKind::Consultation);
impl_entity!(TopPerformer, EntityKind::TopPerformer);
impl_entity!(QuestionPaper, EntityKind::QuestionPaper);
impl_entity!(Subscriber, EntityKind::Subscriber);
impl_entity!(ImatUniversity, EntityKind::ImatUniversity);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_university_from_record_with_alias_and_bare_url() {
        let record = Record::from_value(json!({
            "_id": "u1",
            "name": "Università di Pavia",
            "location": "Pavia",
            "programs": ["Medicine", "Pharmacy"],
            "logo": "https://cdn/pavia.png",
            "campusImage": {"url": "https://cdn/campus.jpg", "publicId": "campus"}
        }))
        .unwrap();

        let uni = University::from_record(&record).unwrap();
        assert_eq!(uni.id, Some(RecordId::from("u1")));
        assert_eq!(uni.programs.len(), 2);
        assert_eq!(uni.logo.unwrap().url, "https://cdn/pavia.png");
        assert_eq!(uni.campus_image.unwrap().public_id.as_deref(), Some("campus"));
    }

    #[test]
    fn test_course_to_record_uses_canonical_id() {
        let course = Course {
            id: Some(RecordId::from("c1")),
            title: "IMAT Prep".to_string(),
            faqs: vec![FaqEntry {
                question: "Duration?".to_string(),
                answer: "6 months".to_string(),
            }],
            ..Default::default()
        };
        let record = course.to_record().unwrap();
        assert_eq!(record.id(), Some(RecordId::from("c1")));
        assert_eq!(record.get("faqs").unwrap()[0]["answer"], json!("6 months"));
        assert!(!record.contains_key("thumbnail"));
    }

    #[test]
    fn test_consultation_status_defaults_to_pending() {
        let record = Record::from_value(json!({"id": "c1", "name": "Asha"})).unwrap();
        let consultation = Consultation::from_record(&record).unwrap();
        assert_eq!(consultation.status, ConsultationStatus::Pending);

        let record = Record::from_value(json!({"id": "c2", "name": "Ravi", "status": "completed"}))
            .unwrap();
        let consultation = Consultation::from_record(&record).unwrap();
        assert_eq!(consultation.status, ConsultationStatus::Completed);
    }

    #[test]
    fn test_blog_timestamp_parses() {
        let record = Record::from_value(json!({
            "id": "b1",
            "title": "Studying in Italy",
            "publishedAt": "2024-03-01T10:00:00Z"
        }))
        .unwrap();
        let blog = Blog::from_record(&record).unwrap();
        assert!(blog.published_at.is_some());
    }

    #[test]
    fn test_entity_descriptor_binding() {
        assert_eq!(Testimonial::descriptor().path, "testimonials");
        assert_eq!(QuestionPaper::KIND, EntityKind::QuestionPaper);
    }
}
