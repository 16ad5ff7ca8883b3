//! Entity descriptors: the per-entity facts every generic component needs.
//!
//! Each admin screen is the same collection/filter/paginate/edit pattern
//! instantiated over a different entity. A descriptor carries the REST path,
//! the route style of the update and delete endpoints (which differ between
//! entities on the backend), the fields searched by the filter stage, the
//! media fields uploaded as multipart parts, and any custom actions.
//!
//! | Entity | Path | Update | Delete | Search fields |
//! |--------|------|--------|--------|---------------|
//! | Course | `courses` | `update/{id}` | `delete/{id}` | title, category, level |
//! | University | `universities` | `update/{id}` | `delete/{id}` | name, location |
//! | Blog | `blogs` | `edit/{id}` | `{id}` | title, author, tags |
//! | Team member | `team` | `update/{id}` | `delete/{id}` | name, role |
//! | Testimonial | `testimonials` | `edit/{id}` | `{id}` | name, course, message |
//! | Consultation | `consultations` | n/a | `delete/{id}` | name, email, phone |
//! | Top performer | `top-performers` | `update/{id}` | `delete/{id}` | name, exam, university |
//! | Question paper | `pyqs` | `update/{id}` | `delete/{id}` | title, exam, subject |
//! | Subscriber | `subscribers` | n/a | `{id}` | email |
//! | IMAT university | `imat-universities` | local only | local only | name, city |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::RecordId;

/// Every entity type managed by the back-office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Course,
    University,
    Blog,
    TeamMember,
    Testimonial,
    Consultation,
    TopPerformer,
    QuestionPaper,
    Subscriber,
    ImatUniversity,
}

impl EntityKind {
    pub const ALL: [EntityKind; 10] = [
        EntityKind::Course,
        EntityKind::University,
        EntityKind::Blog,
        EntityKind::TeamMember,
        EntityKind::Testimonial,
        EntityKind::Consultation,
        EntityKind::TopPerformer,
        EntityKind::QuestionPaper,
        EntityKind::Subscriber,
        EntityKind::ImatUniversity,
    ];

    pub fn descriptor(self) -> &'static EntityDescriptor {
        match self {
            EntityKind::Course => &COURSE,
            EntityKind::University => &UNIVERSITY,
            EntityKind::Blog => &BLOG,
            EntityKind::TeamMember => &TEAM_MEMBER,
            EntityKind::Testimonial => &TESTIMONIAL,
            EntityKind::Consultation => &CONSULTATION,
            EntityKind::TopPerformer => &TOP_PERFORMER,
            EntityKind::QuestionPaper => &QUESTION_PAPER,
            EntityKind::Subscriber => &SUBSCRIBER,
            EntityKind::ImatUniversity => &IMAT_UNIVERSITY,
        }
    }

    /// REST path segment.
    pub fn path(self) -> &'static str {
        self.descriptor().path
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    /// Accepts the path segment (`top-performers`) or the label in any case
    /// with spaces, dashes or underscores (`Top performer`, `top_performer`).
    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize_name(s);
        EntityKind::ALL
            .into_iter()
            .find(|kind| {
                let d = kind.descriptor();
                let label = normalize_name(d.label);
                normalize_name(d.path) == wanted || label == wanted || label + "s" == wanted
            })
            .ok_or_else(|| Error::Validation(format!("unknown entity type: {s}")))
    }
}

fn normalize_name(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Shape of the update endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateRoute {
    /// `PUT /{entity}/update/{id}`
    Update,
    /// `PUT /{entity}/edit/{id}`
    Edit,
}

/// Shape of the delete endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteRoute {
    /// `DELETE /{entity}/delete/{id}`
    Delete,
    /// `DELETE /{entity}/{id}`
    Bare,
}

/// Whether the screen talks to the API or keeps never-persisted local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    Remote,
    LocalOnly,
}

/// Operations a gateway offers for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operations {
    pub get_all: bool,
    pub get_by_id: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

impl Operations {
    pub const CRUD: Operations = Operations {
        get_all: true,
        get_by_id: true,
        create: true,
        update: true,
        delete: true,
    };
}

/// Kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Bool,
    /// ISO 8601 date or timestamp string.
    Date,
    /// Ordered sequence of strings (tags, programs offered).
    StringList,
    /// Ordered sequence of nested records (FAQ entries, syllabus sections).
    RecordList,
    /// Nested plain object.
    Object,
    /// Uploaded file: remote descriptor or pending local file.
    Media,
}

/// A field of an entity's form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name; for media fields this is the multipart part name and must
    /// match the backend exactly.
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

const fn text(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::Text)
}

const fn number(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::Number)
}

const fn date(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::Date)
}

const fn list(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::StringList)
}

const fn records(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::RecordList)
}

const fn object(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::Object)
}

const fn media(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::Media)
}

/// HTTP verb of a custom action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMethod {
    Post,
    Put,
    Patch,
}

/// Entity-specific action beyond CRUD (e.g. marking a consultation done).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomAction {
    pub name: &'static str,
    pub method: ActionMethod,
    /// Route segment placed between the entity path and the id:
    /// `/{entity}/{segment}/{id}`.
    pub segment: &'static str,
    /// Fields written into the local record once the action succeeds.
    pub patch: &'static [(&'static str, &'static str)],
}

/// Static description of one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub kind: EntityKind,
    /// Human label, singular.
    pub label: &'static str,
    pub path: &'static str,
    pub operations: Operations,
    pub update_route: UpdateRoute,
    pub delete_route: DeleteRoute,
    pub persistence: Persistence,
    pub search_fields: &'static [&'static str],
    pub fields: &'static [FieldSpec],
    pub actions: &'static [CustomAction],
}

impl EntityDescriptor {
    /// `GET /{entity}`
    pub fn list_path(&self) -> String {
        self.path.to_string()
    }

    /// `GET /{entity}/{id}`
    pub fn item_path(&self, id: &RecordId) -> String {
        format!("{}/{}", self.path, id)
    }

    /// `POST /{entity}/create`
    pub fn create_path(&self) -> String {
        format!("{}/create", self.path)
    }

    pub fn update_path(&self, id: &RecordId) -> String {
        match self.update_route {
            UpdateRoute::Update => format!("{}/update/{}", self.path, id),
            UpdateRoute::Edit => format!("{}/edit/{}", self.path, id),
        }
    }

    pub fn delete_path(&self, id: &RecordId) -> String {
        match self.delete_route {
            DeleteRoute::Delete => format!("{}/delete/{}", self.path, id),
            DeleteRoute::Bare => format!("{}/{}", self.path, id),
        }
    }

    pub fn action_path(&self, action: &CustomAction, id: &RecordId) -> String {
        format!("{}/{}/{}", self.path, action.segment, id)
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn action(&self, name: &str) -> Option<&'static CustomAction> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn media_fields(&self) -> impl Iterator<Item = &'static str> {
        self.fields
            .iter()
            .filter(|f| f.kind == FieldKind::Media)
            .map(|f| f.name)
    }

    pub fn is_media_field(&self, name: &str) -> bool {
        self.field(name).is_some_and(|f| f.kind == FieldKind::Media)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Error for an operation this entity's gateway does not offer.
    pub fn unsupported(&self, op: &str) -> Error {
        Error::Unsupported(format!("{} does not support {}", self.path, op))
    }

    /// Fails with [`Error::Unsupported`] unless `allowed`.
    pub fn ensure(&self, allowed: bool, op: &str) -> Result<()> {
        if allowed {
            Ok(())
        } else {
            Err(self.unsupported(op))
        }
    }
}

// =============================================================================
// DESCRIPTORS
// =============================================================================

pub static COURSE: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Course,
    label: "Course",
    path: "courses",
    operations: Operations::CRUD,
    update_route: UpdateRoute::Update,
    delete_route: DeleteRoute::Delete,
    persistence: Persistence::Remote,
    search_fields: &["title", "category", "level"],
    fields: &[
        text("title").required(),
        text("category").required(),
        text("level"),
        text("duration"),
        number("fees"),
        text("description"),
        list("highlights"),
        records("syllabus"),
        records("faqs"),
        media("thumbnail"),
    ],
    actions: &[],
};

pub static UNIVERSITY: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::University,
    label: "University",
    path: "universities",
    operations: Operations::CRUD,
    update_route: UpdateRoute::Update,
    delete_route: DeleteRoute::Delete,
    persistence: Persistence::Remote,
    search_fields: &["name", "location"],
    fields: &[
        text("name").required(),
        text("location").required(),
        text("country"),
        number("ranking"),
        text("website"),
        text("description"),
        list("programs"),
        records("faqs"),
        object("admission"),
        media("logo"),
        media("campusImage"),
    ],
    actions: &[],
};

pub static BLOG: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Blog,
    label: "Blog",
    path: "blogs",
    operations: Operations::CRUD,
    update_route: UpdateRoute::Edit,
    delete_route: DeleteRoute::Bare,
    persistence: Persistence::Remote,
    search_fields: &["title", "author", "tags"],
    fields: &[
        text("title").required(),
        text("author").required(),
        text("excerpt"),
        text("content").required(),
        list("tags"),
        date("publishedAt"),
        media("thumbnail"),
    ],
    actions: &[],
};

pub static TEAM_MEMBER: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::TeamMember,
    label: "Team member",
    path: "team",
    operations: Operations::CRUD,
    update_route: UpdateRoute::Update,
    delete_route: DeleteRoute::Delete,
    persistence: Persistence::Remote,
    search_fields: &["name", "role"],
    fields: &[
        text("name").required(),
        text("role").required(),
        text("bio"),
        text("email"),
        object("socials"),
        media("image"),
    ],
    actions: &[],
};

pub static TESTIMONIAL: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Testimonial,
    label: "Testimonial",
    path: "testimonials",
    operations: Operations::CRUD,
    update_route: UpdateRoute::Edit,
    delete_route: DeleteRoute::Bare,
    persistence: Persistence::Remote,
    search_fields: &["name", "course", "message"],
    fields: &[
        text("name").required(),
        text("course"),
        number("rating"),
        text("message").required(),
        media("image"),
    ],
    actions: &[],
};

pub static CONSULTATION: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Consultation,
    label: "Consultation",
    path: "consultations",
    operations: Operations {
        get_all: true,
        get_by_id: true,
        create: true,
        update: false,
        delete: true,
    },
    update_route: UpdateRoute::Update,
    delete_route: DeleteRoute::Delete,
    persistence: Persistence::Remote,
    search_fields: &["name", "email", "phone"],
    fields: &[
        text("name").required(),
        text("email").required(),
        text("phone").required(),
        text("course"),
        text("message"),
        text("status"),
        date("createdAt"),
    ],
    actions: &[CustomAction {
        name: "mark_completed",
        method: ActionMethod::Put,
        segment: "complete",
        patch: &[("status", "completed")],
    }],
};

pub static TOP_PERFORMER: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::TopPerformer,
    label: "Top performer",
    path: "top-performers",
    operations: Operations::CRUD,
    update_route: UpdateRoute::Update,
    delete_route: DeleteRoute::Delete,
    persistence: Persistence::Remote,
    search_fields: &["name", "exam", "university"],
    fields: &[
        text("name").required(),
        text("exam").required(),
        text("score").required(),
        number("year"),
        text("university"),
        media("image"),
    ],
    actions: &[],
};

pub static QUESTION_PAPER: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::QuestionPaper,
    label: "Question paper",
    path: "pyqs",
    operations: Operations::CRUD,
    update_route: UpdateRoute::Update,
    delete_route: DeleteRoute::Delete,
    persistence: Persistence::Remote,
    search_fields: &["title", "exam", "subject"],
    fields: &[
        text("title").required(),
        text("exam").required(),
        text("subject"),
        number("year").required(),
        media("file"),
    ],
    actions: &[],
};

pub static SUBSCRIBER: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Subscriber,
    label: "Subscriber",
    path: "subscribers",
    operations: Operations {
        get_all: true,
        get_by_id: false,
        create: true,
        update: false,
        delete: true,
    },
    update_route: UpdateRoute::Update,
    delete_route: DeleteRoute::Bare,
    persistence: Persistence::Remote,
    search_fields: &["email"],
    fields: &[text("email").required(), date("subscribedAt")],
    actions: &[],
};

pub static IMAT_UNIVERSITY: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::ImatUniversity,
    label: "IMAT university",
    path: "imat-universities",
    operations: Operations::CRUD,
    update_route: UpdateRoute::Update,
    delete_route: DeleteRoute::Delete,
    persistence: Persistence::LocalOnly,
    search_fields: &["name", "city"],
    fields: &[
        text("name").required(),
        text("city").required(),
        number("seats"),
        number("fees"),
        number("cutoff"),
        media("image"),
    ],
    actions: &[],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_kind_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.descriptor().kind, kind);
        }
    }

    #[test]
    fn test_update_routes_differ_per_entity() {
        let id = RecordId::from("42");
        assert_eq!(UNIVERSITY.update_path(&id), "universities/update/42");
        assert_eq!(BLOG.update_path(&id), "blogs/edit/42");
    }

    #[test]
    fn test_delete_routes_differ_per_entity() {
        let id = RecordId::from("42");
        assert_eq!(COURSE.delete_path(&id), "courses/delete/42");
        assert_eq!(TESTIMONIAL.delete_path(&id), "testimonials/42");
    }

    #[test]
    fn test_create_and_item_paths() {
        let id = RecordId::from("a1");
        assert_eq!(TEAM_MEMBER.create_path(), "team/create");
        assert_eq!(TEAM_MEMBER.item_path(&id), "team/a1");
        assert_eq!(TEAM_MEMBER.list_path(), "team");
    }

    #[test]
    fn test_media_field_names_are_backend_contract() {
        let names: Vec<_> = UNIVERSITY.media_fields().collect();
        assert_eq!(names, vec!["logo", "campusImage"]);
        assert!(COURSE.is_media_field("thumbnail"));
        assert!(!COURSE.is_media_field("title"));
    }

    #[test]
    fn test_consultation_action_path() {
        let action = CONSULTATION.action("mark_completed").unwrap();
        let id = RecordId::from("c7");
        assert_eq!(CONSULTATION.action_path(action, &id), "consultations/complete/c7");
        assert_eq!(action.patch, &[("status", "completed")]);
    }

    #[test]
    fn test_search_fields_are_declared_fields() {
        for kind in EntityKind::ALL {
            let d = kind.descriptor();
            for field in d.search_fields {
                assert!(d.field(field).is_some(), "{}: {}", d.path, field);
            }
        }
    }

    #[test]
    fn test_from_str_accepts_path_and_label() {
        assert_eq!(
            "top-performers".parse::<EntityKind>().unwrap(),
            EntityKind::TopPerformer
        );
        assert_eq!(
            "Top performer".parse::<EntityKind>().unwrap(),
            EntityKind::TopPerformer
        );
        assert_eq!("pyqs".parse::<EntityKind>().unwrap(), EntityKind::QuestionPaper);
        assert_eq!(
            "universities".parse::<EntityKind>().unwrap(),
            EntityKind::University
        );
        assert!("widgets".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_ensure_unsupported() {
        let err = SUBSCRIBER
            .ensure(SUBSCRIBER.operations.update, "update")
            .unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }

    #[test]
    fn test_imat_is_local_only() {
        assert_eq!(IMAT_UNIVERSITY.persistence, Persistence::LocalOnly);
        assert_eq!(UNIVERSITY.persistence, Persistence::Remote);
    }
}
