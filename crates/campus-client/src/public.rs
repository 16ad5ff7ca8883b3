//! Helpers behind the public site: newsletter signup, catalog listings and
//! the chat contact link.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use tracing::{info, instrument};

use campus_core::entity::SUBSCRIBER;
use campus_core::{Entity, EntityKind, Error, Payload, Record, RemoteGateway, Result};

use crate::http::{ApiClient, HttpGateway};

/// Entities the public site lists.
const CATALOG_KINDS: &[EntityKind] = &[
    EntityKind::Course,
    EntityKind::University,
    EntityKind::Blog,
    EntityKind::Testimonial,
    EntityKind::TopPerformer,
    EntityKind::QuestionPaper,
];

/// Subscribe an email address to the newsletter.
#[instrument(skip(api), fields(subsystem = "client", component = "public", op = "subscribe_newsletter"))]
pub async fn subscribe_newsletter(api: &ApiClient, email: &str) -> Result<()> {
    let email = email.trim();
    if !is_plausible_email(email) {
        return Err(Error::Validation(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    let fields = Record::from_value(json!({ "email": email }))?;
    api.post(&SUBSCRIBER.create_path(), &Payload::from_fields(&fields))
        .await?;
    info!("Newsletter subscription sent");
    Ok(())
}

/// Fetch a read-only listing of a public entity as typed models.
pub async fn fetch_catalog<T: Entity>(api: &ApiClient) -> Result<Vec<T>> {
    if !CATALOG_KINDS.contains(&T::KIND) {
        return Err(Error::Unsupported(format!("{} is not listed publicly", T::KIND)));
    }
    let gateway = HttpGateway::new(api.clone(), T::descriptor());
    gateway
        .get_all()
        .await?
        .iter()
        .map(T::from_record)
        .collect()
}

/// `https://wa.me/<digits>` link for a contact number, or `None` when the
/// number has no digits.
pub fn contact_link(number: &str) -> Option<String> {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    (!digits.is_empty()).then(|| format!("https://wa.me/{}", digits))
}

/// One `@`, a non-empty local part, and a dotted domain with no empty labels.
static EMAIL_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").ok());

fn is_plausible_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(email))
}
