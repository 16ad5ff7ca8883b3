//! Search stage: derive the filtered view of a collection.
//!
//! Matching is a case-insensitive substring test over a fixed set of fields
//! per entity (see the table in [`crate::entity`]). There is no ranking;
//! matches keep collection order. A blank query matches everything.

use serde_json::Value;

use crate::record::Record;

/// Filter `records` by `query` over `fields`.
pub fn filter<'a, I>(records: I, query: &str, fields: &[&str]) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.into_iter().collect();
    }
    records
        .into_iter()
        .filter(|record| matches(record, &needle, fields))
        .collect()
}

/// True when any of `fields` of `record` contains `needle`, which must
/// already be trimmed and lowercased.
pub fn matches(record: &Record, needle: &str, fields: &[&str]) -> bool {
    fields
        .iter()
        .filter_map(|field| record.get(field))
        .any(|value| value_contains(value, needle))
}

fn value_contains(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Number(n) => n.to_string().contains(needle),
        Value::Bool(b) => b.to_string().contains(needle),
        Value::Array(items) => items.iter().any(|item| match item {
            Value::String(_) | Value::Number(_) => value_contains(item, needle),
            _ => false,
        }),
        Value::Null | Value::Object(_) => false,
    }
}

/// True when a query would leave the collection unfiltered.
pub fn is_blank(query: &str) -> bool {
    query.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    fn names<'a>(view: &[&'a Record], field: &str) -> Vec<&'a str> {
        view.iter().map(|r| r.get_str(field).unwrap()).collect()
    }

    fn universities() -> Vec<Record> {
        vec![
            rec(json!({"id": "1", "name": "University of Pavia", "location": "Pavia"})),
            rec(json!({"id": "2", "name": "Sapienza", "location": "Rome"})),
            rec(json!({"id": "3", "name": "Tor Vergata", "location": "ROME"})),
        ]
    }

    #[test]
    fn test_blank_query_returns_all_in_order() {
        let data = universities();
        for query in ["", "   ", "\t"] {
            let view = filter(&data, query, &["name", "location"]);
            assert_eq!(names(&view, "name"), vec!["University of Pavia", "Sapienza", "Tor Vergata"]);
        }
    }

    #[test]
    fn test_case_insensitive_over_fields() {
        let data = universities();
        let view = filter(&data, "rome", &["name", "location"]);
        assert_eq!(names(&view, "name"), vec!["Sapienza", "Tor Vergata"]);
    }

    #[test]
    fn test_query_is_trimmed() {
        let data = universities();
        let view = filter(&data, "  pavia ", &["name"]);
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn test_only_listed_fields_are_checked() {
        let data = universities();
        let view = filter(&data, "rome", &["name"]);
        assert!(view.is_empty());
    }

    #[test]
    fn test_tag_arrays_match_elements() {
        let data = vec![
            rec(json!({"id": "b1", "title": "Visa guide", "author": "Meera", "tags": ["Italy", "Visa"]})),
            rec(json!({"id": "b2", "title": "Exam tips", "author": "Arjun", "tags": ["IMAT"]})),
        ];
        let view = filter(&data, "visa", &["title", "author", "tags"]);
        assert_eq!(view.len(), 1);
        let view = filter(&data, "imat", &["title", "author", "tags"]);
        assert_eq!(names(&view, "id"), vec!["b2"]);
    }

    #[test]
    fn test_numbers_match_rendered_text() {
        let data = vec![rec(json!({"id": "p1", "title": "Paper", "year": 2023}))];
        assert_eq!(filter(&data, "2023", &["year"]).len(), 1);
        assert!(filter(&data, "2024", &["year"]).is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let data = universities();
        let once = filter(&data, "a", &["name", "location"]);
        let twice = filter(once.iter().copied(), "a", &["name", "location"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_fields_do_not_match() {
        let data = vec![rec(json!({"id": "x"}))];
        assert!(filter(&data, "x", &["name"]).is_empty());
    }
}
