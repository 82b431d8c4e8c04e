//! Decoding of schemaless documents into domain types.
//!
//! Documents come from a store the app does not fully control, so decoding
//! recovers locally instead of failing the whole snapshot: a missing or
//! malformed `date` becomes "now" and a non-numeric `amount` drops the record
//! from aggregation. Every recovery is logged and collected in a
//! [`DecodeReport`].

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;
use tracker_domain::{Friend, Money, Transaction, TransactionKind, UserProfile};

use crate::backend::Document;

/// Description used when a stored transaction has none.
pub const FALLBACK_DESCRIPTION: &str = "Transaction";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    pub warnings: Vec<String>,
    /// Records excluded from the result.
    pub skipped: usize,
    /// Records whose date was replaced by the decode time.
    pub defaulted_dates: usize,
}

impl DecodeReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn merge(&mut self, other: DecodeReport) {
        self.warnings.extend(other.warnings);
        self.skipped += other.skipped;
        self.defaulted_dates += other.defaulted_dates;
    }

    fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.warnings.push(message);
    }
}

#[derive(Debug, Clone, Default)]
pub struct Decoded<T> {
    pub items: Vec<T>,
    pub report: DecodeReport,
}

/// Decodes transaction documents. `owner_id` fills in records that lack one.
pub fn decode_transactions(
    documents: &[Document],
    owner_id: &str,
    now: DateTime<Utc>,
) -> Decoded<Transaction> {
    let mut report = DecodeReport::default();
    let items = documents
        .iter()
        .filter_map(|doc| decode_transaction(doc, owner_id, now, &mut report))
        .collect();
    Decoded { items, report }
}

fn decode_transaction(
    doc: &Document,
    owner_id: &str,
    now: DateTime<Utc>,
    report: &mut DecodeReport,
) -> Option<Transaction> {
    let kind = match doc.data.get("type").and_then(Value::as_str) {
        Some(raw) => match raw.parse::<TransactionKind>() {
            Ok(kind) => kind,
            Err(err) => {
                report.skipped += 1;
                report.warn(format!("transaction {}: {err}; excluded", doc.id));
                return None;
            }
        },
        None => {
            report.skipped += 1;
            report.warn(format!("transaction {} has no type; excluded", doc.id));
            return None;
        }
    };

    let amount = match doc.data.get("amount").and_then(amount_from_value) {
        Some(amount) if amount.is_positive() => amount,
        Some(amount) => {
            report.skipped += 1;
            report.warn(format!(
                "transaction {} has non-positive amount {amount}; excluded",
                doc.id
            ));
            return None;
        }
        None => {
            report.skipped += 1;
            report.warn(format!(
                "transaction {} has a non-numeric amount; excluded",
                doc.id
            ));
            return None;
        }
    };

    let date = match doc.data.get("date").and_then(timestamp_from_value) {
        Some(date) => date,
        None => {
            report.defaulted_dates += 1;
            report.warn(format!(
                "transaction {} has a missing or malformed date; using current time",
                doc.id
            ));
            now
        }
    };

    let description = doc
        .data
        .get("description")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(FALLBACK_DESCRIPTION)
        .to_string();

    let owner = doc
        .data
        .get("ownerId")
        .or_else(|| doc.data.get("userId"))
        .and_then(Value::as_str)
        .unwrap_or(owner_id)
        .to_string();

    Some(Transaction {
        id: doc.id.clone(),
        kind,
        amount,
        date,
        description,
        owner_id: owner,
    })
}

/// Reads an amount from a JSON number or a numeric string.
pub fn amount_from_value(value: &Value) -> Option<Money> {
    match value {
        Value::Number(number) => number.as_f64().and_then(Money::from_major),
        Value::String(text) => {
            let trimmed = text.trim();
            trimmed
                .parse::<Money>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(Money::from_major))
        }
        _ => None,
    }
}

/// Reads a timestamp from the shapes the store has used over time:
/// RFC 3339 strings, bare `YYYY-MM-DD` dates, `{seconds, nanoseconds}`
/// timestamp objects, and integer milliseconds since the epoch.
pub fn timestamp_from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            DateTime::parse_from_rfc3339(trimmed)
                .map(|date| date.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                        .ok()
                        .and_then(|date| date.and_hms_opt(0, 0, 0))
                        .map(|naive| Utc.from_utc_datetime(&naive))
                })
        }
        Value::Number(number) => number
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        Value::Object(fields) => {
            let seconds = fields
                .get("seconds")
                .or_else(|| fields.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = fields
                .get("nanoseconds")
                .or_else(|| fields.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            let nanos = u32::try_from(nanos).ok()?;
            Utc.timestamp_opt(seconds, nanos).single()
        }
        _ => None,
    }
}

/// Decodes friend documents; a friend without a usable name is excluded.
pub fn decode_friends(documents: &[Document], owner_id: &str) -> Decoded<Friend> {
    let mut report = DecodeReport::default();
    let mut items = Vec::with_capacity(documents.len());
    for doc in documents {
        match doc
            .data
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
        {
            Some(name) => items.push(Friend {
                id: doc.id.clone(),
                name: name.to_string(),
                owner_id: doc
                    .data
                    .get("ownerId")
                    .and_then(Value::as_str)
                    .unwrap_or(owner_id)
                    .to_string(),
            }),
            None => {
                report.skipped += 1;
                report.warn(format!("friend {} has no name; excluded", doc.id));
            }
        }
    }
    Decoded { items, report }
}

/// Decodes a profile document, falling back to an empty profile on malformed data.
pub fn decode_profile(doc: &Document) -> (UserProfile, DecodeReport) {
    let mut report = DecodeReport::default();
    let mut profile = match serde_json::from_value::<UserProfile>(doc.data.clone()) {
        Ok(profile) => profile,
        Err(err) => {
            report.warn(format!("profile {} is malformed: {err}", doc.id));
            empty_profile()
        }
    };
    if profile.uid.is_empty() {
        profile.uid = doc.id.clone();
    }
    (profile, report)
}

pub(crate) fn empty_profile() -> UserProfile {
    UserProfile {
        uid: String::new(),
        name: String::new(),
        email: String::new(),
        phone_number: None,
        target_balance: UserProfile::default_target_balance(),
        created_at: None,
        last_login: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, data: Value) -> Document {
        Document {
            id: id.into(),
            data,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 8, 30, 0).unwrap()
    }

    #[test]
    fn missing_date_defaults_to_now_with_warning() {
        let docs = [doc("t1", json!({"type": "income", "amount": 10}))];
        let decoded = decode_transactions(&docs, "u1", now());
        assert_eq!(decoded.items.len(), 1);
        assert_eq!(decoded.items[0].date, now());
        assert_eq!(decoded.report.defaulted_dates, 1);
        assert_eq!(decoded.report.warnings.len(), 1);
    }

    #[test]
    fn non_numeric_amount_is_excluded_not_fatal() {
        let docs = [
            doc("bad", json!({"type": "expense", "amount": "lots", "date": "2024-05-01"})),
            doc("ok", json!({"type": "expense", "amount": "12.5", "date": "2024-05-01"})),
            doc("null", json!({"type": "expense", "amount": null, "date": "2024-05-01"})),
        ];
        let decoded = decode_transactions(&docs, "u1", now());
        assert_eq!(decoded.items.len(), 1);
        assert_eq!(decoded.items[0].id, "ok");
        assert_eq!(decoded.items[0].amount, Money::from_cents(1250));
        assert_eq!(decoded.report.skipped, 2);
    }

    #[test]
    fn timestamps_accept_every_stored_shape() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(
            timestamp_from_value(&json!("2024-05-01T00:00:00Z")),
            Some(expected)
        );
        assert_eq!(timestamp_from_value(&json!("2024-05-01")), Some(expected));
        assert_eq!(
            timestamp_from_value(&json!({"seconds": expected.timestamp(), "nanoseconds": 0})),
            Some(expected)
        );
        assert_eq!(
            timestamp_from_value(&json!(expected.timestamp_millis())),
            Some(expected)
        );
        assert_eq!(timestamp_from_value(&json!("yesterday")), None);
        assert_eq!(timestamp_from_value(&json!(true)), None);
    }

    #[test]
    fn unknown_types_are_excluded() {
        let docs = [doc("t", json!({"type": "gift", "amount": 5, "date": "2024-05-01"}))];
        let decoded = decode_transactions(&docs, "u1", now());
        assert!(decoded.items.is_empty());
        assert_eq!(decoded.report.skipped, 1);
    }

    #[test]
    fn description_and_owner_fall_back() {
        let docs = [doc(
            "t",
            json!({"type": "income", "amount": 5, "date": "2024-05-01", "userId": "legacy"}),
        )];
        let decoded = decode_transactions(&docs, "u1", now());
        assert_eq!(decoded.items[0].description, FALLBACK_DESCRIPTION);
        assert_eq!(decoded.items[0].owner_id, "legacy");
    }

    #[test]
    fn friends_without_names_are_skipped() {
        let docs = [
            doc("f1", json!({"name": "Bob"})),
            doc("f2", json!({"name": ""})),
        ];
        let decoded = decode_friends(&docs, "u1");
        assert_eq!(decoded.items.len(), 1);
        assert_eq!(decoded.items[0].owner_id, "u1");
        assert_eq!(decoded.report.skipped, 1);
    }

    #[test]
    fn malformed_profile_falls_back_to_defaults() {
        let (profile, report) = decode_profile(&doc("u1", json!({"targetBalance": "nope"})));
        assert_eq!(profile.uid, "u1");
        assert_eq!(profile.target_balance, UserProfile::default_target_balance());
        assert!(!report.is_clean());
    }
}
