//! Inbox data model — provisional transactions awaiting confirmation.

use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Direction of money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    Debit,
    Credit,
}

impl FlowKind {
    /// Flow implied by the sign of `amount`: negative is an outflow.
    pub fn from_amount(amount: Decimal) -> Self {
        if amount.is_sign_negative() && !amount.is_zero() {
            Self::Debit
        } else {
            Self::Credit
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

/// A parsed-but-unconfirmed transaction.
///
/// `temp_id` is only unique within the current batch. `flow` is kept as
/// provided and is not reconciled against the sign of `amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxItem {
    pub temp_id: String,
    pub date: NaiveDate,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub flow: FlowKind,
    pub suggested_category: Option<String>,
}

impl InboxItem {
    /// Whether `flow` disagrees with the sign of `amount`.
    pub fn flow_mismatch(&self) -> bool {
        match self.flow {
            FlowKind::Debit => self.amount > Decimal::ZERO,
            FlowKind::Credit => self.amount < Decimal::ZERO,
        }
    }
}

/// Result of promoting the staged batch into the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResult {
    pub committed_count: usize,
}

/// Acknowledgement of a category change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetCategoryAck {
    pub ok: bool,
}

/// An uploaded statement, fully buffered in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ImportFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk; the name is the path's final component.
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }

    /// Payload for the `import_csv` command: `{ bytes: [..], name }`.
    pub fn to_payload(&self) -> Value {
        json!({ "bytes": self.bytes, "name": self.name })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn item(amount: Decimal, flow: FlowKind) -> InboxItem {
        InboxItem {
            temp_id: "1".into(),
            date: NaiveDate::from_ymd_opt(2025, 1, 4).unwrap(),
            description: "Blue Bottle Coffee".into(),
            amount,
            flow,
            suggested_category: Some("Dining".into()),
        }
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let json = serde_json::to_value(item(dec!(-8.5), FlowKind::Debit)).unwrap();
        assert_eq!(json["tempId"], "1");
        assert_eq!(json["date"], "2025-01-04");
        assert_eq!(json["amount"], -8.5);
        assert_eq!(json["flow"], "debit");
        assert_eq!(json["suggestedCategory"], "Dining");
    }

    #[test]
    fn deserializes_null_category() {
        let raw = r#"{"tempId":"7","date":"2025-02-01","description":"Payroll",
            "amount":2500.0,"flow":"credit","suggestedCategory":null}"#;
        let parsed: InboxItem = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.temp_id, "7");
        assert_eq!(parsed.amount, dec!(2500));
        assert_eq!(parsed.flow, FlowKind::Credit);
        assert!(parsed.suggested_category.is_none());
    }

    #[test]
    fn flow_mismatch_is_detected_not_corrected() {
        assert!(!item(dec!(-8.5), FlowKind::Debit).flow_mismatch());
        assert!(item(dec!(8.5), FlowKind::Debit).flow_mismatch());
        assert!(item(dec!(-8.5), FlowKind::Credit).flow_mismatch());
        assert!(!item(dec!(0), FlowKind::Debit).flow_mismatch());
    }

    #[test]
    fn flow_from_amount() {
        assert_eq!(FlowKind::from_amount(dec!(-1)), FlowKind::Debit);
        assert_eq!(FlowKind::from_amount(dec!(0)), FlowKind::Credit);
        assert_eq!(FlowKind::from_amount(dec!(12.5)), FlowKind::Credit);
    }

    #[test]
    fn import_payload_is_byte_array() {
        let file = ImportFile::new("jan.csv", b"ab".to_vec());
        let payload = file.to_payload();
        assert_eq!(payload["name"], "jan.csv");
        assert_eq!(payload["bytes"], serde_json::json!([97, 98]));
    }

    #[tokio::test]
    async fn reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statement.csv");
        std::fs::write(&path, "date,amount\n").unwrap();

        let file = ImportFile::read(&path).await.unwrap();
        assert_eq!(file.name, "statement.csv");
        assert_eq!(file.bytes, b"date,amount\n");
    }
}
