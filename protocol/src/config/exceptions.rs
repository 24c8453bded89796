use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Historical transactions that the network accepts despite failing today's
/// rules, and ids that were computed differently by old nodes.
pub trait ExceptionList: Send + Sync {
    /// Whether `id` skips schema and signature checks.
    fn is_exception(&self, id: &str) -> bool;

    /// The id old nodes recorded for a transaction whose hash is `id`.
    fn transaction_id_fix(&self, id: &str) -> Option<&str>;

    /// Whether `id` is one of the recorded (broken) ids in the fix table.
    fn is_broken_id(&self, id: &str) -> bool;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exceptions {
    #[serde(default)]
    pub transactions: HashSet<String>,

    /// Maps the computed id to the id recorded on chain.
    #[serde(default)]
    pub transaction_id_fix_table: HashMap<String, String>,
}

impl Exceptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transaction(mut self, id: impl Into<String>) -> Self {
        self.transactions.insert(id.into());
        self
    }

    pub fn with_id_fix(mut self, computed: impl Into<String>, recorded: impl Into<String>) -> Self {
        self.transaction_id_fix_table
            .insert(computed.into(), recorded.into());
        self
    }
}

impl ExceptionList for Exceptions {
    fn is_exception(&self, id: &str) -> bool {
        self.transactions.contains(id)
    }

    fn transaction_id_fix(&self, id: &str) -> Option<&str> {
        self.transaction_id_fix_table.get(id).map(String::as_str)
    }

    fn is_broken_id(&self, id: &str) -> bool {
        self.transaction_id_fix_table.values().any(|value| value == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_populates_both_tables() {
        let exceptions = Exceptions::new()
            .with_transaction("aa")
            .with_id_fix("computed", "recorded");

        assert!(exceptions.is_exception("aa"));
        assert!(!exceptions.is_exception("bb"));
        assert_eq!(exceptions.transaction_id_fix("computed"), Some("recorded"));
        assert!(exceptions.is_broken_id("recorded"));
        assert!(!exceptions.is_broken_id("computed"));
    }

    #[test]
    fn deserializes_from_preset_shape() {
        let exceptions: Exceptions = serde_json::from_str(
            r#"{ "transactions": ["x"], "transactionIdFixTable": { "a": "b" } }"#,
        )
        .unwrap();
        assert!(exceptions.is_exception("x"));
        assert_eq!(exceptions.transaction_id_fix("a"), Some("b"));
    }
}
