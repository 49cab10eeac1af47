//! Reduction of batch responses

use serde_json::Value;

use crate::api::models::{MutationResponse, RecordResult};

/// A batch response split into succeeded and failed entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub succeeded: Vec<RecordResult>,
    pub failed: Vec<RecordResult>,
}

impl BatchOutcome {
    /// Partition a batch response.
    ///
    /// Returns the store's message as the error when the whole batch was
    /// rejected (`success == false`); nothing in such a batch took effect.
    pub fn from_response(response: MutationResponse) -> Result<Self, String> {
        if !response.success {
            return Err(response
                .message
                .unwrap_or_else(|| "Request rejected by record store".to_string()));
        }

        let (succeeded, failed) = response
            .results
            .unwrap_or_default()
            .into_iter()
            .partition(|r| r.success);

        Ok(Self { succeeded, failed })
    }

    pub fn any_succeeded(&self) -> bool {
        !self.succeeded.is_empty()
    }

    /// Data of the first succeeded entry
    pub fn first_record(&self) -> Option<&Value> {
        self.succeeded
            .first()
            .and_then(|r| r.data.as_ref())
            .filter(|data| !data.is_null())
    }

    /// Field-level errors followed by the record-level message, for each
    /// failed entry
    pub fn failure_messages(&self) -> Vec<String> {
        self.failed
            .iter()
            .flat_map(|entry| {
                entry
                    .errors
                    .iter()
                    .map(ToString::to_string)
                    .chain(entry.message.clone())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::FieldError;
    use serde_json::json;

    #[test]
    fn test_rejected_batch_is_error() {
        let result = BatchOutcome::from_response(MutationResponse::rejected("Quota exceeded"));
        assert_eq!(result, Err("Quota exceeded".to_string()));
    }

    #[test]
    fn test_partition_keeps_order() {
        let outcome = BatchOutcome::from_response(MutationResponse::ok(vec![
            RecordResult::failed("bad"),
            RecordResult::succeeded(Some(json!({"Id": 1}))),
            RecordResult::succeeded(Some(json!({"Id": 2}))),
        ]))
        .unwrap();

        assert!(outcome.any_succeeded());
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.first_record(), Some(&json!({"Id": 1})));
    }

    #[test]
    fn test_missing_results_means_no_success() {
        let response = MutationResponse {
            success: true,
            message: None,
            results: None,
        };
        let outcome = BatchOutcome::from_response(response).unwrap();
        assert!(!outcome.any_succeeded());
        assert!(outcome.first_record().is_none());
    }

    #[test]
    fn test_failure_messages_include_field_errors() {
        let mut failed = RecordResult::failed("Record rejected");
        failed.errors.push(FieldError {
            field_label: "Probability".to_string(),
            message: "out of range".to_string(),
        });
        let outcome = BatchOutcome {
            succeeded: vec![],
            failed: vec![failed],
        };

        assert_eq!(
            outcome.failure_messages(),
            vec!["Probability: out of range".to_string(), "Record rejected".to_string()]
        );
    }
}
