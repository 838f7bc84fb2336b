use serde::{Deserialize, Serialize};

/// One probeable (hostname, port) pair derived from the talker dataset.
///
/// Identity is `(hostname, port)`; `name` is the talker's display name,
/// carried through for reporting only.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    pub hostname: String,
    pub port: u16,
}

/// The result of one connection attempt against one endpoint.
///
/// `error` is omitted from the JSON form when absent. `is_connectable == false`
/// with no error string is legal ("down, unspecified").
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProbeOutcome {
    pub name: String,
    pub hostname: String,
    pub port: u16,
    pub is_connectable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeOutcome {
    /// Outcome for an endpoint that accepted a connection.
    pub fn up(endpoint: &Endpoint) -> Self {
        Self {
            name: endpoint.name.clone(),
            hostname: endpoint.hostname.clone(),
            port: endpoint.port,
            is_connectable: true,
            error: None,
        }
    }

    /// Outcome for an endpoint that could not be reached, with a diagnostic.
    pub fn down(endpoint: &Endpoint, error: impl Into<String>) -> Self {
        Self {
            name: endpoint.name.clone(),
            hostname: endpoint.hostname.clone(),
            port: endpoint.port,
            is_connectable: false,
            error: Some(error.into()),
        }
    }
}

/// One complete probe run, as persisted by the batch sink.
///
/// `talkers` holds only connectable outcomes in the persisted form. Each run
/// supersedes the previous artifact wholesale; there is no incremental merge.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProbeBatchResult {
    pub date_checked: String,
    pub talkers: Vec<ProbeOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> Endpoint {
        Endpoint {
            name: "Surfers".into(),
            hostname: "surfers.example.org".into(),
            port: 4242,
        }
    }

    #[test]
    fn up_outcome_has_no_error() {
        let o = ProbeOutcome::up(&endpoint());
        assert!(o.is_connectable);
        assert_eq!(o.error, None);
    }

    #[test]
    fn serialized_field_names_are_camel_case() {
        let o = ProbeOutcome::up(&endpoint());
        let json = serde_json::to_value(&o).unwrap();
        assert_eq!(json["isConnectable"], true);
        assert!(json.get("error").is_none(), "absent error must be omitted");

        let batch = ProbeBatchResult {
            date_checked: "2024-01-01T00:00:00Z".into(),
            talkers: vec![o],
        };
        let json = serde_json::to_value(&batch).unwrap();
        assert!(json.get("dateChecked").is_some());
    }

    #[test]
    fn down_outcome_keeps_diagnostic() {
        let o = ProbeOutcome::down(&endpoint(), "Connection timed out");
        assert!(!o.is_connectable);
        let json = serde_json::to_value(&o).unwrap();
        assert_eq!(json["error"], "Connection timed out");
    }
}
