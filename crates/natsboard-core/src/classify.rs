// ── Error classification ──
//
// Maps raw failure text from the control plane (or transport layer) to a
// closed taxonomy with a severity and a suggested remedy. Matching is
// ordered case-insensitive substring search; group order matters because
// some phrases are subsets of others (e.g. "connection timeout" must hit
// the connection group before the generic timeout group).

use serde::{Deserialize, Serialize};

/// Closed taxonomy of node-scoped failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorKind {
    AccountNotFound,
    NoActiveUsers,
    DatabaseError,
    ValidationError,
    JetStreamNotEnabled,
    ConnectionError,
    PermissionDenied,
    Timeout,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// What the operator should do about the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SuggestedAction {
    EnableJetStream,
    Retry,
    CheckPermissions,
    ContactAdmin,
    CreateUser,
    None,
}

impl SuggestedAction {
    /// Remedy text appended to user-facing messages. Empty for `None`.
    fn hint(self) -> &'static str {
        match self {
            Self::EnableJetStream => "Enable JetStream for this account and retry",
            Self::Retry => "Retry the request; contact an administrator if the problem persists",
            Self::CheckPermissions => "Ask an administrator to review the account permissions",
            Self::ContactAdmin => "Contact an administrator if the problem persists",
            Self::CreateUser => "Create or activate a user for this account",
            Self::None => "",
        }
    }
}

/// A classified, node-scoped failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
    pub action: SuggestedAction,
    pub severity: Severity,
}

impl ErrorInfo {
    /// The message with the suggested remedy appended, for display.
    pub fn display_message(&self) -> String {
        let hint = self.action.hint();
        if hint.is_empty() {
            self.message.clone()
        } else {
            format!("{}. {hint}", self.message)
        }
    }
}

/// Ordered pattern groups. First match wins; order is load-bearing.
const PATTERN_GROUPS: &[(ErrorKind, &[&str])] = &[
    (
        ErrorKind::AccountNotFound,
        &["account not found", "account does not exist", "account not exist"],
    ),
    (
        ErrorKind::NoActiveUsers,
        &["no users found", "no active users", "no available users"],
    ),
    (
        ErrorKind::DatabaseError,
        &["database error", "database query failed", "db error", "sql error"],
    ),
    (
        ErrorKind::ValidationError,
        &["validation error", "validation failed", "invalid format", "invalid parameter"],
    ),
    (
        ErrorKind::JetStreamNotEnabled,
        &[
            "jetstream not enabled",
            "jetstream is not enabled",
            "no jetstream",
            "stream not found",
            "account does not have jetstream enabled",
        ],
    ),
    (
        ErrorKind::ConnectionError,
        &[
            "connection failed",
            "connection refused",
            "connection timeout",
            "network error",
            "dial tcp",
            "connection reset",
            "no route to host",
        ],
    ),
    (
        ErrorKind::PermissionDenied,
        &[
            "permission denied",
            "access denied",
            "unauthorized",
            "forbidden",
            "authentication failed",
            "invalid credentials",
        ],
    ),
    (
        ErrorKind::Timeout,
        &["timeout", "request timeout", "context deadline exceeded", "operation timed out"],
    ),
];

/// Classify a raw failure against the taxonomy.
///
/// `context_label` names the resource being loaded (account or stream
/// label) and is woven into the message. Unrecognized failures come back
/// as `Unknown` with the raw text verbatim.
pub fn classify(raw: &str, context_label: &str) -> ErrorInfo {
    let lowered = raw.to_lowercase();
    for (kind, patterns) in PATTERN_GROUPS {
        if patterns.iter().any(|p| lowered.contains(p)) {
            return for_kind(*kind, context_label);
        }
    }

    ErrorInfo {
        kind: ErrorKind::Unknown,
        message: raw.to_owned(),
        action: SuggestedAction::ContactAdmin,
        severity: Severity::Error,
    }
}

fn for_kind(kind: ErrorKind, label: &str) -> ErrorInfo {
    let (message, action, severity) = match kind {
        ErrorKind::AccountNotFound => (
            format!("Account {label} not found"),
            SuggestedAction::ContactAdmin,
            Severity::Error,
        ),
        ErrorKind::NoActiveUsers => (
            format!("Account {label} has no active users"),
            SuggestedAction::CreateUser,
            Severity::Warning,
        ),
        ErrorKind::DatabaseError => (
            format!("Database error while accessing {label}"),
            SuggestedAction::Retry,
            Severity::Error,
        ),
        ErrorKind::ValidationError => (
            format!("Request validation failed for {label}"),
            SuggestedAction::ContactAdmin,
            Severity::Error,
        ),
        ErrorKind::JetStreamNotEnabled => (
            format!("JetStream is not enabled for {label}"),
            SuggestedAction::EnableJetStream,
            Severity::Info,
        ),
        ErrorKind::ConnectionError => (
            format!("Failed to connect while loading {label}"),
            SuggestedAction::Retry,
            Severity::Error,
        ),
        ErrorKind::PermissionDenied => (
            format!("Access to {label} denied"),
            SuggestedAction::CheckPermissions,
            Severity::Error,
        ),
        ErrorKind::Timeout => (
            format!("Request for {label} timed out"),
            SuggestedAction::Retry,
            Severity::Warning,
        ),
        ErrorKind::Unknown => (
            format!("Failed to load {label}"),
            SuggestedAction::ContactAdmin,
            Severity::Error,
        ),
    };

    ErrorInfo {
        kind,
        message,
        action,
        severity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_refused_is_connection_error() {
        let info = classify("dial tcp 10.0.0.1:4222: connection refused", "payments");
        assert_eq!(info.kind, ErrorKind::ConnectionError);
        assert_eq!(info.action, SuggestedAction::Retry);
        assert_eq!(info.severity, Severity::Error);
        assert!(info.message.contains("payments"));
    }

    #[test]
    fn jetstream_not_enabled_is_info_severity() {
        let info = classify("account does not have JetStream enabled", "billing");
        assert_eq!(info.kind, ErrorKind::JetStreamNotEnabled);
        assert_eq!(info.severity, Severity::Info);
        assert_eq!(info.action, SuggestedAction::EnableJetStream);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let info = classify("PERMISSION DENIED for subject", "ops");
        assert_eq!(info.kind, ErrorKind::PermissionDenied);
    }

    #[test]
    fn connection_timeout_hits_connection_group_not_timeout() {
        // "connection timeout" contains "timeout", so group order decides.
        let info = classify("connection timeout after 5s", "x");
        assert_eq!(info.kind, ErrorKind::ConnectionError);
    }

    #[test]
    fn plain_timeout_is_timeout() {
        let info = classify("context deadline exceeded", "x");
        assert_eq!(info.kind, ErrorKind::Timeout);
        assert_eq!(info.severity, Severity::Warning);
    }

    #[test]
    fn unknown_retains_raw_message() {
        let raw = "flux capacitor misaligned";
        let info = classify(raw, "x");
        assert_eq!(info.kind, ErrorKind::Unknown);
        assert_eq!(info.message, raw);
    }

    #[test]
    fn display_message_appends_remedy() {
        let info = classify("no active users", "payments");
        let shown = info.display_message();
        assert!(shown.starts_with("Account payments has no active users"));
        assert!(shown.contains("Create or activate"));
    }
}
