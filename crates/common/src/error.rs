/// Closed classification shared by every error in the workspace.
///
/// Callers branch on the kind instead of inspecting messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing caller input. Never reaches a backend.
    Client,
    /// The search index or the system of record is unreachable, failing, or timed out.
    BackendUnavailable,
    /// An event kind that cannot be applied by plain upsert. Reserved; the
    /// `Created` kind never produces it.
    NotIdempotentConflict,
}

impl ErrorKind {
    /// Returns true for errors caused by the caller.
    pub fn is_client(&self) -> bool {
        matches!(self, ErrorKind::Client)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Client => "client",
            ErrorKind::BackendUnavailable => "backend_unavailable",
            ErrorKind::NotIdempotentConflict => "not_idempotent_conflict",
        };
        f.write_str(name)
    }
}
