//! Classification of tool diagnostics into failure categories
//!
//! git and gh report network and credential trouble only as free text on
//! stderr. These matchers are shared by every subcommand that touches a
//! remote.

/// Broad category of a failed remote operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Auth,
    Network,
    Other,
}

const AUTH_MARKERS: &[&str] = &[
    "authentication failed",
    "could not read username",
    "could not read password",
    "terminal prompts disabled",
    "permission denied (publickey",
    "bad credentials",
    "http 401",
    "requires authentication",
    "gh auth login",
    "not logged in",
    "invalid token",
    "the token in gh_token is invalid",
];

const NETWORK_MARKERS: &[&str] = &[
    "could not resolve host",
    "could not resolve hostname",
    "unable to access",
    "connection timed out",
    "connection refused",
    "connection reset",
    "network is unreachable",
    "error connecting to",
    "dial tcp",
    "i/o timeout",
    "tls handshake",
    "temporary failure in name resolution",
];

/// Classify a diagnostic. Credential markers win over network markers
/// because git prefixes many auth failures with "unable to access".
pub fn classify(diagnostic: &str) -> Failure {
    let lower = diagnostic.to_lowercase();
    if AUTH_MARKERS.iter().any(|m| lower.contains(m)) {
        Failure::Auth
    } else if NETWORK_MARKERS.iter().any(|m| lower.contains(m)) {
        Failure::Network
    } else {
        Failure::Other
    }
}
