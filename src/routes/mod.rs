/// Router Module Index
///
/// Organizes the routing surface into security-segregated modules so access
/// control is applied explicitly at the module level (via Axum layers),
/// never per-handler by accident.

/// Routes accessible to all clients: every read endpoint, plus token
/// issuance. No authentication layer is applied here.
pub mod public;

/// Mutating routes, protected by the `AuthUser` extractor middleware.
/// Requires a resolvable bearer token.
pub mod authenticated;
