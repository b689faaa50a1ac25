//! ============================================================================
//! Access Types - Gate decisions and redirect destinations
//! ============================================================================

use serde::{Deserialize, Serialize};

/// Surfaces the directory can hand a viewer off to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectTarget {
    /// Sign-in flow for guests
    AuthenticationSurface,
    /// Richer search/filter page for members past their allowance
    AlternateSearchSurface,
}

impl RedirectTarget {
    /// Get human-readable surface name
    pub fn display_name(&self) -> &'static str {
        match self {
            RedirectTarget::AuthenticationSurface => "Sign In",
            RedirectTarget::AlternateSearchSurface => "Advanced Filters",
        }
    }
}

/// Outcome of an access check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    Permit,
    Redirect(RedirectTarget),
}

impl GateDecision {
    pub fn is_permit(&self) -> bool {
        matches!(self, GateDecision::Permit)
    }
}
