//! Closed enumerations of the irreversibility map.
//!
//! Every enum here round-trips through a snake_case token. Parsing goes
//! through [`normalize_token`] so hosts may use `cross-pod`, `Cross Pod` or
//! `CROSS_POD` interchangeably.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use steward_types::{normalize_token, TokenError};

/// Implements `ALL`, `as_str`, `Display`, `FromStr` for a token enum.
macro_rules! token_enum {
    ($ty:ident, $kind:literal, [$($variant:ident => $token:literal),+ $(,)?]) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$(Self::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $token),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = TokenError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let token = normalize_token(s);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == token)
                    .ok_or_else(|| TokenError::InvalidEnum {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

// ── Impact & Scope ─────────────────────────────────────────────────────

/// How much damage an action can do if it goes wrong. Ordered weakest first.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ActionImpact {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

token_enum!(ActionImpact, "action_impact", [
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
]);

impl ActionImpact {
    /// One step stronger, saturating at `Critical`.
    pub fn escalate(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High | Self::Critical => Self::Critical,
        }
    }
}

/// Blast radius of an action. Ordered narrowest first.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum IrreversibilityScope {
    #[default]
    Pod,
    CrossPod,
    System,
    /// Leaves the system boundary (third parties, outbound messages).
    External,
}

token_enum!(IrreversibilityScope, "irreversibility_scope", [
    Pod => "pod",
    CrossPod => "cross_pod",
    System => "system",
    External => "external",
]);

// ── Release Gate ───────────────────────────────────────────────────────

/// Rollout stage an action must pass through. Ordered least strict first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseGate {
    /// Straight to production.
    Live,
    /// Staged rollout (canary, percentage ramp).
    Staged,
    /// A human must sign off first.
    HumanApproved,
    /// Only shadow or mock executions; never live.
    ShadowOnly,
}

token_enum!(ReleaseGate, "release_gate", [
    Live => "live",
    Staged => "staged",
    HumanApproved => "human_approved",
    ShadowOnly => "shadow_only",
]);

impl ReleaseGate {
    pub fn requires_human_approval(self) -> bool {
        match self {
            Self::Live | Self::Staged => false,
            Self::HumanApproved | Self::ShadowOnly => true,
        }
    }
}

/// Gate required for an action of `impact` reaching `scope`.
///
/// | impact   | pod            | cross_pod      | system         | external       |
/// |----------|----------------|----------------|----------------|----------------|
/// | low      | live           | live           | staged         | staged         |
/// | medium   | live           | staged         | staged         | human_approved |
/// | high     | staged         | human_approved | human_approved | human_approved |
/// | critical | human_approved | human_approved | shadow_only    | shadow_only    |
///
/// Non-decreasing in both arguments.
pub fn get_release_gate(scope: IrreversibilityScope, impact: ActionImpact) -> ReleaseGate {
    use ActionImpact as I;
    use IrreversibilityScope as S;
    use ReleaseGate as G;

    match (impact, scope) {
        (I::Low, S::Pod | S::CrossPod) => G::Live,
        (I::Low, S::System | S::External) => G::Staged,
        (I::Medium, S::Pod) => G::Live,
        (I::Medium, S::CrossPod | S::System) => G::Staged,
        (I::Medium, S::External) => G::HumanApproved,
        (I::High, S::Pod) => G::Staged,
        (I::High, S::CrossPod | S::System | S::External) => G::HumanApproved,
        (I::Critical, S::Pod | S::CrossPod) => G::HumanApproved,
        (I::Critical, S::System | S::External) => G::ShadowOnly,
    }
}

// ── Irreversibility descriptors ────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrreversibilityReversibility {
    Reversible,
    PartiallyReversible,
    Irreversible,
}

token_enum!(IrreversibilityReversibility, "reversibility", [
    Reversible => "reversible",
    PartiallyReversible => "partially_reversible",
    Irreversible => "irreversible",
]);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrreversibilityApproval {
    Automatic,
    SingleHuman,
    TwoPersonRule,
}

token_enum!(IrreversibilityApproval, "required_approvals", [
    Automatic => "automatic",
    SingleHuman => "single_human",
    TwoPersonRule => "two_person_rule",
]);

/// What to do when an irreversible step fails midway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrreversibilityFallback {
    Retry,
    Rollback,
    Compensate,
    HaltAndAlert,
}

token_enum!(IrreversibilityFallback, "fallback_behavior", [
    Retry => "retry",
    Rollback => "rollback",
    Compensate => "compensate",
    HaltAndAlert => "halt_and_alert",
]);
