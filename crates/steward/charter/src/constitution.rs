use serde::{Deserialize, Serialize};

/// Statement of system purpose plus the outcomes it must never optimize for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constitution {
    purpose: String,
    #[serde(default)]
    non_goals: Vec<String>,
}

impl Constitution {
    pub fn new(purpose: impl Into<String>, non_goals: Vec<String>) -> Self {
        Self {
            purpose: purpose.into(),
            non_goals,
        }
    }

    pub fn builtin() -> Self {
        Self::new(
            "Operate autonomous pods that act only within governed, auditable and human-overridable bounds",
            vec![
                "maximize engagement".into(),
                "attention capture".into(),
                "revenue at any cost".into(),
                "minimize human oversight".into(),
                "growth at all costs".into(),
            ],
        )
    }

    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    pub fn non_goals(&self) -> &[String] {
        &self.non_goals
    }
}

impl Default for Constitution {
    fn default() -> Self {
        Self::builtin()
    }
}
