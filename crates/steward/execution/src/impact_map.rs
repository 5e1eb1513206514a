//! Action key to required impact.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use steward_types::normalize_token;

use crate::catalogue::IrreversibilityCatalogue;
use crate::types::ActionImpact;

/// Minimum impact an action must be declared with.
///
/// Keys are stored normalized (trimmed, lower-cased, `-`/space folded to
/// `_`), so `Data.Delete` and `data.delete` are the same action.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, ActionImpact>", into = "BTreeMap<String, ActionImpact>")]
pub struct ActionImpactMap {
    entries: BTreeMap<String, ActionImpact>,
}

impl ActionImpactMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derived from [`IrreversibilityCatalogue::builtin`].
    pub fn builtin() -> Self {
        builtin_map().clone()
    }

    pub fn insert(&mut self, action_key: &str, impact: ActionImpact) -> Option<ActionImpact> {
        self.entries.insert(normalize_token(action_key), impact)
    }

    pub fn get(&self, action_key: &str) -> Option<ActionImpact> {
        self.entries.get(&normalize_token(action_key)).copied()
    }

    /// This map with every entry of `overrides` taking precedence.
    pub fn layered(&self, overrides: &ActionImpactMap) -> Self {
        let mut entries = self.entries.clone();
        entries.extend(overrides.entries.iter().map(|(k, v)| (k.clone(), *v)));
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ActionImpact)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<BTreeMap<String, ActionImpact>> for ActionImpactMap {
    fn from(raw: BTreeMap<String, ActionImpact>) -> Self {
        raw.into_iter().collect()
    }
}

impl From<ActionImpactMap> for BTreeMap<String, ActionImpact> {
    fn from(map: ActionImpactMap) -> Self {
        map.entries
    }
}

impl<K: AsRef<str>> FromIterator<(K, ActionImpact)> for ActionImpactMap {
    fn from_iter<I: IntoIterator<Item = (K, ActionImpact)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, impact) in iter {
            map.insert(key.as_ref(), impact);
        }
        map
    }
}

fn builtin_map() -> &'static ActionImpactMap {
    static BUILTIN: OnceLock<ActionImpactMap> = OnceLock::new();
    BUILTIN.get_or_init(|| IrreversibilityCatalogue::builtin().action_map())
}

/// Required impact for `action_key`, consulting `map_override` before the
/// built-in map. `None` when neither knows the action.
pub fn get_required_impact(
    action_key: &str,
    map_override: Option<&ActionImpactMap>,
) -> Option<ActionImpact> {
    map_override
        .and_then(|map| map.get(action_key))
        .or_else(|| builtin_map().get(action_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_normalized() {
        let map: ActionImpactMap = [("Billing Export", ActionImpact::High)].into_iter().collect();
        assert_eq!(map.get("billing_export"), Some(ActionImpact::High));
        assert_eq!(map.get(" BILLING-EXPORT "), Some(ActionImpact::High));
    }

    #[test]
    fn override_wins_then_falls_back() {
        let overrides: ActionImpactMap =
            [("data.delete", ActionImpact::Medium)].into_iter().collect();
        assert_eq!(
            get_required_impact("data.delete", Some(&overrides)),
            Some(ActionImpact::Medium)
        );
        assert_eq!(
            get_required_impact("schema.migrate", Some(&overrides)),
            Some(ActionImpact::High)
        );
        assert_eq!(get_required_impact("unknown.action", None), None);
    }

    #[test]
    fn layered_keeps_base_entries() {
        let base = ActionImpactMap::builtin();
        let over: ActionImpactMap = [("cache.flush", ActionImpact::High)].into_iter().collect();
        let merged = base.layered(&over);
        assert_eq!(merged.get("cache.flush"), Some(ActionImpact::High));
        assert_eq!(merged.get("data.delete"), Some(ActionImpact::Critical));
        assert_eq!(merged.len(), base.len());
    }

    #[test]
    fn deserializes_from_plain_table() {
        let map: ActionImpactMap =
            serde_json::from_str(r#"{"Report-Send": "medium"}"#).unwrap();
        assert_eq!(map.get("report_send"), Some(ActionImpact::Medium));
    }
}
