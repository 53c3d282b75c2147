//! Policy Resolver: per-`wm_class` override rules deciding whether (and how
//! strictly) a window participates in matching.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::config::MatcherConfig;

/// Resolved or configured sync action for a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyAction {
    Ignore,
    Restore,
}

/// A single override rule. `title: None` makes this the generic rule for its
/// `wm_class`; `action: None` falls through to the configured default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PolicyRule {
    pub title: Option<String>,
    pub action: Option<PolicyAction>,
    pub threshold: Option<f64>,
    pub match_properties: Option<Vec<String>>,
}

/// `wm_class -> ordered list of rules`, loaded the same way
/// [`MatcherConfig`] loads its own TOML overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PolicyOverrides(HashMap<String, Vec<PolicyRule>>);

impl PolicyOverrides {
    pub fn new(rules: HashMap<String, Vec<PolicyRule>>) -> Self {
        PolicyOverrides(rules)
    }

    pub fn rules_for(&self, wm_class: &str) -> &[PolicyRule] {
        self.0.get(wm_class).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// The fully-resolved policy for a `(wm_class, title)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPolicy {
    pub action: PolicyAction,
    pub threshold: f64,
    /// `None` means all managed properties are allowed.
    pub allowed_properties: Option<Vec<String>>,
}

impl ResolvedPolicy {
    pub fn allows(&self, property: &str) -> bool {
        match &self.allowed_properties {
            None => true,
            Some(list) => list.iter().any(|p| p == property),
        }
    }
}

/// Resolution order: exact title match > generic (no-title) rule > defaults.
pub fn resolve(overrides: &PolicyOverrides, config: &MatcherConfig, wm_class: &str, title: &str) -> ResolvedPolicy {
    let rules = overrides.rules_for(wm_class);

    if let Some(rule) = rules.iter().find(|r| r.title.as_deref() == Some(title)) {
        return resolved_from_rule(rule, config);
    }
    if let Some(rule) = rules.iter().find(|r| r.title.is_none()) {
        return resolved_from_rule(rule, config);
    }

    ResolvedPolicy {
        action: config.default_sync_mode,
        threshold: config.default_match_threshold,
        allowed_properties: None,
    }
}

fn resolved_from_rule(rule: &PolicyRule, config: &MatcherConfig) -> ResolvedPolicy {
    ResolvedPolicy {
        action: rule.action.unwrap_or(config.default_sync_mode),
        threshold: rule.threshold.unwrap_or(config.default_match_threshold),
        allowed_properties: rule.match_properties.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides_with(wm_class: &str, rules: Vec<PolicyRule>) -> PolicyOverrides {
        let mut map = HashMap::new();
        map.insert(wm_class.to_string(), rules);
        PolicyOverrides::new(map)
    }

    #[test]
    fn exact_title_rule_wins_over_generic() {
        let overrides = overrides_with(
            "Editor",
            vec![
                PolicyRule {
                    title: None,
                    action: Some(PolicyAction::Ignore),
                    ..Default::default()
                },
                PolicyRule {
                    title: Some("README.md".to_string()),
                    action: Some(PolicyAction::Restore),
                    ..Default::default()
                },
            ],
        );
        let resolved = resolve(&overrides, &MatcherConfig::default(), "Editor", "README.md");
        assert_eq!(resolved.action, PolicyAction::Restore);
    }

    #[test]
    fn generic_rule_wins_when_no_exact_title_matches() {
        let overrides = overrides_with(
            "Slack",
            vec![PolicyRule {
                title: None,
                action: Some(PolicyAction::Ignore),
                ..Default::default()
            }],
        );
        let resolved = resolve(&overrides, &MatcherConfig::default(), "Slack", "Any title at all");
        assert_eq!(resolved.action, PolicyAction::Ignore);
    }

    #[test]
    fn falls_back_to_configured_defaults_with_no_rules() {
        let overrides = PolicyOverrides::default();
        let config = MatcherConfig::default();
        let resolved = resolve(&overrides, &config, "Unknown", "whatever");
        assert_eq!(resolved.action, config.default_sync_mode);
        assert_eq!(resolved.threshold, config.default_match_threshold);
        assert!(resolved.allowed_properties.is_none());
    }

    #[test]
    fn no_match_properties_means_all_allowed() {
        let resolved = ResolvedPolicy {
            action: PolicyAction::Restore,
            threshold: 0.8,
            allowed_properties: None,
        };
        assert!(resolved.allows("position"));
        assert!(resolved.allows("anything"));
    }

    #[test]
    fn match_properties_restricts_allowed_set() {
        let resolved = ResolvedPolicy {
            action: PolicyAction::Restore,
            threshold: 0.8,
            allowed_properties: Some(vec!["workspace".to_string()]),
        };
        assert!(resolved.allows("workspace"));
        assert!(!resolved.allows("position"));
    }
}
