// ── Remote rule index ──

use std::collections::HashSet;

use crate::model::RemoteRuleSummary;

/// Names of the rules present on the device when the pass started.
///
/// Built once from a single fetch and never refreshed mid-pass.
#[derive(Debug, Clone, Default)]
pub struct RemoteRuleIndex {
    names: HashSet<String>,
}

impl RemoteRuleIndex {
    pub fn build(existing: &[RemoteRuleSummary]) -> Self {
        Self {
            names: existing.iter().map(|r| r.name.clone()).collect(),
        }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str) -> RemoteRuleSummary {
        RemoteRuleSummary {
            name: name.into(),
            ..RemoteRuleSummary::default()
        }
    }

    #[test]
    fn build_collects_names() {
        let index = RemoteRuleIndex::build(&[summary("a"), summary("b"), summary("a")]);
        assert_eq!(index.len(), 2);
        assert!(index.contains("a"));
        assert!(index.contains("b"));
        assert!(!index.contains("c"));
    }

    #[test]
    fn lookup_is_exact() {
        let index = RemoteRuleIndex::from_names(["allow-web"]);
        assert!(!index.contains("allow"));
        assert!(!index.contains("Allow-Web"));
    }

    #[test]
    fn empty_index() {
        let index = RemoteRuleIndex::build(&[]);
        assert!(index.is_empty());
        assert!(!index.contains(""));
    }
}
