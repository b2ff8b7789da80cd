//! Fixed synonym table for skill matching
//!
//! Matching must be deterministic, so synonyms come from a table rather than
//! the model. Each group lists a canonical name first, then its aliases.

use std::collections::HashMap;

/// Built-in synonym groups (canonical name first)
pub const BUILTIN_SYNONYMS: &[&[&str]] = &[
    &["javascript", "js", "ecmascript"],
    &["typescript", "ts"],
    &["python", "python3", "py"],
    &["postgresql", "postgres", "psql"],
    &["kubernetes", "k8s"],
    &["machine learning", "ml"],
    &["artificial intelligence", "ai"],
    &["natural language processing", "nlp"],
    &["amazon web services", "aws"],
    &["google cloud platform", "gcp", "google cloud"],
    &["c++", "cpp"],
    &["c#", "csharp", "c sharp"],
    &["golang", "go"],
    &["node.js", "nodejs", "node"],
    &["react", "react.js", "reactjs"],
    &["sql", "structured query language"],
    &["continuous integration", "ci", "ci/cd"],
];

/// Alias → canonical lookup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynonymTable {
    canonical: HashMap<String, String>,
}

impl SynonymTable {
    /// Empty table: only case and whitespace are normalized
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table seeded with [`BUILTIN_SYNONYMS`]
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for group in BUILTIN_SYNONYMS {
            table.add_group(group.iter().copied());
        }
        table
    }

    /// Build a table from configured groups (canonical name first)
    pub fn from_groups<G, S>(groups: G) -> Self
    where
        G: IntoIterator,
        G::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::empty();
        for group in groups {
            table.add_group(group);
        }
        table
    }

    /// Add one group
    ///
    /// A group sharing a name with groups already in the table is merged with
    /// them. The canonical name of the earliest overlapped group wins, so
    /// every member of every merged group resolves to one name.
    ///
    /// # Examples
    ///
    /// ```
    /// use smarthire_domain::SynonymTable;
    ///
    /// let mut table = SynonymTable::from_groups([["go", "go lang"]]);
    /// table.add_group(["golang", "go"]);
    /// assert_eq!(table.canonicalize("golang"), "go");
    /// assert_eq!(table.canonicalize("Go Lang"), "go");
    /// ```
    pub fn add_group<I, S>(&mut self, group: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let members: Vec<String> = group
            .into_iter()
            .map(|s| normalize_skill(s.as_ref()))
            .filter(|m| !m.is_empty())
            .collect();
        if members.is_empty() {
            return;
        }

        let mut overlapped: Vec<String> = Vec::new();
        for member in &members {
            if let Some(existing) = self.canonical.get(member) {
                if !overlapped.contains(existing) {
                    overlapped.push(existing.clone());
                }
            }
        }
        let winner = overlapped
            .first()
            .cloned()
            .unwrap_or_else(|| members[0].clone());

        for target in self.canonical.values_mut() {
            if overlapped.contains(target) {
                *target = winner.clone();
            }
        }
        for member in members {
            self.canonical.insert(member, winner.clone());
        }
    }

    /// Canonical form of a skill: lowercased, whitespace-collapsed, alias-resolved
    ///
    /// # Examples
    ///
    /// ```
    /// use smarthire_domain::SynonymTable;
    ///
    /// let table = SynonymTable::builtin();
    /// assert_eq!(table.canonicalize("  K8s "), "kubernetes");
    /// assert_eq!(table.canonicalize("Rust"), "rust");
    /// ```
    pub fn canonicalize(&self, skill: &str) -> String {
        let normalized = normalize_skill(skill);
        match self.canonical.get(&normalized) {
            Some(canonical) => canonical.clone(),
            None => normalized,
        }
    }

    /// Number of known names (canonical names plus aliases)
    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    /// True when the table knows no names
    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

/// Lowercase and collapse internal whitespace
pub fn normalize_skill(skill: &str) -> String {
    skill
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_aliases_resolve() {
        let table = SynonymTable::builtin();
        assert_eq!(table.canonicalize("JS"), "javascript");
        assert_eq!(table.canonicalize("Postgres"), "postgresql");
        assert_eq!(table.canonicalize("machine   learning"), "machine learning");
    }

    #[test]
    fn test_unknown_skill_is_only_normalized() {
        let table = SynonymTable::empty();
        assert_eq!(table.canonicalize(" Apache  Kafka "), "apache kafka");
    }

    #[test]
    fn test_overlapping_groups_merge_under_first_canonical() {
        let table = SynonymTable::from_groups(vec![
            vec!["golang", "go"],
            vec!["go board game", "go"],
        ]);
        assert_eq!(table.canonicalize("go"), "golang");
        assert_eq!(table.canonicalize("go board game"), "golang");
    }

    #[test]
    fn test_group_bridging_two_groups_merges_all_members() {
        let mut table = SynonymTable::from_groups(vec![
            vec!["postgresql", "postgres"],
            vec!["pg", "pgsql"],
        ]);
        table.add_group(["psql", "postgres", "pg"]);
        for alias in ["postgres", "pg", "pgsql", "psql"] {
            assert_eq!(table.canonicalize(alias), "postgresql", "{}", alias);
        }
    }

    #[test]
    fn test_configured_alias_does_not_split_builtin_group() {
        let mut table = SynonymTable::from_groups(vec![vec!["go", "go lang"]]);
        for group in BUILTIN_SYNONYMS {
            table.add_group(group.iter().copied());
        }
        assert_eq!(table.canonicalize("golang"), "go");
        assert_eq!(table.canonicalize("Go"), "go");
        assert_eq!(table.canonicalize("go lang"), "go");
        assert_eq!(table.canonicalize("k8s"), "kubernetes");
    }

    #[test]
    fn test_empty_groups_are_ignored() {
        let table = SynonymTable::from_groups(vec![Vec::<String>::new(), vec![String::new()]]);
        assert!(table.is_empty());
    }
}
