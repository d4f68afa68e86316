// Command tree built from the daemon's flat method list.
//
// The daemon advertises methods as dot-delimited names such as
// `core.get_torrents_status` or `label.set_torrent`. The final segment is the
// command, everything before it is the namespace path. Each level of the tree
// holds a set of command names and a map of child namespaces, so a name can
// never appear twice at the same level no matter how it was reached.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Serialize, Serializer};

/// One key of a namespace path
///
/// Canonical unsigned decimal segments (`"0"`, `"12"`) become `Index` keys so
/// numerically indexed namespaces compare as integers; everything else,
/// including `"007"` or `"-1"`, stays a `Name`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    Index(u64),
    Name(String),
}

impl Segment {
    pub fn parse(raw: &str) -> Self {
        if is_canonical_index(raw) {
            if let Ok(n) = raw.parse::<u64>() {
                return Self::Index(n);
            }
        }
        Self::Name(raw.to_string())
    }
}

fn is_canonical_index(raw: &str) -> bool {
    !raw.is_empty()
        && raw.bytes().all(|b| b.is_ascii_digit())
        && (raw == "0" || !raw.starts_with('0'))
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(n) => write!(f, "{}", n),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for Segment {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for Segment {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&String> for Segment {
    fn from(raw: &String) -> Self {
        Self::parse(raw)
    }
}

impl From<u64> for Segment {
    fn from(n: u64) -> Self {
        Self::Index(n)
    }
}

impl Serialize for Segment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Hierarchical namespace of daemon commands
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandTree {
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    commands: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    namespaces: BTreeMap<Segment, CommandTree>,
}

impl CommandTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from dot-delimited method names
    ///
    /// Blank names, and names ending in `.`, carry no command and are skipped.
    pub fn build<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        methods
            .into_iter()
            .filter_map(|method| Self::from_method(method.as_ref()))
            .fold(Self::new(), Self::merge)
    }

    /// Single-method tree: the namespace path down to one command
    pub fn from_method(method: &str) -> Option<Self> {
        let method = method.trim();
        let mut segments: Vec<&str> = method.split('.').collect();
        let command = segments.pop().filter(|c| !c.is_empty())?;

        let mut tree = Self::new();
        tree.commands.insert(command.to_string());

        Some(segments.into_iter().rev().fold(tree, |child, segment| {
            let mut parent = Self::new();
            parent.namespaces.insert(Segment::parse(segment), child);
            parent
        }))
    }

    /// Merge two trees into a new one
    ///
    /// Matching namespaces are merged recursively, command sets are unioned,
    /// and keys present on only one side are kept as they are.
    pub fn merge(mut self, other: CommandTree) -> CommandTree {
        self.commands.extend(other.commands);
        for (key, theirs) in other.namespaces {
            let merged = match self.namespaces.remove(&key) {
                Some(ours) => ours.merge(theirs),
                None => theirs,
            };
            self.namespaces.insert(key, merged);
        }
        self
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.commands.contains(name)
    }

    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(String::as_str)
    }

    pub fn namespace(&self, key: &Segment) -> Option<&CommandTree> {
        self.namespaces.get(key)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = (&Segment, &CommandTree)> {
        self.namespaces.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.namespaces.is_empty()
    }

    /// Number of commands at this level and below
    pub fn command_count(&self) -> usize {
        self.commands.len()
            + self
                .namespaces
                .values()
                .map(CommandTree::command_count)
                .sum::<usize>()
    }

    /// Flatten back into sorted, fully-qualified method names
    pub fn method_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.command_count());
        self.collect_names("", &mut names);
        names.sort();
        names
    }

    fn collect_names(&self, prefix: &str, out: &mut Vec<String>) {
        for command in &self.commands {
            out.push(join(prefix, command));
        }
        for (key, child) in &self.namespaces {
            child.collect_names(&join(prefix, &key.to_string()), out);
        }
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaves(tree: &CommandTree) -> Vec<&str> {
        tree.commands().collect()
    }

    #[test]
    fn test_duplicates_collapse_and_siblings_survive() {
        let tree = CommandTree::build(["a.b.c", "a.b.d", "a.b.c"]);
        let ab = tree
            .namespace(&"a".into())
            .and_then(|a| a.namespace(&"b".into()))
            .unwrap();
        assert_eq!(leaves(ab), vec!["c", "d"]);
        assert_eq!(tree.command_count(), 2);
    }

    #[test]
    fn test_single_segment_is_root_command() {
        let tree = CommandTree::build(["x"]);
        assert!(tree.has_command("x"));
        assert_eq!(tree.namespaces().count(), 0);
    }

    #[test]
    fn test_order_independent_membership() {
        let methods = [
            "core.get_torrents_status",
            "core.add_torrent_magnet",
            "label.set_torrent",
            "web.connected",
            "core.get_torrents_status",
            "daemon.info",
        ];
        let forward = CommandTree::build(methods);
        let backward = CommandTree::build(methods.iter().rev());
        let mut rotated = methods.to_vec();
        rotated.rotate_left(3);
        assert_eq!(forward, backward);
        assert_eq!(forward, CommandTree::build(rotated));
    }

    #[test]
    fn test_numeric_segments_become_indices() {
        let tree = CommandTree::build(["plugins.0.enable", "plugins.12.enable", "plugins.007.enable"]);
        let plugins = tree.namespace(&"plugins".into()).unwrap();
        assert!(plugins.namespace(&Segment::Index(0)).is_some());
        assert!(plugins.namespace(&Segment::Index(12)).is_some());
        assert!(plugins.namespace(&Segment::Name("007".into())).is_some());
        assert_eq!(Segment::from("0"), Segment::Index(0));
        assert_eq!(Segment::from("-1"), Segment::Name("-1".into()));
    }

    #[test]
    fn test_names_round_trip() {
        let methods = ["core.pause_torrent", "label.add", "plugins.0.enable", "plugins.007.x", "ping"];
        let tree = CommandTree::build(methods);
        let mut expected: Vec<String> = methods.iter().map(|m| m.to_string()).collect();
        expected.sort();
        assert_eq!(tree.method_names(), expected);
    }

    #[test]
    fn test_merge_keeps_keys_from_both_sides() {
        let left = CommandTree::build(["core.a", "label.x"]);
        let right = CommandTree::build(["core.b", "web.y", "core.a"]);
        let merged = left.merge(right);
        assert_eq!(
            merged.method_names(),
            vec!["core.a", "core.b", "label.x", "web.y"]
        );
    }

    #[test]
    fn test_command_and_namespace_may_share_a_name() {
        let tree = CommandTree::build(["stats", "stats.session"]);
        assert!(tree.has_command("stats"));
        assert!(tree.namespace(&"stats".into()).unwrap().has_command("session"));
    }

    #[test]
    fn test_blank_entries_are_skipped() {
        let tree = CommandTree::build(["", "  ", "core.", "core.resume"]);
        assert_eq!(tree.method_names(), vec!["core.resume"]);
    }

    #[test]
    fn test_serializes_as_nested_json() {
        let tree = CommandTree::build(["core.get_torrents", "core.add_torrent", "plugins.0.enable"]);
        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!({
                "namespaces": {
                    "core": {"commands": ["add_torrent", "get_torrents"]},
                    "plugins": {"namespaces": {"0": {"commands": ["enable"]}}}
                }
            })
        );
    }
}
