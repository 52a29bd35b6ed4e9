//! Interned ids shared by nodes and edges.
//!
//! Ids come from three places: the built-in templates (`start`, `e1-2`),
//! imported documents (any string), and the editor (`node-7`, `image-8`).
//! All of them live in one process-wide interner, so an id is a 4-byte
//! `Copy` handle and equality is an integer compare.

use lasso::{Spur, ThreadedRodeo};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

static IDS: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Suffix source for editor-generated ids.
static SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Id of a node or an edge. Nodes and edges share one namespace within a
/// diagram.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

impl NodeId {
    pub fn intern(s: &str) -> Self {
        NodeId(IDS.get_or_intern(s))
    }

    pub fn as_str(&self) -> &'static str {
        IDS.resolve(&self.0)
    }

    /// Next editor-generated id for `prefix`, shaped `<prefix>-<n>`.
    ///
    /// Only unique among generated ids. An imported document may already
    /// hold the same string, so go through
    /// [`Diagram::fresh_id`](crate::Diagram::fresh_id) when inserting.
    pub fn sequential(prefix: &str) -> Self {
        let n = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}-{n}"))
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::intern(s)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = NodeId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a node or edge id string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<NodeId, E> {
                if v.is_empty() {
                    return Err(E::invalid_value(de::Unexpected::Str(v), &self));
                }
                Ok(NodeId::intern(v))
            }
        }

        deserializer.deserialize_str(IdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_string_same_id() {
        let a = NodeId::intern("decision1");
        let b = NodeId::from("decision1");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "decision1");
        assert_eq!(a.to_string(), "decision1");
        assert_eq!(format!("{a:?}"), "#decision1");
    }

    #[test]
    fn sequential_ids_differ() {
        let a = NodeId::sequential("node");
        let b = NodeId::sequential("node");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("node-"));
    }

    #[test]
    fn json_is_a_plain_string() {
        let id = NodeId::intern("e1-2");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""e1-2""#);
        let back: NodeId = serde_json::from_str(r#""e1-2""#).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn empty_id_is_rejected() {
        assert!(serde_json::from_str::<NodeId>(r#""""#).is_err());
        assert!(serde_json::from_str::<NodeId>("12").is_err());
    }
}
