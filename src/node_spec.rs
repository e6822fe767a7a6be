#[cfg(not(feature = "std"))]
use core as std;

use crate::{NODE_CTR_SIZE, Scru64Id};
use std::{error, fmt, str};

/// Represents a node configuration specifier used to build a [`Scru64Generator`].
///
/// A node spec is usually expressed as a node spec string, which starts with a decimal
/// `node_id`, a hexadecimal `node_id` prefixed by "0x", or a 12-digit `node_prev` SCRU64 ID
/// value, followed by a slash and a decimal `node_id_size` value ranging from 1 to 23 (e.g.,
/// `"42/8"`, `"0xb00/12"`, `"0u2r85hm2pt3/16"`).
///
/// A `node_prev` form carries the ID issued immediately before a generator was shut down, so
/// that a restarted generator resumes the monotonic order of IDs from where the predecessor
/// left off.
///
/// # Examples
///
/// ```rust
/// use scru64::NodeSpec;
///
/// let x = "42/8".parse::<NodeSpec>()?;
/// assert_eq!(x.node_id(), 42);
/// assert_eq!(x.node_id_size(), 8);
/// assert_eq!(x.node_prev(), None);
///
/// let y = "0xb00/12".parse::<NodeSpec>()?;
/// assert_eq!(y.node_id(), 2816);
/// assert_eq!(y.node_id_size(), 12);
///
/// let z = "0u2r85hm2pt3/16".parse::<NodeSpec>()?;
/// assert_eq!(z.node_id(), 11001);
/// assert_eq!(z.node_id_size(), 16);
/// assert_eq!(z.node_prev(), Some("0u2r85hm2pt3".parse()?));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// [`Scru64Generator`]: crate::generator::Scru64Generator
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct NodeSpec {
    node_prev: Scru64Id,
    node_id_size: u8,
}

impl NodeSpec {
    /// Creates an instance of node spec from `node_prev` and `node_id_size` values.
    pub const fn with_node_prev(node_prev: Scru64Id, node_id_size: u8) -> Result<Self, NodeSpecError> {
        if node_id_size == 0 || node_id_size >= NODE_CTR_SIZE {
            return Err(NodeSpecError::node_id_size_range(node_id_size as u32));
        }
        Ok(Self {
            node_prev,
            node_id_size,
        })
    }

    /// Creates an instance of node spec from `node_id` and `node_id_size` values.
    pub const fn with_node_id(node_id: u32, node_id_size: u8) -> Result<Self, NodeSpecError> {
        if node_id_size == 0 || node_id_size >= NODE_CTR_SIZE {
            return Err(NodeSpecError::node_id_size_range(node_id_size as u32));
        }
        if node_id >= 1 << node_id_size {
            return Err(NodeSpecError::node_id_range(node_id, node_id_size));
        }
        let counter_size = NODE_CTR_SIZE - node_id_size;
        Ok(Self {
            node_prev: Scru64Id::from_parts(0, node_id << counter_size),
            node_id_size,
        })
    }

    /// Returns the `node_id_size` value.
    pub const fn node_id_size(&self) -> u8 {
        self.node_id_size
    }

    /// Returns the `node_id` value.
    pub const fn node_id(&self) -> u32 {
        let counter_size = NODE_CTR_SIZE - self.node_id_size;
        self.node_prev.node_ctr() >> counter_size
    }

    /// Returns the `node_prev` value if the node spec carries one, or `None` otherwise.
    pub const fn node_prev(&self) -> Option<Scru64Id> {
        if self.node_prev.timestamp() > 0 {
            Some(self.node_prev)
        } else {
            None
        }
    }

    /// Returns the `node_prev` value whether or not the node spec carries a meaningful one.
    pub(crate) const fn node_prev_raw(&self) -> Scru64Id {
        self.node_prev
    }

    /// Creates an instance of node spec from pre-validated field values.
    pub(crate) const fn from_raw_parts(node_prev: Scru64Id, node_id_size: u8) -> Self {
        Self {
            node_prev,
            node_id_size,
        }
    }
}

impl str::FromStr for NodeSpec {
    type Err = NodeSpecError;

    /// Creates an instance of node spec from a node spec string.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let Some((id_part, size_part)) = value.split_once('/') else {
            return Err(NodeSpecError::syntax());
        };
        let Some(node_id_size) = parse_strict_dec(size_part) else {
            return Err(NodeSpecError::syntax());
        };
        if node_id_size >= 0x100 {
            return Err(NodeSpecError::node_id_size_range(node_id_size));
        }

        if id_part.len() == 12 {
            match Scru64Id::try_from_str(id_part) {
                Ok(node_prev) => Self::with_node_prev(node_prev, node_id_size as u8),
                _ => Err(NodeSpecError::syntax()),
            }
        } else if let Some(hex_part) = id_part.strip_prefix("0x").or_else(|| id_part.strip_prefix("0X")) {
            match parse_hex(hex_part) {
                Some(node_id) => Self::with_node_id(node_id, node_id_size as u8),
                _ => Err(NodeSpecError::syntax()),
            }
        } else {
            match parse_strict_dec(id_part) {
                Some(node_id) => Self::with_node_id(node_id, node_id_size as u8),
                _ => Err(NodeSpecError::syntax()),
            }
        }
    }
}

impl fmt::Display for NodeSpec {
    /// Returns the canonical node spec string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node_prev() {
            Some(node_prev) => write!(f, "{}/{}", node_prev, self.node_id_size),
            None => write!(f, "{}/{}", self.node_id(), self.node_id_size),
        }
    }
}

/// Parses a decimal integer, accepting ASCII digits only and rejecting signs, whitespace, and
/// redundant leading zeros.
fn parse_strict_dec(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        None
    } else if text.len() > 1 && text.starts_with('0') {
        None
    } else {
        text.parse().ok()
    }
}

/// Parses a hexadecimal integer (without prefix), accepting ASCII hex digits only.
fn parse_hex(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        None
    } else {
        u32::from_str_radix(text, 16).ok()
    }
}

/// An error parsing an invalid node spec representation.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct NodeSpecError {
    kind: NodeSpecErrorKind,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
enum NodeSpecErrorKind {
    Syntax,
    NodeIdSizeRange { node_id_size: u32 },
    NodeIdRange { node_id: u32, node_id_size: u8 },
}

impl NodeSpecError {
    const fn syntax() -> Self {
        Self {
            kind: NodeSpecErrorKind::Syntax,
        }
    }

    const fn node_id_size_range(node_id_size: u32) -> Self {
        Self {
            kind: NodeSpecErrorKind::NodeIdSizeRange { node_id_size },
        }
    }

    const fn node_id_range(node_id: u32, node_id_size: u8) -> Self {
        Self {
            kind: NodeSpecErrorKind::NodeIdRange {
                node_id,
                node_id_size,
            },
        }
    }
}

impl fmt::Display for NodeSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not interpret node spec: ")?;
        match self.kind {
            NodeSpecErrorKind::Syntax => write!(
                f,
                "invalid syntax (it looks like: `42/8`, `0xb00/12`, `0u2r85hm2pt3/16`)"
            ),
            NodeSpecErrorKind::NodeIdSizeRange { node_id_size } => write!(
                f,
                "`node_id_size` ({}) must range from 1 to 23",
                node_id_size
            ),
            NodeSpecErrorKind::NodeIdRange {
                node_id,
                node_id_size,
            } => write!(
                f,
                "`node_id` ({}) must fit in `node_id_size` ({}) bits",
                node_id, node_id_size
            ),
        }
    }
}

impl error::Error for NodeSpecError {}

#[cfg(feature = "serde")]
mod with_serde {
    use super::{NodeSpec, fmt};
    use serde::{Deserializer, Serializer, de};

    impl serde::Serialize for NodeSpec {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    impl<'de> serde::Deserialize<'de> for NodeSpec {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_str(VisitorImpl)
        }
    }

    struct VisitorImpl;

    impl de::Visitor<'_> for VisitorImpl {
        type Value = NodeSpec;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "a node spec string")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            value.parse().map_err(de::Error::custom)
        }
    }

}
