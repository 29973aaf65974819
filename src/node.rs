//! Node identities and directed edge keys.
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Satellite identifier, unique within one constellation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SatId(pub u32);

impl fmt::Display for SatId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "sat {}", self.0)
    }
}

/// Ground-location identifier (station or imaging target).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroundId(pub u32);

impl fmt::Display for GroundId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Orbital plane identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlaneId(pub u32);

impl fmt::Display for PlaneId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "plane {}", self.0)
    }
}

/// Either end of a contact edge. Satellite and ground namespaces are
/// disjoint by construction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeId {
    Satellite(SatId),
    Ground(GroundId),
}

impl NodeId {
    // Ordering bounds used for ranged edge lookups.
    pub(crate) const MIN: NodeId = NodeId::Satellite(SatId(0));
    pub(crate) const MAX: NodeId = NodeId::Ground(GroundId(u32::MAX));

    pub fn is_satellite(&self) -> bool {
        matches!(self, Self::Satellite(_))
    }

    pub fn is_ground(&self) -> bool {
        matches!(self, Self::Ground(_))
    }

    /// Satellite identity, if this node is a satellite.
    pub fn as_satellite(&self) -> Option<SatId> {
        match self {
            Self::Satellite(sat) => Some(*sat),
            Self::Ground(_) => None,
        }
    }

    /// Ground identity, if this node is a ground location.
    pub fn as_ground(&self) -> Option<GroundId> {
        match self {
            Self::Satellite(_) => None,
            Self::Ground(g) => Some(*g),
        }
    }
}

impl From<SatId> for NodeId {
    fn from(sat: SatId) -> Self {
        Self::Satellite(sat)
    }
}

impl From<GroundId> for NodeId {
    fn from(g: GroundId) -> Self {
        Self::Ground(g)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Satellite(sat) => write!(f, "{}", sat.0),
            Self::Ground(g) => write!(f, "{}", g),
        }
    }
}

/// Directed edge key. Ordered `src` first so all outgoing edges of a node
/// sit contiguously in a sorted map.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeKey {
    pub src: NodeId,
    pub dst: NodeId,
}

impl EdgeKey {
    pub fn new(src: NodeId, dst: NodeId) -> Self {
        Self { src, dst }
    }

    /// Same contact, opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            src: self.dst,
            dst: self.src,
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.src, self.dst)
    }
}
