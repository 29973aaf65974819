//! Contact graph assembly and the time-varying query view the router runs on.
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use hifitime::{Duration, Epoch};

use crate::{
    grid::TimeGrid,
    node::{EdgeKey, NodeId, SatId},
};

/// Contact mask of one directed edge, with the grid it is aligned to.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactSeries {
    mask: Vec<bool>,
    grid: Arc<TimeGrid>,
}

impl ContactSeries {
    pub fn new(mask: Vec<bool>, grid: Arc<TimeGrid>) -> Self {
        assert_eq!(mask.len(), grid.len(), "mask must align with its grid");
        Self { mask, grid }
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    pub fn grid(&self) -> &Arc<TimeGrid> {
        &self.grid
    }

    /// Earliest grid instant strictly after `t` with the mask asserted.
    pub fn next_contact(&self, t: Epoch) -> Option<Epoch> {
        let first = self.grid.first_index_after(t)?;
        (first..self.mask.len())
            .find(|&i| self.mask[i])
            .map(|i| self.grid.epoch_at(i))
    }

    /// True when any contact remains strictly after `t`.
    pub fn has_contact_after(&self, t: Epoch) -> bool {
        self.next_contact(t).is_some()
    }
}

/// Directed contact edges surviving the feasibility filters.
///
/// The node set is the union of endpoints over all inserted keys; ground to
/// ground edges are never created and self loops are rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactGraph {
    edges: BTreeMap<EdgeKey, ContactSeries>,
}

impl ContactGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts one directed edge.
    pub fn insert(&mut self, key: EdgeKey, series: ContactSeries) {
        assert!(key.src != key.dst, "self loops are not allowed");
        self.edges.insert(key, series);
    }

    /// Inserts the same contact data under `a-b` and `b-a`: a symmetric
    /// link carries identical masks in both directions.
    pub fn insert_symmetric(&mut self, a: NodeId, b: NodeId, series: ContactSeries) {
        self.insert(EdgeKey::new(a, b), series.clone());
        self.insert(EdgeKey::new(b, a), series);
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edge(&self, src: NodeId, dst: NodeId) -> Option<&ContactSeries> {
        self.edges.get(&EdgeKey::new(src, dst))
    }

    pub fn edges_iter(&self) -> impl Iterator<Item = (&EdgeKey, &ContactSeries)> + '_ {
        self.edges.iter()
    }

    /// All outgoing edges of `node`, in key order.
    pub fn outgoing_iter(&self, node: NodeId) -> impl Iterator<Item = (&EdgeKey, &ContactSeries)> + '_ {
        self.edges
            .range(EdgeKey::new(node, NodeId::MIN)..=EdgeKey::new(node, NodeId::MAX))
    }

    /// Union of endpoint nodes over all inserted edges.
    pub fn nodes(&self) -> BTreeSet<NodeId> {
        let mut nodes = BTreeSet::new();
        for key in self.edges.keys() {
            nodes.insert(key.src);
            nodes.insert(key.dst);
        }
        nodes
    }

    /// Outgoing satellite-to-satellite edge keys of `sat`, skipping excluded
    /// destinations.
    pub fn isl_edge_keys(&self, sat: SatId, exclude: &[SatId]) -> Vec<EdgeKey> {
        self.outgoing_iter(NodeId::Satellite(sat))
            .filter_map(|(key, _)| match key.dst.as_satellite() {
                Some(dst) if !exclude.contains(&dst) => Some(*key),
                _ => None,
            })
            .collect()
    }
}

/// Query view over a [ContactGraph], parameterized by current time.
///
/// Edge values are FIFO: the set of contact instants of an edge does not
/// depend on when data arrives at its source, so arriving earlier never
/// yields a later arrival downstream.
#[derive(Debug, Clone)]
pub struct TimeVaryingGraph<'a> {
    graph: &'a ContactGraph,
    allowed: Option<BTreeSet<NodeId>>,
}

impl<'a> TimeVaryingGraph<'a> {
    /// View over the full graph.
    pub fn new(graph: &'a ContactGraph) -> Self {
        Self {
            graph,
            allowed: None,
        }
    }

    /// View restricted to `nodes`: edges with either endpoint outside the
    /// set disappear. Used for routing without inter-satellite relaying.
    pub fn restricted(graph: &'a ContactGraph, nodes: BTreeSet<NodeId>) -> Self {
        Self {
            graph,
            allowed: Some(nodes),
        }
    }

    fn allows(&self, node: NodeId) -> bool {
        match &self.allowed {
            Some(nodes) => nodes.contains(&node),
            None => true,
        }
    }

    /// Node set of this view.
    pub fn nodes(&self) -> BTreeSet<NodeId> {
        self.graph
            .nodes()
            .into_iter()
            .filter(|n| self.allows(*n))
            .collect()
    }

    /// Destinations reachable from `node` through a contact strictly after
    /// `current_time`. Empty once `current_time` passes the end of the grid.
    pub fn outgoing_edges(&self, node: NodeId, current_time: Epoch) -> Vec<NodeId> {
        if !self.allows(node) {
            return Vec::new();
        }

        self.graph
            .outgoing_iter(node)
            .filter(|(key, series)| self.allows(key.dst) && series.has_contact_after(current_time))
            .map(|(key, _)| key.dst)
            .collect()
    }

    /// Waiting time from `current_time` until the next contact of `src-dst`;
    /// `None` when no contact remains.
    pub fn edge_value(&self, src: NodeId, dst: NodeId, current_time: Epoch) -> Option<Duration> {
        if !self.allows(src) || !self.allows(dst) {
            return None;
        }

        self.graph
            .edge(src, dst)?
            .next_contact(current_time)
            .map(|t| t - current_time)
    }
}
