//! Time-dependent earliest-arrival routing (Dijkstra over contact waiting
//! times), as used for delay-tolerant network routing.
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};
use std::sync::atomic::{AtomicBool, Ordering};

use hifitime::{Duration, Epoch};
use log::trace;

use crate::{graph::TimeVaryingGraph, node::NodeId};

/// Arrival labels and predecessors of one sensing event.
///
/// Scoped to a single source: a fresh table is produced per event and may be
/// discarded once its downlink has been selected.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTable {
    source: NodeId,
    start_time: Epoch,
    horizon: Epoch,
    labels: BTreeMap<NodeId, Epoch>,
    predecessors: BTreeMap<NodeId, NodeId>,
}

impl RouteTable {
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Instant the source data became available.
    pub fn start_time(&self) -> Epoch {
        self.start_time
    }

    /// Sentinel bound: nodes still labeled with this instant were not
    /// reached within the simulation horizon.
    pub fn horizon(&self) -> Epoch {
        self.horizon
    }

    /// Earliest arrival at `node`; `None` when the node is not in the graph.
    pub fn arrival(&self, node: NodeId) -> Option<Epoch> {
        self.labels.get(&node).copied()
    }

    /// True when `node` was reached strictly before the horizon sentinel.
    pub fn is_reached(&self, node: NodeId) -> bool {
        self.arrival(node).is_some_and(|t| t < self.horizon)
    }

    /// Walks predecessors from `node` back to the source; first element is
    /// the source. `None` when no route reached `node`.
    pub fn path_to(&self, node: NodeId) -> Option<Vec<NodeId>> {
        let mut path = vec![node];
        let mut cursor = node;

        while cursor != self.source {
            cursor = *self.predecessors.get(&cursor)?;
            path.push(cursor);
        }

        path.reverse();
        Some(path)
    }

    /// Sink with the earliest arrival; ties broken by node identity so the
    /// selection is reproducible. Sinks absent from the graph count as
    /// unreached (horizon arrival).
    pub fn best_sink(&self, sinks: &[NodeId]) -> Option<(NodeId, Epoch)> {
        sinks
            .iter()
            .map(|&sink| (self.arrival(sink).unwrap_or(self.horizon), sink))
            .min()
            .map(|(arrival, sink)| (sink, arrival))
    }
}

/// Runs the earliest-arrival relaxation from `source` over `graph`.
///
/// Every label starts at the sentinel `sim_start + sim_time`; the source
/// label is `start_time`, the instant its sensing data became available.
/// Relaxing an edge adds the waiting time until its next contact, so a label
/// is the earliest instant data can sit at that node.
///
/// Correct under the FIFO contact model: waiting times are computed from a
/// contact set that does not depend on the arrival instant, so settling
/// nodes in label order is safe. Ties between equal labels are broken by
/// node identity, which keeps runs reproducible.
pub fn earliest_arrival(
    graph: &TimeVaryingGraph,
    source: NodeId,
    start_time: Epoch,
    sim_start: Epoch,
    sim_time: Duration,
) -> RouteTable {
    let never = AtomicBool::new(false);
    earliest_arrival_cancellable(graph, source, start_time, sim_start, sim_time, &never)
        .expect("relaxation cannot be interrupted, the flag is never raised")
}

/// Same as [earliest_arrival], sampling `cancel` once per main-loop
/// iteration. Returns `None` when interrupted: a partially relaxed table
/// carries no valid labels, the caller must discard the event.
pub fn earliest_arrival_cancellable(
    graph: &TimeVaryingGraph,
    source: NodeId,
    start_time: Epoch,
    sim_start: Epoch,
    sim_time: Duration,
    cancel: &AtomicBool,
) -> Option<RouteTable> {
    let horizon = sim_start + sim_time;

    let mut labels: BTreeMap<NodeId, Epoch> =
        graph.nodes().into_iter().map(|n| (n, horizon)).collect();

    // the source may have lost all its edges to filtering, keep it addressable
    labels.insert(source, start_time);

    let mut predecessors = BTreeMap::<NodeId, NodeId>::new();
    let mut settled = BTreeSet::<NodeId>::new();

    let mut queue: BinaryHeap<Reverse<(Epoch, NodeId)>> =
        labels.iter().map(|(&node, &label)| Reverse((label, node))).collect();

    while let Some(Reverse((label, node))) = queue.pop() {
        if cancel.load(Ordering::Relaxed) {
            trace!("relaxation interrupted while settling {}", node);
            return None;
        }

        if settled.contains(&node) {
            continue;
        }
        if labels.get(&node) != Some(&label) {
            // stale queue entry, a better label was pushed since
            continue;
        }
        settled.insert(node);

        for neighbor in graph.outgoing_edges(node, label) {
            let Some(wait) = graph.edge_value(node, neighbor, label) else {
                continue;
            };

            let candidate = label + wait;
            let current = labels.get(&neighbor).copied().unwrap_or(horizon);

            if candidate < current {
                trace!("{} -> {}: arrival {}", node, neighbor, candidate);
                labels.insert(neighbor, candidate);
                predecessors.insert(neighbor, node);
                queue.push(Reverse((candidate, neighbor)));
            }
        }
    }

    Some(RouteTable {
        source,
        start_time,
        horizon,
        labels,
        predecessors,
    })
}
