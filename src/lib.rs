//! Earliest-arrival data-delivery planning for reconfigurable constellations.
#![doc(html_logo_url = "https://raw.githubusercontent.com/rtk-rs/.github/master/logos/logo2.jpg")]
#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

/*
 * RELAYPLAN is part of the nav-solutions framework.
 * Authors: Guillaume W. Bres <guillaume.bressaix@gmail.com> et al.
 * (cf. https://github.com/nav-solutions/relayplan/graphs/contributors)
 * This framework is shipped under Mozilla Public V2 license.
 *
 * Documentation: https://github.com/nav-solutions/relayplan
 */

#[cfg(test)]
mod tests;

mod access;
mod constants;
mod constellation;
mod errors;
mod graph;
mod grid;
mod intervals;
mod metrics;
mod node;
mod planner;
mod providers;
mod router;
mod state;

/// Cartesian 3-vector (km or km.s⁻¹ depending on context).
pub type Vector3D = nalgebra::Vector3<f64>;

pub mod prelude {
    pub use crate::{
        access::{AccessConstraint, IslConstraints},
        constants::{EARTH_RADIUS_KM, SPEED_OF_LIGHT_KM_S},
        constellation::{Constellation, GroundLocation, ManeuverPlan, Plane, ScheduledManeuver},
        errors::{ConfigError, Error, PropagationError},
        graph::{ContactGraph, ContactSeries, TimeVaryingGraph},
        grid::TimeGrid,
        intervals::{excise_short_intervals, false_intervals, true_intervals, ContactInterval},
        metrics::{integrate, DeliveryEvent, Metrics},
        node::{EdgeKey, GroundId, NodeId, PlaneId, SatId},
        planner::{
            Config, DownlinkRecord, PassRecord, PlanResult, Planner, Prepared, RouteRecord,
            Timings,
        },
        providers::{GroundEphemeris, ManeuverScheduler, OrbitPropagator},
        router::{earliest_arrival, earliest_arrival_cancellable, RouteTable},
        state::{AccessSeries, GroundSeries, RelativeSeries, StateSeries},
        Vector3D,
    };

    // Pub re-export
    pub use hifitime::{Duration, Epoch, TimeScale, Unit};
}
