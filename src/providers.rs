//! Interfaces consumed from the external collaborators: orbit propagation,
//! maneuver scheduling and ground ephemerides. The planner is generic over
//! these seams and imposes nothing beyond the sampled outputs.
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{
    constellation::{Constellation, GroundLocation, ManeuverPlan, ScheduledManeuver},
    errors::PropagationError,
    grid::TimeGrid,
    node::{PlaneId, SatId},
    state::{GroundSeries, StateSeries},
};

/// Two-body + J2 orbit propagator, sampled on the shared grid.
pub trait OrbitPropagator {
    /// Samples inertial state of `sat` over `grid`, applying `maneuver` when
    /// one is scheduled for it.
    fn sample(
        &self,
        sat: SatId,
        maneuver: Option<&ManeuverPlan>,
        grid: &Arc<TimeGrid>,
    ) -> Result<StateSeries, PropagationError>;
}

/// Selects the maneuvering satellites that will drift over the target, one
/// set per plane.
pub trait ManeuverScheduler {
    fn select_maneuverers(
        &self,
        constellation: &Constellation,
        target: &GroundLocation,
        alt_change_km: f64,
    ) -> BTreeMap<PlaneId, Vec<ScheduledManeuver>>;
}

/// Samples a ground location over the shared grid: inertial position under
/// Earth rotation, plus the lighting flag used by the lighting restraint.
pub trait GroundEphemeris {
    fn sample(&self, location: &GroundLocation, grid: &Arc<TimeGrid>) -> GroundSeries;
}
