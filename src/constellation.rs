//! Constellation and ground-segment description consumed by the planner.
use hifitime::{Duration, Epoch};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::node::{GroundId, PlaneId, SatId};

/// One orbital plane and the satellites riding in it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Plane {
    pub id: PlaneId,
    pub satellites: Vec<SatId>,
}

impl Plane {
    pub fn new(id: PlaneId, satellites: Vec<SatId>) -> Self {
        Self { id, satellites }
    }
}

/// The constellation under analysis: planes of satellite identities. Orbit
/// elements live with the external propagator; the planner only needs the
/// topology.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Constellation {
    planes: Vec<Plane>,
}

impl Constellation {
    pub fn new(planes: Vec<Plane>) -> Self {
        Self { planes }
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// Every satellite, in plane order.
    pub fn satellites_iter(&self) -> impl Iterator<Item = SatId> + '_ {
        self.planes.iter().flat_map(|p| p.satellites.iter().copied())
    }

    pub fn total_satellites(&self) -> usize {
        self.satellites_iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.satellites_iter().next().is_none()
    }
}

/// Geodetic ground location: downlink station or imaging target. The
/// coordinates are carried for the external ground-ephemeris collaborator;
/// the planner itself never interprets them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroundLocation {
    pub id: GroundId,
    pub latitude_rad: f64,
    pub longitude_rad: f64,
    pub height_km: f64,
    pub name: Option<String>,
}

impl GroundLocation {
    pub fn new(id: GroundId, latitude_rad: f64, longitude_rad: f64, height_km: f64) -> Self {
        Self {
            id,
            latitude_rad,
            longitude_rad,
            height_km,
            name: None,
        }
    }

    /// Copies and returns [Self] with a human-readable name.
    pub fn with_name(&self, name: &str) -> Self {
        let mut s = self.clone();
        s.name = Some(name.to_string());
        s
    }
}

/// Drift-orbit maneuver handed to the external propagator when orbit
/// reconfiguration is enabled.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManeuverPlan {
    /// Altitude delta to the drift orbit (km).
    pub alt_change_km: f64,

    /// Maneuver start.
    pub start: Epoch,

    /// Time spent on the drift orbit.
    pub duration: Duration,
}

/// A maneuvering satellite selected by the external scheduler; these are the
/// sensing satellites of the run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduledManeuver {
    pub sat: SatId,
    pub plan: ManeuverPlan,
}

#[cfg(test)]
mod test {
    use super::{Constellation, GroundLocation, Plane};
    use crate::node::{GroundId, PlaneId, SatId};

    #[test]
    fn satellites_in_plane_order() {
        let constellation = Constellation::new(vec![
            Plane::new(PlaneId(0), vec![SatId(0), SatId(2)]),
            Plane::new(PlaneId(1), vec![SatId(1)]),
        ]);

        assert_eq!(constellation.total_satellites(), 3);
        assert_eq!(
            constellation.satellites_iter().collect::<Vec<_>>(),
            vec![SatId(0), SatId(2), SatId(1)],
        );
        assert!(!constellation.is_empty());
        assert!(Constellation::default().is_empty());
    }

    #[test]
    fn ground_location_naming() {
        let gs = GroundLocation::new(GroundId(0), 0.236, 2.527, 0.0).with_name("Guam");
        assert_eq!(gs.name.as_deref(), Some("Guam"));
    }
}
