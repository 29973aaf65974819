//! Sampled satellite state and the per-index geometry derived from it.
use std::sync::Arc;

use crate::{
    constants::{EARTH_RADIUS_KM, SPEED_OF_LIGHT_KM_S},
    grid::TimeGrid,
    Vector3D,
};

/// Inertial state samples of one satellite, aligned to the shared [TimeGrid].
/// Built once per propagation run and never mutated.
#[derive(Debug, Clone)]
pub struct StateSeries {
    grid: Arc<TimeGrid>,
    position_km: Vec<Vector3D>,
    velocity_km_s: Vec<Vector3D>,
}

impl StateSeries {
    /// Wraps sampled state. Both vectors must carry one sample per grid point.
    pub fn new(grid: Arc<TimeGrid>, position_km: Vec<Vector3D>, velocity_km_s: Vec<Vector3D>) -> Self {
        assert_eq!(position_km.len(), grid.len(), "one position sample per grid point");
        assert_eq!(velocity_km_s.len(), grid.len(), "one velocity sample per grid point");
        Self {
            grid,
            position_km,
            velocity_km_s,
        }
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    pub fn grid(&self) -> &Arc<TimeGrid> {
        &self.grid
    }

    pub fn position_km(&self, index: usize) -> &Vector3D {
        &self.position_km[index]
    }

    pub fn velocity_km_s(&self, index: usize) -> &Vector3D {
        &self.velocity_km_s[index]
    }
}

/// Relative geometry of satellite `b` as seen from satellite `a`, per grid
/// index. All quantities are pure functions of the state at that index.
///
/// The series is symmetric: swapping the pair flips the sign of the relative
/// vectors but leaves every norm, the slew rate, the Doppler factor and the
/// line-of-sight flag unchanged.
#[derive(Debug, Clone)]
pub struct RelativeSeries {
    grid: Arc<TimeGrid>,
    rel_position_km: Vec<Vector3D>,
    rel_position_norm_km: Vec<f64>,
    rel_velocity_km_s: Vec<Vector3D>,
    rel_velocity_norm_km_s: Vec<f64>,
    slew_rate_rad_s: Vec<f64>,
    doppler_factor: Vec<f64>,
    los: Vec<bool>,
}

impl RelativeSeries {
    /// Derives the relative geometry between two aligned state series.
    pub fn between(a: &StateSeries, b: &StateSeries) -> Self {
        assert_eq!(a.len(), b.len(), "series must share one grid");
        let len = a.len();

        let mut rel_position_km = Vec::with_capacity(len);
        let mut rel_position_norm_km = Vec::with_capacity(len);
        let mut rel_velocity_km_s = Vec::with_capacity(len);
        let mut rel_velocity_norm_km_s = Vec::with_capacity(len);
        let mut slew_rate_rad_s = Vec::with_capacity(len);
        let mut doppler_factor = Vec::with_capacity(len);
        let mut los = Vec::with_capacity(len);

        for i in 0..len {
            let r = b.position_km(i) - a.position_km(i);
            let v = b.velocity_km_s(i) - a.velocity_km_s(i);
            let r_norm = r.norm();

            if r_norm > 0.0 {
                // ω = |r × v| / |r|²
                slew_rate_rad_s.push(r.cross(&v).norm() / (r_norm * r_norm));
                doppler_factor.push(r.dot(&v) / r_norm / SPEED_OF_LIGHT_KM_S);
                los.push(segment_clears_earth(a.position_km(i), b.position_km(i)));
            } else {
                // coincident samples carry no usable link
                slew_rate_rad_s.push(0.0);
                doppler_factor.push(0.0);
                los.push(false);
            }

            rel_position_norm_km.push(r_norm);
            rel_velocity_norm_km_s.push(v.norm());
            rel_position_km.push(r);
            rel_velocity_km_s.push(v);
        }

        Self {
            grid: a.grid().clone(),
            rel_position_km,
            rel_position_norm_km,
            rel_velocity_km_s,
            rel_velocity_norm_km_s,
            slew_rate_rad_s,
            doppler_factor,
            los,
        }
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    pub fn grid(&self) -> &Arc<TimeGrid> {
        &self.grid
    }

    pub fn rel_position_km(&self, index: usize) -> &Vector3D {
        &self.rel_position_km[index]
    }

    pub fn rel_position_norm_km(&self, index: usize) -> f64 {
        self.rel_position_norm_km[index]
    }

    pub fn rel_velocity_km_s(&self, index: usize) -> &Vector3D {
        &self.rel_velocity_km_s[index]
    }

    pub fn rel_velocity_norm_km_s(&self, index: usize) -> f64 {
        self.rel_velocity_norm_km_s[index]
    }

    /// Angular rate of the line of sight (rad.s⁻¹).
    pub fn slew_rate_rad_s(&self, index: usize) -> f64 {
        self.slew_rate_rad_s[index]
    }

    /// Relative frequency shift (r̂ · v) / c.
    pub fn doppler_factor(&self, index: usize) -> f64 {
        self.doppler_factor[index]
    }

    /// True when Earth does not occlude the link at this index.
    pub fn los(&self, index: usize) -> bool {
        self.los[index]
    }

    /// True when at least one sample has line of sight.
    pub fn any_los(&self) -> bool {
        self.los.iter().any(|&b| b)
    }
}

/// Ground-location samples: inertial position and lighting, per grid index.
/// Delivered by the external ground-ephemeris collaborator.
#[derive(Debug, Clone)]
pub struct GroundSeries {
    grid: Arc<TimeGrid>,
    position_km: Vec<Vector3D>,
    sunlit: Vec<bool>,
}

impl GroundSeries {
    pub fn new(grid: Arc<TimeGrid>, position_km: Vec<Vector3D>, sunlit: Vec<bool>) -> Self {
        assert_eq!(position_km.len(), grid.len(), "one position sample per grid point");
        assert_eq!(sunlit.len(), grid.len(), "one lighting sample per grid point");
        Self {
            grid,
            position_km,
            sunlit,
        }
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    pub fn grid(&self) -> &Arc<TimeGrid> {
        &self.grid
    }

    pub fn position_km(&self, index: usize) -> &Vector3D {
        &self.position_km[index]
    }

    /// True when the location is sunlit at this index.
    pub fn sunlit(&self, index: usize) -> bool {
        self.sunlit[index]
    }
}

/// Viewing geometry between a satellite and a ground location, per grid index.
#[derive(Debug, Clone)]
pub struct AccessSeries {
    grid: Arc<TimeGrid>,
    elevation_rad: Vec<f64>,
    nadir_angle_rad: Vec<f64>,
    sunlit: Vec<bool>,
}

impl AccessSeries {
    /// Derives elevation and nadir angles between aligned series.
    pub fn between(sat: &StateSeries, ground: &GroundSeries) -> Self {
        assert_eq!(sat.len(), ground.len(), "series must share one grid");
        let len = sat.len();

        let mut elevation_rad = Vec::with_capacity(len);
        let mut nadir_angle_rad = Vec::with_capacity(len);
        let mut sunlit = Vec::with_capacity(len);

        for i in 0..len {
            let s = sat.position_km(i);
            let g = ground.position_km(i);
            let range = s - g;

            // elevation above the local horizon
            let up = g.normalize();
            let sin_el = (up.dot(&range) / range.norm()).clamp(-1.0, 1.0);
            elevation_rad.push(sin_el.asin());

            // off-nadir angle of the location as seen from the satellite
            let nadir = -s.normalize();
            let to_ground = (g - s).normalize();
            let cos_nadir = nadir.dot(&to_ground).clamp(-1.0, 1.0);
            nadir_angle_rad.push(cos_nadir.acos());

            sunlit.push(ground.sunlit(i));
        }

        Self {
            grid: sat.grid().clone(),
            elevation_rad,
            nadir_angle_rad,
            sunlit,
        }
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    pub fn grid(&self) -> &Arc<TimeGrid> {
        &self.grid
    }

    /// Elevation of the satellite above the local horizon (rad).
    pub fn elevation_rad(&self, index: usize) -> f64 {
        self.elevation_rad[index]
    }

    /// Angle of the location off the satellite nadir direction (rad).
    pub fn nadir_angle_rad(&self, index: usize) -> f64 {
        self.nadir_angle_rad[index]
    }

    /// True when the ground location is sunlit at this index.
    pub fn sunlit(&self, index: usize) -> bool {
        self.sunlit[index]
    }
}

/// True when the segment between two positions keeps clear of the Earth
/// sphere: no point of the segment lies within [EARTH_RADIUS_KM] of the
/// Earth center.
fn segment_clears_earth(a: &Vector3D, b: &Vector3D) -> bool {
    let ab = b - a;
    let len2 = ab.norm_squared();

    let t = if len2 > 0.0 {
        (-a.dot(&ab) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let closest = a + ab * t;
    closest.norm() > EARTH_RADIUS_KM
}

#[cfg(test)]
mod test {
    use super::{segment_clears_earth, AccessSeries, GroundSeries, RelativeSeries, StateSeries};
    use crate::{constants::EARTH_RADIUS_KM, grid::TimeGrid, Vector3D};
    use hifitime::{Epoch, Unit};
    use std::str::FromStr;
    use std::sync::Arc;

    fn grid(len: usize) -> Arc<TimeGrid> {
        let t0 = Epoch::from_str("2020-01-01T00:00:00 UTC").unwrap();
        Arc::new(TimeGrid::from_points(t0, 15 * Unit::Second, len).unwrap())
    }

    fn constant_series(grid: &Arc<TimeGrid>, pos: Vector3D, vel: Vector3D) -> StateSeries {
        StateSeries::new(
            grid.clone(),
            vec![pos; grid.len()],
            vec![vel; grid.len()],
        )
    }

    #[test]
    fn earth_occlusion() {
        let r = EARTH_RADIUS_KM + 600.0;

        // same side of Earth: clear
        assert!(segment_clears_earth(
            &Vector3D::new(r, 0.0, 0.0),
            &Vector3D::new(r, 1000.0, 0.0),
        ));

        // antipodal: the segment runs through the Earth center
        assert!(!segment_clears_earth(
            &Vector3D::new(r, 0.0, 0.0),
            &Vector3D::new(-r, 0.0, 0.0),
        ));

        // perpendicular but high enough: grazing line stays outside
        assert!(segment_clears_earth(
            &Vector3D::new(2.0 * r, 0.0, 0.0),
            &Vector3D::new(0.0, 2.0 * r, 0.0),
        ));
    }

    #[test]
    fn slew_rate_and_doppler() {
        let grid = grid(4);

        // b moves tangentially around a at 100 km range, 1 km/s
        let a = constant_series(&grid, Vector3D::new(7000.0, 0.0, 0.0), Vector3D::zeros());
        let b = constant_series(
            &grid,
            Vector3D::new(7100.0, 0.0, 0.0),
            Vector3D::new(0.0, 1.0, 0.0),
        );

        let rel = RelativeSeries::between(&a, &b);
        for i in 0..rel.len() {
            assert_eq!(rel.rel_position_norm_km(i), 100.0);
            // ω = |r × v| / |r|² = 100 / 10000
            assert!((rel.slew_rate_rad_s(i) - 0.01).abs() < 1e-12);
            // purely tangential: no radial rate, no Doppler
            assert!(rel.doppler_factor(i).abs() < 1e-12);
            assert!(rel.los(i));
        }

        // swap the pair: scalar geometry is unchanged
        let rel_ba = RelativeSeries::between(&b, &a);
        for i in 0..rel.len() {
            assert_eq!(rel.rel_position_norm_km(i), rel_ba.rel_position_norm_km(i));
            assert_eq!(rel.slew_rate_rad_s(i), rel_ba.slew_rate_rad_s(i));
            assert_eq!(rel.doppler_factor(i), rel_ba.doppler_factor(i));
            assert_eq!(rel.los(i), rel_ba.los(i));
        }
    }

    #[test]
    fn overhead_geometry() {
        let grid = grid(3);
        let sat = constant_series(
            &grid,
            Vector3D::new(EARTH_RADIUS_KM + 550.0, 0.0, 0.0),
            Vector3D::zeros(),
        );
        let ground = GroundSeries::new(
            grid.clone(),
            vec![Vector3D::new(EARTH_RADIUS_KM, 0.0, 0.0); grid.len()],
            vec![true; grid.len()],
        );

        let access = AccessSeries::between(&sat, &ground);
        for i in 0..access.len() {
            // straight overhead: zenith elevation, zero nadir angle
            assert!((access.elevation_rad(i) - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
            assert!(access.nadir_angle_rad(i) < 1e-6);
            assert!(access.sunlit(i));
        }
    }

    #[test]
    fn below_horizon_geometry() {
        let grid = grid(3);
        let sat = constant_series(
            &grid,
            Vector3D::new(-(EARTH_RADIUS_KM + 550.0), 0.0, 0.0),
            Vector3D::zeros(),
        );
        let ground = GroundSeries::new(
            grid.clone(),
            vec![Vector3D::new(EARTH_RADIUS_KM, 0.0, 0.0); grid.len()],
            vec![true; grid.len()],
        );

        let access = AccessSeries::between(&sat, &ground);
        for i in 0..access.len() {
            assert!(access.elevation_rad(i) < 0.0, "far-side satellite sits below horizon");
        }
    }
}
