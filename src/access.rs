//! Contact feasibility masks derived from sampled geometry.
//!
//! Every mask entry is a pure function of the state at its grid index; no
//! smoothing or windowing across indices.
use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    errors::ConfigError,
    state::{AccessSeries, RelativeSeries},
};

/// Inter-satellite link feasibility bounds.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IslConstraints {
    /// Link-budget range bound (km). Contacts require strictly less range.
    pub max_range_km: f64,

    /// Pointing bound on the line-of-sight angular rate (rad.s⁻¹).
    pub max_slew_rate_rad_s: f64,

    /// Optional `(min, max)` bounds on the Doppler factor. Only applied when
    /// both bounds are supplied.
    pub doppler_bounds: Option<(f64, f64)>,
}

impl IslConstraints {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if let Some((min, max)) = self.doppler_bounds {
            if max < min {
                return Err(ConfigError::InvalidDopplerBounds);
            }
        }
        Ok(())
    }

    /// Element-wise AND of the line-of-sight, range, slew and optional
    /// Doppler masks. When no sample has line of sight the link is declared
    /// infeasible outright.
    pub fn feasibility_mask(&self, rel: &RelativeSeries) -> Vec<bool> {
        if !rel.any_los() {
            debug!("pair never in line of sight, link infeasible");
            return (0..rel.len()).map(|i| rel.los(i)).collect();
        }

        (0..rel.len())
            .map(|i| {
                let doppler_ok = match self.doppler_bounds {
                    Some((min, max)) => {
                        let dop = rel.doppler_factor(i);
                        dop >= min && dop <= max
                    },
                    None => true,
                };

                rel.los(i)
                    && rel.rel_position_norm_km(i) < self.max_range_km
                    && rel.slew_rate_rad_s(i) < self.max_slew_rate_rad_s
                    && doppler_ok
            })
            .collect()
    }
}

/// Ground access predicate: minimum elevation from the ground location, or
/// maximum off-nadir angle from the satellite (analogous to a sensor FOV).
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AccessConstraint {
    /// Satellite must stand at least this high above the local horizon (rad).
    Elevation(f64),

    /// Location must sit within this angle off the satellite nadir (rad).
    Nadir(f64),
}

impl AccessConstraint {
    /// Boolean access mask over the series' grid.
    pub fn access_mask(&self, access: &AccessSeries) -> Vec<bool> {
        (0..access.len())
            .map(|i| match self {
                Self::Elevation(min) => access.elevation_rad(i) >= *min,
                Self::Nadir(max) => access.nadir_angle_rad(i) <= *max,
            })
            .collect()
    }

    /// Access mask AND-ed with the lighting flag.
    pub fn access_mask_lit(&self, access: &AccessSeries) -> Vec<bool> {
        self.access_mask(access)
            .into_iter()
            .enumerate()
            .map(|(i, ok)| ok && access.sunlit(i))
            .collect()
    }
}
