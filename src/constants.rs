/// Earth mean equatorial radius (km), used by the line-of-sight occlusion test.
pub const EARTH_RADIUS_KM: f64 = 6378.137;

/// Speed of light in vacuum (km.s⁻¹), used by the Doppler factor.
pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;
