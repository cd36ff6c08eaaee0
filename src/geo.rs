use glam::DVec3;

/// Globe radius in scene units.
pub const GLOBE_RADIUS: f64 = 5.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Place this coordinate on a sphere of `radius`.
    pub fn to_cartesian(self, radius: f64) -> DVec3 {
        project(self.latitude, self.longitude, radius)
    }

    /// Whether both components fall inside their physical range.
    pub fn in_range(self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Map latitude/longitude (degrees) onto a Y-up sphere of `radius`.
///
/// The polar angle is measured down from the north pole and the azimuth is
/// shifted by 180° so an equirectangular earth texture lines up with the
/// markers: `(0, 0)` lands on +X, the north pole on +Y.
#[inline]
pub fn project(lat: f64, lng: f64, radius: f64) -> DVec3 {
    let phi = (90.0 - lat).to_radians();
    let theta = (lng + 180.0).to_radians();

    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();

    DVec3::new(
        -(radius * sin_phi * cos_theta),
        radius * cos_phi,
        radius * sin_phi * sin_theta,
    )
}

/// Inverse of [`project`] for any non-zero point.
pub fn unproject(point: DVec3) -> GeoCoordinate {
    let radius = point.length();
    if radius <= f64::EPSILON {
        return GeoCoordinate::new(0.0, 0.0);
    }

    let phi = (point.y / radius).clamp(-1.0, 1.0).acos();
    let theta = point.z.atan2(-point.x);

    GeoCoordinate::new(90.0 - phi.to_degrees(), wrap_longitude(theta.to_degrees() - 180.0))
}

/// Wrap a longitude into [-180, 180).
#[inline(always)]
pub fn wrap_longitude(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}
