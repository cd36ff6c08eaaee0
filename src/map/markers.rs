use glam::DVec3;

use crate::data::Country;
use crate::geo::GeoCoordinate;
use crate::map::camera::Orbit;

/// Index of a marker in dataset order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub usize);

/// A pin on the globe surface.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRecord {
    pub id: MarkerId,
    pub display_name: String,
    pub flag_asset_ref: String,
    pub coordinate: GeoCoordinate,
    /// Position in the unrotated globe frame.
    pub position: DVec3,
    pub highlighted: bool,
}

/// All pins, built once at startup. Only highlight flags change afterwards.
#[derive(Debug, Clone, Default)]
pub struct MarkerRegistry {
    markers: Vec<MarkerRecord>,
}

impl MarkerRegistry {
    pub fn build(countries: &[Country], radius: f64) -> Self {
        let markers = countries
            .iter()
            .enumerate()
            .map(|(i, country)| MarkerRecord {
                id: MarkerId(i),
                display_name: country.name.clone(),
                flag_asset_ref: country.flag.clone(),
                coordinate: country.coordinate,
                position: country.coordinate.to_cartesian(radius),
                highlighted: false,
            })
            .collect::<Vec<_>>();
        log::info!("built {} markers on a globe of radius {radius}", markers.len());
        Self { markers }
    }

    pub fn find_by_id(&self, id: MarkerId) -> Option<&MarkerRecord> {
        self.markers.get(id.0)
    }

    pub fn all(&self) -> &[MarkerRecord] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn set_highlight(&mut self, id: MarkerId, on: bool) {
        if let Some(marker) = self.markers.get_mut(id.0) {
            marker.highlighted = on;
        }
    }

    pub fn clear_highlights(&mut self) {
        for marker in &mut self.markers {
            marker.highlighted = false;
        }
    }

    /// The highlighted marker, if any.
    pub fn highlighted(&self) -> Option<MarkerId> {
        self.markers.iter().find(|m| m.highlighted).map(|m| m.id)
    }

    /// Marker position after the globe rotation.
    pub fn world_position(&self, id: MarkerId, orbit: &Orbit) -> Option<DVec3> {
        self.find_by_id(id).map(|m| orbit.matrix() * m.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::default_countries;
    use crate::geo::GLOBE_RADIUS;

    #[test]
    fn build_keeps_dataset_order() {
        let registry = MarkerRegistry::build(&default_countries(), GLOBE_RADIUS);
        assert_eq!(registry.len(), 9);
        assert_eq!(registry.find_by_id(MarkerId(0)).unwrap().display_name, "Netherlands");
        assert_eq!(registry.find_by_id(MarkerId(8)).unwrap().display_name, "UK");
        assert!(registry.find_by_id(MarkerId(9)).is_none());
        for marker in registry.all() {
            assert!((marker.position.length() - GLOBE_RADIUS).abs() < 1e-9);
            assert!(!marker.highlighted);
        }
    }

    #[test]
    fn highlight_flags() {
        let mut registry = MarkerRegistry::build(&default_countries(), GLOBE_RADIUS);
        registry.set_highlight(MarkerId(3), true);
        assert_eq!(registry.highlighted(), Some(MarkerId(3)));
        registry.set_highlight(MarkerId(42), true);
        registry.clear_highlights();
        assert_eq!(registry.highlighted(), None);
    }

    #[test]
    fn world_position_applies_orbit() {
        let registry = MarkerRegistry::build(&default_countries(), GLOBE_RADIUS);
        let still = Orbit {
            pitch: 0.0,
            yaw: 0.0,
            tilt: 0.0,
        };
        let local = registry.find_by_id(MarkerId(1)).unwrap().position;
        assert!((registry.world_position(MarkerId(1), &still).unwrap() - local).length() < 1e-12);

        let rotated = registry.world_position(MarkerId(1), &Orbit::default()).unwrap();
        assert!((rotated.length() - GLOBE_RADIUS).abs() < 1e-9);
        assert!((rotated - local).length() > 0.1);
    }
}
