use crate::error::GlobeError;
use crate::geo::GeoCoordinate;
use geojson::{Feature, GeoJson, Geometry, Value};
use std::fs;
use std::path::Path;

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// One record of the country dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub name: String,
    pub coordinate: GeoCoordinate,
    /// Flag image reference (URI).
    pub flag: String,
}

impl Country {
    pub fn new(name: &str, lat: f64, lng: f64, flag: &str) -> Self {
        Self {
            name: name.to_string(),
            coordinate: GeoCoordinate::new(lat, lng),
            flag: flag.to_string(),
        }
    }
}

/// The built-in country list
pub fn default_countries() -> Vec<Country> {
    vec![
        Country::new("Netherlands", 52.1326, 5.2913, "https://flagcdn.com/nl.svg"),
        Country::new("Belgium", 50.5039, 4.4699, "https://flagcdn.com/be.svg"),
        Country::new("Germany", 51.1657, 10.4515, "https://flagcdn.com/de.svg"),
        Country::new("Austria", 47.5162, 14.5501, "https://flagcdn.com/at.svg"),
        Country::new("Sweden", 60.1282, 18.6435, "https://flagcdn.com/se.svg"),
        Country::new("Finland", 61.9241, 25.7482, "https://flagcdn.com/fi.svg"),
        Country::new("Norway", 60.4720, 8.4689, "https://flagcdn.com/no.svg"),
        Country::new("Denmark", 56.2639, 9.5018, "https://flagcdn.com/dk.svg"),
        Country::new("UK", 55.3781, -3.4360, "https://flagcdn.com/gb.svg"),
    ]
}

/// Regional-indicator emoji for a flag reference whose file stem is a
/// two-letter country code, e.g. `https://flagcdn.com/nl.svg`.
pub fn flag_emoji(flag: &str) -> Option<String> {
    let file = flag.rsplit(['/', '\\']).next()?;
    let stem = file.split('.').next()?;
    if stem.len() != 2 || !stem.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    stem.chars()
        .map(|c| char::from_u32(0x1F1E6 + (c.to_ascii_uppercase() as u32 - 'A' as u32)))
        .collect()
}

/// Load a country list from a GeoJSON FeatureCollection.
///
/// Each feature needs a `name` and `flag` property and a position, given
/// either as a Point geometry or as `lat`/`lng` properties.
pub fn load_countries(path: &Path) -> Result<Vec<Country>, GlobeError> {
    let content = fs::read_to_string(path).map_err(|e| GlobeError::io(path, e))?;
    let geojson: GeoJson = content.parse().map_err(|e| GlobeError::geojson(path, e))?;
    let countries = parse_countries(&geojson)?;
    log::info!("loaded {} countries from {}", countries.len(), path.display());
    Ok(countries)
}

/// Extract country records from parsed GeoJSON.
pub fn parse_countries(geojson: &GeoJson) -> Result<Vec<Country>, GlobeError> {
    let features: Vec<&Feature> = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features.iter().collect(),
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => {
            return Err(GlobeError::malformed(0, "", "expected features, found a bare geometry"))
        }
    };

    features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| parse_country(index, feature))
        .collect()
}

fn parse_country(index: usize, feature: &Feature) -> Result<Country, GlobeError> {
    let string_prop = |key: &str| {
        feature
            .property(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };
    let number_prop = |key: &str| feature.property(key).and_then(|v| v.as_f64());

    let Some(name) = string_prop("name") else {
        return Err(GlobeError::malformed(index, "", "missing name"));
    };
    let Some(flag) = string_prop("flag") else {
        return Err(GlobeError::malformed(index, name, "missing flag"));
    };

    // Point geometry wins over lat/lng properties
    let from_geometry = feature.geometry.as_ref().and_then(|geometry| match &geometry.value {
        Value::Point(coords) if coords.len() >= 2 => Some((coords[1], coords[0])),
        _ => None,
    });
    let from_props = number_prop("lat").zip(number_prop("lng"));

    let Some((lat, lng)) = from_geometry.or(from_props) else {
        return Err(GlobeError::malformed(index, name, "missing coordinates"));
    };
    if !lat.is_finite() || !lng.is_finite() {
        return Err(GlobeError::malformed(index, name, "coordinates are not finite"));
    }

    let country = Country::new(name, lat, lng, flag);
    if !country.coordinate.in_range() {
        log::warn!("country {name} has out-of-range coordinates ({lat}, {lng})");
    }
    Ok(country)
}

/// Load coastline lines used as the globe surface.
pub fn load_surface(path: &Path) -> Result<Vec<LineString>, GlobeError> {
    let content = fs::read_to_string(path).map_err(|e| GlobeError::io(path, e))?;
    let geojson: GeoJson = content.parse().map_err(|e| GlobeError::geojson(path, e))?;

    let mut lines = Vec::new();
    process_geojson_lines(&geojson, |line| lines.push(line));

    if lines.is_empty() {
        return Err(GlobeError::EmptySurface {
            path: path.to_path_buf(),
        });
    }
    log::info!("loaded {} surface lines from {}", lines.len(), path.display());
    Ok(lines)
}

/// Process GeoJSON and extract line features
fn process_geojson_lines<F>(geojson: &GeoJson, mut add_line: F)
where
    F: FnMut(LineString),
{
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(ref geometry) = feature.geometry {
                    process_geometry_lines(geometry, &mut add_line);
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(ref geometry) = f.geometry {
                process_geometry_lines(geometry, &mut add_line);
            }
        }
        GeoJson::Geometry(geometry) => {
            process_geometry_lines(geometry, &mut add_line);
        }
    }
}

fn process_geometry_lines<F>(geometry: &Geometry, add_line: &mut F)
where
    F: FnMut(LineString),
{
    let to_line = |coords: &[Vec<f64>]| -> LineString {
        coords.iter().filter(|c| c.len() >= 2).map(|c| (c[0], c[1])).collect()
    };

    match &geometry.value {
        Value::LineString(coords) => add_line(to_line(coords)),
        Value::MultiLineString(lines) => {
            for coords in lines {
                add_line(to_line(coords));
            }
        }
        // Exterior rings only; holes add noise at braille resolution
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                add_line(to_line(exterior));
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                if let Some(exterior) = rings.first() {
                    add_line(to_line(exterior));
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                process_geometry_lines(g, add_line);
            }
        }
        _ => {}
    }
}

const NORTH_AMERICA: &[(f64, f64)] = &[
    (-168.0, 65.0), (-166.0, 60.0), (-141.0, 60.0), (-130.0, 55.0),
    (-125.0, 48.0), (-124.0, 40.0), (-117.0, 32.0), (-110.0, 25.0),
    (-97.0, 25.0), (-97.0, 28.0), (-82.0, 24.0), (-80.0, 25.0),
    (-81.0, 31.0), (-75.0, 35.0), (-70.0, 41.0), (-67.0, 45.0),
    (-55.0, 47.0), (-58.0, 55.0), (-64.0, 60.0), (-80.0, 63.0),
    (-95.0, 62.0), (-110.0, 68.0), (-130.0, 70.0), (-145.0, 70.0),
    (-168.0, 65.0),
];

const SOUTH_AMERICA: &[(f64, f64)] = &[
    (-80.0, 10.0), (-75.0, 5.0), (-60.0, 5.0), (-50.0, 0.0),
    (-35.0, -5.0), (-38.0, -15.0), (-40.0, -22.0), (-48.0, -25.0),
    (-55.0, -34.0), (-65.0, -42.0), (-68.0, -50.0), (-75.0, -52.0),
    (-72.0, -40.0), (-70.0, -20.0), (-80.0, -5.0), (-80.0, 10.0),
];

const EUROPE: &[(f64, f64)] = &[
    (-10.0, 36.0), (0.0, 38.0), (5.0, 43.0), (15.0, 45.0),
    (20.0, 40.0), (25.0, 37.0), (30.0, 40.0), (40.0, 43.0),
    (40.0, 55.0), (30.0, 60.0), (25.0, 65.0), (20.0, 70.0),
    (10.0, 71.0), (5.0, 62.0), (5.0, 58.0), (-5.0, 58.0),
    (-10.0, 52.0), (-5.0, 48.0), (-5.0, 43.0), (-10.0, 36.0),
];

const AFRICA: &[(f64, f64)] = &[
    (-17.0, 15.0), (-17.0, 20.0), (-15.0, 28.0), (-5.0, 35.0),
    (10.0, 37.0), (25.0, 32.0), (35.0, 30.0), (42.0, 12.0),
    (50.0, 12.0), (35.0, -5.0), (35.0, -25.0), (20.0, -35.0),
    (15.0, -30.0), (10.0, -15.0), (10.0, 0.0), (-5.0, 5.0),
    (-17.0, 15.0),
];

const ASIA: &[(f64, f64)] = &[
    (40.0, 43.0), (50.0, 40.0), (60.0, 25.0), (70.0, 20.0),
    (80.0, 8.0), (88.0, 22.0), (95.0, 16.0), (105.0, 10.0),
    (110.0, 20.0), (120.0, 22.0), (125.0, 30.0), (135.0, 35.0),
    (145.0, 45.0), (140.0, 55.0), (130.0, 52.0), (120.0, 40.0),
    (90.0, 50.0), (70.0, 55.0), (50.0, 50.0), (40.0, 43.0),
];

const AUSTRALIA: &[(f64, f64)] = &[
    (115.0, -20.0), (130.0, -12.0), (140.0, -12.0), (150.0, -25.0),
    (153.0, -30.0), (145.0, -38.0), (135.0, -35.0), (125.0, -32.0),
    (115.0, -35.0), (115.0, -20.0),
];

/// Coarse continent outlines used when no surface file is configured
pub fn simple_world() -> Vec<LineString> {
    [NORTH_AMERICA, SOUTH_AMERICA, EUROPE, AFRICA, ASIA, AUSTRALIA]
        .iter()
        .map(|outline| outline.to_vec())
        .collect()
}
