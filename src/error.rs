use std::path::PathBuf;

/// Startup failures. Nothing in the per-frame path returns an error.
#[derive(Debug, thiserror::Error)]
pub enum GlobeError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse GeoJSON in {path}")]
    GeoJson {
        path: PathBuf,
        #[source]
        source: Box<geojson::Error>,
    },

    #[error("failed to parse config {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: simd_json::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("country #{index} ({name}): {reason}")]
    MalformedCountry {
        index: usize,
        name: String,
        reason: String,
    },

    #[error("globe surface {path} contains no line geometry")]
    EmptySurface { path: PathBuf },
}

impl GlobeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn geojson(path: impl Into<PathBuf>, source: geojson::Error) -> Self {
        Self::GeoJson {
            path: path.into(),
            source: Box::new(source),
        }
    }

    pub(crate) fn malformed(index: usize, name: &str, reason: impl Into<String>) -> Self {
        Self::MalformedCountry {
            index,
            name: if name.is_empty() { "<unnamed>".to_string() } else { name.to_string() },
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_country_names_the_entry() {
        let err = GlobeError::malformed(3, "Atlantis", "missing coordinates");
        assert_eq!(err.to_string(), "country #3 (Atlantis): missing coordinates");

        let unnamed = GlobeError::malformed(0, "", "missing name");
        assert_eq!(unnamed.to_string(), "country #0 (<unnamed>): missing name");
    }
}
