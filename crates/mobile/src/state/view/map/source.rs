/// Where the overlay's vector tiles are served from.
#[derive(Debug, Clone)]
pub struct MapSource {
    pub(crate) overlay_tiles: String,
}

impl MapSource {
    pub(crate) fn protected_areas(tiles_base_url: &str) -> Self {
        let base = tiles_base_url.trim_end_matches('/');
        MapSource {
            overlay_tiles: format!("{base}/national_parks/{{z}}/{{x}}/{{y}}.pbf"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_ignored() {
        let a = MapSource::protected_areas("http://localhost:3000/");
        let b = MapSource::protected_areas("http://localhost:3000");

        assert_eq!(a.overlay_tiles, b.overlay_tiles);
        assert_eq!(
            a.overlay_tiles,
            "http://localhost:3000/national_parks/{z}/{x}/{y}.pbf"
        );
    }
}
