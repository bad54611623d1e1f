use geo::MultiPolygon;

/// One row of the public counts CSV: a municipality name and its total
/// number of recorded infractions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MunicipalityCount {
    pub municipality: String,
    pub count: u64,
}

/// One feature of the boundary file, with the name attribute already
/// renamed to the canonical municipality key.
#[derive(Debug, Clone)]
pub struct MunicipalityShape {
    pub municipality: String,
    pub geometry: MultiPolygon<f64>,
}

/// Join output: every shape yields exactly one area, counts default to zero.
#[derive(Debug, Clone)]
pub struct MapArea {
    pub municipality: String,
    pub geometry: MultiPolygon<f64>,
    pub count: u64,
}
