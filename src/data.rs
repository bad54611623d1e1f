use crate::cache::FileCache;
use crate::config::InputConfig;
use crate::diag::Diagnostics;
use crate::types::{MunicipalityCount, MunicipalityShape};
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use geo::MultiPolygon;
use shapefile::Reader;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Outcome of the top-level data check. `main` branches on this exactly once:
/// without the primary counts dataset the whole report halts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Ready,
    MissingCounts,
}

/// Front-end over the loaders with process-lifetime memoization.
#[derive(Default)]
pub struct DataLoader {
    counts_cache: FileCache<Vec<MunicipalityCount>>,
    boundaries_cache: FileCache<Option<Vec<MunicipalityShape>>>,
}

impl DataLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(
        &mut self,
        input: &InputConfig,
        diags: &mut Diagnostics,
    ) -> Arc<Vec<MunicipalityCount>> {
        self.counts_cache.get_or_insert_with(&input.counts_csv, || {
            load_counts(
                &input.counts_csv,
                &input.municipality_column,
                &input.count_column,
                diags,
            )
        })
    }

    pub fn boundaries(
        &mut self,
        input: &InputConfig,
        diags: &mut Diagnostics,
    ) -> Arc<Option<Vec<MunicipalityShape>>> {
        self.boundaries_cache.get_or_insert_with(&input.boundaries, || {
            load_boundaries(&input.boundaries, &input.boundary_name_column, diags)
        })
    }
}

pub fn check_availability(
    loader: &mut DataLoader,
    input: &InputConfig,
    diags: &mut Diagnostics,
) -> Availability {
    let counts = loader.counts(input, diags);
    if counts.is_empty() {
        if input.counts_csv.exists() {
            diags.error(format!(
                "Erro: O arquivo de dados do mapa ('{}') não contém registros utilizáveis.",
                input.counts_csv.display()
            ));
        }
        return Availability::MissingCounts;
    }
    Availability::Ready
}

/// Load the per-municipality counts CSV.
///
/// Failures never propagate: a missing or unparsable file yields exactly one
/// error diagnostic and an empty vec, so downstream sections can test for
/// emptiness instead of crashing.
pub fn load_counts(
    path: &Path,
    municipality_column: &str,
    count_column: &str,
    diags: &mut Diagnostics,
) -> Vec<MunicipalityCount> {
    if !path.exists() {
        diags.error(format!(
            "Erro: O arquivo de dados do mapa ('{}') não foi encontrado.",
            path.display()
        ));
        return Vec::new();
    }

    match read_counts(path, municipality_column, count_column) {
        Ok(rows) => {
            println!("Loaded counts for {} municipalities", rows.len());
            rows
        }
        Err(e) => {
            diags.error(format!("Erro ao carregar os dados do mapa: {e:#}"));
            Vec::new()
        }
    }
}

fn read_counts(
    path: &Path,
    municipality_column: &str,
    count_column: &str,
) -> Result<Vec<MunicipalityCount>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    let mut rdr = ReaderBuilder::new().from_reader(file);
    let headers = rdr.headers()?.clone();

    let name_idx = headers
        .iter()
        .position(|h| h == municipality_column)
        .ok_or_else(|| anyhow!("coluna '{}' não encontrada no CSV", municipality_column))?;
    let count_idx = headers
        .iter()
        .position(|h| h == count_column)
        .ok_or_else(|| anyhow!("coluna '{}' não encontrada no CSV", count_column))?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let name = record.get(name_idx).unwrap_or("").trim();
        if name.is_empty() {
            continue;
        }
        // pandas-produced CSVs sometimes carry counts as floats ("100.0").
        let Some(count) = parse_count(record.get(count_idx).unwrap_or("")) else {
            continue;
        };
        rows.push(MunicipalityCount {
            municipality: name.to_string(),
            count,
        });
    }

    Ok(rows)
}

fn parse_count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<u64>() {
        return Some(v);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u64)
}

/// Load municipal boundaries (`.shp` or `.geojson`), renaming the name
/// attribute to the canonical municipality key.
///
/// A missing file is a warning plus download guidance and `None`; the map
/// section is skipped entirely. A present-but-unparsable file is one error
/// diagnostic and `None`.
pub fn load_boundaries(
    path: &Path,
    name_column: &str,
    diags: &mut Diagnostics,
) -> Option<Vec<MunicipalityShape>> {
    if !path.exists() {
        diags.warning(format!(
            "Aviso: Shapefile do mapa ('{}') não encontrado.",
            path.display()
        ));
        diags.info(
            "Para ver o mapa de calor, baixe os arquivos (.shp, .shx, .dbf) dos 'Limites \
             dos Municípios' do Ceará no portal do IBGE (Malhas Digitais) e coloque-os na \
             pasta de dados.",
        );
        return None;
    }

    match read_boundaries(path, name_column) {
        Ok(shapes) => {
            println!("Loaded {} municipal boundaries", shapes.len());
            Some(shapes)
        }
        Err(e) => {
            diags.error(format!("Erro ao carregar o shapefile do mapa: {e:#}"));
            None
        }
    }
}

fn read_boundaries(path: &Path, name_column: &str) -> Result<Vec<MunicipalityShape>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s: &str| s.to_lowercase())
        .ok_or_else(|| anyhow!("arquivo de limites sem extensão"))?;

    match extension.as_str() {
        "shp" => read_shapefile(path, name_column),
        "json" | "geojson" => read_geojson(path, name_column),
        other => Err(anyhow!("formato de limites não suportado: {}", other)),
    }
}

fn read_shapefile(path: &Path, name_column: &str) -> Result<Vec<MunicipalityShape>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("Failed to open Shapefile: {:?}", path))?;

    let mut shapes = Vec::new();

    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result?;

        let name_value = record
            .get(name_column)
            .ok_or_else(|| anyhow!("atributo '{}' não encontrado no shapefile", name_column))?;

        let name = match name_value {
            shapefile::dbase::FieldValue::Character(Some(s)) => s.clone(),
            shapefile::dbase::FieldValue::Character(None) => continue, // Skip if null
            _ => return Err(anyhow!("o atributo de nome do shapefile deve ser texto")),
        };

        let geometry = match shape {
            shapefile::Shape::Polygon(polygon) => {
                let geo_polygon: MultiPolygon<f64> = polygon
                    .try_into()
                    .map_err(|e| anyhow!("Failed to convert polygon: {:?}", e))?;
                geo_polygon
            }
            shapefile::Shape::PolygonM(polygon) => {
                let geo_polygon: MultiPolygon<f64> = polygon
                    .try_into()
                    .map_err(|e| anyhow!("Failed to convert polygonM: {:?}", e))?;
                geo_polygon
            }
            shapefile::Shape::PolygonZ(polygon) => {
                let geo_polygon: MultiPolygon<f64> = polygon
                    .try_into()
                    .map_err(|e| anyhow!("Failed to convert polygonZ: {:?}", e))?;
                geo_polygon
            }
            _ => continue, // Skip non-polygon shapes
        };

        shapes.push(MunicipalityShape {
            municipality: name,
            geometry,
        });
    }

    Ok(shapes)
}

fn read_geojson(path: &Path, name_column: &str) -> Result<Vec<MunicipalityShape>> {
    use geojson::GeoJson;
    use std::io::BufReader;

    let file = File::open(path)
        .with_context(|| format!("Failed to open GeoJSON file: {:?}", path))?;
    let reader = BufReader::new(file);

    // Note: this parses the whole file into memory.
    let geojson = GeoJson::from_reader(reader).context("Failed to parse GeoJSON")?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("GeoJSON must be a FeatureCollection")),
    };

    let mut shapes = Vec::new();

    for feature in collection.features {
        let name_val = feature
            .properties
            .as_ref()
            .and_then(|props| props.get(name_column));

        let name = match name_val {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => continue, // Skip if no name or not string/number
        };

        let geometry = match feature.geometry {
            Some(geom) => {
                let valid_geo: geo::Geometry<f64> = geom
                    .value
                    .try_into()
                    .map_err(|e| anyhow!("Failed to convert geojson geometry: {:?}", e))?;

                match valid_geo {
                    geo::Geometry::MultiPolygon(mp) => mp,
                    geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
                    _ => continue, // Skip points/lines
                }
            }
            None => continue,
        };

        shapes.push(MunicipalityShape {
            municipality: name,
            geometry,
        });
    }

    Ok(shapes)
}
