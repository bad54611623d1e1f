use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub map: MapConfig,
    pub output: OutputConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// Per-municipality counts CSV.
    pub counts_csv: PathBuf,
    #[serde(default = "default_municipality_column")]
    pub municipality_column: String,
    #[serde(default = "default_count_column")]
    pub count_column: String,
    /// Municipal boundaries, `.shp` or `.geojson`.
    pub boundaries: PathBuf,
    /// Attribute holding the municipality name in the boundary file.
    #[serde(default = "default_boundary_name_column")]
    pub boundary_name_column: String,
    /// Pre-rendered SAEB performance chart, embedded verbatim.
    pub performance_image: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MapConfig {
    /// Raster width in pixels; height follows the projected aspect ratio.
    pub width: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig { width: 900 }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

fn default_municipality_column() -> String {
    "Município".to_string()
}

fn default_count_column() -> String {
    "Contagem".to_string()
}

fn default_boundary_name_column() -> String {
    "NM_MUN".to_string()
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let toml = r#"
            [input]
            counts_csv = "dados_mapa_publico.csv"
            boundaries = "CE_Municipios_2022.shp"
            performance_image = "grafico_saeb_desempenho.png"

            [output]
            dir = "dist"

            [server]
            port = 8080
        "#;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(toml.as_bytes()).unwrap();

        let config = AppConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.input.municipality_column, "Município");
        assert_eq!(config.input.count_column, "Contagem");
        assert_eq!(config.input.boundary_name_column, "NM_MUN");
        assert_eq!(config.map.width, 900);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = AppConfig::load_from_file(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
