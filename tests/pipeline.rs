//! End-to-end render pass over on-disk fixtures: counts CSV plus GeoJSON
//! boundaries, through load, join, choropleth and page rendering.

use ceara_dashboard::data::{self, Availability, DataLoader};
use ceara_dashboard::diag::{Diagnostics, Severity};
use ceara_dashboard::config::InputConfig;
use ceara_dashboard::{join, map, report};
use std::fs;
use std::path::Path;

fn square_feature(name: &str, offset: f64) -> String {
    format!(
        r#"{{
            "type": "Feature",
            "properties": {{ "NM_MUN": "{name}" }},
            "geometry": {{
                "type": "Polygon",
                "coordinates": [[
                    [{x0}, 0.0], [{x1}, 0.0], [{x1}, 1.0], [{x0}, 1.0], [{x0}, 0.0]
                ]]
            }}
        }}"#,
        name = name,
        x0 = offset,
        x1 = offset + 1.0,
    )
}

fn write_fixtures(dir: &Path) -> InputConfig {
    let counts_csv = dir.join("dados_mapa_publico.csv");
    // Case and whitespace deliberately differ from the boundary names.
    fs::write(
        &counts_csv,
        "Município,Contagem\nFortaleza ,100\nSOBRAL,20\n",
    )
    .unwrap();

    let boundaries = dir.join("limites.geojson");
    let features = [
        square_feature("Fortaleza", 0.0),
        square_feature("Sobral", 2.0),
        square_feature("Iguatu", 4.0),
    ]
    .join(",");
    fs::write(
        &boundaries,
        format!(r#"{{ "type": "FeatureCollection", "features": [{features}] }}"#),
    )
    .unwrap();

    InputConfig {
        counts_csv,
        municipality_column: "Município".to_string(),
        count_column: "Contagem".to_string(),
        boundaries,
        boundary_name_column: "NM_MUN".to_string(),
        performance_image: dir.join("grafico_saeb_desempenho.png"),
    }
}

#[test]
fn full_render_pass_over_fixture_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixtures(dir.path());
    let mut loader = DataLoader::new();
    let mut diags = Diagnostics::new();

    assert_eq!(
        data::check_availability(&mut loader, &input, &mut diags),
        Availability::Ready
    );

    let counts = loader.counts(&input, &mut diags);
    let boundaries = loader.boundaries(&input, &mut diags);
    let shapes = (*boundaries).as_ref().expect("boundaries should load");

    // Three boundary rows, counts [100, 20, 0]: normalized names match and
    // the unmatched municipality defaults to zero.
    let areas = join::join_counts(shapes, counts.as_slice());
    assert_eq!(areas.len(), 3);
    let observed: Vec<(String, u64)> = areas
        .iter()
        .map(|a| (a.municipality.clone(), a.count))
        .collect();
    assert_eq!(
        observed,
        vec![
            ("FORTALEZA".to_string(), 100),
            ("SOBRAL".to_string(), 20),
            ("IGUATU".to_string(), 0),
        ]
    );

    // No load diagnostics on the happy path.
    assert!(diags.is_empty());

    // Choropleth renders and lands on disk.
    let choropleth = map::render_choropleth(&areas, 96).expect("non-empty areas render");
    assert_eq!(choropleth.max_count, 100);
    let png = dir.path().join("mapa_infracoes.png");
    map::write_png(&choropleth, &png).unwrap();
    assert!(png.exists());

    // Page renders with the map section and without the SAEB image, which is
    // absent from the fixtures.
    let ctx = report::ReportContext {
        diagnostics: &diags,
        map: Some(report::MapSection {
            image_file: "mapa_infracoes.png".to_string(),
            area_count: areas.len(),
            max_count: choropleth.max_count,
        }),
        performance_image: None,
    };
    report::write_report(dir.path(), &ctx).unwrap();

    let page = fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(page.contains("Onde o Problema se Concentra?"));
    assert!(page.contains("mapa_infracoes.png"));
    assert!(!page.contains("id=\"saeb\""));
}

#[test]
fn missing_boundaries_skip_the_map_but_not_the_report() {
    let dir = tempfile::tempdir().unwrap();
    let mut input = write_fixtures(dir.path());
    input.boundaries = dir.path().join("nao_existe.shp");

    let mut loader = DataLoader::new();
    let mut diags = Diagnostics::new();

    assert_eq!(
        data::check_availability(&mut loader, &input, &mut diags),
        Availability::Ready
    );
    let boundaries = loader.boundaries(&input, &mut diags);
    assert!(boundaries.is_none());
    assert_eq!(diags.count_of(Severity::Warning), 1);
    assert_eq!(diags.count_of(Severity::Info), 1);

    let ctx = report::ReportContext {
        diagnostics: &diags,
        map: None,
        performance_image: None,
    };
    report::write_report(dir.path(), &ctx).unwrap();

    let page = fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(!page.contains("Onde o Problema se Concentra?"));
    assert!(page.contains("Ato 1: A Realidade da Segurança"));
    assert!(page.contains("notice-warning"));
    assert!(page.contains("notice-info"));
}
