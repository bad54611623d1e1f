use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use ceara_dashboard::config::AppConfig;
use ceara_dashboard::data::{self, Availability, DataLoader};
use ceara_dashboard::diag::Diagnostics;
use ceara_dashboard::{join, map, report, server};

const MAP_IMAGE_FILE: &str = "mapa_infracoes.png";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the dashboard page and choropleth
    Generate {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Serve the generated dashboard
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate { config } => {
            println!("Generating dashboard with config: {:?}", config);
            let app_config = AppConfig::load_from_file(config)?;
            generate(&app_config)?;
            println!("Generation complete!");
        }
        Commands::Serve { config } => {
            println!("Serving dashboard with config: {:?}", config);
            let app_config = AppConfig::load_from_file(config)?;

            // Regenerate before binding so the served page is never stale.
            generate(&app_config)?;

            server::start_server(app_config).await?;
        }
    }

    Ok(())
}

fn generate(config: &AppConfig) -> Result<()> {
    let mut loader = DataLoader::new();
    let mut diags = Diagnostics::new();

    // 1. Availability gate: without the primary counts dataset the whole
    // report halts.
    match data::check_availability(&mut loader, &config.input, &mut diags) {
        Availability::Ready => {}
        Availability::MissingCounts => {
            bail!(
                "primary counts dataset is missing or empty: {:?}",
                config.input.counts_csv
            );
        }
    }

    fs::create_dir_all(&config.output.dir)
        .with_context(|| format!("Failed to create output dir: {:?}", config.output.dir))?;

    // 2. Load both sources (memoized; the counts were already parsed above)
    let counts = loader.counts(&config.input, &mut diags);
    let boundaries = loader.boundaries(&config.input, &mut diags);

    // 3. Join and render the choropleth
    let map_section = match boundaries.as_ref() {
        Some(shapes) => {
            let areas = join::join_counts(shapes, counts.as_slice());
            map::render_choropleth(&areas, config.map.width)
                .map(|choropleth| -> Result<report::MapSection> {
                    map::write_png(&choropleth, &config.output.dir.join(MAP_IMAGE_FILE))?;
                    Ok(report::MapSection {
                        image_file: MAP_IMAGE_FILE.to_string(),
                        area_count: areas.len(),
                        max_count: choropleth.max_count,
                    })
                })
                .transpose()?
        }
        None => None,
    };

    // 4. Stage the pre-rendered SAEB image next to the page
    let performance_image = stage_performance_image(config, &mut diags)?;

    // 5. Render the page
    let ctx = report::ReportContext {
        diagnostics: &diags,
        map: map_section,
        performance_image,
    };
    report::write_report(&config.output.dir, &ctx)
}

fn stage_performance_image(config: &AppConfig, diags: &mut Diagnostics) -> Result<Option<String>> {
    let source = &config.input.performance_image;
    if !source.exists() {
        diags.error(format!(
            "Erro ao carregar a imagem '{}'. Verifique se o arquivo está na pasta.",
            source.display()
        ));
        return Ok(None);
    }

    let file_name = source
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("grafico_saeb_desempenho.png")
        .to_string();
    fs::copy(source, config.output.dir.join(&file_name))
        .with_context(|| format!("Failed to copy performance image: {:?}", source))?;
    Ok(Some(file_name))
}
