//! The dashboard page itself: maud markup with inline plotly charts, built as
//! three narrative acts plus the choropleth section.

use crate::diag::{Diagnostics, Severity};
use crate::map::reds_rgb;
use crate::stats::{self, format_count};
use anyhow::{Context, Result};
use chrono::Local;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use plotly::color::Rgb;
use plotly::common::{Marker, Orientation, Title};
use plotly::{Bar, Layout, Pie, Plot};
use std::fs;
use std::path::Path;

/// Map section inputs; absent when boundaries failed to load.
pub struct MapSection {
    /// Choropleth file name relative to the page.
    pub image_file: String,
    pub area_count: usize,
    pub max_count: u64,
}

pub struct ReportContext<'a> {
    pub diagnostics: &'a Diagnostics,
    pub map: Option<MapSection>,
    /// Performance image file name relative to the page, when present.
    pub performance_image: Option<String>,
}

pub fn write_report(out_dir: &Path, ctx: &ReportContext) -> Result<()> {
    let page = render_page(ctx);
    let path = out_dir.join("index.html");
    fs::write(&path, page.into_string())
        .with_context(|| format!("Failed to write report: {:?}", path))?;
    println!("Report written to {:?}", path);
    Ok(())
}

pub fn render_page(ctx: &ReportContext) -> Markup {
    let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    html! {
        (DOCTYPE)
        html lang="pt-BR" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Diagnóstico Ceará: Educação e Segurança" }
                script src="https://cdn.plot.ly/plotly-latest.min.js" {}
                style { (PreEscaped(PAGE_CSS)) }
            }
            body {
                h1 { "Diagnóstico de Risco: Educação e Segurança no Ceará" }
                p class="lead" {
                    "Uma análise de data storytelling para a Bolsa Reitoral de Liderança, \
                     baseada em dados agregados da SUSEP e SAEB."
                }
                p class="timestamp" { "Gerado em " (generated_at) }

                (notices(ctx.diagnostics))
                (act1())
                (map_section(ctx))
                (act2(ctx))
                (act3())
            }
        }
    }
}

fn notices(diags: &Diagnostics) -> Markup {
    html! {
        @for diag in diags.iter() {
            @let class = match diag.severity {
                Severity::Error => "notice notice-error",
                Severity::Warning => "notice notice-warning",
                Severity::Info => "notice notice-info",
            };
            div class=(class) { (diag.message) }
        }
    }
}

fn act1() -> Markup {
    html! {
        h2 class="act act-red" { "Ato 1: A Realidade da Segurança" }

        div class="kpis" {
            @for kpi in &stats::KPIS {
                div class="kpi" {
                    span class="kpi-label" { (kpi.label) }
                    span class="kpi-value" { (kpi.value) }
                }
            }
        }

        p {
            "A análise dos registros da SUSEP revela que o problema da criminalidade \
             está profundamente ligado à evasão escolar e à juventude."
        }

        div class="chart-grid" {
            div class="chart" {
                h3 { "Perfil de Escolaridade dos Infratores" }
                (PreEscaped(schooling_chart().to_inline_html(Some("grafico-escolaridade"))))
            }
            div class="chart" {
                h3 { "Perfil de Idade dos Infratores" }
                (PreEscaped(age_chart().to_inline_html(Some("grafico-idade"))))
            }
        }

        div class="chart chart-narrow" {
            h3 { "Perfil de Gênero dos Infratores" }
            (PreEscaped(gender_chart().to_inline_html(Some("grafico-genero"))))
        }
    }
}

fn map_section(ctx: &ReportContext) -> Markup {
    let Some(map) = &ctx.map else {
        // Boundaries or counts missing: the section is skipped, the notices
        // above already explain why.
        return html! {};
    };

    html! {
        h2 class="act" { "Onde o Problema se Concentra?" }
        p {
            "O mapa de calor abaixo mostra a contagem total de infrações por município, \
             revelando os 'hotspots' de criminalidade no estado."
        }
        figure id="mapa" {
            img src=(map.image_file) alt="Mapa de calor de infrações por município";
            figcaption {
                "Concentração de infrações em " (map.area_count) " municípios, de 0 a "
                (format_count(map.max_count)) " registros."
            }
        }
    }
}

fn act2(ctx: &ReportContext) -> Markup {
    html! {
        h2 class="act act-blue" { "Ato 2: A Causa Raiz" }
        p {
            "Se a evasão é o problema, por que os alunos evadem? A análise dos dados do \
             SAEB mostra um claro abismo de desempenho e uma falha em criar perspectiva."
        }

        @if let Some(image) = &ctx.performance_image {
            figure id="saeb" {
                img src=(image) alt="Desempenho médio em Matemática (SAEB)";
                figcaption {
                    "Desempenho Médio em Matemática (SAEB) - Ceará (Público vs. Privado)"
                }
            }
        }

        p { strong { "Dados do SAEB (Ensino Médio - Ceará) revelam:" } }
        ul {
            @for finding in &stats::SAEB_FINDINGS {
                li { (finding) }
            }
        }
    }
}

fn act3() -> Markup {
    html! {
        h2 class="act act-green" { "Ato 3: A Intervenção" }
        h3 { "Meu projeto ataca a causa raiz, não o sintoma." }
        p {
            "Proponho uma intervenção-piloto focada em "
            strong { "desempenho, motivação e perspectiva de futuro" } "."
        }

        div class="proposals" {
            @for proposal in &stats::PROPOSALS {
                div class="proposal" {
                    h4 { (proposal.title) }
                    p { (proposal.body) }
                }
            }
        }

        div class="notice notice-success" {
            "Esta não é apenas uma proposta educacional. É uma "
            strong { "política pública de prevenção à criminalidade" }
            " baseada em evidências."
        }
    }
}

fn schooling_chart() -> Plot {
    // Ascending so the largest level sits at the top of the horizontal bars.
    let mut levels: Vec<&stats::LabeledCount> = stats::SCHOOLING.iter().collect();
    levels.sort_by_key(|l| l.count);

    let max = levels.iter().map(|l| l.count).max().unwrap_or(1).max(1) as f64;
    let counts: Vec<u64> = levels.iter().map(|l| l.count).collect();
    let labels: Vec<String> = levels.iter().map(|l| l.label.to_string()).collect();
    let text: Vec<String> = levels.iter().map(|l| format_count(l.count)).collect();
    let colors: Vec<Rgb> = levels
        .iter()
        .map(|l| {
            let (r, g, b) = reds_rgb(l.count as f64 / max);
            Rgb::new(r, g, b)
        })
        .collect();

    let trace = Bar::new(counts, labels)
        .orientation(Orientation::Horizontal)
        .text_array(text)
        .marker(Marker::new().color_array(colors));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(
        Layout::new()
            .title(Title::with_text("Escolaridade dos Infratores no Ceará"))
            .show_legend(false)
            .height(460),
    );
    plot
}

fn age_chart() -> Plot {
    let mut bands: Vec<&stats::LabeledCount> = stats::AGE_BANDS.iter().collect();
    bands.sort_by_key(|b| std::cmp::Reverse(b.count));

    let labels: Vec<String> = bands.iter().map(|b| b.label.to_string()).collect();
    let counts: Vec<u64> = bands.iter().map(|b| b.count).collect();
    let text: Vec<String> = bands.iter().map(|b| format_count(b.count)).collect();
    // The two youth bands carry the argument; everything else stays muted.
    let colors: Vec<Rgb> = bands
        .iter()
        .map(|b| match b.label {
            "18 até 23 anos" => Rgb::new(255, 75, 75),
            "12 até 17 anos" => Rgb::new(255, 140, 0),
            _ => Rgb::new(150, 150, 160),
        })
        .collect();

    let trace = Bar::new(labels, counts)
        .text_array(text)
        .marker(Marker::new().color_array(colors));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(
        Layout::new()
            .title(Title::with_text("Perfil de Idade dos Infratores (Top 8 Faixas)"))
            .show_legend(false)
            .height(460),
    );
    plot
}

fn gender_chart() -> Plot {
    let labels: Vec<String> = stats::GENDER_SPLIT
        .iter()
        .map(|g| g.label.to_string())
        .collect();
    let counts: Vec<u64> = stats::GENDER_SPLIT.iter().map(|g| g.count).collect();

    let trace = Pie::new(counts).labels(labels);

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(
        Layout::new()
            .title(Title::with_text("Gênero dos Infratores"))
            .height(420),
    );
    plot
}

const PAGE_CSS: &str = r#"
body {
    font-family: "Segoe UI", Arial, sans-serif;
    max-width: 1100px;
    margin: 0 auto;
    padding: 24px;
    color: #222;
}
h1 { margin-bottom: 4px; }
.lead { font-size: 1.1em; color: #444; }
.timestamp { color: #888; font-size: 0.85em; }
.act {
    margin-top: 40px;
    padding-bottom: 6px;
    border-bottom: 3px solid #bbb;
}
.act-red { border-color: #ff4b4b; }
.act-blue { border-color: #3d85c6; }
.act-green { border-color: #2e9e5b; }
.kpis, .proposals { display: flex; gap: 16px; }
.kpi, .proposal {
    flex: 1;
    padding: 16px;
    border-radius: 10px;
    background: #f6f6f8;
    box-shadow: 0 1px 3px rgba(0,0,0,0.12);
}
.kpi-label { display: block; color: #666; font-size: 0.85em; }
.kpi-value { display: block; font-size: 1.9em; font-weight: 700; margin-top: 6px; }
.proposal { background: #eef4fb; }
.chart-grid { display: flex; gap: 16px; flex-wrap: wrap; }
.chart { flex: 1; min-width: 480px; }
.chart-narrow { max-width: 560px; }
figure { margin: 16px 0; }
figure img { max-width: 100%; border: 1px solid #ddd; border-radius: 6px; }
figcaption { color: #666; font-size: 0.85em; margin-top: 6px; }
.notice { padding: 12px 16px; border-radius: 8px; margin: 10px 0; }
.notice-error { background: #fdecec; border-left: 4px solid #d93030; }
.notice-warning { background: #fdf5e6; border-left: 4px solid #e6a817; }
.notice-info { background: #e8f1fb; border-left: 4px solid #3d85c6; }
.notice-success { background: #e9f7ef; border-left: 4px solid #2e9e5b; margin-top: 24px; }
"#;
