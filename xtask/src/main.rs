use anyhow::Context;
use brandcheck_types::scene::{
    ElementId, ElementKind, Geometry, ImagePayload, Payload, SceneDocument, SceneElement, Style,
    TextPayload,
};
use clap::{Parser, Subcommand};
use fs_err as fs;
use std::path::PathBuf;
use std::process::Command as ProcessCommand;

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Workspace helper tasks")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print schema identifiers used by brandcheck.
    PrintSchemas,
    /// Write a sample creative that trips several fixable rules.
    SampleDocument {
        #[arg(long, default_value = "samples/creative.json")]
        out: PathBuf,
    },
    /// Run fmt, clippy and tests the way CI does.
    Ci,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::PrintSchemas => {
            println!("{}", brandcheck_types::schema::BRANDCHECK_REPORT_V1);
            println!("{}", brandcheck_types::schema::BRANDCHECK_REMEDIATION_V1);
            println!("{}", brandcheck_types::schema::BRANDCHECK_CERTIFICATE_V1);
        }
        Command::SampleDocument { out } => {
            if let Some(parent) = out.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_string_pretty(&sample_document())
                .context("serialize sample document")?;
            fs::write(&out, json + "\n")?;
            println!("wrote {}", out.display());
        }
        Command::Ci => {
            let steps: [&[&str]; 3] = [
                &["fmt", "--all", "--", "--check"],
                &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
                &["test", "--workspace"],
            ];
            for args in steps {
                let status = ProcessCommand::new("cargo")
                    .args(args)
                    .status()
                    .with_context(|| format!("run cargo {}", args.join(" ")))?;
                if !status.success() {
                    anyhow::bail!("cargo {} failed", args.join(" "));
                }
            }
        }
    }
    Ok(())
}

fn text(id: &str, font: &str, fill: &str, geometry: Geometry) -> SceneElement {
    SceneElement {
        id: ElementId::new(id),
        name: Some(id.to_string()),
        role: None,
        kind: ElementKind::Text,
        geometry,
        style: Style {
            fill: Some(fill.to_string()),
            ..Style::default()
        },
        payload: Payload::Text(TextPayload {
            content: format!("{id} copy"),
            font_family: font.to_string(),
            font_size: 40.0,
            font_weight: None,
        }),
        bounds: None,
    }
}

/// Undersized logo, three font families, low-contrast body copy, a call to action bleeding off
/// the canvas and legal copy at the top.
fn sample_document() -> SceneDocument {
    let mut doc = SceneDocument::new("sample-creative", 1080.0, 1080.0);
    doc.elements = vec![
        SceneElement {
            id: ElementId::new("logo"),
            name: Some("logo".to_string()),
            role: None,
            kind: ElementKind::Image,
            geometry: Geometry::new(40.0, 40.0, 40.0, 20.0),
            style: Style::default(),
            payload: Payload::Image(ImagePayload {
                src: "logo.png".to_string(),
            }),
            bounds: None,
        },
        text("headline", "Inter", "#000000", Geometry::new(100.0, 400.0, 400.0, 60.0)),
        text("body", "Georgia", "#bbbbbb", Geometry::new(100.0, 500.0, 400.0, 60.0)),
        text("cta", "Arial", "#000000", Geometry::new(1000.0, 800.0, 150.0, 60.0)),
        text("legal", "Inter", "#000000", Geometry::new(100.0, 300.0, 400.0, 30.0)),
    ];
    doc
}
