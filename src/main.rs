//! Meshport CLI
//!
//! Converts triangle-mesh models into self-contained glTF 2.0 assets.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use meshport_core::{Geometry, Material, Model, Triangle, Vertex};
use meshport_export::{ColorMode, ContainerForm, GltfExportOptions, GltfExporter};

/// Meshport - triangle-mesh to glTF 2.0 converter
#[derive(Parser)]
#[command(name = "meshport")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a JSON model file to a glTF asset
    Convert(ConvertArgs),

    /// Export the built-in one-triangle sample model
    Demo(DemoArgs),
}

#[derive(Args)]
struct ConvertArgs {
    /// Path to the model JSON file
    input: PathBuf,

    #[command(flatten)]
    export: ExportArgs,
}

#[derive(Args)]
struct DemoArgs {
    #[command(flatten)]
    export: ExportArgs,
}

#[derive(Args)]
struct ExportArgs {
    /// Output path stem; the container extension is appended
    #[arg(short, long, default_value = "model")]
    output: PathBuf,

    /// Use per-vertex colors instead of a shared texture atlas
    #[arg(long)]
    vertex_colors: bool,

    /// Produce an embedded .gltf text document rather than a binary .glb
    #[arg(short, long)]
    embedded: bool,

    /// Texture atlas edge length in pixels
    #[arg(long, default_value_t = 32)]
    atlas_size: u32,
}

impl ExportArgs {
    fn options(&self) -> GltfExportOptions {
        GltfExportOptions {
            color_mode: if self.vertex_colors {
                ColorMode::VertexColors
            } else {
                ColorMode::TextureAtlas
            },
            container: if self.embedded {
                ContainerForm::EmbeddedText
            } else {
                ContainerForm::Binary
            },
            atlas_size: self.atlas_size,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Convert(args) => {
            let json = std::fs::read_to_string(&args.input)
                .with_context(|| format!("reading model file {}", args.input.display()))?;
            let model: Model = serde_json::from_str(&json)
                .with_context(|| format!("parsing model file {}", args.input.display()))?;
            export(&model, &args.export)
        }
        Commands::Demo(args) => export(&sample_model(), &args.export),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn,meshport=info",
        1 => "info,meshport=debug",
        _ => "debug,meshport=trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt().with_env_filter(filter).init();
}

fn export(model: &Model, args: &ExportArgs) -> Result<()> {
    let exporter = GltfExporter::new(args.options());
    let path = exporter
        .export_to_path(model, &args.output)
        .context("exporting model")?;
    info!(path = %path.display(), "wrote glTF asset");
    println!("{}", path.display());
    Ok(())
}

/// One solid-red triangle in the XY plane
fn sample_model() -> Model {
    let normal = [0.0, 0.0, 1.0];
    let red = [1.0, 0.0, 0.0, 1.0];
    Model {
        meshes: vec![Geometry {
            vertices: vec![
                Vertex {
                    position: [0.0, 0.0, 0.0],
                    normal,
                    color: red,
                    uv: [0.0, 0.0],
                },
                Vertex {
                    position: [1.0, 0.0, 0.0],
                    normal,
                    color: red,
                    uv: [0.0, 0.0],
                },
                Vertex {
                    position: [0.0, 1.0, 0.0],
                    normal,
                    color: red,
                    uv: [0.0, 0.0],
                },
            ],
            faces: vec![Triangle::new(0, 1, 2)],
            material: Material {
                diffuse: [1.0, 0.0, 0.0],
                opacity: 1.0,
                ..Material::default()
            },
        }],
    }
}
