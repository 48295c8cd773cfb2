use std::path::PathBuf;

use clap::Parser;
use glam::Vec2;

/// Target atlas dimensions in pixels.
#[derive(Debug, Clone, Copy)]
pub struct AtlasConfig {
    pub width: u32,
    pub height: u32,
}

impl AtlasConfig {
    /// Width-over-height ratio used to correct packing rects for
    /// non-square atlases.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            width: 2048,
            height: 2048,
        }
    }
}

/// Fully resolved per-material settings, produced by the scoped resolver
/// before any geometry work starts.
#[derive(Debug, Clone, Copy)]
pub struct MaterialSettings {
    /// Material texture footprint, in pixels; UVs are scaled by this into
    /// texel space before clustering.
    pub texture_size: Vec2,
    /// Island scale multiplier applied when converting to packing boxes.
    pub scale: f32,
    /// Outward padding (texels) added around every island.
    pub padding: f32,
    /// Merge tolerance (texels) for the overlap test.
    pub epsilon: f32,
    /// Collapse each surface into one island instead of clustering
    /// per polygon.
    pub single_island: bool,
}

/// Fully resolved pipeline configuration (constructed from CLI args).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub atlas: AtlasConfig,
    pub padding: f32,
    pub epsilon: f32,
    pub scale: f32,
    pub single_island: bool,
    /// Global fallback for materials without an explicit texture size
    /// (square, in pixels). Materials lacking both are a config error.
    pub default_texture_size: Option<f32>,
    pub dry_run: bool,
    pub verbose: bool,
    pub threads: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::new(),
            atlas: AtlasConfig::default(),
            padding: 2.0,
            epsilon: 2.0,
            scale: 1.0,
            single_island: false,
            default_texture_size: None,
            dry_run: false,
            verbose: false,
            threads: None,
        }
    }
}

/// CLI argument definition (clap derive).
#[derive(Parser, Debug)]
#[command(
    name = "uv-repacker",
    about = "Merge textured UV patches into per-material islands and repack them into one atlas",
    version
)]
pub struct CliArgs {
    /// Scene snapshot JSON (materials, objects, UV polygons)
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Output JSON (transforms, placements, remapped UVs)
    #[arg(short = 'o', long)]
    pub output: PathBuf,

    /// Atlas width in pixels
    #[arg(long, default_value_t = 2048)]
    pub atlas_width: u32,

    /// Atlas height in pixels
    #[arg(long, default_value_t = 2048)]
    pub atlas_height: u32,

    /// Island padding in texels
    #[arg(long, default_value_t = 2.0)]
    pub padding: f32,

    /// Merge tolerance in texels
    #[arg(long, default_value_t = 2.0)]
    pub epsilon: f32,

    /// Global material scale multiplier
    #[arg(long, default_value_t = 1.0)]
    pub scale: f32,

    /// One island per surface instead of per-polygon clustering
    #[arg(long)]
    pub single_island: bool,

    /// Square texture size (pixels) for materials without one in the scene
    #[arg(long)]
    pub default_texture_size: Option<f32>,

    /// Cluster and pack, report placements, write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Worker thread count (default: all cores)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

impl From<CliArgs> for PipelineConfig {
    fn from(args: CliArgs) -> Self {
        PipelineConfig {
            input: args.input,
            output: args.output,
            atlas: AtlasConfig {
                width: args.atlas_width,
                height: args.atlas_height,
            },
            padding: args.padding,
            epsilon: args.epsilon,
            scale: args.scale,
            single_island: args.single_island,
            default_texture_size: args.default_texture_size,
            dry_run: args.dry_run,
            verbose: args.verbose,
            threads: args.threads,
        }
    }
}
