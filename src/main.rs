use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use uv_repacker::config::{CliArgs, PipelineConfig};
use uv_repacker::pipeline::Pipeline;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Init tracing
    let filter = if args.verbose {
        EnvFilter::new("uv_repacker=debug")
    } else {
        EnvFilter::new("uv_repacker=info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config: PipelineConfig = args.into();

    // Configure rayon thread pool
    if let Some(threads) = config.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure rayon thread pool")?;
    }

    match Pipeline::run(&config) {
        Ok(summary) => {
            println!(
                "Done: {} islands packed ({} merges, {} loops remapped) in {:.2}s",
                summary.islands,
                summary.merges,
                summary.loops_rewritten,
                summary.duration.as_secs_f64()
            );
            Ok(())
        }
        Err(e) => {
            error!(%e, "Pipeline failed");
            Err(anyhow::anyhow!(e)).context("uv-repacker pipeline failed")
        }
    }
}
