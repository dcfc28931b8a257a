use anyhow::Result;
use nimbyvote::{apportion_all, PipelineConfig, QualityReport};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::ApportionArgs) -> Result<()> {
    let config = PipelineConfig::load(&args.config)?;
    let out_dir = args.output.clone().unwrap_or_else(|| config.output_dir.clone());
    std::fs::create_dir_all(&out_dir)?;

    let mut report = QualityReport::new();
    let results = apportion_all(&config, &mut report)?;
    for (key, result) in &results {
        let path = result.write(&out_dir, key)?;
        eprintln!("[apportion] {key}: {} precincts, {} outside tolerance -> {}",
            result.data().height(), result.violations().len(), path.display());
    }
    if results.is_empty() {
        eprintln!("[apportion] no census/boundary pairing is fully configured");
    }

    Ok(())
}
