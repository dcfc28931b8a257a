use anyhow::{bail, Result};
use nimbyvote::{analyze, apportion_all, load_propositions, read_apportioned, ElectionSet, PipelineConfig, QualityReport};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::AnalyzeArgs) -> Result<()> {
    let config = PipelineConfig::load(&args.config)?;
    let out_dir = args.output.clone().unwrap_or_else(|| config.output_dir.clone());
    std::fs::create_dir_all(&out_dir)?;

    let mut report = QualityReport::new();
    let census = if args.reuse {
        eprintln!("[analyze] reading apportioned census tables from {}", out_dir.display());
        read_apportioned(&out_dir)?
    } else {
        eprintln!("[analyze] apportioning census values onto precincts");
        let mut tables = std::collections::BTreeMap::new();
        for (key, result) in apportion_all(&config, &mut report)? {
            result.write(&out_dir, &key)?;
            tables.insert(key, result.values()?);
        }
        tables
    };
    if census.is_empty() {
        bail!("[analyze] no apportioned census tables available");
    }

    let propositions = load_propositions(&config.resolve(&config.propositions))?;
    let (elections, failures) = ElectionSet::load(&config);
    eprintln!("[analyze] transforming {} proposition(s) from {} election(s)", elections.len(), elections.elections().len());

    let mut run = analyze(elections, failures, &propositions, &census, &config.derive);
    run.summary.warnings = report.warnings().to_vec();
    run.write(&out_dir)?;

    eprintln!("[analyze] {} rows, {} unit(s) failed, results in {}",
        run.table.len(), run.summary.failed(), out_dir.display());

    Ok(())
}
