use std::{collections::BTreeMap, fs, path::{Path, PathBuf}};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    common::require_file_exists,
    config::SheetParamTable,
    era::{BoundaryVintage, CensusVintage, ElectionDate},
    geom::{NAD83_LONLAT, NAD83_UTM10N},
};

/// A polygon shapefile and how to read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSource {
    pub path: PathBuf,
    /// Attribute fields concatenated (in order) to form each feature's id.
    pub id_fields: Vec<String>,
    /// PROJ.4 string of the shapefile's coordinates.
    #[serde(default = "default_source_crs")]
    pub crs: String,
}

/// Block-group census values for one census vintage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CensusSource {
    /// CSV of block-group values keyed by `geoid`.
    pub table: PathBuf,
    /// CSV allow-list of variables (`name`, `use_in_final`).
    pub variables: PathBuf,
    pub block_groups: LayerSource,
}

/// Accepted band for the sum of a precinct's fragment-area fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApportionTolerance {
    pub min: f64,
    pub max: f64,
}

impl Default for ApportionTolerance {
    fn default() -> Self { Self { min: 0.97, max: 1.10 } }
}

impl ApportionTolerance {
    #[inline]
    pub fn contains(&self, coverage: f64) -> bool { coverage >= self.min && coverage <= self.max }
}

/// Census column names read by the derived variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivationColumns {
    pub med_income: String,
    pub med_value: String,
    pub yr_built: String,
    pub yr_moved_all: String,
    pub yr_moved_owner: String,
}

impl Default for DerivationColumns {
    fn default() -> Self {
        Self {
            med_income: "med_inc".into(),
            med_value: "med_value".into(),
            yr_built: "med_yr_built".into(),
            yr_moved_all: "med_yr_moved_all".into(),
            yr_moved_owner: "med_yr_moved_owner".into(),
        }
    }
}

/// One election's workbook and the sheet holding each proposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectionSource {
    pub date: ElectionDate,
    pub workbook: PathBuf,
    /// Proposition letter -> sheet name.
    pub props: BTreeMap<String, String>,
}

/// Everything a pipeline run reads, as loaded from a TOML file.
///
/// Relative paths are resolved against `input_dir`, which is itself
/// resolved against the directory holding the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// CSV with `Date_str`, `Letter`, `Vote that equals NIMBY`.
    pub propositions: PathBuf,
    #[serde(default = "default_target_crs")]
    pub target_crs: String,
    #[serde(default)]
    pub tolerance: ApportionTolerance,
    #[serde(default)]
    pub derive: DerivationColumns,
    #[serde(default)]
    pub census: BTreeMap<CensusVintage, CensusSource>,
    #[serde(default)]
    pub boundaries: BTreeMap<BoundaryVintage, LayerSource>,
    #[serde(default)]
    pub sheets: SheetParamTable,
    #[serde(default)]
    pub elections: Vec<ElectionSource>,
}

fn default_source_crs() -> String { NAD83_LONLAT.to_string() }
fn default_target_crs() -> String { NAD83_UTM10N.to_string() }
fn default_input_dir() -> PathBuf { PathBuf::from(".") }
fn default_output_dir() -> PathBuf { PathBuf::from("results") }

impl PipelineConfig {
    /// Read and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        require_file_exists(path)?;
        let text = fs::read_to_string(path)
            .with_context(|| format!("[config] Failed to read config file: {}", path.display()))?;
        let mut config: PipelineConfig = toml::from_str(&text)
            .with_context(|| format!("[config] Failed to parse config file: {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.input_dir = base.join(&config.input_dir);
            config.output_dir = base.join(&config.output_dir);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let ApportionTolerance { min, max } = self.tolerance;
        if !(min.is_finite() && max.is_finite() && min <= max) {
            bail!("[config] tolerance band [{min}, {max}] is not a valid interval");
        }
        for source in self.boundaries.values().chain(self.census.values().map(|c| &c.block_groups)) {
            if source.id_fields.is_empty() {
                bail!("[config] layer {} names no id fields", source.path.display());
            }
        }
        Ok(())
    }

    /// Resolve a configured path against `input_dir`.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() { path.to_path_buf() } else { self.input_dir.join(path) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
        input_dir = "data"
        propositions = "prop_metadata.csv"

        [tolerance]
        min = 0.95
        max = 1.05

        [census.ce2000]
        table = "census/ce2000.csv"
        variables = "census/variable_codes.csv"
        block_groups = { path = "tiger/bg00.shp", id_fields = ["STATEFP00", "COUNTYFP00", "TRACTCE00", "BLKGRPCE00"] }

        [boundaries.pre1992]
        path = "precincts/pre1992.shp"
        id_fields = ["precname"]
        crs = "+proj=utm +zone=10 +datum=NAD83 +units=m +no_defs +type=crs"

        [sheets.defaults]
        skiprows = 2

        [[sheets.overrides]]
        date = "200011"
        letter = "K"
        index_col = [0, 1]

        [[elections]]
        date = "200011"
        workbook = "votes/200011.xls"
        props = { K = "Prop K", L = "Prop L" }
    "#;

    #[test]
    fn parses_full_config() {
        let config: PipelineConfig = toml::from_str(CONFIG).unwrap();
        config.validate().unwrap();

        assert_eq!(config.tolerance, ApportionTolerance { min: 0.95, max: 1.05 });
        assert_eq!(config.target_crs, NAD83_UTM10N);
        assert_eq!(config.derive, DerivationColumns::default());
        assert_eq!(config.census[&CensusVintage::Ce2000].block_groups.id_fields.len(), 4);
        assert_eq!(config.census[&CensusVintage::Ce2000].block_groups.crs, NAD83_LONLAT);
        assert_eq!(config.boundaries[&BoundaryVintage::Pre1992].crs, NAD83_UTM10N);
        assert_eq!(config.elections[0].props["L"], "Prop L");
        assert_eq!(config.sheets.params(config.elections[0].date, "K").index_col, vec![0, 1]);
        assert_eq!(config.resolve(Path::new("votes/200011.xls")), PathBuf::from("data/votes/200011.xls"));
    }

    #[test]
    fn load_resolves_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        fs::write(&path, CONFIG).unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.input_dir, dir.path().join("data"));
        assert_eq!(config.output_dir, dir.path().join("results"));
    }

    #[test]
    fn rejects_inverted_tolerance() {
        let mut config: PipelineConfig = toml::from_str(CONFIG).unwrap();
        config.tolerance = ApportionTolerance { min: 1.1, max: 0.9 };
        assert!(config.validate().is_err());
        assert!(ApportionTolerance::default().contains(1.0));
        assert!(!ApportionTolerance::default().contains(0.5));
    }
}
