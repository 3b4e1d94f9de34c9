use crate::cleaning::OutlierFilter;
use crate::decompose::DecompositionModel;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fmt::Debug,
    fs,
    ops::RangeBounds,
    path::{Component, Path, PathBuf},
};

/// Analysis configuration.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory layout, relative to the project directory.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Layout of the input tables.
    #[serde(default)]
    pub input: InputConfig,

    /// Outlier regimes applied while cleaning the input series.
    #[serde(default)]
    pub clean: OutlierFilter,

    /// Chart and decomposition settings.
    pub analysis: AnalysisConfig,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub figure_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            figure_dir: PathBuf::from("figures"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Column holding `DD-MM-YYYY HH:MM` timestamps.
    pub datetime_column: String,
    /// Column holding the consumption in kWh.
    pub value_column: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            datetime_column: "Datetime".to_string(),
            value_column: "kwh".to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Sampling interval of the input, used in chart titles (e.g. "10 secs").
    pub resolution_label: String,
    /// Draw the raw series as a scatter plot instead of a line.
    #[serde(default)]
    pub scatter: bool,
    /// Apply the daily outlier regime to the daily totals.
    #[serde(default)]
    pub daily_outliers: bool,
    /// Decomposition model of the daily totals.
    #[serde(default)]
    pub model: DecompositionModel,
    /// Seasonal period of the daily totals, in days.
    pub period: usize,
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        check_rel_path(&self.paths.data_dir).context("invalid data dir")?;
        check_rel_path(&self.paths.output_dir).context("invalid output dir")?;
        check_rel_path(&self.paths.figure_dir).context("invalid figure dir")?;
        check_not_ancestor(&self.paths.output_dir, &self.paths.data_dir)
            .context("invalid output dir")?;
        check_not_ancestor(&self.paths.figure_dir, &self.paths.data_dir)
            .context("invalid figure dir")?;

        check_name(&self.input.datetime_column).context("invalid datetime column")?;
        check_name(&self.input.value_column).context("invalid value column")?;
        check_name(&self.analysis.resolution_label).context("invalid resolution label")?;

        check_num(self.analysis.period, 2..1_000).context("invalid decomposition period")?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("name must not be empty");
    }
    Ok(())
}

fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn check_rel_path(path: &Path) -> Result<()> {
    if path.is_absolute() {
        bail!("path must be relative to the project dir, but is {path:?}");
    }
    if path.components().any(|c| c == Component::ParentDir) {
        bail!("path must stay inside the project dir, but is {path:?}");
    }
    if normalize(path).as_os_str().is_empty() {
        bail!("path must name a subdirectory of the project dir, but is {path:?}");
    }
    Ok(())
}

/// Removable dirs must not contain the data dir.
fn check_not_ancestor(dir: &Path, data_dir: &Path) -> Result<()> {
    if normalize(data_dir).starts_with(normalize(dir)) {
        bail!("{dir:?} must not be or contain the data dir {data_dir:?}");
    }
    Ok(())
}
