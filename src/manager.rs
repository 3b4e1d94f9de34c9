use crate::cleaning::{self, OutlierFilter};
use crate::config::Config;
use crate::csv_file;
use crate::decompose::decompose;
use crate::model::Series;
use crate::render::{self, JsonRenderer, Render};
use crate::views;
use anyhow::{Context, Result};
use glob::glob;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub struct Manager {
    project_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(project_dir: P) -> Result<Self> {
        let project_dir = project_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(project_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self::with_config(project_dir, cfg))
    }

    pub fn with_config(project_dir: PathBuf, cfg: Config) -> Self {
        Self { project_dir, cfg }
    }

    pub fn clean_data(&self) -> Result<()> {
        let output_dir = self.output_dir();
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("failed to create {output_dir:?}"))?;

        for file in self.data_files().context("failed to list data files")? {
            let series = self
                .load_series(&file)
                .with_context(|| format!("failed to load {file:?}"))?;

            let cleaned_file = self.cleaned_file(&file)?;
            csv_file::write_series(&cleaned_file, &series, &self.cfg.input)
                .with_context(|| format!("failed to write {cleaned_file:?}"))?;
            log::info!("wrote {} readings to {cleaned_file:?}", series.len());
        }

        Ok(())
    }

    pub fn analyze_data(&self) -> Result<()> {
        let renderer = JsonRenderer::new(self.figure_dir());

        for file in self.data_files().context("failed to list data files")? {
            let series = self
                .load_series(&file)
                .with_context(|| format!("failed to load {file:?}"))?;

            let stem = file_stem(&file)?;
            self.analyze_series(&stem, &series, &renderer)
                .with_context(|| format!("failed to analyze {file:?}"))?;
        }

        Ok(())
    }

    pub fn reset(&self) -> Result<()> {
        for dir in [self.output_dir(), self.figure_dir()] {
            if dir.is_dir() {
                fs::remove_dir_all(&dir).with_context(|| format!("failed to remove {dir:?}"))?;
                log::info!("removed {dir:?}");
            }
        }

        Ok(())
    }

    /// Compute every view of `series` and render one chart per view.
    pub fn analyze_series<R: Render>(
        &self,
        stem: &str,
        series: &Series,
        renderer: &R,
    ) -> Result<()> {
        let analysis = &self.cfg.analysis;
        if series.is_empty() {
            log::warn!("{stem} has no readings left after cleaning");
        }

        let mut daily = views::daily_totals(series);
        if analysis.daily_outliers {
            daily = cleaning::remove_outliers(&daily, OutlierFilter::DAILY);
        }

        let mut charts = vec![
            (
                "series",
                render::series_chart(series, &analysis.resolution_label, analysis.scatter),
            ),
            ("daily", render::daily_totals_chart(&daily)),
        ];

        match decompose(&daily, analysis.model, analysis.period) {
            Ok(dec) => charts.push(("trend", render::decomposition_chart(&dec))),
            Err(error) => log::warn!("skipping trend decomposition of {stem}: {error}"),
        }

        let weekday_avg = views::weekday_average(series);
        charts.push(("daytime", render::daytime_chart(&views::time_of_day_average(series))));
        charts.push(("daytype", render::daytype_chart(&views::day_type_split(series))));
        charts.push(("daywise", render::daywise_chart(&weekday_avg)));
        charts.push(("composition", render::composition_chart(&weekday_avg)));

        for (name, chart) in charts {
            if chart.is_empty() {
                log::debug!("{stem}-{name} chart has no points");
            }
            renderer
                .render(&format!("{stem}-{name}"), &chart)
                .with_context(|| format!("failed to render {name} chart"))?;
        }

        Ok(())
    }

    fn load_series(&self, file: &Path) -> Result<Series> {
        let records = csv_file::read_raw_records(file, &self.cfg.input)?;
        let series = cleaning::clean(&records, self.cfg.clean).context("failed to clean records")?;
        log::info!(
            "loaded {file:?}: {} records, {} readings after cleaning",
            records.len(),
            series.len()
        );
        Ok(series)
    }

    fn data_files(&self) -> Result<Vec<PathBuf>> {
        let pattern = self.project_dir.join(&self.cfg.paths.data_dir).join("*.csv");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let mut files: Vec<_> = glob(pattern)
            .context("failed to glob data files")?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        if files.is_empty() {
            log::warn!("no data files match {pattern:?}");
        }
        Ok(files)
    }

    fn output_dir(&self) -> PathBuf {
        self.project_dir.join(&self.cfg.paths.output_dir)
    }

    fn figure_dir(&self) -> PathBuf {
        self.project_dir.join(&self.cfg.paths.figure_dir)
    }

    fn cleaned_file(&self, file: &Path) -> Result<PathBuf> {
        let stem = file_stem(file)?;
        Ok(self.output_dir().join(format!("{stem}-clean.csv")))
    }
}

fn file_stem(file: &Path) -> Result<String> {
    let stem = file
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("invalid file name {file:?}"))?;
    Ok(stem.to_string())
}
