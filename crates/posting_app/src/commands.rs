use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use posting_core::{
    bucket_by_percentile, flatten_dataset, normalize_raw_dataset, salary_coverage,
    summarize_by_category, Bucket, CategoricalField, CategorySummary, Dataset, NumericField,
    PostingLink, RawDataset, SalaryCoverage,
};
use posting_engine::{
    load_credentials, read_json, run_batch, AtomicFileWriter, BatchReport, FetchSettings,
    HarvestEvent, HarvestSink, HttpJobSite, ListingSession, PaginatedHarvester, PersistError,
};
use scrape_logging::{scrape_error, scrape_info, scrape_warn};

use crate::cli::Command;
use crate::config::BatchConfig;

pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Harvest { config } => harvest(&config),
        Command::Normalize { raw, out } => normalize(&raw, &out).map(|_| ()),
        Command::Summarize {
            dataset,
            dimension,
            buckets,
            group_by,
        } => summarize(&dataset, dimension, buckets, group_by),
    }
}

/// Output file names for one run, stamped with the run date.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RunFiles {
    links: String,
    raw: String,
    normalized: String,
}

impl RunFiles {
    fn dated(date: NaiveDate) -> Self {
        let stamp = date.format("%Y%m%d");
        Self {
            links: format!("harvested_links_{stamp}.json"),
            raw: format!("raw_postings_{stamp}.json"),
            normalized: format!("normalized_postings_{stamp}.json"),
        }
    }
}

/// Rewrites the links file after every harvested page, so an aborted run
/// still leaves the links it found.
struct LinkCheckpoint<'a> {
    writer: &'a AtomicFileWriter,
    filename: String,
    links: RefCell<BTreeMap<String, Vec<PostingLink>>>,
}

impl<'a> LinkCheckpoint<'a> {
    fn new(writer: &'a AtomicFileWriter, filename: String) -> Self {
        Self {
            writer,
            filename,
            links: RefCell::new(BTreeMap::new()),
        }
    }
}

impl HarvestSink for LinkCheckpoint<'_> {
    fn emit(&self, event: HarvestEvent) {
        let HarvestEvent::PageHarvested {
            search_term,
            new_links,
            ..
        } = event
        else {
            return;
        };
        let mut links = self.links.borrow_mut();
        links.entry(search_term).or_default().extend(new_links);
        if let Err(err) = self.writer.write_json(&self.filename, &*links) {
            scrape_warn!("could not checkpoint links to {}: {}", self.filename, err);
        }
    }
}

fn harvest(config_path: &Path) -> Result<()> {
    let config = BatchConfig::load(config_path)?;
    let writer = AtomicFileWriter::new(config.output_dir.clone());
    let files = RunFiles::dated(Local::now().date_naive());

    let site = HttpJobSite::new(config.site_profile(), FetchSettings::default())
        .context("building site session")?;
    let mut harvester = PaginatedHarvester::new(site, config.harvest_settings());

    if let Some(path) = &config.credentials {
        let credentials = load_credentials(path)
            .with_context(|| format!("loading credentials from {}", path.display()))?;
        harvester
            .session_mut()
            .authenticate(&credentials)
            .context("signing in")?;
    }

    let checkpoint = LinkCheckpoint::new(&writer, files.links.clone());
    let mut raw = RawDataset::new();
    let mut normalized = Dataset::new();
    let report = run_batch(&mut harvester, &config.searches, &checkpoint, |term| {
        let search_term = term.harvest.search_term.clone();
        raw.insert(search_term.clone(), term.raw_postings.clone());
        normalized.insert(search_term, term.normalized.postings.clone());
        if let Err(err) = save_datasets(&writer, &files, &raw, &normalized) {
            scrape_error!("could not save datasets: {}", err);
        }
    });

    print!("{}", render_batch(&report));
    Ok(())
}

fn save_datasets(
    writer: &AtomicFileWriter,
    files: &RunFiles,
    raw: &RawDataset,
    normalized: &Dataset,
) -> Result<(), PersistError> {
    let raw_path = writer.write_json(&files.raw, raw)?;
    let normalized_path = writer.write_json(&files.normalized, normalized)?;
    scrape_info!(
        "saved {} and {}",
        raw_path.display(),
        normalized_path.display()
    );
    Ok(())
}

fn normalize(raw_path: &Path, out_dir: &Path) -> Result<PathBuf> {
    let raw: RawDataset = read_json(raw_path)
        .with_context(|| format!("reading raw dataset {}", raw_path.display()))?;
    let (dataset, rejected) = normalize_raw_dataset(&raw);
    for (search_term, rejection) in &rejected {
        scrape_warn!("{:?}: dropping {}: {}", search_term, rejection.url, rejection.error);
    }

    let filename = normalized_filename(raw_path);
    let path = AtomicFileWriter::new(out_dir.to_path_buf())
        .write_json(&filename, &dataset)
        .with_context(|| format!("writing normalized dataset to {}", out_dir.display()))?;
    scrape_info!(
        "normalized {} terms ({} postings dropped) into {}",
        dataset.len(),
        rejected.len(),
        path.display()
    );
    Ok(path)
}

/// `raw_postings_20240407.json` becomes `normalized_postings_20240407.json`.
fn normalized_filename(raw_path: &Path) -> String {
    let stem = raw_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.strip_prefix("raw_") {
        Some(rest) => format!("normalized_{rest}.json"),
        None => format!("{stem}_normalized.json"),
    }
}

fn summarize(
    dataset_path: &Path,
    dimension: Option<NumericField>,
    buckets: usize,
    group_by: Option<CategoricalField>,
) -> Result<()> {
    let dataset: Dataset = read_json(dataset_path)
        .with_context(|| format!("reading dataset {}", dataset_path.display()))?;
    let records = flatten_dataset(&dataset);

    let mut out = render_coverage(salary_coverage(&records));
    if let Some(field) = group_by {
        out.push_str(&render_categories(field, &summarize_by_category(&records, field)));
    }
    if dimension.is_some() || group_by.is_none() {
        let dimension = dimension.unwrap_or(NumericField::AnnualSalary);
        let table = bucket_by_percentile(&records, dimension, buckets)?;
        out.push_str(&render_buckets(dimension, &table));
    }
    print!("{out}");
    Ok(())
}

fn render_coverage(coverage: SalaryCoverage) -> String {
    format!(
        "{} postings, {} with a numeric annual salary\n",
        coverage.postings, coverage.with_salary
    )
}

fn render_buckets(dimension: NumericField, buckets: &[Bucket]) -> String {
    let mut out = format!("\n{dimension:<24} {:>8} {:>16}\n", "count", "mean salary");
    for bucket in buckets {
        let _ = writeln!(
            out,
            "{:<24} {:>8} {:>16}",
            bucket.range_label,
            bucket.count,
            money(bucket.mean_value)
        );
    }
    out
}

fn render_categories(field: CategoricalField, summaries: &[CategorySummary]) -> String {
    let mut out = format!("\n{field:<24} {:>8} {:>16}\n", "salaried", "mean salary");
    for summary in summaries {
        let _ = writeln!(
            out,
            "{:<24} {:>8} {:>16}",
            summary.key,
            summary.count,
            money(summary.mean_annual_salary)
        );
    }
    out
}

fn render_batch(report: &BatchReport) -> String {
    let mut out = String::new();
    for term in &report.terms {
        let _ = writeln!(
            out,
            "{}: {} links over {} pages ({:?}), {} fetched, {} failed, {} normalized, {} rejected",
            term.harvest.search_term,
            term.harvest.links.len(),
            term.harvest.pages_read,
            term.harvest.stop,
            term.raw_postings.len(),
            term.fetch_failures.len(),
            term.normalized.postings.len(),
            term.normalized.rejected.len()
        );
    }
    out
}

fn money(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |amount| format!("{amount:.2}"))
}
