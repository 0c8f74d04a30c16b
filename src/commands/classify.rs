use crate::export::{write_report, AnalysisExport, ReportLayout};
use crate::haplogroup::annotation::AnnotationTable;
use crate::haplogroup::scoring::RankingMethod;
use crate::haplogroup::session::SampleFile;
use crate::input::{hsd, vcf, InputFormat};
use crate::utils::cache::TreeCache;
use crate::utils::progress_bar_builder::ProgressBarBuilder;
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

/// Everything `classify` needs once flags and config are merged.
#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: InputFormat,
    pub tree_dir: PathBuf,
    pub phylotree: String,
    pub metric: String,
    pub weighted: bool,
    pub hits: usize,
    pub layout: ReportLayout,
    pub json: Option<PathBuf>,
    pub annotations: Option<PathBuf>,
    pub heteroplasmy_threshold: f64,
    pub threads: usize,
    pub show_progress: bool,
}

pub fn run(options: ClassifyOptions) -> Result<()> {
    if !options.input.exists() {
        bail!("Input file not found: {}", options.input.display());
    }

    // Resolve the metric before touching any data.
    let method = options
        .metric
        .parse::<RankingMethod>()?
        .with_weighting(options.weighted);

    let cache = TreeCache::new(&options.tree_dir);
    let tree = cache
        .get_tree(&options.phylotree)
        .with_context(|| format!("Failed to load phylotree {}", options.phylotree))?;

    let annotations = match &options.annotations {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open annotations {}", path.display()))?;
            Some(AnnotationTable::from_reader(BufReader::new(file))?)
        }
        None => None,
    };

    let batch = match options.format {
        InputFormat::Hsd => hsd::read_hsd(&options.input),
        InputFormat::Vcf => vcf::read_vcf(&options.input, options.heteroplasmy_threshold),
    }
    .with_context(|| format!("Failed to read samples from {}", options.input.display()))?;

    let mut session = SampleFile::from_batch(batch, annotations.as_ref());
    if session.is_empty() {
        bail!("No usable samples in {}", options.input.display());
    }
    log::info!(
        "Classifying {} samples with {} against phylotree {}",
        session.len(),
        method,
        options.phylotree
    );

    let progress = ProgressBarBuilder::new("Classifying samples")
        .with_length(session.len() as u64)
        .hidden(!options.show_progress)
        .build()?;
    let warnings = session.classify_parallel(
        &tree,
        method,
        options.hits,
        options.threads,
        Some(&progress),
    );
    progress.finish_with_message("Classification complete");

    let writer = BufWriter::new(
        File::create(&options.output)
            .with_context(|| format!("Failed to create {}", options.output.display()))?,
    );
    write_report(&session, options.layout, writer)?;

    if let Some(path) = &options.json {
        let writer = BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        );
        AnalysisExport::new(&session, &options.phylotree, method).write_json(writer)?;
    }

    log::info!(
        "Wrote {} ({} classified, {} rejected, {} low-evidence)",
        options.output.display(),
        session.len(),
        session.rejected().len(),
        warnings.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn options(dir: &std::path::Path) -> ClassifyOptions {
        ClassifyOptions {
            input: dir.join("samples.hsd"),
            output: dir.join("report.txt"),
            format: InputFormat::Hsd,
            tree_dir: dir.to_path_buf(),
            phylotree: "17".to_string(),
            metric: "kulczynski".to_string(),
            weighted: true,
            hits: 1,
            layout: ReportLayout::Simple,
            json: None,
            annotations: None,
            heteroplasmy_threshold: 0.96,
            threads: 2,
            show_progress: false,
        }
    }

    #[test]
    fn test_unknown_metric_fails_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("samples.hsd"), "S1\t1-16569\t?\t73G\n").unwrap();
        let err = run(ClassifyOptions {
            metric: "cosine".to_string(),
            ..options(dir.path())
        })
        .unwrap_err();
        assert!(err.to_string().contains("cosine"));
        assert!(!dir.path().join("report.txt").exists());
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(options(dir.path())).unwrap_err();
        assert!(err.to_string().starts_with("Input file not found"));
    }
}
