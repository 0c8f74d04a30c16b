use crate::error::{HaploError, Result};
use crate::haplogroup::annotation::AnnotationTable;
use crate::haplogroup::sample::{SampleProfile, SampleRecord};
use crate::haplogroup::scoring::{RankedResult, RankingMethod};
use crate::haplogroup::tree::Phylotree;
use crossbeam_channel::{bounded, unbounded};
use indicatif::ProgressBar;
use serde::Serialize;
use std::collections::HashMap;
use std::thread;

/// Top-ranked results for one sample.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub results: Vec<RankedResult>,
    /// Set when the sample had nothing in range to compare.
    pub low_evidence: bool,
}

impl Classification {
    pub fn best(&self) -> Option<&RankedResult> {
        self.results.first()
    }
}

/// Score one sample against the whole tree and keep the best `hits` results.
pub fn classify_sample(
    profile: &SampleProfile,
    tree: &Phylotree,
    method: RankingMethod,
    hits: usize,
) -> Classification {
    let mut results = method.rank(profile, tree);
    results.truncate(hits.max(1));
    Classification {
        results,
        low_evidence: !profile.has_evidence(),
    }
}

#[derive(Debug, Clone)]
pub struct TestSample {
    profile: SampleProfile,
    classification: Option<Classification>,
}

impl TestSample {
    pub fn profile(&self) -> &SampleProfile {
        &self.profile
    }

    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }
}

/// An input record that could not become a sample.
#[derive(Debug)]
pub struct RejectedRecord {
    pub sample_id: String,
    pub line: usize,
    pub error: HaploError,
}

/// What a reader got out of one input: usable records plus lines it could not split.
#[derive(Debug, Default)]
pub struct SampleBatch {
    pub records: Vec<SampleRecord>,
    pub rejected: Vec<RejectedRecord>,
}

/// All samples of one run and, once classified, their results.
#[derive(Debug, Default)]
pub struct SampleFile {
    samples: Vec<TestSample>,
    index: HashMap<String, usize>,
    rejected: Vec<RejectedRecord>,
}

impl SampleFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build profiles from records; bad records are set aside instead of failing the batch.
    pub fn from_records(records: Vec<SampleRecord>, annotations: Option<&AnnotationTable>) -> Self {
        let mut file = Self::new();
        for record in records {
            let outcome = SampleProfile::from_record(&record, annotations)
                .and_then(|profile| file.add(profile));
            if let Err(error) = outcome {
                log::warn!("Skipping sample '{}': {}", record.id, error);
                file.rejected.push(RejectedRecord {
                    sample_id: record.id,
                    line: record.line,
                    error,
                });
            }
        }
        file
    }

    /// Like [`SampleFile::from_records`], keeping the reader's own rejections in line order.
    pub fn from_batch(batch: SampleBatch, annotations: Option<&AnnotationTable>) -> Self {
        let mut file = Self::from_records(batch.records, annotations);
        file.rejected.extend(batch.rejected);
        file.rejected.sort_by_key(|r| r.line);
        file
    }

    pub fn add(&mut self, profile: SampleProfile) -> Result<()> {
        if self.index.contains_key(profile.id()) {
            return Err(HaploError::input(
                0,
                format!("duplicate sample id '{}'", profile.id()),
            ));
        }
        self.index.insert(profile.id().to_string(), self.samples.len());
        self.samples.push(TestSample {
            profile,
            classification: None,
        });
        Ok(())
    }

    /// Classify every sample on the current thread.
    ///
    /// Returns the non-fatal `EmptySample` conditions raised along the way.
    pub fn classify(
        &mut self,
        tree: &Phylotree,
        method: RankingMethod,
        hits: usize,
    ) -> Vec<HaploError> {
        for sample in &mut self.samples {
            sample.classification = Some(classify_sample(&sample.profile, tree, method, hits));
        }
        self.collect_warnings()
    }

    /// Same results as [`SampleFile::classify`], spread over `threads` workers.
    pub fn classify_parallel(
        &mut self,
        tree: &Phylotree,
        method: RankingMethod,
        hits: usize,
        threads: usize,
        progress: Option<&ProgressBar>,
    ) -> Vec<HaploError> {
        let threads = threads.max(1);
        let (job_tx, job_rx) = bounded::<usize>(threads * 2);
        let (result_tx, result_rx) = unbounded::<(usize, Classification)>();
        let profiles: Vec<&SampleProfile> = self.samples.iter().map(|s| &s.profile).collect();
        let mut classified: Vec<(usize, Classification)> = Vec::with_capacity(profiles.len());

        thread::scope(|scope| {
            for _ in 0..threads {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let profiles = &profiles;
                scope.spawn(move || {
                    while let Ok(idx) = job_rx.recv() {
                        let classification = classify_sample(profiles[idx], tree, method, hits);
                        if result_tx.send((idx, classification)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(job_rx);
            drop(result_tx);

            for idx in 0..profiles.len() {
                if job_tx.send(idx).is_err() {
                    break;
                }
            }
            drop(job_tx);

            for received in result_rx.iter() {
                if let Some(progress) = progress {
                    progress.inc(1);
                }
                classified.push(received);
            }
        });

        for (idx, classification) in classified {
            self.samples[idx].classification = Some(classification);
        }
        self.collect_warnings()
    }

    fn collect_warnings(&self) -> Vec<HaploError> {
        self.samples
            .iter()
            .filter(|s| s.classification.as_ref().is_some_and(|c| c.low_evidence))
            .map(|s| {
                let warning = HaploError::EmptySample(s.profile.id().to_string());
                log::warn!("{}; results are low-evidence", warning);
                warning
            })
            .collect()
    }

    pub fn samples(&self) -> impl Iterator<Item = &TestSample> {
        self.samples.iter()
    }

    pub fn sample(&self, id: &str) -> Option<&TestSample> {
        self.index.get(id).map(|&idx| &self.samples[idx])
    }

    pub fn results(&self, id: &str) -> Option<&Classification> {
        self.sample(id).and_then(|s| s.classification())
    }

    /// Samples ordered by id, as reports list them.
    pub fn sorted_samples(&self) -> Vec<&TestSample> {
        let mut samples: Vec<&TestSample> = self.samples.iter().collect();
        samples.sort_by(|a, b| a.profile.id().cmp(b.profile.id()));
        samples
    }

    pub fn rejected(&self) -> &[RejectedRecord] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
