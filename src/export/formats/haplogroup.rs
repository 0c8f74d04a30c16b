use crate::haplogroup::sample::SampleProfile;
use crate::haplogroup::scoring::{RankedResult, RankingMethod};
use crate::haplogroup::session::SampleFile;
use serde::Serialize;

/// JSON view of one classified sample.
#[derive(Debug, Serialize)]
pub struct SampleExport<'a> {
    pub sample: &'a SampleProfile,
    pub low_evidence: bool,
    pub results: &'a [RankedResult],
}

#[derive(Debug, Serialize)]
pub struct HaplogroupExport<'a> {
    pub phylotree: String,
    pub ranking: RankingMethod,
    pub samples: Vec<SampleExport<'a>>,
    pub rejected: Vec<RejectedExport>,
}

#[derive(Debug, Serialize)]
pub struct RejectedExport {
    pub sample_id: String,
    pub line: usize,
    pub error: String,
}

impl<'a> HaplogroupExport<'a> {
    pub fn from_session(session: &'a SampleFile, phylotree: &str, ranking: RankingMethod) -> Self {
        let samples = session
            .sorted_samples()
            .into_iter()
            .filter_map(|sample| {
                let classification = sample.classification()?;
                Some(SampleExport {
                    sample: sample.profile(),
                    low_evidence: classification.low_evidence,
                    results: &classification.results,
                })
            })
            .collect();

        let rejected = session
            .rejected()
            .iter()
            .map(|r| RejectedExport {
                sample_id: r.sample_id.clone(),
                line: r.line,
                error: r.error.to_string(),
            })
            .collect();

        Self {
            phylotree: phylotree.to_string(),
            ranking,
            samples,
            rejected,
        }
    }
}
