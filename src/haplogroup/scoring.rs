use crate::error::{HaploError, Result};
use crate::haplogroup::sample::SampleProfile;
use crate::haplogroup::tree::{NodeId, Phylotree};
use crate::haplogroup::types::Polymorphism;
use crate::haplogroup::weights::MutationRates;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Similarity metric used to compare a sample with a haplogroup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "metric", rename_all = "lowercase")]
pub enum RankingMethod {
    Kulczynski { weighted: bool },
    Hamming { weighted: bool },
    Jaccard { weighted: bool },
}

impl Default for RankingMethod {
    fn default() -> Self {
        RankingMethod::Kulczynski { weighted: true }
    }
}

impl FromStr for RankingMethod {
    type Err = HaploError;

    /// Accepts the numeric selectors `1`, `2`, `3` or the metric names.
    fn from_str(selector: &str) -> Result<Self> {
        match selector.trim().to_ascii_lowercase().as_str() {
            "1" | "kulczynski" => Ok(RankingMethod::Kulczynski { weighted: true }),
            "2" | "hamming" => Ok(RankingMethod::Hamming { weighted: true }),
            "3" | "jaccard" => Ok(RankingMethod::Jaccard { weighted: true }),
            _ => Err(HaploError::UnknownMetric(selector.to_string())),
        }
    }
}

impl fmt::Display for RankingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        if !self.is_weighted() {
            write!(f, " (unweighted)")?;
        }
        Ok(())
    }
}

/// Evidence behind one score. All sets are restricted to the sample's coverage range.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetailedResult {
    pub expected: Vec<Polymorphism>,
    pub found: Vec<Polymorphism>,
    pub not_found: Vec<Polymorphism>,
    pub remaining: Vec<Polymorphism>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedResult {
    pub haplogroup: String,
    #[serde(skip)]
    pub node: NodeId,
    pub score: f64,
    pub detailed: DetailedResult,
}

impl RankingMethod {
    pub fn name(&self) -> &'static str {
        match self {
            RankingMethod::Kulczynski { .. } => "kulczynski",
            RankingMethod::Hamming { .. } => "hamming",
            RankingMethod::Jaccard { .. } => "jaccard",
        }
    }

    pub fn is_weighted(&self) -> bool {
        match *self {
            RankingMethod::Kulczynski { weighted }
            | RankingMethod::Hamming { weighted }
            | RankingMethod::Jaccard { weighted } => weighted,
        }
    }

    pub fn with_weighting(self, weighted: bool) -> Self {
        match self {
            RankingMethod::Kulczynski { .. } => RankingMethod::Kulczynski { weighted },
            RankingMethod::Hamming { .. } => RankingMethod::Hamming { weighted },
            RankingMethod::Jaccard { .. } => RankingMethod::Jaccard { weighted },
        }
    }

    fn mass<'a>(
        &self,
        polys: impl IntoIterator<Item = &'a Polymorphism>,
        weights: &MutationRates,
    ) -> f64 {
        if self.is_weighted() {
            polys.into_iter().map(|p| weights.weight(p.position())).sum()
        } else {
            polys.into_iter().count() as f64
        }
    }

    /// Score a sample against one haplogroup's cumulative defining set.
    pub fn score(
        &self,
        sample: &SampleProfile,
        expected: &BTreeSet<Polymorphism>,
        weights: &MutationRates,
    ) -> (f64, DetailedResult) {
        let range = sample.range();
        let observed: BTreeSet<&Polymorphism> = sample.observed_in_range().collect();

        let mut detailed = DetailedResult::default();
        for poly in expected.iter().filter(|p| range.contains(p.position())) {
            detailed.expected.push(poly.clone());
            // Keep the sample's copy so its annotation reaches the report.
            match observed.get(poly) {
                Some(seen) => detailed.found.push((*seen).clone()),
                None => detailed.not_found.push(poly.clone()),
            }
        }
        detailed.remaining = observed
            .iter()
            .filter(|p| !expected.contains(**p))
            .map(|p| (*p).clone())
            .collect();

        // Zero denominators only arise from empty sets; two empty sets match exactly.
        let nothing_to_compare = detailed.expected.is_empty() && observed.is_empty();
        let ratio = |numerator: f64, denominator: f64| {
            if denominator > 0.0 {
                numerator / denominator
            } else if nothing_to_compare {
                1.0
            } else {
                0.0
            }
        };

        let found = self.mass(&detailed.found, weights);
        let score = match self {
            RankingMethod::Kulczynski { .. } => {
                let expected_mass = self.mass(&detailed.expected, weights);
                let observed_mass = self.mass(observed.iter().copied(), weights);
                (ratio(found, expected_mass) + ratio(found, observed_mass)) / 2.0
            }
            RankingMethod::Hamming { .. } => {
                let length = range.len() as f64;
                if length == 0.0 {
                    1.0
                } else {
                    let differing = self.mass(&detailed.not_found, weights)
                        + self.mass(&detailed.remaining, weights);
                    1.0 - differing / length
                }
            }
            RankingMethod::Jaccard { .. } => {
                let union = found
                    + self.mass(&detailed.not_found, weights)
                    + self.mass(&detailed.remaining, weights);
                ratio(found, union)
            }
        };

        (score.clamp(0.0, 1.0), detailed)
    }

    /// Score a sample against every node and return all results, best first.
    pub fn rank(&self, sample: &SampleProfile, tree: &Phylotree) -> Vec<RankedResult> {
        let mut results: Vec<RankedResult> = tree
            .all_nodes()
            .map(|node| {
                let (score, detailed) =
                    self.score(sample, tree.cumulative_polymorphisms(node.id()), tree.weights());
                RankedResult {
                    haplogroup: node.name().to_string(),
                    node: node.id(),
                    score,
                    detailed,
                }
            })
            .collect();
        sort_ranked(&mut results);
        results
    }
}

/// Descending score, ties broken by ascending haplogroup name.
pub fn compare_ranked(a: &RankedResult, b: &RankedResult) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.haplogroup.cmp(&b.haplogroup))
}

pub fn sort_ranked(results: &mut [RankedResult]) {
    results.sort_by(compare_ranked);
}
