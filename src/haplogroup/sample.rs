use crate::error::{HaploError, Result};
use crate::haplogroup::annotation::AnnotationTable;
use crate::haplogroup::types::Polymorphism;
use crate::haplogroup::validation::{validate_span, MT_LENGTH};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A normalized input record as handed over by the readers.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    pub id: String,
    pub range: String,
    /// Haplogroup claimed by the input file, if any.
    pub haplogroup: Option<String>,
    pub polymorphisms: Vec<String>,
    /// 1-based source line, 0 when the record did not come from a text file.
    pub line: usize,
}

/// Declared coverage: sorted, merged, inclusive spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRange {
    spans: Vec<(u32, u32)>,
}

impl SampleRange {
    pub fn full() -> Self {
        Self {
            spans: vec![(1, MT_LENGTH)],
        }
    }

    pub fn from_spans(spans: impl IntoIterator<Item = (u32, u32)>) -> Result<Self> {
        let mut spans = spans
            .into_iter()
            .map(|(start, end)| validate_span(start, end))
            .collect::<Result<Vec<_>>>()?;
        spans.sort_unstable();

        let mut merged: Vec<(u32, u32)> = Vec::with_capacity(spans.len());
        for (start, end) in spans {
            match merged.last_mut() {
                Some(last) if start <= last.1.saturating_add(1) => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }
        Ok(Self { spans: merged })
    }

    pub fn spans(&self) -> &[(u32, u32)] {
        &self.spans
    }

    pub fn contains(&self, position: u32) -> bool {
        self.spans
            .iter()
            .any(|&(start, end)| (start..=end).contains(&position))
    }

    /// Number of covered positions.
    pub fn len(&self) -> u32 {
        self.spans.iter().map(|&(start, end)| end - start + 1).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

impl FromStr for SampleRange {
    type Err = HaploError;

    /// Accepts `1-16569`, `16024-16569;1-576` and single positions such as `73;263`.
    fn from_str(text: &str) -> Result<Self> {
        let invalid = || HaploError::InvalidRange(format!("cannot read range '{}'", text));
        let mut spans = Vec::new();

        for piece in text.split(|c| c == ';' || c == ' ').map(str::trim) {
            if piece.is_empty() {
                continue;
            }
            let (start, end) = match piece.split_once('-') {
                Some((start, end)) => (start.trim(), end.trim()),
                None => (piece, piece),
            };
            let start: u32 = start.parse().map_err(|_| invalid())?;
            let end: u32 = end.parse().map_err(|_| invalid())?;
            spans.push((start, end));
        }

        Self::from_spans(spans)
    }
}

impl fmt::Display for SampleRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .spans
            .iter()
            .map(|&(start, end)| {
                if start == end {
                    start.to_string()
                } else {
                    format!("{}-{}", start, end)
                }
            })
            .collect();
        write!(f, "{}", rendered.join(";"))
    }
}

impl Serialize for SampleRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One sample's coverage and observed variants.
#[derive(Debug, Clone, Serialize)]
pub struct SampleProfile {
    id: String,
    range: SampleRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_haplogroup: Option<String>,
    polymorphisms: BTreeSet<Polymorphism>,
}

impl SampleProfile {
    pub fn new(
        id: impl Into<String>,
        range: SampleRange,
        polymorphisms: impl IntoIterator<Item = Polymorphism>,
    ) -> Self {
        Self {
            id: id.into(),
            range,
            expected_haplogroup: None,
            polymorphisms: polymorphisms.into_iter().collect(),
        }
    }

    pub fn from_record(
        record: &SampleRecord,
        annotations: Option<&AnnotationTable>,
    ) -> Result<Self> {
        if record.id.trim().is_empty() {
            return Err(HaploError::input(record.line, "sample id is empty"));
        }
        let range: SampleRange = record.range.parse()?;

        let mut polymorphisms = BTreeSet::new();
        for token in &record.polymorphisms {
            for poly in Polymorphism::parse_token(token)? {
                let poly = match annotations {
                    Some(table) => table.annotate(poly),
                    None => poly,
                };
                polymorphisms.insert(poly);
            }
        }

        Ok(Self {
            id: record.id.clone(),
            range,
            expected_haplogroup: record.haplogroup.clone(),
            polymorphisms,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn range(&self) -> &SampleRange {
        &self.range
    }

    pub fn expected_haplogroup(&self) -> Option<&str> {
        self.expected_haplogroup.as_deref()
    }

    /// All input polymorphisms, including any outside the coverage range.
    pub fn polymorphisms(&self) -> &BTreeSet<Polymorphism> {
        &self.polymorphisms
    }

    pub fn observed_in_range(&self) -> impl Iterator<Item = &Polymorphism> + '_ {
        self.polymorphisms
            .iter()
            .filter(move |p| self.range.contains(p.position()))
    }

    pub fn has_evidence(&self) -> bool {
        self.observed_in_range().next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(range: &str, polys: &[&str]) -> SampleRecord {
        SampleRecord {
            id: "S1".to_string(),
            range: range.to_string(),
            haplogroup: None,
            polymorphisms: polys.iter().map(|p| p.to_string()).collect(),
            line: 1,
        }
    }

    #[test]
    fn test_range_parsing_and_merging() {
        let range: SampleRange = "16024-16569;1-576;".parse().unwrap();
        assert_eq!(range.spans(), &[(1, 576), (16024, 16569)]);
        assert_eq!(range.len(), 576 + 546);
        assert!(range.contains(73));
        assert!(!range.contains(750));
        assert_eq!(range.to_string(), "1-576;16024-16569");

        let merged: SampleRange = "1-100;50-200;201-300;73".parse().unwrap();
        assert_eq!(merged.spans(), &[(1, 300)]);

        let points: SampleRange = "73;263".parse().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points.to_string(), "73;263");
    }

    #[test]
    fn test_invalid_ranges() {
        for text in ["0-100", "1-17000", "500-100", "a-b", "1-"] {
            assert!(
                matches!(text.parse::<SampleRange>(), Err(HaploError::InvalidRange(_))),
                "accepted {text}"
            );
        }
    }

    #[test]
    fn test_empty_range_is_allowed() {
        let range: SampleRange = "".parse().unwrap();
        assert!(range.is_empty());
        assert_eq!(range.len(), 0);
    }

    #[test]
    fn test_profile_restricts_observed_to_range() {
        let profile =
            SampleProfile::from_record(&record("1-576", &["73G", "263G", "750G", "73G"]), None)
                .unwrap();
        assert_eq!(profile.polymorphisms().len(), 3);
        let observed: Vec<String> = profile.observed_in_range().map(|p| p.to_string()).collect();
        assert_eq!(observed, vec!["73G", "263G"]);
        assert!(profile.has_evidence());
    }

    #[test]
    fn test_profile_errors_are_per_record() {
        assert!(matches!(
            SampleProfile::from_record(&record("1-16569", &["73X"]), None),
            Err(HaploError::InvalidPolymorphism(_))
        ));
        assert!(matches!(
            SampleProfile::from_record(&record("0-16569", &["73G"]), None),
            Err(HaploError::InvalidRange(_))
        ));
    }
}
