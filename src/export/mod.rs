pub mod formats;

use crate::export::formats::haplogroup::HaplogroupExport;
use crate::haplogroup::scoring::RankingMethod;
use crate::haplogroup::session::SampleFile;
use chrono::{DateTime, Utc};
use serde::ser::Serializer;
use serde::Serialize;
use std::io::Write;

pub use formats::tabular::{write_report, ReportLayout};

/// Root structure of the JSON export.
#[derive(Debug, Serialize)]
pub struct AnalysisExport<'a> {
    pub version: String,
    #[serde(serialize_with = "serialize_datetime")]
    pub created_at: DateTime<Utc>,
    pub tool_version: String,

    #[serde(flatten)]
    pub data: HaplogroupExport<'a>,
}

const EXPORT_VERSION: &str = "1.0";

fn serialize_datetime<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&date.to_rfc3339())
}

impl<'a> AnalysisExport<'a> {
    pub fn new(session: &'a SampleFile, phylotree: &str, ranking: RankingMethod) -> Self {
        Self {
            version: EXPORT_VERSION.to_string(),
            created_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            data: HaplogroupExport::from_session(session, phylotree, ranking),
        }
    }

    pub fn write_json<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(writer, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::haplogroup::sample::SampleRecord;
    use crate::haplogroup::tree::{Phylotree, TreeSpec};
    use crate::haplogroup::weights::MutationRates;

    #[test]
    fn test_json_export_shape() {
        let tree = Phylotree::load(
            TreeSpec::from_json(
                r#"{"name": "mt-MRCA", "children": [{"name": "H", "polymorphisms": ["73G"]}]}"#,
            )
            .unwrap(),
            MutationRates::default(),
        )
        .unwrap();
        let records = vec![
            SampleRecord {
                id: "S1".to_string(),
                range: "1-16569".to_string(),
                haplogroup: Some("H".to_string()),
                polymorphisms: vec!["73G".to_string()],
                line: 1,
            },
            SampleRecord {
                id: "S2".to_string(),
                range: "1-99999".to_string(),
                haplogroup: None,
                polymorphisms: vec![],
                line: 2,
            },
        ];
        let mut session = SampleFile::from_records(records, None);
        session.classify(&tree, RankingMethod::default(), 1);

        let mut out = Vec::new();
        AnalysisExport::new(&session, "17", RankingMethod::default())
            .write_json(&mut out)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["phylotree"], "17");
        assert_eq!(value["ranking"]["metric"], "kulczynski");
        assert_eq!(value["samples"][0]["sample"]["id"], "S1");
        assert_eq!(value["samples"][0]["sample"]["range"], "1-16569");
        assert_eq!(value["samples"][0]["results"][0]["haplogroup"], "H");
        assert_eq!(value["samples"][0]["results"][0]["detailed"]["found"][0], "73G");
        assert_eq!(value["samples"][0]["low_evidence"], false);
        assert!(value["samples"][0].get("confidence").is_none());
        assert_eq!(value["rejected"][0]["sample_id"], "S2");
        assert!(value["created_at"].is_string());
    }
}
