use haplorank_tools::commands::classify::{self, ClassifyOptions};
use haplorank_tools::export::ReportLayout;
use haplorank_tools::haplogroup::{SampleFile, SampleRecord};
use haplorank_tools::input::{hsd, InputFormat};
use haplorank_tools::{HaploError, RankingMethod, TreeCache};
use std::fs;
use std::path::Path;

const TREE: &str = r#"{
  "name": "mt-MRCA",
  "children": [
    {"name": "L0", "polymorphisms": ["146C", "263G"]},
    {"name": "L1", "polymorphisms": ["73G"],
     "children": [
       {"name": "H", "polymorphisms": ["263G", "750G"],
        "children": [
          {"name": "H1", "polymorphisms": ["3010A"]},
          {"name": "H2", "polymorphisms": ["1438A", "263A"]}
        ]}
     ]}
  ]
}"#;

const WEIGHTS: &str = "# site weight\n73 2.0\n263 1.5\n750 3.0\n3010 4.0\n";

const SAMPLES: &str = "SampleID\tRange\tHaplogroup\tPolymorphisms\n\
S2\t1-16569\t?\t73G\t263G\t750G\t3010A\n\
S1\t1-16569\tH\t73G\t263G\t750G\n\
S3\t1-16569\t?\t146C\t263G\n\
empty\t1-16569\t?\n\
bad\t0-20000\t?\t73G\n";

fn write_fixture(dir: &Path) {
    fs::write(dir.join("phylotree17.json"), TREE).unwrap();
    fs::write(dir.join("weights17.txt"), WEIGHTS).unwrap();
    fs::write(dir.join("samples.hsd"), SAMPLES).unwrap();
}

fn options(dir: &Path, output: &str) -> ClassifyOptions {
    ClassifyOptions {
        input: dir.join("samples.hsd"),
        output: dir.join(output),
        format: InputFormat::Hsd,
        tree_dir: dir.to_path_buf(),
        phylotree: "17".to_string(),
        metric: "1".to_string(),
        weighted: true,
        hits: 1,
        layout: ReportLayout::Simple,
        json: None,
        annotations: None,
        heteroplasmy_threshold: 0.96,
        threads: 3,
        show_progress: false,
    }
}

#[test]
fn test_session_picks_expected_haplogroups() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    let tree = TreeCache::new(dir.path()).get_tree("17").unwrap();
    let batch = hsd::read_hsd(&dir.path().join("samples.hsd")).unwrap();
    let mut session = SampleFile::from_batch(batch, None);

    assert_eq!(session.len(), 4);
    assert_eq!(session.rejected().len(), 1);
    assert_eq!(session.rejected()[0].sample_id, "bad");
    assert!(matches!(session.rejected()[0].error, HaploError::InvalidRange(_)));

    let warnings = session.classify(&tree, RankingMethod::default(), 3);
    assert_eq!(warnings.len(), 1);
    assert!(matches!(&warnings[0], HaploError::EmptySample(id) if id == "empty"));

    let best = |id: &str| {
        session
            .results(id)
            .and_then(|c| c.best())
            .map(|r| r.haplogroup.clone())
            .unwrap()
    };
    assert_eq!(best("S1"), "H");
    assert_eq!(best("S2"), "H1");
    assert_eq!(best("S3"), "L0");

    let s1 = session.results("S1").unwrap();
    assert!(!s1.low_evidence);
    assert_eq!(s1.results.len(), 3);
    assert!(s1.results.windows(2).all(|w| w[0].score >= w[1].score));
    assert!((s1.results[0].score - 1.0).abs() < 1e-9);
}

#[test]
fn test_back_mutation_changes_expected_set() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let tree = TreeCache::new(dir.path()).get_tree("17").unwrap();

    let h2 = tree.find("H2").unwrap();
    let expected: Vec<String> = tree
        .cumulative_polymorphisms(h2.id())
        .iter()
        .map(|p| p.to_string())
        .collect();
    assert_eq!(expected, vec!["73G", "750G", "1438A"]);
}

#[test]
fn test_command_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    classify::run(ClassifyOptions {
        json: Some(dir.path().join("report.json")),
        ..options(dir.path(), "report.txt")
    })
    .unwrap();

    let report = fs::read_to_string(dir.path().join("report.txt")).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines[0], "SampleID\tRange\tHaplogroup\tOverall_Rank");
    let ids: Vec<&str> = lines[1..].iter().map(|l| l.split('\t').next().unwrap()).collect();
    assert_eq!(ids, vec!["S1", "S2", "S3", "empty"]);
    assert!(lines[1].starts_with("S1\t1-16569\tH\t1.0000"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap()).unwrap();
    assert_eq!(json["samples"].as_array().unwrap().len(), 4);
    assert_eq!(json["samples"][3]["low_evidence"], true);
    assert_eq!(json["rejected"][0]["sample_id"], "bad");
}

#[test]
fn test_runs_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    for (output, threads) in [("a.txt", 1), ("b.txt", 4)] {
        classify::run(ClassifyOptions {
            layout: ReportLayout::Extended,
            hits: 5,
            threads,
            ..options(dir.path(), output)
        })
        .unwrap();
    }

    let a = fs::read(dir.path().join("a.txt")).unwrap();
    let b = fs::read(dir.path().join("b.txt")).unwrap();
    assert!(!a.is_empty());
    assert_eq!(a, b);
}

#[test]
fn test_record_built_in_code() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let tree = TreeCache::new(dir.path()).get_tree("17").unwrap();

    // Coverage limited to the control region hides 750G and 3010A.
    let record = SampleRecord {
        id: "partial".to_string(),
        range: "16024-16569;1-576".to_string(),
        haplogroup: None,
        polymorphisms: vec!["73G".to_string(), "263G".to_string()],
        line: 0,
    };
    let mut session = SampleFile::from_records(vec![record], None);
    session.classify(&tree, RankingMethod::Kulczynski { weighted: false }, 10);

    let results = &session.results("partial").unwrap().results;
    let top_score = results[0].score;
    assert!((top_score - 1.0).abs() < 1e-9);
    // H and H1 both explain the sample once out-of-range sites are dropped.
    let tied: Vec<&str> = results
        .iter()
        .filter(|r| (r.score - top_score).abs() < 1e-9)
        .map(|r| r.haplogroup.as_str())
        .collect();
    assert_eq!(tied, vec!["H", "H1"]);
}

#[test]
fn test_short_line_leaves_neighbours_classified() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    fs::write(
        dir.path().join("samples.hsd"),
        "S1\t1-16569\t?\t73G\t263G\nBROKEN\t1-16569\nS2\t1-16569\t?\t750G\n",
    )
    .unwrap();

    classify::run(ClassifyOptions {
        json: Some(dir.path().join("report.json")),
        ..options(dir.path(), "report.txt")
    })
    .unwrap();

    let report = fs::read_to_string(dir.path().join("report.txt")).unwrap();
    let ids: Vec<&str> = report
        .lines()
        .skip(1)
        .map(|l| l.split('\t').next().unwrap())
        .collect();
    assert_eq!(ids, vec!["S1", "S2"]);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap()).unwrap();
    assert_eq!(json["rejected"][0]["sample_id"], "BROKEN");
    assert_eq!(json["rejected"][0]["line"], 2);
}
