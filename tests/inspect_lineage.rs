use haplorank_tools::commands::inspect;
use haplorank_tools::TreeCache;
use std::fs;

const TREE: &str = r#"{
  "name": "mt-MRCA",
  "children": [
    {"name": "L1", "polymorphisms": ["73G"],
     "children": [
       {"name": "H", "polymorphisms": ["263G", "750G"],
        "children": [
          {"name": "H2", "polymorphisms": ["1438A", "750G!"]}
        ]}
     ]}
  ]
}"#;

fn lineage(node: &str) -> anyhow::Result<String> {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("phylotree17.json"), TREE).unwrap();
    let tree = TreeCache::new(dir.path()).get_tree("17").unwrap();

    let mut out = Vec::new();
    inspect::write_lineage(&tree, node, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn test_lineage_shows_back_mutation_and_expected_set() {
    let text = lineage("H2").unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "mt-MRCA",
            "  L1 73G",
            "    H 263G 750G",
            "      H2 1438A 750G!",
            "Expected (3): 73G 263G 1438A",
        ]
    );
}

#[test]
fn test_unknown_node() {
    let err = lineage("Z9").unwrap_err();
    assert!(err.to_string().contains("'Z9' not found"));
}
