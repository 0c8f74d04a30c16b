use crate::haplogroup::tree::Phylotree;
use crate::haplogroup::types::Polymorphism;
use crate::utils::cache::TreeCache;
use anyhow::{anyhow, Context, Result};
use std::io::{self, Write};
use std::path::Path;

fn render<'a>(polys: impl IntoIterator<Item = &'a Polymorphism>, marker: &str) -> String {
    polys
        .into_iter()
        .map(|p| format!("{}{}", p, marker))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Write the lineage of `node`, one indented line per ancestor, then its expected set.
pub fn write_lineage<W: Write>(tree: &Phylotree, node: &str, mut writer: W) -> Result<()> {
    let target = tree
        .find(node)
        .ok_or_else(|| anyhow!("Haplogroup '{}' not found", node))?;

    for ancestor in tree.lineage(target.id()) {
        let mut line = format!("{}{}", "  ".repeat(tree.depth(ancestor.id())), ancestor.name());
        let gained = render(ancestor.polymorphisms(), "");
        let lost = render(ancestor.back_mutations(), "!");
        for part in [gained, lost] {
            if !part.is_empty() {
                line.push(' ');
                line.push_str(&part);
            }
        }
        writeln!(writer, "{}", line)?;
    }

    let expected = tree.cumulative_polymorphisms(target.id());
    writeln!(writer, "Expected ({}): {}", expected.len(), render(expected, ""))?;
    Ok(())
}

pub fn run(tree_dir: &Path, version: &str, node: &str) -> Result<()> {
    let tree = TreeCache::new(tree_dir)
        .get_tree(version)
        .with_context(|| format!("Failed to load phylotree {}", version))?;
    write_lineage(&tree, node, io::stdout().lock())
        .with_context(|| format!("Phylotree {}", version))
}
