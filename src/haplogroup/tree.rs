use crate::error::{HaploError, Result};
use crate::haplogroup::types::Polymorphism;
use crate::haplogroup::weights::MutationRates;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// A node as written in the flat tree format.
#[derive(Deserialize, Debug, Clone)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default, alias = "poly")]
    pub polymorphisms: Vec<String>,
}

/// A node as written in the nested tree format.
#[derive(Deserialize, Debug, Clone)]
pub struct NestedNodeSpec {
    pub name: String,
    #[serde(default, alias = "poly")]
    pub polymorphisms: Vec<String>,
    #[serde(default)]
    pub children: Vec<NestedNodeSpec>,
}

/// Tree description, either `{"nodes": [...]}` with parent names or a nested root object.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum TreeSpec {
    Flat { nodes: Vec<NodeSpec> },
    Nested(NestedNodeSpec),
}

impl TreeSpec {
    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data)
            .map_err(|e| HaploError::malformed(format!("unreadable tree description: {}", e)))
    }

    fn into_flat(self) -> Vec<NodeSpec> {
        fn flatten(node: NestedNodeSpec, parent: Option<String>, out: &mut Vec<NodeSpec>) {
            let name = node.name;
            out.push(NodeSpec {
                name: name.clone(),
                parent,
                polymorphisms: node.polymorphisms,
            });
            for child in node.children {
                flatten(child, Some(name.clone()), out);
            }
        }

        match self {
            TreeSpec::Flat { nodes } => nodes,
            TreeSpec::Nested(root) => {
                let mut out = Vec::new();
                flatten(root, None, &mut out);
                out
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
pub struct HaplogroupNode {
    id: NodeId,
    name: String,
    polymorphisms: Vec<Polymorphism>,
    back_mutations: Vec<Polymorphism>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl HaplogroupNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Polymorphisms this node adds relative to its parent.
    pub fn polymorphisms(&self) -> &[Polymorphism] {
        &self.polymorphisms
    }

    /// Entries marked with `!`, reverting an ancestor's mutation.
    pub fn back_mutations(&self) -> &[Polymorphism] {
        &self.back_mutations
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Read-only haplogroup phylogeny with cumulative defining sets cached per node.
#[derive(Debug)]
pub struct Phylotree {
    nodes: Vec<HaplogroupNode>,
    cumulative: Vec<BTreeSet<Polymorphism>>,
    index: HashMap<String, NodeId>,
    root: NodeId,
    weights: MutationRates,
}

impl Phylotree {
    pub fn load(spec: TreeSpec, weights: MutationRates) -> Result<Self> {
        let specs = spec.into_flat();
        if specs.is_empty() {
            return Err(HaploError::malformed("tree has no nodes"));
        }

        let mut index = HashMap::with_capacity(specs.len());
        for (idx, node) in specs.iter().enumerate() {
            if node.name.trim().is_empty() {
                return Err(HaploError::malformed(format!("node #{} has an empty name", idx)));
            }
            if index.insert(node.name.clone(), NodeId(idx)).is_some() {
                return Err(HaploError::malformed(format!(
                    "duplicate node name '{}'",
                    node.name
                )));
            }
        }

        let mut nodes = Vec::with_capacity(specs.len());
        let mut roots = Vec::new();
        for (idx, spec) in specs.into_iter().enumerate() {
            let parent = match &spec.parent {
                None => {
                    roots.push(NodeId(idx));
                    None
                }
                Some(parent) => Some(*index.get(parent).ok_or_else(|| {
                    HaploError::malformed(format!(
                        "node '{}' refers to unknown parent '{}'",
                        spec.name, parent
                    ))
                })?),
            };

            let (polymorphisms, back_mutations) = parse_local(&spec.name, &spec.polymorphisms)?;
            nodes.push(HaplogroupNode {
                id: NodeId(idx),
                name: spec.name,
                polymorphisms,
                back_mutations,
                parent,
                children: Vec::new(),
            });
        }

        let root = match roots.as_slice() {
            [root] => *root,
            [] => return Err(HaploError::malformed("tree has no root node")),
            many => {
                let names: Vec<&str> = many.iter().map(|id| nodes[id.0].name.as_str()).collect();
                return Err(HaploError::malformed(format!(
                    "tree has several root nodes: {}",
                    names.join(", ")
                )));
            }
        };

        for idx in 0..nodes.len() {
            if let Some(parent) = nodes[idx].parent {
                nodes[parent.0].children.push(NodeId(idx));
            }
        }

        let mut tree = Phylotree {
            nodes,
            cumulative: Vec::new(),
            index,
            root,
            weights,
        };

        // Nodes unreachable from the single root can only sit on a parent cycle.
        let order: Vec<NodeId> = tree.all_nodes().map(|node| node.id).collect();
        if order.len() != tree.nodes.len() {
            let mut reached = vec![false; tree.nodes.len()];
            for id in &order {
                reached[id.0] = true;
            }
            let stranded = tree
                .nodes
                .iter()
                .find(|node| !reached[node.id.0])
                .map(|node| node.name.clone())
                .unwrap_or_default();
            return Err(HaploError::malformed(format!(
                "parent links form a cycle through '{}'",
                stranded
            )));
        }

        let mut cumulative = vec![BTreeSet::new(); tree.nodes.len()];
        for id in order {
            let node = &tree.nodes[id.0];
            let inherited = match node.parent {
                Some(parent) => cumulative[parent.0].clone(),
                None => BTreeSet::new(),
            };
            cumulative[id.0] = apply_local(inherited, node);
        }
        tree.cumulative = cumulative;

        log::debug!(
            "Loaded phylotree with {} nodes rooted at '{}'",
            tree.nodes.len(),
            tree.nodes[tree.root.0].name
        );
        Ok(tree)
    }

    /// Load a JSON tree and an optional weight table; either file may be compressed.
    pub fn from_paths(tree_path: &Path, weights_path: Option<&Path>) -> Result<Self> {
        let mut data = String::new();
        open_transparent(tree_path)?.read_to_string(&mut data)?;
        let spec = TreeSpec::from_json(&data)?;

        let weights = match weights_path {
            Some(path) => MutationRates::from_reader(BufReader::new(open_transparent(path)?))?,
            None => MutationRates::default(),
        };

        Self::load(spec, weights)
    }

    pub fn root(&self) -> &HaplogroupNode {
        &self.nodes[self.root.0]
    }

    pub fn node(&self, id: NodeId) -> &HaplogroupNode {
        &self.nodes[id.0]
    }

    pub fn find(&self, name: &str) -> Option<&HaplogroupNode> {
        self.index.get(name).map(|id| &self.nodes[id.0])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn weights(&self) -> &MutationRates {
        &self.weights
    }

    /// Everything distinguishing `id` from the reference sequence.
    pub fn cumulative_polymorphisms(&self, id: NodeId) -> &BTreeSet<Polymorphism> {
        &self.cumulative[id.0]
    }

    /// Lazy pre-order walk from the root. Every call starts over.
    pub fn all_nodes(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![self.root],
        }
    }

    /// Path from the root down to `id`, both ends included.
    pub fn lineage(&self, id: NodeId) -> Vec<&HaplogroupNode> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id.0];
            path.push(node);
            current = node.parent;
        }
        path.reverse();
        path
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.lineage(id).len() - 1
    }
}

pub struct Preorder<'a> {
    tree: &'a Phylotree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a HaplogroupNode;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = &self.tree.nodes[id.0];
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

fn open_transparent(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path)?;
    let (reader, _format) = niffler::get_reader(Box::new(file))?;
    Ok(reader)
}

/// Split a node's tokens into forward mutations and `!`-marked back mutations.
fn parse_local(node: &str, tokens: &[String]) -> Result<(Vec<Polymorphism>, Vec<Polymorphism>)> {
    let mut forward = Vec::new();
    let mut back = Vec::new();

    for token in tokens {
        let trimmed = token.trim();
        let bare = trimmed.trim_end_matches('!');
        // `!!` re-applies a reverted mutation, so only an odd count reverts.
        let reverts = (trimmed.len() - bare.len()) % 2 == 1;

        let polys = Polymorphism::parse_token(bare).map_err(|e| match e {
            HaploError::InvalidPolymorphism(token) => HaploError::malformed(format!(
                "node '{}': unparsable polymorphism '{}'",
                node, token
            )),
            other => other,
        })?;

        if reverts {
            back.extend(polys);
        } else {
            forward.extend(polys);
        }
    }

    Ok((forward, back))
}

/// Apply a node's local entries on top of its parent's cumulative set.
fn apply_local(mut set: BTreeSet<Polymorphism>, node: &HaplogroupNode) -> BTreeSet<Polymorphism> {
    for reverted in &node.back_mutations {
        set.retain(|p| p.site() != reverted.site());
    }

    for poly in &node.polymorphisms {
        if set.contains(poly) {
            continue;
        }
        let before = set.len();
        set.retain(|p| p.site() != poly.site());
        if set.len() == before {
            set.insert(poly.clone());
        }
    }

    set
}
