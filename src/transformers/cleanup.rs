//! Graph cleanup passes
//!
//! Output-list maintenance that runs after fusion: dropping outputs nothing
//! reads and renaming edges to caller-chosen names.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::error::GraphResult;
use crate::graph::Graph;
use crate::traits::Pass;
use crate::transform::PassStats;

/// Drop node outputs that are neither graph outputs nor read by a child
///
/// Nodes are never removed, only their output lists shrink. Running the pass
/// twice gives the same graph as running it once.
#[derive(Debug, Default, Clone, Copy)]
pub struct RemoveDanglingOutputs;

impl RemoveDanglingOutputs {
    /// Create the pass
    pub fn new() -> Self {
        Self
    }
}

impl Pass for RemoveDanglingOutputs {
    fn name(&self) -> &'static str {
        "RemoveDanglingOutputs"
    }

    fn run(&self, graph: Graph) -> GraphResult<(Graph, PassStats)> {
        let mut stats = PassStats::new();
        let mut kept: Vec<Option<Vec<String>>> = vec![None; graph.len()];

        for id in graph.node_ids() {
            let node = graph.node(id);
            let read: FxHashSet<&str> = graph
                .children(id)
                .iter()
                .flat_map(|&child| graph.node(child).inputs.iter().map(|s| s.as_str()))
                .collect();

            let (live, dangling): (Vec<&String>, Vec<&String>) = node
                .outputs
                .iter()
                .partition(|o| graph.is_graph_output(o) || read.contains(o.as_str()));
            if dangling.is_empty() {
                continue;
            }

            log::debug!("{}: dropping unused outputs {:?}", node.name, dangling);
            stats.patterns_matched += 1;
            stats.outputs_dropped += dangling.len();
            stats.transformed_nodes.push(node.name.clone());
            kept[id.index()] = Some(live.into_iter().cloned().collect());
        }

        if stats.outputs_dropped == 0 {
            return Ok((graph, stats));
        }

        let (mut nodes, inputs, outputs) = graph.into_parts();
        for (node, live) in nodes.iter_mut().zip(kept) {
            if let Some(live) = live {
                node.outputs = live;
            }
        }
        Ok((Graph::from_nodes(nodes, inputs, outputs)?, stats))
    }
}

/// Rename node outputs according to an ordered old → new mapping
///
/// For each node in order, every output still present in the mapping is
/// renamed, the matching inputs of its children follow, and the entry is
/// consumed. Keys that never match are ignored. A renamed edge that is also
/// a declared graph output is renamed there too.
#[derive(Debug, Default, Clone)]
pub struct RenameOutputs {
    mapping: IndexMap<String, String>,
}

impl RenameOutputs {
    /// Create the pass from an ordered mapping
    pub fn new(mapping: IndexMap<String, String>) -> Self {
        Self { mapping }
    }

    /// Create the pass from `(old, new)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// The configured mapping
    pub fn mapping(&self) -> &IndexMap<String, String> {
        &self.mapping
    }
}

impl Pass for RenameOutputs {
    fn name(&self) -> &'static str {
        "RenameOutputs"
    }

    fn run(&self, graph: Graph) -> GraphResult<(Graph, PassStats)> {
        let mut stats = PassStats::new();
        if self.mapping.is_empty() {
            return Ok((graph, stats));
        }

        // (node index, output slot, new name) and (child index, input slot, new name)
        let mut output_edits: Vec<(usize, usize, String)> = Vec::new();
        let mut input_edits: Vec<(usize, usize, String)> = Vec::new();
        let mut renamed: IndexMap<String, String> = IndexMap::new();
        let mut pending = self.mapping.clone();

        'nodes: for id in graph.node_ids() {
            let node = graph.node(id);
            for (slot, output) in node.outputs.iter().enumerate() {
                let Some(new_name) = pending.shift_remove(output) else {
                    continue;
                };
                log::debug!("{}: renaming output '{}' -> '{}'", node.name, output, new_name);

                output_edits.push((id.index(), slot, new_name.clone()));
                for &child in graph.children(id) {
                    for (j, input) in graph.node(child).inputs.iter().enumerate() {
                        if input == output {
                            input_edits.push((child.index(), j, new_name.clone()));
                        }
                    }
                }
                renamed.insert(output.clone(), new_name);
                stats.edges_renamed += 1;
                stats.transformed_nodes.push(node.name.clone());

                if pending.is_empty() {
                    break 'nodes;
                }
            }
        }

        if !pending.is_empty() {
            log::debug!("rename keys without a producer: {:?}", pending.keys().collect::<Vec<_>>());
        }
        if renamed.is_empty() {
            return Ok((graph, stats));
        }

        let (mut nodes, inputs, mut outputs) = graph.into_parts();
        for (idx, slot, name) in output_edits {
            nodes[idx].outputs[slot] = name;
        }
        for (idx, slot, name) in input_edits {
            nodes[idx].inputs[slot] = name;
        }
        for value in outputs.iter_mut() {
            if let Some(new_name) = renamed.get(&value.name) {
                value.name = new_name.clone();
            }
        }
        Ok((Graph::from_nodes(nodes, inputs, outputs)?, stats))
    }
}
