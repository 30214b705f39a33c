use crate::entry::Entry;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// `depends_on` edges between entries, keyed by `file`.
pub struct DependencyDag {
    pub graph: DiGraph<String, ()>,
    pub file_to_index: HashMap<String, NodeIndex>,
    pub dangling: Vec<(String, String)>,
}

impl DependencyDag {
    pub fn build(entries: &[Entry]) -> Self {
        let mut graph: DiGraph<String, ()> = DiGraph::new();
        let mut file_to_index: HashMap<String, NodeIndex> = HashMap::new();
        let mut dangling = Vec::new();

        for entry in entries {
            file_to_index
                .entry(entry.file.clone())
                .or_insert_with(|| graph.add_node(entry.file.clone()));
        }

        // Edges point from dependency to dependent.
        for entry in entries {
            let Some(depends_on) = entry.depends_on.as_deref().filter(|dep| !dep.is_empty())
            else {
                continue;
            };
            match (
                file_to_index.get(depends_on),
                file_to_index.get(entry.file.as_str()),
            ) {
                (Some(&from), Some(&to)) => {
                    graph.add_edge(from, to, ());
                }
                _ => dangling.push((entry.file.clone(), depends_on.to_string())),
            }
        }

        Self {
            graph,
            file_to_index,
            dangling,
        }
    }

    /// Groups of files whose dependencies loop back on themselves.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&node| self.graph.contains_edge(node, node))
            })
            .map(|component| {
                let mut files: Vec<String> = component
                    .into_iter()
                    .map(|node| self.graph[node].clone())
                    .collect();
                files.sort();
                files
            })
            .collect();
        cycles.sort();
        cycles
    }
}

/// Structural problems in a schedule that the publishers do not guard against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleDiagnostics {
    pub duplicate_files: Vec<String>,
    /// `(entry, missing dependency)` pairs.
    pub dangling: Vec<(String, String)>,
    pub cycles: Vec<Vec<String>>,
}

impl ScheduleDiagnostics {
    pub fn collect(entries: &[Entry]) -> Self {
        let mut seen = HashSet::with_capacity(entries.len());
        let mut duplicate_files = Vec::new();
        for entry in entries {
            if !seen.insert(entry.file.as_str()) && !duplicate_files.contains(&entry.file) {
                duplicate_files.push(entry.file.clone());
            }
        }

        let dag = DependencyDag::build(entries);
        let cycles = dag.cycles();
        Self {
            duplicate_files,
            dangling: dag.dangling,
            cycles,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.duplicate_files.is_empty() && self.dangling.is_empty() && self.cycles.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        let mut messages = Vec::new();
        for file in &self.duplicate_files {
            messages.push(format!("duplicate entry for {file}"));
        }
        for (file, depends_on) in &self.dangling {
            messages.push(format!(
                "dependency {depends_on} not found in schedule for {file}"
            ));
        }
        for cycle in &self.cycles {
            messages.push(format!("dependency cycle: {}", cycle.join(" -> ")));
        }
        messages
    }
}
