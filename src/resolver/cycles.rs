//! Optional static cycle detection for aggregate serializers.
//!
//! A serializer that calls a method returning the aggregate itself (or a
//! collection of it, or anything that leads back to it) recurses without
//! end. Callers normally exclude such capabilities by hand; a target can opt
//! in to this check to catch the ones they missed.

use std::collections::{HashMap, VecDeque};

use petgraph::algo::astar;
use petgraph::graph::{DiGraph, NodeIndex};

use super::errors::GenerateError;
use super::method_set::MethodSet;
use crate::core::registry::MetadataProvider;

/// Directed graph of capabilities; an edge `A -> B` means a method of `A`
/// returns a type mentioning `B`.
pub struct CapabilityGraph {
    graph: DiGraph<String, String>,
    nodes: HashMap<String, NodeIndex>,
}

impl CapabilityGraph {
    /// Build the graph reachable from `roots`.
    pub fn build<'a>(
        provider: &dyn MetadataProvider,
        roots: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, GenerateError> {
        let mut graph = CapabilityGraph {
            graph: DiGraph::new(),
            nodes: HashMap::new(),
        };

        let mut queue: VecDeque<String> = roots
            .into_iter()
            .filter(|name| provider.has_capability(name))
            .map(str::to_string)
            .collect();

        while let Some(name) = queue.pop_front() {
            let from = graph.node(&name);
            for method in provider.describe_capability(&name)? {
                let mut referenced = Vec::new();
                for ret in &method.returns {
                    ret.collect_names(&mut referenced);
                }
                for target in referenced {
                    if !provider.has_capability(target) {
                        continue;
                    }
                    let is_new = !graph.nodes.contains_key(target);
                    let to = graph.node(target);
                    if graph.graph.find_edge(from, to).is_none() {
                        graph.graph.add_edge(from, to, method.name.clone());
                    }
                    if is_new {
                        queue.push_back(target.to_string());
                    }
                }
            }
        }

        Ok(graph)
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.nodes.insert(name.to_string(), idx);
        idx
    }

    /// Shortest chain of capabilities leading from `from` to `to`.
    pub fn path(&self, from: &str, to: &str) -> Option<Vec<String>> {
        let start = *self.nodes.get(from)?;
        let goal = *self.nodes.get(to)?;
        let (_, path) = astar(&self.graph, start, |n| n == goal, |_| 1, |_| 0)?;
        Some(path.into_iter().map(|n| self.graph[n].clone()).collect())
    }
}

/// Fail if any method in `set` returns a type that leads back to `receiver`.
pub fn check_cycles(
    provider: &dyn MetadataProvider,
    receiver: &str,
    set: &MethodSet,
) -> Result<(), GenerateError> {
    let mut roots = Vec::new();
    for method in set {
        for ret in &method.returns {
            ret.collect_names(&mut roots);
        }
    }
    roots.push(receiver);

    let graph = CapabilityGraph::build(provider, roots)?;

    for method in set {
        let mut referenced = Vec::new();
        for ret in &method.returns {
            ret.collect_names(&mut referenced);
        }
        for name in referenced {
            if let Some(chain) = graph.path(name, receiver) {
                let mut path = vec![format!("{}.{}", receiver, method.name)];
                path.extend(chain);
                return Err(GenerateError::CycleDetected {
                    receiver: receiver.to_string(),
                    method: method.name.clone(),
                    path,
                });
            }
        }
    }

    Ok(())
}
