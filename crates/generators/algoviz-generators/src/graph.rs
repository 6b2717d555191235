//! Graph traversal and shortest paths.
//!
//! Neighbours are always visited in ascending node order so every run of the
//! same graph narrates the same way.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use algoviz_player_core::{FrameRecorder, FrameSequence};
use serde::{Deserialize, Serialize};

use crate::error::{check_index, GenerateError};
use crate::limits::GeneratorLimits;
use crate::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub weight: u32,
}

/// Weighted graph. Undirected edges are stored once and walked both ways.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<String>,
    pub edges: Vec<Edge>,
    pub directed: bool,
}

impl Graph {
    /// `count` nodes labelled A, B, C, ... (then by index past Z).
    pub fn with_nodes(count: usize, directed: bool) -> Result<Self> {
        if count == 0 {
            return Err(GenerateError::empty("graph"));
        }
        GeneratorLimits::default().check_nodes("graph", count)?;
        let nodes = (0..count)
            .map(|i| match u8::try_from(i) {
                Ok(b) if b < 26 => char::from(b'A' + b).to_string(),
                _ => i.to_string(),
            })
            .collect();
        Ok(Self {
            nodes,
            edges: Vec::new(),
            directed,
        })
    }

    pub fn from_edges(count: usize, edges: &[(usize, usize, u32)], directed: bool) -> Result<Self> {
        let mut g = Self::with_nodes(count, directed)?;
        for &(from, to, weight) in edges {
            g.add_edge(from, to, weight)?;
        }
        Ok(g)
    }

    pub fn add_edge(&mut self, from: usize, to: usize, weight: u32) -> Result<()> {
        check_index("edge endpoint", from, self.nodes.len())?;
        check_index("edge endpoint", to, self.nodes.len())?;
        self.edges.push(Edge { from, to, weight });
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Per node: `(neighbour, edge index, weight)` sorted by neighbour.
    pub fn adjacency(&self) -> Vec<Vec<(usize, usize, u32)>> {
        let mut adj = vec![Vec::new(); self.nodes.len()];
        for (i, e) in self.edges.iter().enumerate() {
            adj[e.from].push((e.to, i, e.weight));
            if !self.directed && e.from != e.to {
                adj[e.to].push((e.from, i, e.weight));
            }
        }
        for list in &mut adj {
            list.sort_by_key(|&(n, i, _)| (n, i));
        }
        adj
    }

    fn validate(&self, start: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(GenerateError::empty("graph"));
        }
        GeneratorLimits::default().check_nodes("graph", self.nodes.len())?;
        for e in &self.edges {
            check_index("edge endpoint", e.from, self.nodes.len())?;
            check_index("edge endpoint", e.to, self.nodes.len())?;
        }
        check_index("start node", start, self.nodes.len())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    #[default]
    Unvisited,
    Frontier,
    Current,
    Visited,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeState {
    #[default]
    Idle,
    Considered,
    /// Part of the traversal / shortest-path tree.
    Tree,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub node_states: Vec<NodeState>,
    pub edge_states: Vec<EdgeState>,
    /// Hop count for BFS, path weight for Dijkstra, `None` while unreached.
    pub distances: Vec<Option<u64>>,
    /// Queue, stack or priority-queue contents, next out first.
    pub frontier: Vec<usize>,
    /// Nodes in the order they were visited.
    pub order: Vec<usize>,
    pub current: Option<usize>,
    pub parents: Vec<Option<usize>>,
}

impl GraphSnapshot {
    fn new(graph: &Graph) -> Self {
        let n = graph.nodes.len();
        Self {
            node_states: vec![NodeState::Unvisited; n],
            edge_states: vec![EdgeState::Idle; graph.edges.len()],
            distances: vec![None; n],
            frontier: Vec::new(),
            order: Vec::new(),
            current: None,
            parents: vec![None; n],
        }
    }

    /// Start-to-`target` path along the recorded parents.
    pub fn path_to(&self, target: usize) -> Option<Vec<usize>> {
        self.distances.get(target).copied().flatten()?;
        let mut path = vec![target];
        let mut at = target;
        while let Some(p) = self.parents[at] {
            path.push(p);
            at = p;
            if path.len() > self.parents.len() {
                return None;
            }
        }
        path.reverse();
        Some(path)
    }
}

struct GraphTrace<'g> {
    graph: &'g Graph,
    s: GraphSnapshot,
    rec: FrameRecorder<GraphSnapshot>,
}

impl<'g> GraphTrace<'g> {
    fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            s: GraphSnapshot::new(graph),
            rec: FrameRecorder::new(),
        }
    }

    fn label(&self, i: usize) -> &'g str {
        &self.graph.nodes[i]
    }

    fn record(&mut self, desc: impl Into<String>) {
        self.rec.record(&self.s, desc);
    }

    fn visit(&mut self, u: usize) {
        if let Some(prev) = self.s.current.take() {
            self.s.node_states[prev] = NodeState::Visited;
        }
        self.s.node_states[u] = NodeState::Current;
        self.s.current = Some(u);
        self.s.order.push(u);
    }

    fn finish(mut self, desc: impl Into<String>) -> FrameSequence<GraphSnapshot> {
        if let Some(prev) = self.s.current.take() {
            self.s.node_states[prev] = NodeState::Visited;
        }
        self.s.frontier.clear();
        self.record(desc);
        self.rec.finish()
    }
}

/// Breadth-first search from `start`. Distances are hop counts.
pub fn bfs(graph: &Graph, start: usize) -> Result<FrameSequence<GraphSnapshot>> {
    graph.validate(start)?;
    let adj = graph.adjacency();
    let mut t = GraphTrace::new(graph);
    let mut queue = VecDeque::from([start]);
    t.s.distances[start] = Some(0);
    t.s.node_states[start] = NodeState::Frontier;
    t.s.frontier = vec![start];
    t.record(format!("Queue the start node {}", t.label(start)));

    while let Some(u) = queue.pop_front() {
        t.visit(u);
        t.s.frontier = queue.iter().copied().collect();
        t.record(format!("Dequeue and visit {}", t.label(u)));
        let du = t.s.distances[u].unwrap_or(0);
        for &(v, e, _) in &adj[u] {
            if t.s.node_states[v] != NodeState::Unvisited {
                continue;
            }
            t.s.node_states[v] = NodeState::Frontier;
            t.s.edge_states[e] = EdgeState::Tree;
            t.s.parents[v] = Some(u);
            t.s.distances[v] = Some(du + 1);
            queue.push_back(v);
            t.s.frontier = queue.iter().copied().collect();
            t.record(format!("Discover {} from {}", t.label(v), t.label(u)));
        }
    }
    let visited = t.s.order.len();
    Ok(t.finish(format!("BFS done: {visited} of {} nodes reached", graph.len())))
}

/// Iterative depth-first search. Neighbours are pushed in reverse so the
/// smallest is explored first.
pub fn dfs(graph: &Graph, start: usize) -> Result<FrameSequence<GraphSnapshot>> {
    graph.validate(start)?;
    let adj = graph.adjacency();
    let mut t = GraphTrace::new(graph);
    // (node, parent, edge from parent)
    let mut stack: Vec<(usize, Option<(usize, usize)>)> = vec![(start, None)];
    t.s.node_states[start] = NodeState::Frontier;
    t.s.frontier = vec![start];
    t.record(format!("Push the start node {}", t.label(start)));

    while let Some((u, via)) = stack.pop() {
        if matches!(
            t.s.node_states[u],
            NodeState::Visited | NodeState::Current
        ) {
            continue;
        }
        t.visit(u);
        let depth = match via {
            Some((p, e)) => {
                t.s.parents[u] = Some(p);
                t.s.edge_states[e] = EdgeState::Tree;
                t.s.distances[p].map_or(1, |d| d + 1)
            }
            None => 0,
        };
        t.s.distances[u] = Some(depth);
        for &(v, e, _) in adj[u].iter().rev() {
            if matches!(t.s.node_states[v], NodeState::Unvisited | NodeState::Frontier) {
                t.s.node_states[v] = NodeState::Frontier;
                stack.push((v, Some((u, e))));
            }
        }
        t.s.frontier = stack.iter().rev().map(|&(v, _)| v).collect();
        t.record(format!("Pop and visit {}", t.label(u)));
    }
    let visited = t.s.order.len();
    Ok(t.finish(format!("DFS done: {visited} of {} nodes reached", graph.len())))
}

/// Dijkstra's shortest paths from `start` with a binary heap.
pub fn dijkstra(graph: &Graph, start: usize) -> Result<FrameSequence<GraphSnapshot>> {
    graph.validate(start)?;
    let adj = graph.adjacency();
    let mut t = GraphTrace::new(graph);
    let mut heap = BinaryHeap::new();
    t.s.distances[start] = Some(0);
    t.s.node_states[start] = NodeState::Frontier;
    heap.push(Reverse((0u64, start)));
    t.s.frontier = vec![start];
    t.record(format!("Distance to {} is 0", t.label(start)));

    while let Some(Reverse((d, u))) = heap.pop() {
        if t.s.node_states[u] == NodeState::Visited || t.s.node_states[u] == NodeState::Current {
            continue;
        }
        if t.s.distances[u].is_some_and(|best| d > best) {
            continue;
        }
        t.visit(u);
        t.s.frontier = pending(&heap, &t.s);
        t.record(format!("Settle {} at distance {d}", t.label(u)));

        for &(v, e, w) in &adj[u] {
            if matches!(t.s.node_states[v], NodeState::Visited | NodeState::Current) {
                continue;
            }
            let candidate = d + u64::from(w);
            t.s.edge_states[e] = EdgeState::Considered;
            match t.s.distances[v] {
                Some(old) if candidate >= old => {
                    t.record(format!(
                        "{} via {} costs {candidate}, no better than {old}",
                        t.label(v),
                        t.label(u)
                    ));
                }
                old => {
                    if let Some(p) = t.s.parents[v] {
                        if let Some(pe) = tree_edge(&t.s, &adj, p, v) {
                            t.s.edge_states[pe] = EdgeState::Considered;
                        }
                    }
                    t.s.distances[v] = Some(candidate);
                    t.s.parents[v] = Some(u);
                    t.s.edge_states[e] = EdgeState::Tree;
                    t.s.node_states[v] = NodeState::Frontier;
                    heap.push(Reverse((candidate, v)));
                    t.s.frontier = pending(&heap, &t.s);
                    let was = old.map_or_else(|| "unreached".to_string(), |o| o.to_string());
                    t.record(format!(
                        "Relax {}: {was} -> {candidate} via {}",
                        t.label(v),
                        t.label(u)
                    ));
                }
            }
        }
    }
    Ok(t.finish("All reachable nodes settled"))
}

/// Unsettled nodes in the heap, nearest first.
fn pending(heap: &BinaryHeap<Reverse<(u64, usize)>>, s: &GraphSnapshot) -> Vec<usize> {
    let mut live: Vec<(u64, usize)> = heap
        .iter()
        .map(|Reverse(entry)| *entry)
        .filter(|&(d, v)| s.node_states[v] == NodeState::Frontier && s.distances[v] == Some(d))
        .collect();
    live.sort_unstable();
    live.into_iter().map(|(_, v)| v).collect()
}

/// Tree edge currently joining `p` to `v`.
fn tree_edge(
    s: &GraphSnapshot,
    adj: &[Vec<(usize, usize, u32)>],
    p: usize,
    v: usize,
) -> Option<usize> {
    adj[p]
        .iter()
        .find(|&&(n, e, _)| n == v && s.edge_states[e] == EdgeState::Tree)
        .map(|&(_, e, _)| e)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Graph {
        Graph::from_edges(
            6,
            &[
                (0, 1, 7),
                (0, 2, 9),
                (0, 5, 14),
                (1, 2, 10),
                (1, 3, 15),
                (2, 3, 11),
                (2, 5, 2),
                (3, 4, 6),
                (4, 5, 9),
            ],
            false,
        )
        .unwrap()
    }

    fn last(frames: &FrameSequence<GraphSnapshot>) -> &GraphSnapshot {
        &frames.last().unwrap().snapshot
    }

    #[test]
    fn bfs_order_and_hops() {
        let frames = bfs(&sample(), 0).unwrap();
        let snap = last(&frames);
        assert_eq!(snap.order, vec![0, 1, 2, 5, 3, 4]);
        assert_eq!(snap.distances[4], Some(2));
        assert!(snap.node_states.iter().all(|&s| s == NodeState::Visited));
    }

    #[test]
    fn dfs_order() {
        let frames = dfs(&sample(), 0).unwrap();
        assert_eq!(last(&frames).order, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(last(&frames).path_to(5), Some(vec![0, 1, 2, 3, 4, 5]));
    }

    #[test]
    fn dijkstra_distances() {
        let frames = dijkstra(&sample(), 0).unwrap();
        let snap = last(&frames);
        let d: Vec<u64> = snap.distances.iter().map(|d| d.unwrap()).collect();
        assert_eq!(d, vec![0, 7, 9, 20, 20, 11]);
        assert_eq!(snap.order, vec![0, 1, 2, 5, 3, 4]);
        assert_eq!(snap.path_to(4), Some(vec![0, 2, 5, 4]));
        // one tree edge per non-start node
        let tree = snap
            .edge_states
            .iter()
            .filter(|&&e| e == EdgeState::Tree)
            .count();
        assert_eq!(tree, 5);
    }

    #[test]
    fn directed_edges_only_go_forward() {
        let g = Graph::from_edges(3, &[(0, 1, 1), (2, 1, 1)], true).unwrap();
        let frames = bfs(&g, 0).unwrap();
        let snap = last(&frames);
        assert_eq!(snap.order, vec![0, 1]);
        assert_eq!(snap.distances[2], None);
        assert_eq!(snap.path_to(2), None);
    }

    #[test]
    fn unknown_start_node() {
        assert!(matches!(
            bfs(&sample(), 6),
            Err(GenerateError::OutOfRange { value: 6, max: 5, .. })
        ));
        assert!(Graph::from_edges(2, &[(0, 2, 1)], false).is_err());
        assert!(Graph::with_nodes(0, false).is_err());
    }

    #[test]
    fn labels() {
        let g = Graph::with_nodes(3, false).unwrap();
        assert_eq!(g.nodes, vec!["A", "B", "C"]);
    }
}
