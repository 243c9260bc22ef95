//! Rank assignment for one scope.
//!
//! Nodes are plain indices `0..node_count` and edges are `(source, target)`
//! pairs without self loops. [`reversed_edges`] makes the edge set acyclic;
//! [`assign_ranks`] expects that acyclic orientation and guarantees
//! `rank[target] >= rank[source] + 1` for every edge.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{trace, warn};
use petgraph::{
    algo::toposort,
    graph::{DiGraph, NodeIndex},
    unionfind::UnionFind,
    visit::{DfsEvent, depth_first_search},
};

use trellis_core::style::Ranker;

/// Pivot limit for network simplex, per node.
const PIVOTS_PER_NODE: usize = 8;

fn build_graph(node_count: usize, edges: &[(usize, usize)]) -> DiGraph<(), ()> {
    let mut graph = DiGraph::with_capacity(node_count, edges.len());
    for _ in 0..node_count {
        graph.add_node(());
    }
    for &(source, target) in edges {
        graph.add_edge(NodeIndex::new(source), NodeIndex::new(target), ());
    }
    graph
}

/// Flags the edges a depth-first search classifies as back edges.
///
/// The search starts from the nodes in index order, so the result only
/// depends on declaration order. Reversing the flagged edges leaves a DAG.
pub(super) fn reversed_edges(node_count: usize, edges: &[(usize, usize)]) -> Vec<bool> {
    let graph = build_graph(node_count, edges);
    let mut back_edges = HashSet::new();

    depth_first_search(&graph, graph.node_indices(), |event| {
        if let DfsEvent::BackEdge(source, target) = event {
            back_edges.insert((source.index(), target.index()));
        }
    });

    trace!(back_edges = back_edges.len(); "Found back edges");
    edges.iter().map(|edge| back_edges.contains(edge)).collect()
}

/// Ranks the nodes of an acyclic graph with the selected strategy.
pub(super) fn assign_ranks(
    ranker: Ranker,
    node_count: usize,
    edges: &[(usize, usize)],
) -> Vec<usize> {
    let mut rank = longest_path(node_count, edges);

    match ranker {
        Ranker::LongestPath => {}
        Ranker::TightTree => {
            feasible_tree(node_count, edges, &mut rank);
        }
        Ranker::NetworkSimplex => network_simplex(node_count, edges, &mut rank),
    }

    normalize(node_count, edges, &rank)
}

fn slack(rank: &[i64], (source, target): (usize, usize)) -> i64 {
    rank[target] - rank[source] - 1
}

/// Every node one below its lowest predecessor, sources at rank zero.
fn longest_path(node_count: usize, edges: &[(usize, usize)]) -> Vec<i64> {
    let graph = build_graph(node_count, edges);
    let order = toposort(&graph, None).unwrap_or_else(|cycle| {
        warn!(node = cycle.node_id().index(); "Ranking a cyclic graph, ranks may be invalid");
        graph.node_indices().collect()
    });

    let mut rank = vec![0_i64; node_count];
    for node in order {
        for successor in graph.neighbors(node) {
            rank[successor.index()] = rank[successor.index()].max(rank[node.index()] + 1);
        }
    }
    rank
}

/// Weakly connected components, each listed in node order.
fn components(node_count: usize, edges: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut sets = UnionFind::new(node_count);
    for &(source, target) in edges {
        sets.union(source, target);
    }

    let mut components: IndexMap<usize, Vec<usize>> = IndexMap::new();
    for node in 0..node_count {
        components.entry(sets.find(node)).or_default().push(node);
    }
    components.into_values().collect()
}

/// Grows a spanning tree of tight edges per component, shifting the tree
/// along the incident edge of minimal slack whenever it gets stuck.
///
/// Returns the tree membership of every edge. Ranks stay feasible.
fn feasible_tree(node_count: usize, edges: &[(usize, usize)], rank: &mut [i64]) -> Vec<bool> {
    let mut in_tree = vec![false; node_count];
    let mut tree_edges = vec![false; edges.len()];

    for component in components(node_count, edges) {
        in_tree[component[0]] = true;
        let mut size = 1;

        while size < component.len() {
            let mut grew = true;
            while grew {
                grew = false;
                for (index, &(source, target)) in edges.iter().enumerate() {
                    if in_tree[source] != in_tree[target] && slack(rank, (source, target)) == 0 {
                        let outside = if in_tree[source] { target } else { source };
                        in_tree[outside] = true;
                        tree_edges[index] = true;
                        size += 1;
                        grew = true;
                    }
                }
            }
            if size == component.len() {
                break;
            }

            let incident = edges
                .iter()
                .enumerate()
                .filter(|(_, (source, target))| in_tree[*source] != in_tree[*target])
                .map(|(index, &edge)| (index, slack(rank, edge)))
                .min_by_key(|&(_, slack)| slack);
            let Some((index, delta)) = incident else {
                break;
            };

            let shift = if in_tree[edges[index].0] { delta } else { -delta };
            for &node in &component {
                if in_tree[node] {
                    rank[node] += shift;
                }
            }
        }
    }

    tree_edges
}

/// Nodes reachable from `start` over tree edges, skipping edge `removed`.
fn tree_side(
    node_count: usize,
    edges: &[(usize, usize)],
    tree: &[bool],
    removed: usize,
    start: usize,
) -> Vec<bool> {
    let mut side = vec![false; node_count];
    side[start] = true;
    let mut stack = vec![start];

    while let Some(node) = stack.pop() {
        for (index, &(source, target)) in edges.iter().enumerate() {
            if !tree[index] || index == removed {
                continue;
            }
            let other = if source == node {
                target
            } else if target == node {
                source
            } else {
                continue;
            };
            if !side[other] {
                side[other] = true;
                stack.push(other);
            }
        }
    }
    side
}

/// Tail and head components of a tree edge.
fn split(
    node_count: usize,
    edges: &[(usize, usize)],
    tree: &[bool],
    index: usize,
) -> (Vec<bool>, Vec<bool>) {
    let (source, target) = edges[index];
    (
        tree_side(node_count, edges, tree, index, source),
        tree_side(node_count, edges, tree, index, target),
    )
}

fn cut_value(edges: &[(usize, usize)], tail: &[bool], head: &[bool]) -> i64 {
    edges
        .iter()
        .map(|&(source, target)| {
            if tail[source] && head[target] {
                1
            } else if head[source] && tail[target] {
                -1
            } else {
                0
            }
        })
        .sum()
}

/// Improves a feasible ranking by exchanging tree edges with negative cut
/// values, minimizing the total edge length.
fn network_simplex(node_count: usize, edges: &[(usize, usize)], rank: &mut [i64]) {
    let mut tree = feasible_tree(node_count, edges, rank);
    let limit = PIVOTS_PER_NODE * node_count.max(1);

    for pivot in 0..limit {
        let leaving = (0..edges.len()).filter(|&index| tree[index]).find_map(|index| {
            let (tail, head) = split(node_count, edges, &tree, index);
            (cut_value(edges, &tail, &head) < 0).then_some((index, tail, head))
        });
        let Some((leaving, tail, head)) = leaving else {
            trace!(pivots = pivot; "Network simplex converged");
            return;
        };

        let entering = edges
            .iter()
            .enumerate()
            .filter(|&(index, &(source, target))| !tree[index] && head[source] && tail[target])
            .map(|(index, &edge)| (index, slack(rank, edge)))
            .min_by_key(|&(_, slack)| slack);
        let Some((entering, delta)) = entering else {
            return;
        };

        tree[leaving] = false;
        tree[entering] = true;
        for node in 0..node_count {
            if head[node] {
                rank[node] += delta;
            }
        }
    }

    trace!(limit; "Network simplex stopped at the pivot limit");
}

/// Shifts every component so its smallest rank is zero.
fn normalize(node_count: usize, edges: &[(usize, usize)], rank: &[i64]) -> Vec<usize> {
    let mut normalized = vec![0; node_count];
    for component in components(node_count, edges) {
        let min = component.iter().map(|&node| rank[node]).min().unwrap_or(0);
        for node in component {
            normalized[node] = usize::try_from(rank[node] - min).unwrap_or(0);
        }
    }
    normalized
}
