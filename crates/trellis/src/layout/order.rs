//! Layering with virtual vertices and crossing minimization.

use log::trace;

/// Number of down+up sweep pairs.
const SWEEPS: usize = 4;

/// A vertex of the layered graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Vertex {
    /// A node of the scope, by its local index.
    Node(usize),
    /// A bend point of a long edge.
    Virtual,
}

/// Vertices grouped into ordered layers.
///
/// Vertex ids `0..node_count` are the scope's nodes; virtual vertices follow.
#[derive(Debug, Clone)]
pub(super) struct Layering {
    pub vertices: Vec<Vertex>,
    pub layer_of: Vec<usize>,
    /// Vertex ids of every layer, left to right.
    pub layers: Vec<Vec<usize>>,
    /// For every edge, the vertices it passes through from source to target.
    pub chains: Vec<Vec<usize>>,
}

impl Layering {
    /// Splits edges spanning several ranks into chains of virtual vertices.
    pub fn new(rank: &[usize], edges: &[(usize, usize)]) -> Self {
        let mut vertices: Vec<Vertex> = (0..rank.len()).map(Vertex::Node).collect();
        let mut layer_of = rank.to_vec();
        let mut chains = Vec::with_capacity(edges.len());

        for &(source, target) in edges {
            let mut chain = vec![source];
            for layer in rank[source] + 1..rank[target] {
                chain.push(vertices.len());
                vertices.push(Vertex::Virtual);
                layer_of.push(layer);
            }
            chain.push(target);
            chains.push(chain);
        }

        let layer_count = layer_of.iter().max().map_or(0, |max| max + 1);
        let mut layers = vec![Vec::new(); layer_count];
        for (vertex, &layer) in layer_of.iter().enumerate() {
            layers[layer].push(vertex);
        }

        Self {
            vertices,
            layer_of,
            layers,
            chains,
        }
    }

    /// Pairs of vertices joined by an edge segment, upper vertex first.
    pub fn segments(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.chains
            .iter()
            .flat_map(|chain| chain.windows(2).map(|pair| (pair[0], pair[1])))
    }

    /// Reorders each layer by barycenter sweeps, keeping the ordering with
    /// the fewest crossings.
    pub fn minimize_crossings(&mut self) {
        let mut upper = vec![Vec::new(); self.vertices.len()];
        let mut lower = vec![Vec::new(); self.vertices.len()];
        for (top, bottom) in self.segments() {
            upper[bottom].push(top);
            lower[top].push(bottom);
        }

        let mut best = self.layers.clone();
        let mut best_crossings = self.crossings();

        for _ in 0..SWEEPS {
            if best_crossings == 0 {
                break;
            }
            for layer in 1..self.layers.len() {
                self.reorder(layer, layer - 1, &upper);
            }
            for layer in (0..self.layers.len().saturating_sub(1)).rev() {
                self.reorder(layer, layer + 1, &lower);
            }

            let crossings = self.crossings();
            if crossings < best_crossings {
                best_crossings = crossings;
                best = self.layers.clone();
            }
        }

        trace!(crossings = best_crossings; "Minimized crossings");
        self.layers = best;
    }

    fn positions(&self) -> Vec<usize> {
        let mut positions = vec![0; self.vertices.len()];
        for layer in &self.layers {
            for (position, &vertex) in layer.iter().enumerate() {
                positions[vertex] = position;
            }
        }
        positions
    }

    /// Sorts `layer` by the mean position of each vertex's neighbours in
    /// `fixed`; vertices without neighbours keep their position.
    fn reorder(&mut self, layer: usize, fixed: usize, neighbours: &[Vec<usize>]) {
        let positions = self.positions();
        let mut keyed: Vec<(f32, usize)> = self.layers[layer]
            .iter()
            .map(|&vertex| {
                let adjacent: Vec<usize> = neighbours[vertex]
                    .iter()
                    .copied()
                    .filter(|&other| self.layer_of[other] == fixed)
                    .collect();
                let barycenter = if adjacent.is_empty() {
                    positions[vertex] as f32
                } else {
                    adjacent.iter().map(|&other| positions[other] as f32).sum::<f32>()
                        / adjacent.len() as f32
                };
                (barycenter, vertex)
            })
            .collect();

        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        self.layers[layer] = keyed.into_iter().map(|(_, vertex)| vertex).collect();
    }

    /// Number of pairwise segment crossings between adjacent layers.
    pub fn crossings(&self) -> usize {
        let positions = self.positions();
        let mut between = vec![Vec::new(); self.layers.len()];
        for (top, bottom) in self.segments() {
            between[self.layer_of[top]].push((positions[top], positions[bottom]));
        }

        between
            .iter()
            .map(|segments| {
                let mut count = 0;
                for (i, a) in segments.iter().enumerate() {
                    for b in &segments[i + 1..] {
                        if (a.0 < b.0 && a.1 > b.1) || (a.0 > b.0 && a.1 < b.1) {
                            count += 1;
                        }
                    }
                }
                count
            })
            .sum()
    }
}
