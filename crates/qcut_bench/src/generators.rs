//! Graph generators for benchmarking
//!
//! Gantree: L8_Benchmark → GraphGenerator
//!
//! Standard Max-Cut test graphs plus seeded Erdős–Rényi graphs.

use qcut_core::constants::graph as defaults;
use qcut_core::{Edge, Graph, NodeId, QcutResult};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Graph generator for benchmarks
/// Gantree: GraphGenerator // 그래프 생성기
#[derive(Debug, Clone)]
pub struct GraphGenerator {
    /// Random seed
    seed: Option<u64>,
}

impl GraphGenerator {
    /// Create generator with the reference seed
    pub fn new() -> Self {
        Self {
            seed: Some(defaults::DEFAULT_SEED),
        }
    }

    /// Create generator with specific seed
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    /// Create generator seeded from OS entropy
    pub fn unseeded() -> Self {
        Self { seed: None }
    }

    /// Seed in use, if any
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    // ========================================================================
    // Deterministic Graphs
    // ========================================================================

    /// Ring of `n` nodes
    pub fn cycle(&self, n: usize) -> Graph {
        Graph::cycle(n).with_name(format!("cycle_{}", n))
    }

    /// Path of `n` nodes
    pub fn path(&self, n: usize) -> Graph {
        Graph::path(n).with_name(format!("path_{}", n))
    }

    /// Complete graph on `n` nodes
    pub fn complete(&self, n: usize) -> Graph {
        Graph::complete(n).with_name(format!("complete_{}", n))
    }

    /// Node 0 joined to every other node
    /// Gantree: star(n) -> Graph // 별 그래프
    pub fn star(&self, n: usize) -> Graph {
        let edges = (1..n).map(|v| Edge::new(0, v)).collect();
        Self::assemble(n, edges, format!("star_{}", n))
    }

    /// Two nodes, one edge
    pub fn single_edge(&self) -> Graph {
        Self::assemble(2, vec![Edge::new(0, 1)], "single_edge".to_string())
    }

    /// Build from a user edge list; rejects malformed input
    pub fn from_pairs(&self, n: usize, pairs: &[(NodeId, NodeId)]) -> QcutResult<Graph> {
        Graph::unweighted(n, pairs)
    }

    // ========================================================================
    // Random Graphs
    // ========================================================================

    /// Erdős–Rényi `G(n, p)`: each unordered pair is an edge with probability `p`
    /// Gantree: erdos_renyi(n, p) -> Graph // 무작위 그래프
    pub fn erdos_renyi(&self, n: usize, p: f64) -> Graph {
        let mut rng = self.get_rng();
        let p = p.clamp(0.0, 1.0);
        let mut edges = Vec::new();

        for u in 0..n {
            for v in (u + 1)..n {
                if rng.gen::<f64>() < p {
                    edges.push(Edge::new(u, v));
                }
            }
        }

        Self::assemble(n, edges, format!("gnp_{}_{}", n, p))
    }

    /// `G(n, p)` with integer weights drawn uniformly from `1..=max_weight`
    pub fn weighted_erdos_renyi(&self, n: usize, p: f64, max_weight: u32) -> Graph {
        let mut rng = self.get_rng();
        let p = p.clamp(0.0, 1.0);
        let max_weight = max_weight.max(1);
        let mut edges = Vec::new();

        for u in 0..n {
            for v in (u + 1)..n {
                if rng.gen::<f64>() < p {
                    let w = rng.gen_range(1..=max_weight);
                    edges.push(Edge::weighted(u, v, f64::from(w)));
                }
            }
        }

        Self::assemble(n, edges, format!("wgnp_{}_{}", n, p))
    }

    /// The reference instance `G(15, 0.5)` under this generator's seed
    pub fn reference(&self) -> Graph {
        self.erdos_renyi(defaults::DEFAULT_NODES, defaults::DEFAULT_EDGE_PROBABILITY)
    }

    /// One `G(n, p)` per node count in `sizes`, each from a fresh seed offset
    pub fn node_scaling(&self, sizes: &[usize], p: f64) -> Vec<Graph> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                let gen = match self.seed {
                    Some(seed) => Self::with_seed(seed.wrapping_add(i as u64)),
                    None => Self::unseeded(),
                };
                gen.erdos_renyi(n, p)
            })
            .collect()
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn get_rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    /// Edges here are in range and loop-free by construction
    fn assemble(n: usize, edges: Vec<Edge>, name: String) -> Graph {
        match Graph::new(n, edges) {
            Ok(graph) => graph.with_name(name),
            Err(_) => Graph::empty(n).with_name(name),
        }
    }
}

impl Default for GraphGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star() {
        let gen = GraphGenerator::new();
        let star = gen.star(5);
        assert_eq!(star.num_nodes(), 5);
        assert_eq!(star.num_edges(), 4);
        assert_eq!(star.degree(0), 4);
        assert_eq!(star.name(), Some("star_5"));
    }

    #[test]
    fn test_single_edge() {
        let g = GraphGenerator::new().single_edge();
        assert_eq!(g.num_nodes(), 2);
        assert_eq!(g.num_edges(), 1);
        assert_eq!(g.cut_weight(0b01), 1.0);
    }

    #[test]
    fn test_named_standard_graphs() {
        let gen = GraphGenerator::new();
        assert_eq!(gen.cycle(4).num_edges(), 4);
        assert_eq!(gen.path(4).num_edges(), 3);
        assert_eq!(gen.complete(4).num_edges(), 6);
        assert_eq!(gen.cycle(4).name(), Some("cycle_4"));
    }

    #[test]
    fn test_erdos_renyi_reproducibility() {
        let a = GraphGenerator::with_seed(7).erdos_renyi(10, 0.5);
        let b = GraphGenerator::with_seed(7).erdos_renyi(10, 0.5);
        assert_eq!(a.edges(), b.edges());
        assert_eq!(a.num_nodes(), 10);
    }

    #[test]
    fn test_erdos_renyi_extremes() {
        let gen = GraphGenerator::new();
        assert_eq!(gen.erdos_renyi(6, 0.0).num_edges(), 0);
        assert_eq!(gen.erdos_renyi(6, 1.0).num_edges(), 15);
        assert_eq!(gen.erdos_renyi(6, 3.0).num_edges(), 15);
    }

    #[test]
    fn test_reference_instance() {
        let g = GraphGenerator::new().reference();
        assert_eq!(g.num_nodes(), 15);
        assert!(g.num_edges() <= 105);
        for e in g.edges() {
            assert!(e.u < e.v);
        }
    }

    #[test]
    fn test_weighted_erdos_renyi() {
        let g = GraphGenerator::with_seed(3).weighted_erdos_renyi(8, 1.0, 4);
        assert_eq!(g.num_edges(), 28);
        for e in g.edges() {
            assert!(e.weight >= 1.0 && e.weight <= 4.0);
            assert_eq!(e.weight.fract(), 0.0);
        }
    }

    #[test]
    fn test_node_scaling() {
        let graphs = GraphGenerator::new().node_scaling(&[3, 4, 5], 0.5);
        let sizes: Vec<usize> = graphs.iter().map(|g| g.num_nodes()).collect();
        assert_eq!(sizes, vec![3, 4, 5]);
    }

    #[test]
    fn test_from_pairs_rejects_self_loop() {
        let gen = GraphGenerator::new();
        assert!(gen.from_pairs(3, &[(1, 1)]).is_err());
        assert!(gen.from_pairs(3, &[(0, 2)]).is_ok());
    }
}
