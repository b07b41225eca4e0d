/// Weighted-node grid for the graph navigation game.
///
/// Every node carries an entry cost. The player walks from the top-left
/// node to the bottom-right one; their route is graded against the
/// cheapest possible route (Dijkstra over 4-connected nodes).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rand::Rng;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Node {
    pub weight: u32,
}

#[derive(Clone, Debug)]
pub struct WeightGrid {
    nodes: Vec<Vec<Node>>,
    size: usize,
}

impl WeightGrid {
    /// `n × n` nodes with weights in `1..=max_weight`.
    pub fn generate<R: Rng + ?Sized>(n: usize, max_weight: u32, rng: &mut R) -> Self {
        let size = n.max(2);
        let max_weight = max_weight.max(1);
        let nodes = (0..size)
            .map(|_| (0..size).map(|_| Node { weight: rng.gen_range(1..=max_weight) }).collect())
            .collect();
        WeightGrid { nodes, size }
    }

    pub fn from_weights(rows: &[&[u32]]) -> Self {
        let size = rows.len();
        let nodes = rows.iter()
            .map(|r| r.iter().map(|&weight| Node { weight }).collect())
            .collect();
        WeightGrid { nodes, size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn start(&self) -> (usize, usize) {
        (0, 0)
    }

    pub fn goal(&self) -> (usize, usize) {
        (self.size - 1, self.size - 1)
    }

    pub fn node(&self, x: usize, y: usize) -> Option<Node> {
        self.nodes.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Cost of walking `path` (the start node is free, every node entered
    /// afterwards costs its weight). `None` if the path is not a chain of
    /// adjacent in-bounds nodes.
    pub fn path_cost(&self, path: &[(usize, usize)]) -> Option<u32> {
        let mut cost = 0;
        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.0.abs_diff(b.0) + a.1.abs_diff(b.1) != 1 { return None; }
            cost += self.node(b.0, b.1)?.weight;
        }
        Some(cost)
    }

    /// Cheapest start→goal cost under the same rules as `path_cost`.
    pub fn cheapest_path_cost(&self) -> u32 {
        let n = self.size;
        let mut dist = vec![vec![u32::MAX; n]; n];
        let mut heap = BinaryHeap::new();
        dist[0][0] = 0;
        heap.push(Reverse((0u32, 0usize, 0usize)));

        while let Some(Reverse((d, x, y))) = heap.pop() {
            if (x, y) == self.goal() { return d; }
            if d > dist[y][x] { continue; }
            let steps = [(0i32, 1i32), (1, 0), (0, -1), (-1, 0)];
            for (dx, dy) in steps {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx < 0 || ny < 0 || nx >= n as i32 || ny >= n as i32 { continue; }
                let (nx, ny) = (nx as usize, ny as usize);
                let nd = d + self.nodes[ny][nx].weight;
                if nd < dist[ny][nx] {
                    dist[ny][nx] = nd;
                    heap.push(Reverse((nd, nx, ny)));
                }
            }
        }
        dist[n - 1][n - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn cheapest_path_avoids_heavy_nodes() {
        let g = WeightGrid::from_weights(&[
            &[1, 9, 9],
            &[1, 9, 9],
            &[1, 1, 1],
        ]);
        assert_eq!(g.cheapest_path_cost(), 4);
        let route = [(0, 0), (0, 1), (0, 2), (1, 2), (2, 2)];
        assert_eq!(g.path_cost(&route), Some(4));
    }

    #[test]
    fn disjoint_path_is_rejected() {
        let g = WeightGrid::from_weights(&[&[1, 1], &[1, 1]]);
        assert_eq!(g.path_cost(&[(0, 0), (1, 1)]), None);
    }

    #[test]
    fn generated_weights_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let g = WeightGrid::generate(6, 5, &mut rng);
        for y in 0..6 {
            for x in 0..6 {
                let w = g.node(x, y).map(|n| n.weight).unwrap_or(0);
                assert!((1..=5).contains(&w));
            }
        }
        // Any monotone route is an upper bound on the optimum.
        let mut route = vec![];
        for x in 0..6 { route.push((x, 0)); }
        for y in 1..6 { route.push((5, y)); }
        assert!(g.cheapest_path_cost() <= g.path_cost(&route).unwrap_or(u32::MAX));
    }
}
