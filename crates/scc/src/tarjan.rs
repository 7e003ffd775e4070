//! Iterative Tarjan SCC over an in-memory graph.

use graph_part::mem::BitSet;

const UNVISITED: usize = usize::MAX;

/// Runs Tarjan's algorithm over the vertices `0..n` accepted by `filter`.
///
/// `neighbors(v)` yields the successors of `v`; successors rejected by the
/// filter are skipped. Each maximal strongly connected component is handed
/// to `on_component` as a slice of vertex indices exactly once, in reverse
/// topological order of the condensation.
///
/// The recursion is unrolled into an explicit frame stack, so the depth is
/// bounded by the vertex count instead of the thread stack.
pub fn tarjan<N, F>(
    n: usize,
    filter: impl Fn(usize) -> bool,
    neighbors: F,
    mut on_component: impl FnMut(&[usize]),
) where
    F: Fn(usize) -> N,
    N: Iterator<Item = usize>,
{
    let mut index = vec![UNVISITED; n];
    let mut low = vec![0usize; n];
    let mut on_stack = BitSet::new(n);
    let mut stack: Vec<usize> = Vec::new();
    let mut frames: Vec<(usize, N)> = Vec::new();
    let mut counter = 0usize;

    for root in 0..n {
        if !filter(root) || index[root] != UNVISITED {
            continue;
        }
        index[root] = counter;
        low[root] = counter;
        counter += 1;
        stack.push(root);
        on_stack.set(root);
        frames.push((root, neighbors(root)));

        while let Some(frame) = frames.last_mut() {
            let u = frame.0;
            let next = frame.1.next();

            match next {
                Some(v) => {
                    if !filter(v) {
                        continue;
                    }
                    if index[v] == UNVISITED {
                        index[v] = counter;
                        low[v] = counter;
                        counter += 1;
                        stack.push(v);
                        on_stack.set(v);
                        frames.push((v, neighbors(v)));
                    } else if on_stack.get(v) && index[v] < low[u] {
                        low[u] = index[v];
                    }
                }
                None => {
                    if low[u] == index[u] {
                        let mut top = stack.len();
                        loop {
                            top -= 1;
                            on_stack.unset(stack[top]);
                            if stack[top] == u {
                                break;
                            }
                        }
                        on_component(&stack[top..]);
                        stack.truncate(top);
                    }
                    frames.pop();
                    if let Some(frame) = frames.last() {
                        let parent = frame.0;
                        if low[u] < low[parent] {
                            low[parent] = low[u];
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components(n: usize, edges: &[(usize, usize)]) -> Vec<Vec<usize>> {
        components_filtered(n, edges, |_| true)
    }

    fn components_filtered(
        n: usize,
        edges: &[(usize, usize)],
        filter: impl Fn(usize) -> bool,
    ) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); n];
        for &(u, v) in edges {
            adjacency[u].push(v);
        }
        let mut found = Vec::new();
        tarjan(
            n,
            filter,
            |v| adjacency[v].iter().copied(),
            |component| {
                let mut component = component.to_vec();
                component.sort_unstable();
                found.push(component);
            },
        );
        found.sort();
        found
    }

    #[test]
    fn chain_yields_singletons() {
        let sccs = components(3, &[(0, 1), (1, 2)]);
        assert_eq!(sccs, vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn cycle_with_tail() {
        let sccs = components(4, &[(0, 1), (1, 2), (2, 0), (2, 3)]);
        assert_eq!(sccs, vec![vec![0, 1, 2], vec![3]]);
    }

    #[test]
    fn nested_cycles_are_one_component() {
        let sccs = components(4, &[(0, 1), (1, 2), (2, 3), (3, 0), (1, 0), (3, 2)]);
        assert_eq!(sccs, vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn self_loop_is_a_component() {
        let sccs = components(2, &[(0, 0), (0, 1)]);
        assert_eq!(sccs, vec![vec![0], vec![1]]);
    }

    #[test]
    fn filter_restricts_the_subgraph() {
        // the outer cycle 0 -> 1 -> 2 -> 0 only closes through vertex 1;
        // filtering 1 away splits the rest into singletons
        let sccs = components_filtered(3, &[(0, 1), (1, 2), (2, 0)], |v| v != 1);
        assert_eq!(sccs, vec![vec![0], vec![2]]);
    }

    #[test]
    fn deep_path_does_not_recurse() {
        let n = 200_000;
        let mut edges = Vec::with_capacity(n);
        for v in 0..n - 1 {
            edges.push((v, v + 1));
        }
        edges.push((n - 1, 0));
        let sccs = components(n, &edges);
        assert_eq!(sccs.len(), 1);
        assert_eq!(sccs[0].len(), n);
    }
}
