//! Topological ordering of an activity network (Kahn's algorithm).

use std::collections::VecDeque;

use crate::error::CpmError;
use crate::graph::ActivityNetwork;
use crate::interner::ActivityIdx;

/// Order activities so that every activity follows all of its predecessors.
///
/// The frontier is a FIFO queue seeded with zero in-degree activities in input
/// order, and successors are released in input order, so a given input always
/// yields the same sequence.
///
/// # Returns
/// * `Ok(order)` containing every activity exactly once
/// * `Err(CpmError::CycleDetected)` if the order comes up short, listing the
///   activities that were never released
pub fn topological_order(network: &ActivityNetwork) -> Result<Vec<ActivityIdx>, CpmError> {
    let n = network.len();
    let mut in_degree: Vec<usize> = (0..n as ActivityIdx)
        .map(|idx| network.predecessors(idx).len())
        .collect();

    let mut frontier: VecDeque<ActivityIdx> = (0..n as ActivityIdx)
        .filter(|&idx| in_degree[idx as usize] == 0)
        .collect();

    let mut order = Vec::with_capacity(n);

    while let Some(idx) = frontier.pop_front() {
        order.push(idx);

        for &succ in network.successors(idx) {
            let degree = &mut in_degree[succ as usize];
            *degree -= 1;
            if *degree == 0 {
                frontier.push_back(succ);
            }
        }
    }

    if order.len() != n {
        let unresolved = (0..n as ActivityIdx)
            .filter(|&idx| in_degree[idx as usize] > 0)
            .map(|idx| network.id_of(idx).to_string())
            .collect();
        return Err(CpmError::CycleDetected { unresolved });
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityRecord;

    fn network(rows: &[(&str, &str)]) -> ActivityNetwork {
        let records: Vec<ActivityRecord> = rows
            .iter()
            .map(|(id, preds)| ActivityRecord::new(*id, *id, "1", *preds))
            .collect();
        ActivityNetwork::from_records(&records).unwrap()
    }

    fn ids(network: &ActivityNetwork, order: &[ActivityIdx]) -> Vec<String> {
        order
            .iter()
            .map(|&idx| network.id_of(idx).to_string())
            .collect()
    }

    #[test]
    fn test_empty_network() {
        let net = network(&[]);
        assert!(topological_order(&net).unwrap().is_empty());
    }

    #[test]
    fn test_order_is_first_seen_first_served() {
        let net = network(&[("A", ""), ("B", "A"), ("C", "A"), ("D", "B,C"), ("E", "D")]);
        let order = topological_order(&net).unwrap();
        assert_eq!(ids(&net, &order), vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn test_predecessors_precede_successors() {
        // Input lists successors before their predecessors.
        let net = network(&[("E", "D"), ("D", "B,C"), ("C", "A"), ("B", "A"), ("A", "")]);
        let order = topological_order(&net).unwrap();
        assert_eq!(order.len(), 5);

        let mut position = vec![0usize; net.len()];
        for (pos, &idx) in order.iter().enumerate() {
            position[idx as usize] = pos;
        }
        for idx in 0..net.len() as ActivityIdx {
            for &pred in net.predecessors(idx) {
                assert!(position[pred as usize] < position[idx as usize]);
            }
        }
    }

    #[test]
    fn test_two_node_cycle() {
        let net = network(&[("A", "B"), ("B", "A")]);
        assert_eq!(
            topological_order(&net),
            Err(CpmError::CycleDetected {
                unresolved: vec!["A".to_string(), "B".to_string()]
            })
        );
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let net = network(&[("A", ""), ("B", "A,B")]);
        assert_eq!(
            topological_order(&net),
            Err(CpmError::CycleDetected {
                unresolved: vec!["B".to_string()]
            })
        );
    }

    #[test]
    fn test_cycle_downstream_of_valid_prefix() {
        let net = network(&[("A", ""), ("B", "A,D"), ("C", "B"), ("D", "C"), ("E", "A")]);
        match topological_order(&net) {
            Err(CpmError::CycleDetected { unresolved }) => {
                assert_eq!(unresolved, vec!["B", "C", "D"]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }
}
