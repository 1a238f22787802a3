//! First-fit pod placement
//!
//! Nodes are scanned in registration order and the pod lands on the first
//! node that admits it. This packs the earliest nodes before touching later
//! ones; there is no scoring or spreading.

use tracing::debug;

use super::node::Node;
use super::pod::Pod;

/// Place `pod` on the first node in `nodes` that admits it
///
/// Returns the index of the hosting node, or `None` if every node refused
/// (the pod is then left Pending and unchanged).
pub fn first_fit(nodes: &mut [Node], pod: &mut Pod) -> Option<usize> {
    for (index, node) in nodes.iter_mut().enumerate() {
        match node.try_admit(pod) {
            Ok(()) => {
                debug!("Placed pod {} on {}", pod.id(), node.name());
                return Some(index);
            }
            Err(reason) => {
                debug!("Node {} skipped for pod {}: {}", node.name(), pod.id(), reason);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::pod::ResourceRequest;

    fn pod(cpu: f64) -> Pod {
        Pod::new("svc", ResourceRequest::new(cpu, 1.0))
    }

    #[test]
    fn test_first_fit_prefers_first_node() {
        let mut nodes = vec![Node::new("a", 4.0, 8.0), Node::new("b", 4.0, 8.0)];
        let mut p = pod(1.0);

        assert_eq!(first_fit(&mut nodes, &mut p), Some(0));
        assert_eq!(p.node(), Some("a"));
    }

    #[test]
    fn test_first_fit_skips_full_node() {
        let mut nodes = vec![Node::new("a", 1.0, 8.0), Node::new("b", 4.0, 8.0)];
        let mut filler = pod(1.0);
        first_fit(&mut nodes, &mut filler);

        let mut p = pod(1.0);
        assert_eq!(first_fit(&mut nodes, &mut p), Some(1));
        assert_eq!(p.node(), Some("b"));
    }

    #[test]
    fn test_first_fit_no_capacity() {
        let mut nodes = vec![Node::new("a", 1.0, 8.0)];
        let mut p = pod(2.0);

        assert_eq!(first_fit(&mut nodes, &mut p), None);
        assert!(!p.is_running());
        assert_eq!(nodes[0].pod_count(), 0);
    }

    #[test]
    fn test_first_fit_empty_cluster() {
        let mut nodes: Vec<Node> = Vec::new();
        let mut p = pod(1.0);

        assert_eq!(first_fit(&mut nodes, &mut p), None);
    }
}
