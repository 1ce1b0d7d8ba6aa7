use super::*;
use std::f32::consts::PI;

pub const CENTER: (f32, f32) = (500.0, 400.0);
pub const CENTER_SIZE: (f32, f32) = (150.0, 80.0);
pub const BRANCH_SIZE: (f32, f32) = (140.0, 60.0);
pub const SUBTOPIC_SIZE: (f32, f32) = (120.0, 50.0);
pub const BRANCH_RADIUS: f32 = 300.0;
pub const SUBTOPIC_RADIUS: f32 = 150.0;
pub const MAX_SUBTOPICS: usize = 5;
const SUBTOPIC_ARC: f32 = PI / 3.0;

pub(super) fn compute_mindmap_layout(tree: &TopicTree, style: &LayoutStyle) -> Graph {
    let mut graph = Graph::new();
    let center = node_at(&tree.central_theme, CENTER, CENTER_SIZE).with_color(&style.palette.accent);

    let branch_count = tree.branches.len();
    let mut placed = Vec::new();
    let mut edges = Vec::new();
    for (i, branch) in tree.branches.iter().enumerate() {
        // First branch points straight up.
        let angle = i as f32 * (2.0 * PI / branch_count as f32) - PI / 2.0;
        let point = polar(CENTER, BRANCH_RADIUS, angle);
        let branch_node = node_at(&branch.topic, point, BRANCH_SIZE);
        edges.push(Edge::between(&center, &branch_node));

        let shown = &branch.subtopics[..branch.subtopics.len().min(MAX_SUBTOPICS)];
        let mut subtopic_nodes = Vec::with_capacity(shown.len());
        for (j, subtopic) in shown.iter().enumerate() {
            let sub_angle = subtopic_angle(angle, j, shown.len());
            let sub_node = node_at(subtopic, polar(point, SUBTOPIC_RADIUS, sub_angle), SUBTOPIC_SIZE);
            edges.push(Edge::between(&branch_node, &sub_node));
            subtopic_nodes.push(sub_node);
        }
        placed.push(branch_node);
        placed.extend(subtopic_nodes);
    }

    graph.nodes.push(center);
    graph.nodes.extend(placed);
    graph.edges = edges;
    graph
}

/// Spreads subtopics over a 60° arc centered on the branch's own angle.
fn subtopic_angle(branch_angle: f32, index: usize, count: usize) -> f32 {
    if count <= 1 {
        return branch_angle;
    }
    branch_angle - SUBTOPIC_ARC / 2.0 + index as f32 * (SUBTOPIC_ARC / (count - 1) as f32)
}

fn polar(origin: (f32, f32), radius: f32, angle: f32) -> (f32, f32) {
    (origin.0 + radius * angle.cos(), origin.1 + radius * angle.sin())
}

fn node_at(text: &str, center: (f32, f32), size: (f32, f32)) -> Node {
    Node::text(text, center.0 - size.0 / 2.0, center.1 - size.1 / 2.0, size.0, size.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Branch;
    use crate::theme;

    fn tree(branches: Vec<(&str, Vec<&str>)>) -> TopicTree {
        TopicTree {
            central_theme: "Root".to_string(),
            branches: branches
                .into_iter()
                .map(|(topic, subs)| Branch {
                    topic: topic.to_string(),
                    subtopics: subs.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
        }
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn central_node_is_fixed() {
        let graph = compute_mindmap_layout(&tree(vec![]), &LayoutStyle::interactive());
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.edges.is_empty());
        let root = &graph.nodes[0];
        assert_eq!((root.x, root.y, root.width, root.height), (425.0, 360.0, 150.0, 80.0));
        assert_eq!(root.color.as_deref(), Some(theme::PURPLE));
    }

    #[test]
    fn first_branch_points_up() {
        let graph = compute_mindmap_layout(&tree(vec![("A", vec![]), ("B", vec![])]), &LayoutStyle::interactive());
        let a = graph.find_text("A").unwrap();
        let (ax, ay) = a.center();
        assert!(close(ax, 500.0) && close(ay, 100.0));
        let (bx, by) = graph.find_text("B").unwrap().center();
        assert!(close(bx, 500.0) && close(by, 700.0));

        let up = &graph.edges[0];
        assert_eq!(up.to_node, a.id);
        assert_eq!((up.from_side, up.to_side), (Some(Side::Top), Some(Side::Bottom)));
        assert_eq!(graph.edges[1].from_side, Some(Side::Bottom));
    }

    #[test]
    fn subtopics_spread_over_arc_and_cap_at_five() {
        let subs = vec!["s1", "s2", "s3", "s4", "s5", "s6", "s7"];
        let graph = compute_mindmap_layout(&tree(vec![("A", subs)]), &LayoutStyle::interactive());
        assert_eq!(graph.nodes.len(), 1 + 1 + MAX_SUBTOPICS);
        assert_eq!(graph.edges.len(), 1 + MAX_SUBTOPICS);
        assert!(graph.find_text("s6").is_none());

        // Middle subtopic sits on the branch direction, 150 further out.
        let (mx, my) = graph.find_text("s3").unwrap().center();
        assert!(close(mx, 500.0) && close(my, -50.0));
        let (lx, _) = graph.find_text("s1").unwrap().center();
        let (rx, _) = graph.find_text("s5").unwrap().center();
        assert!(lx < mx && mx < rx);
    }

    #[test]
    fn single_subtopic_follows_branch_angle() {
        assert_eq!(subtopic_angle(1.0, 0, 1), 1.0);
        assert!(close(subtopic_angle(0.0, 0, 3), -PI / 6.0));
        assert!(close(subtopic_angle(0.0, 2, 3), PI / 6.0));
    }
}
