use super::{Node, Side};

// ── Edge side selection ──────────────────────────────────────────────
/// Snaps the displacement between two centers to a compass direction.
/// The dominant axis wins; ties go vertical.
pub fn closest_sides(from: (f32, f32), to: (f32, f32)) -> (Side, Side) {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;

    if dx.abs() > dy.abs() {
        if dx >= 0.0 {
            (Side::Right, Side::Left)
        } else {
            (Side::Left, Side::Right)
        }
    } else if dy >= 0.0 {
        (Side::Bottom, Side::Top)
    } else {
        (Side::Top, Side::Bottom)
    }
}

/// Midpoint of the given side of a node's bounding box.
pub fn anchor_point(node: &Node, side: Side) -> (f32, f32) {
    let (cx, cy) = node.center();
    match side {
        Side::Left => (node.x, cy),
        Side::Right => (node.x + node.width, cy),
        Side::Top => (cx, node.y),
        Side::Bottom => (cx, node.y + node.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_displacement_uses_left_right() {
        assert_eq!(closest_sides((0.0, 0.0), (100.0, 20.0)), (Side::Right, Side::Left));
        assert_eq!(closest_sides((0.0, 0.0), (-100.0, 20.0)), (Side::Left, Side::Right));
    }

    #[test]
    fn vertical_displacement_uses_top_bottom() {
        assert_eq!(closest_sides((0.0, 0.0), (10.0, 80.0)), (Side::Bottom, Side::Top));
        assert_eq!(closest_sides((0.0, 0.0), (10.0, -80.0)), (Side::Top, Side::Bottom));
        assert_eq!(closest_sides((0.0, 0.0), (50.0, 50.0)), (Side::Bottom, Side::Top));
    }

    #[test]
    fn anchors_sit_on_box_edges() {
        let node = Node::text("n", 10.0, 20.0, 100.0, 40.0);
        assert_eq!(anchor_point(&node, Side::Left), (10.0, 40.0));
        assert_eq!(anchor_point(&node, Side::Bottom), (60.0, 60.0));
    }
}
