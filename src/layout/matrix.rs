use super::*;

pub const CELL_WIDTH: f32 = 250.0;
pub const CELL_HEIGHT: f32 = 200.0;
pub const CELL_PADDING: f32 = 20.0;
pub const RISK_WIDTH: f32 = 90.0;
pub const RISK_HEIGHT: f32 = 40.0;
const SUB_COLUMN_STEP: f32 = 100.0;

pub(super) fn compute_matrix_layout(risks: &[RiskRecord], style: &LayoutStyle) -> Graph {
    let mut graph = Graph::new();

    // High impact on the top row.
    for impact in Level::ALL {
        for likelihood in Level::ALL {
            let label = format!("{} Impact / {} Likelihood", impact.title(), likelihood.title());
            graph.nodes.push(Node::group(
                label,
                cell_x(likelihood),
                cell_y(impact),
                CELL_WIDTH,
                CELL_HEIGHT,
            ));
        }
    }

    let mut occupancy = [[0usize; 3]; 3];
    for risk in risks {
        let slot = &mut occupancy[risk.impact.index()][risk.likelihood.index()];
        let count = *slot;
        *slot += 1;

        let x = cell_x(risk.likelihood) + CELL_PADDING + (count % 2) as f32 * SUB_COLUMN_STEP;
        let y = cell_y(risk.impact) + CELL_PADDING + (count / 2) as f32 * style.risk_row_step;
        graph.nodes.push(
            Node::text(risk.title.clone(), x, y, RISK_WIDTH, RISK_HEIGHT)
                .with_color(style.palette.risk(risk.score())),
        );
    }

    graph
}

fn cell_x(likelihood: Level) -> f32 {
    likelihood.index() as f32 * (CELL_WIDTH + CELL_PADDING)
}

fn cell_y(impact: Level) -> f32 {
    (2 - impact.index()) as f32 * (CELL_HEIGHT + CELL_PADDING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme;

    fn risk(title: &str, likelihood: Level, impact: Level) -> RiskRecord {
        RiskRecord {
            title: title.to_string(),
            likelihood,
            impact,
        }
    }

    #[test]
    fn grid_puts_high_impact_on_top() {
        let graph = compute_matrix_layout(&[], &LayoutStyle::interactive());
        let cells: Vec<&Node> = graph.groups().collect();
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0].label.as_deref(), Some("Low Impact / Low Likelihood"));
        assert_eq!((cells[0].x, cells[0].y), (0.0, 440.0));
        assert_eq!(cells[8].label.as_deref(), Some("High Impact / High Likelihood"));
        assert_eq!((cells[8].x, cells[8].y), (540.0, 0.0));
    }

    #[test]
    fn risks_fill_two_sub_columns() {
        let risks: Vec<RiskRecord> = (0..3)
            .map(|i| risk(&format!("r{i}"), Level::High, Level::High))
            .collect();
        let graph = compute_matrix_layout(&risks, &LayoutStyle::headless());
        let placed: Vec<(f32, f32)> = graph.content_nodes().map(|n| (n.x, n.y)).collect();
        assert_eq!(placed, vec![(560.0, 20.0), (660.0, 20.0), (560.0, 80.0)]);
        assert!(graph.content_nodes().all(|n| n.color.as_deref() == Some(theme::RED)));
    }

    #[test]
    fn color_follows_score() {
        let risks = vec![
            risk("low", Level::Low, Level::Low),
            risk("mid", Level::Low, Level::High),
            risk("two", Level::Medium, Level::Low),
        ];
        let graph = compute_matrix_layout(&risks, &LayoutStyle::interactive());
        assert_eq!(graph.find_text("low").unwrap().color.as_deref(), Some(theme::GREEN));
        assert_eq!(graph.find_text("mid").unwrap().color.as_deref(), Some(theme::ORANGE));
        assert_eq!(graph.find_text("two").unwrap().color.as_deref(), Some(theme::GREEN));
    }
}
