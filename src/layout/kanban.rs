use super::*;

pub const COLUMN_WIDTH: f32 = 250.0;
pub const COLUMN_PADDING: f32 = 20.0;
pub const HEADER_HEIGHT: f32 = 60.0;
pub const CARD_HEIGHT: f32 = 80.0;

pub(super) fn compute_kanban_layout(tasks: &[TaskRecord], style: &LayoutStyle) -> Graph {
    let mut per_column = [0usize; 4];
    for task in tasks {
        per_column[task.column.index()] += 1;
    }

    let mut graph = Graph::new();
    for column in Column::ALL {
        let idx = column.index();
        let height = match style.column_height {
            ColumnHeight::Fixed(height) => height,
            ColumnHeight::Computed => {
                HEADER_HEIGHT + (per_column[idx] as f32 + 1.0) * (CARD_HEIGHT + style.row_gap)
            }
        };
        graph
            .nodes
            .push(Node::group(column.title(), column_x(idx), 0.0, COLUMN_WIDTH, height));
    }

    let mut rows = [0usize; 4];
    for task in tasks {
        let idx = task.column.index();
        let row = rows[idx];
        rows[idx] += 1;

        let color = match style.task_coloring {
            TaskColoring::Priority => style.palette.priority(task.priority),
            TaskColoring::Column => style.palette.column(task.column),
        };
        let card = Node::text(
            task.title.clone(),
            column_x(idx) + COLUMN_PADDING,
            HEADER_HEIGHT + row as f32 * (CARD_HEIGHT + style.row_gap),
            COLUMN_WIDTH - COLUMN_PADDING * 2.0,
            CARD_HEIGHT,
        )
        .with_color(color);
        graph.nodes.push(card);
    }

    graph
}

fn column_x(idx: usize) -> f32 {
    idx as f32 * (COLUMN_WIDTH + COLUMN_PADDING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Priority;
    use crate::theme;

    fn task(title: &str, column: Column, priority: Priority) -> TaskRecord {
        TaskRecord {
            title: title.to_string(),
            column,
            priority,
        }
    }

    #[test]
    fn cards_stack_per_column() {
        let tasks = vec![
            task("a", Column::ToDo, Priority::High),
            task("b", Column::Done, Priority::Low),
            task("c", Column::ToDo, Priority::Medium),
        ];
        let graph = compute_kanban_layout(&tasks, &LayoutStyle::interactive());
        assert_eq!(graph.groups().count(), 4);

        let a = graph.find_text("a").unwrap();
        let b = graph.find_text("b").unwrap();
        let c = graph.find_text("c").unwrap();
        assert_eq!((a.x, a.y, a.width, a.height), (20.0, 60.0, 210.0, 80.0));
        assert_eq!((c.x, c.y), (20.0, 150.0));
        assert_eq!((b.x, b.y), (830.0, 60.0));
        assert_eq!(a.color.as_deref(), Some(theme::RED));
        assert_eq!(b.color.as_deref(), Some(theme::GREEN));
        assert_eq!(c.color.as_deref(), Some(theme::YELLOW));
    }

    #[test]
    fn column_coloring_and_computed_height() {
        let tasks = vec![
            task("a", Column::InProgress, Priority::High),
            task("b", Column::InProgress, Priority::Low),
        ];
        let graph = compute_kanban_layout(&tasks, &LayoutStyle::headless());
        let groups: Vec<&Node> = graph.groups().collect();
        assert_eq!(groups[0].height, 60.0 + 100.0);
        assert_eq!(groups[1].height, 60.0 + 3.0 * 100.0);
        assert_eq!(groups[1].x, 270.0);
        assert_eq!(groups[1].label.as_deref(), Some("In Progress"));

        let b = graph.find_text("b").unwrap();
        assert_eq!(b.y, 60.0 + 100.0);
        assert_eq!(b.color.as_deref(), Some(theme::YELLOW));
    }

    #[test]
    fn fixed_height_ignores_card_count() {
        let tasks: Vec<TaskRecord> = (0..20)
            .map(|i| task(&format!("t{i}"), Column::Review, Priority::Medium))
            .collect();
        let graph = compute_kanban_layout(&tasks, &LayoutStyle::interactive());
        assert!(graph.groups().all(|g| g.height == 800.0));
    }
}
