// Dashboard `position_json` (layout v2) rendering
//
// Superset stores a dashboard's grid as a flat map of component nodes:
// ROOT_ID -> GRID_ID -> ROW-n -> CHART-<id>. Widths are in 12-column units.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

/// One chart cell on the dashboard grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartPosition {
    pub chart_id: i64,
    pub row: usize,
    pub col: usize,
    pub width: u32,
    pub height: u32,
}

/// Render chart positions into a `position_json` tree.
///
/// Rows are emitted in ascending order, and charts inside a row by column.
pub fn position_json(positions: &[ChartPosition]) -> Value {
    let mut rows: BTreeMap<usize, Vec<&ChartPosition>> = BTreeMap::new();
    for pos in positions {
        rows.entry(pos.row).or_default().push(pos);
    }

    let mut nodes = Map::new();
    nodes.insert("DASHBOARD_VERSION_KEY".into(), json!("v2"));
    nodes.insert(
        "ROOT_ID".into(),
        json!({ "type": "ROOT", "id": "ROOT_ID", "children": ["GRID_ID"] }),
    );

    let mut row_ids = Vec::with_capacity(rows.len());
    for (row, mut cells) in rows {
        cells.sort_by_key(|c| c.col);
        let row_id = format!("ROW-{row}");

        let mut chart_ids = Vec::with_capacity(cells.len());
        for cell in cells {
            let chart_key = format!("CHART-{}", cell.chart_id);
            nodes.insert(
                chart_key.clone(),
                json!({
                    "type": "CHART",
                    "id": chart_key,
                    "children": [],
                    "parents": ["ROOT_ID", "GRID_ID", row_id],
                    "meta": {
                        "chartId": cell.chart_id,
                        "width": cell.width,
                        "height": cell.height,
                    },
                }),
            );
            chart_ids.push(chart_key);
        }

        nodes.insert(
            row_id.clone(),
            json!({
                "type": "ROW",
                "id": row_id,
                "children": chart_ids,
                "parents": ["ROOT_ID", "GRID_ID"],
                "meta": { "background": "BACKGROUND_TRANSPARENT" },
            }),
        );
        row_ids.push(row_id);
    }

    nodes.insert(
        "GRID_ID".into(),
        json!({
            "type": "GRID",
            "id": "GRID_ID",
            "children": row_ids,
            "parents": ["ROOT_ID"],
        }),
    );

    Value::Object(nodes)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn cell(chart_id: i64, row: usize, col: usize) -> ChartPosition {
        ChartPosition {
            chart_id,
            row,
            col,
            width: 6,
            height: 50,
        }
    }

    #[test]
    fn empty_layout_has_root_and_grid() {
        let tree = position_json(&[]);
        assert_eq!(tree["ROOT_ID"]["children"], json!(["GRID_ID"]));
        assert_eq!(tree["GRID_ID"]["children"], json!([]));
    }

    #[test]
    fn charts_are_grouped_into_rows() {
        let tree = position_json(&[cell(5, 0, 0), cell(9, 0, 1), cell(12, 1, 0)]);

        assert_eq!(tree["GRID_ID"]["children"], json!(["ROW-0", "ROW-1"]));
        assert_eq!(tree["ROW-0"]["children"], json!(["CHART-5", "CHART-9"]));
        assert_eq!(tree["ROW-1"]["children"], json!(["CHART-12"]));
        assert_eq!(tree["CHART-12"]["meta"]["chartId"], json!(12));
        assert_eq!(tree["CHART-9"]["meta"]["width"], json!(6));
        assert_eq!(
            tree["CHART-9"]["parents"],
            json!(["ROOT_ID", "GRID_ID", "ROW-0"])
        );
    }

    #[test]
    fn row_order_follows_column_not_input_order() {
        let tree = position_json(&[cell(9, 0, 1), cell(5, 0, 0)]);
        assert_eq!(tree["ROW-0"]["children"], json!(["CHART-5", "CHART-9"]));
    }
}
