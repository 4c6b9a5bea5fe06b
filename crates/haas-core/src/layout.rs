// ── Dashboard layout assignment ──
//
// Pure, deterministic placement of an ordered chart list onto a
// fixed-column grid. Same input, same placements.

use serde::Serialize;

use crate::model::RemoteId;

/// Columns per dashboard row.
pub const GRID_COLUMNS: usize = 2;
/// Superset grids are 12 units wide.
pub const GRID_WIDTH: u32 = 12;
/// Cell height in Superset grid units.
pub const CELL_HEIGHT: u32 = 50;

/// Where one chart sits on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub chart: RemoteId,
    pub row: usize,
    pub col: usize,
    pub width: u32,
    pub height: u32,
}

/// Place `chart_ids` row by row: `col = i % columns`, `row = i / columns`.
///
/// Every cell is `GRID_WIDTH / columns` wide and `CELL_HEIGHT` tall; with
/// the default two columns that is a half-width cell. A column count of
/// zero is treated as one.
pub fn assign(chart_ids: &[RemoteId], columns: usize) -> Vec<Placement> {
    let columns = columns.max(1);
    let width = u32::try_from(columns).map_or(1, |c| (GRID_WIDTH / c).max(1));

    chart_ids
        .iter()
        .enumerate()
        .map(|(index, &chart)| Placement {
            chart,
            row: index / columns,
            col: index % columns,
            width,
            height: CELL_HEIGHT,
        })
        .collect()
}

/// Convert placements to the API crate's wire type.
pub(crate) fn to_chart_positions(placements: &[Placement]) -> Vec<haas_api::ChartPosition> {
    placements
        .iter()
        .map(|p| haas_api::ChartPosition {
            chart_id: p.chart.get(),
            row: p.row,
            col: p.col,
            width: p.width,
            height: p.height,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn ids(raw: &[i64]) -> Vec<RemoteId> {
        raw.iter().copied().map(RemoteId).collect()
    }

    #[test]
    fn two_column_grid() {
        let placements = assign(&ids(&[5, 9, 12, 7]), GRID_COLUMNS);

        let cells: Vec<(i64, usize, usize)> = placements
            .iter()
            .map(|p| (p.chart.get(), p.row, p.col))
            .collect();
        assert_eq!(cells, vec![(5, 0, 0), (9, 0, 1), (12, 1, 0), (7, 1, 1)]);

        assert!(placements.iter().all(|p| p.width == 6 && p.height == CELL_HEIGHT));
    }

    #[test]
    fn odd_count_leaves_last_row_half_full() {
        let placements = assign(&ids(&[1, 2, 3]), GRID_COLUMNS);
        let last = placements.last().expect("three placements");
        assert_eq!((last.row, last.col), (1, 0));
    }

    #[test]
    fn empty_input_gives_empty_layout() {
        assert!(assign(&[], GRID_COLUMNS).is_empty());
    }

    #[test]
    fn deterministic_for_same_input() {
        let input = ids(&[40, 41, 42, 43, 44]);
        assert_eq!(assign(&input, GRID_COLUMNS), assign(&input, GRID_COLUMNS));
    }

    #[test]
    fn zero_columns_degrades_to_single_column() {
        let placements = assign(&ids(&[1, 2]), 0);
        assert_eq!(placements[1].row, 1);
        assert_eq!(placements[1].col, 0);
        assert_eq!(placements[1].width, GRID_WIDTH);
    }

    #[test]
    fn wire_positions_keep_coordinates() {
        let positions = to_chart_positions(&assign(&ids(&[5, 9]), GRID_COLUMNS));
        assert_eq!(positions[1].chart_id, 9);
        assert_eq!(positions[1].col, 1);
        assert_eq!(positions[1].width, 6);
    }
}
