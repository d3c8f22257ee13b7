use heapless::Vec;
use serde::{Deserialize, Serialize};

pub const MAX_TABLE_AXIS_LEN: usize = 24;
pub const DEFAULT_TABLE_AXIS_LEN: usize = 12;

pub type TableAxisValues = Vec<i32, MAX_TABLE_AXIS_LEN>;
pub type TableRow = Vec<i32, MAX_TABLE_AXIS_LEN>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableAxis {
    Load,
    Speed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdvanceTableError {
    AxisTooLong(TableAxis),
    AxisNotAscending(TableAxis),
    RowCountMismatch { rows: usize, load_axis_len: usize },
    RowLengthMismatch { row: usize, len: usize, speed_axis_len: usize },
}

/// Spark advance calibration over load (rows) and speed (columns).
///
/// Cells are in tenths of a degree. The table is immutable once built;
/// every constructor and the store's decoder go through the same shape
/// checks, so a table that exists is a table that can be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceTable {
    load_axis: TableAxisValues,
    speed_axis: TableAxisValues,
    cells: Vec<TableRow, MAX_TABLE_AXIS_LEN>,
}

impl AdvanceTable {
    pub fn new<R: AsRef<[i32]>>(
        load_axis: &[i32],
        speed_axis: &[i32],
        rows: &[R],
    ) -> Result<Self, AdvanceTableError> {
        let load_axis = Self::collect_axis(TableAxis::Load, load_axis)?;
        let speed_axis = Self::collect_axis(TableAxis::Speed, speed_axis)?;

        if rows.len() != load_axis.len() {
            return Err(AdvanceTableError::RowCountMismatch {
                rows: rows.len(),
                load_axis_len: load_axis.len(),
            });
        }

        let mut cells = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != speed_axis.len() {
                return Err(AdvanceTableError::RowLengthMismatch {
                    row: index,
                    len: row.len(),
                    speed_axis_len: speed_axis.len(),
                });
            }

            // Lengths were checked against the axes, which fit the capacity
            let _ = cells.push(Vec::from_slice(row).unwrap_or_default());
        }

        Ok(Self {
            load_axis,
            speed_axis,
            cells,
        })
    }

    /// Table with both axes empty. Never yields a value.
    pub const fn empty() -> Self {
        Self {
            load_axis: Vec::new(),
            speed_axis: Vec::new(),
            cells: Vec::new(),
        }
    }

    pub fn axis(&self, axis: TableAxis) -> &[i32] {
        match axis {
            TableAxis::Load => &self.load_axis,
            TableAxis::Speed => &self.speed_axis,
        }
    }

    pub fn value_at(&self, load_index: usize, speed_index: usize) -> Option<i32> {
        self.cells.get(load_index)?.get(speed_index).copied()
    }

    pub fn rows(&self) -> usize {
        self.load_axis.len()
    }

    pub fn cols(&self) -> usize {
        self.speed_axis.len()
    }

    /// Re-runs the constructor checks, for tables that arrived through serde.
    pub fn verify_shape(&self) -> Result<(), AdvanceTableError> {
        Self::check_ascending(TableAxis::Load, &self.load_axis)?;
        Self::check_ascending(TableAxis::Speed, &self.speed_axis)?;

        if self.cells.len() != self.load_axis.len() {
            return Err(AdvanceTableError::RowCountMismatch {
                rows: self.cells.len(),
                load_axis_len: self.load_axis.len(),
            });
        }

        for (index, row) in self.cells.iter().enumerate() {
            if row.len() != self.speed_axis.len() {
                return Err(AdvanceTableError::RowLengthMismatch {
                    row: index,
                    len: row.len(),
                    speed_axis_len: self.speed_axis.len(),
                });
            }
        }

        Ok(())
    }

    fn collect_axis(axis: TableAxis, values: &[i32]) -> Result<TableAxisValues, AdvanceTableError> {
        let collected =
            Vec::from_slice(values).map_err(|_| AdvanceTableError::AxisTooLong(axis))?;
        Self::check_ascending(axis, &collected)?;

        Ok(collected)
    }

    fn check_ascending(axis: TableAxis, values: &[i32]) -> Result<(), AdvanceTableError> {
        if values.windows(2).all(|pair| pair[0] < pair[1]) {
            Ok(())
        } else {
            Err(AdvanceTableError::AxisNotAscending(axis))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_table() -> AdvanceTable {
        AdvanceTable::new(
            &[0, 50, 100],
            &[1000, 3000, 5000],
            &[[160, 200, 260], [150, 190, 250], [140, 180, 240]],
        )
        .unwrap()
    }

    #[test]
    fn test_value_at_row_is_load_column_is_speed() {
        let table = small_table();

        assert_eq!(table.value_at(0, 2), Some(260));
        assert_eq!(table.value_at(2, 0), Some(140));
        assert_eq!(table.value_at(1, 1), Some(190));
        assert_eq!(table.rows(), 3);
        assert_eq!(table.cols(), 3);
    }

    #[test]
    fn test_value_at_outside_grid() {
        let table = small_table();

        assert_eq!(table.value_at(3, 0), None);
        assert_eq!(table.value_at(0, 3), None);
        assert_eq!(AdvanceTable::empty().value_at(0, 0), None);
    }

    #[test]
    fn test_axis_accessor() {
        let table = small_table();

        assert_eq!(table.axis(TableAxis::Load), &[0, 50, 100]);
        assert_eq!(table.axis(TableAxis::Speed), &[1000, 3000, 5000]);
    }

    #[test]
    fn test_rejects_unordered_axis() {
        let result = AdvanceTable::new(&[0, 50, 50], &[1000], &[[1], [2], [3]]);
        assert_eq!(result, Err(AdvanceTableError::AxisNotAscending(TableAxis::Load)));

        let result = AdvanceTable::new(&[0], &[3000, 1000], &[[1, 2]]);
        assert_eq!(result, Err(AdvanceTableError::AxisNotAscending(TableAxis::Speed)));
    }

    #[test]
    fn test_rejects_grid_mismatch() {
        let result = AdvanceTable::new(&[0, 50], &[1000, 2000], &[[1, 2]]);
        assert_eq!(
            result,
            Err(AdvanceTableError::RowCountMismatch {
                rows: 1,
                load_axis_len: 2
            })
        );

        let rows: [&[i32]; 2] = [&[1, 2], &[3]];
        let result = AdvanceTable::new(&[0, 50], &[1000, 2000], &rows);
        assert_eq!(
            result,
            Err(AdvanceTableError::RowLengthMismatch {
                row: 1,
                len: 1,
                speed_axis_len: 2
            })
        );
    }

    #[test]
    fn test_rejects_axis_over_capacity() {
        let axis = [0_i32; MAX_TABLE_AXIS_LEN + 1];
        let rows: [[i32; 1]; 0] = [];
        let result = AdvanceTable::new(&axis, &[1], &rows);

        assert_eq!(result, Err(AdvanceTableError::AxisTooLong(TableAxis::Load)));
    }

    #[test]
    fn test_full_size_table() {
        let mut axis = [0_i32; MAX_TABLE_AXIS_LEN];
        for (i, value) in axis.iter_mut().enumerate() {
            *value = (i as i32) * 500;
        }
        let rows = [[120_i32; MAX_TABLE_AXIS_LEN]; MAX_TABLE_AXIS_LEN];

        let table = AdvanceTable::new(&axis, &axis, &rows).unwrap();
        assert_eq!(table.value_at(23, 23), Some(120));
        assert!(table.verify_shape().is_ok());
    }
}
