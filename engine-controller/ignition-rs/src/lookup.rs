/// Index of the breakpoint closest to `value`, the lower index on a tie.
///
/// Returns `None` for an empty axis. Runs in one pass without allocating
/// so it can be called from the recompute interrupt.
pub fn find_nearest_neighbor(axis: &[i32], value: i32) -> Option<usize> {
    let mut nearest: Option<(usize, u32)> = None;

    for (index, breakpoint) in axis.iter().enumerate() {
        let distance = breakpoint.abs_diff(value);

        match nearest {
            Some((_, best)) if distance >= best => {}
            _ => nearest = Some((index, distance)),
        }
    }

    nearest.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_closest() {
        assert_eq!(find_nearest_neighbor(&[0, 50, 100], 48), Some(1));
        assert_eq!(find_nearest_neighbor(&[1000, 3000, 5000], 2900), Some(1));
        assert_eq!(find_nearest_neighbor(&[1000, 3000, 5000], 4100), Some(2));
    }

    #[test]
    fn test_clamps_outside_axis() {
        assert_eq!(find_nearest_neighbor(&[10, 20, 30], -500), Some(0));
        assert_eq!(find_nearest_neighbor(&[10, 20, 30], 9000), Some(2));
    }

    #[test]
    fn test_tie_prefers_lower_index() {
        assert_eq!(find_nearest_neighbor(&[0, 50, 100], 25), Some(0));
        assert_eq!(find_nearest_neighbor(&[0, 50, 100], 75), Some(1));
    }

    #[test]
    fn test_exact_match() {
        assert_eq!(find_nearest_neighbor(&[550, 950, 1200], 1200), Some(2));
    }

    #[test]
    fn test_empty_axis() {
        assert_eq!(find_nearest_neighbor(&[], 42), None);
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        assert_eq!(find_nearest_neighbor(&[i32::MIN, 0, i32::MAX], i32::MAX - 1), Some(2));
        assert_eq!(find_nearest_neighbor(&[i32::MIN, i32::MAX], 0), Some(1));
    }
}
