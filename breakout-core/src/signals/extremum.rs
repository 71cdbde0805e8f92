//! Extremum detector.

use crate::domain::BreakoutMode;

/// Whether the last element of `numbers` is the window's maximum (`Max`) or
/// minimum (`Min`). Ties count. An empty slice never fires.
pub fn detected(numbers: &[f64], mode: BreakoutMode) -> bool {
    let Some(&last) = numbers.last() else {
        return false;
    };
    match mode {
        BreakoutMode::Max => numbers.iter().all(|&v| v <= last),
        BreakoutMode::Min => numbers.iter().all(|&v| v >= last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fires_on_new_high() {
        assert!(detected(&[1.0, 3.0, 2.0, 4.0], BreakoutMode::Max));
        assert!(!detected(&[1.0, 3.0, 2.0, 4.0], BreakoutMode::Min));
    }

    #[test]
    fn fires_on_new_low() {
        assert!(detected(&[5.0, 3.0, 4.0, 1.0], BreakoutMode::Min));
        assert!(!detected(&[5.0, 3.0, 4.0, 1.0], BreakoutMode::Max));
    }

    #[test]
    fn ties_count_as_extreme() {
        assert!(detected(&[2.0, 2.0, 2.0], BreakoutMode::Max));
        assert!(detected(&[2.0, 2.0, 2.0], BreakoutMode::Min));
    }

    #[test]
    fn empty_and_nan() {
        assert!(!detected(&[], BreakoutMode::Max));
        assert!(!detected(&[1.0, f64::NAN], BreakoutMode::Max));
        assert!(detected(&[7.0], BreakoutMode::Min));
    }

    proptest! {
        #[test]
        fn matches_last_equals_extreme(values in prop::collection::vec(-1e6..1e6_f64, 1..50)) {
            let last = *values.last().unwrap();
            let max = values.iter().cloned().fold(f64::MIN, f64::max);
            let min = values.iter().cloned().fold(f64::MAX, f64::min);
            prop_assert_eq!(detected(&values, BreakoutMode::Max), last == max);
            prop_assert_eq!(detected(&values, BreakoutMode::Min), last == min);
        }
    }
}
