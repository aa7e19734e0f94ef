/// A simple statistics module with some utility functions such as calculation of percentiles.
use statrs::statistics::{Data, OrderStatistics};

pub fn percentile(numbers: &[f64], percentile: usize) -> f64 {
    let numbers = numbers.to_vec();
    let mut data = Data::new(numbers);

    data.percentile(percentile)
}

/// Index and value of the largest entry, earliest index winning ties.
pub fn peak(numbers: &[f64]) -> Option<(usize, f64)> {
    numbers
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (idx, value)| match best {
            Some((_, best_value)) if best_value >= value => best,
            _ => Some((idx, value)),
        })
}
