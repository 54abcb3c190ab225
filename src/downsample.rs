/// Reduce an oversized sequence to at most `max_points` strided elements
/// plus the guaranteed final element. The stride is `ceil(len / max_points)`;
/// every stride-th element is kept by index, and the last element is always
/// included even when the stride would skip it, so the series' true endpoint
/// survives. Deterministic, order-preserving decimation; not a statistical
/// resample.
pub fn downsample<T: Clone>(items: &[T], max_points: usize) -> Vec<T> {
    if max_points == 0 || items.len() <= max_points {
        return items.to_vec();
    }

    let step = items.len().div_ceil(max_points);
    let last = items.len() - 1;
    let mut kept: Vec<T> = items
        .iter()
        .step_by(step)
        .cloned()
        .collect();
    if last % step != 0 {
        kept.push(items[last].clone());
    }
    kept
}
