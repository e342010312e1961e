//! Trailing-window helpers over optional samples

/// Apply `f` to every trailing window of `window` samples.
///
/// The first `window - 1` outputs are `None`, as is any window containing a
/// missing sample.
pub(crate) fn rolling<F>(values: &[Option<f64>], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    rolling_from(values, 0, window, f)
}

/// Like [`rolling`], but windows never reach back before index `first`.
///
/// Used for return series whose leading entries cannot exist: the window
/// ending at `window - 1` then holds `window - first` samples.
pub(crate) fn rolling_from<F>(
    values: &[Option<f64>],
    first: usize,
    window: usize,
    f: F,
) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut buf = Vec::with_capacity(window);
    (0..values.len())
        .map(|t| {
            if window == 0 || t + 1 < window {
                return None;
            }
            let lo = (t + 1 - window).max(first);
            if lo > t {
                return None;
            }
            buf.clear();
            for v in &values[lo..=t] {
                buf.push((*v)?);
            }
            f(&buf)
        })
        .collect()
}

/// Running count of defined samples up to and including each index
pub(crate) fn cumulative_count(values: &[Option<f64>]) -> Vec<usize> {
    values
        .iter()
        .scan(0, |count, v| {
            *count += usize::from(v.is_some());
            Some(*count)
        })
        .collect()
}

/// Log returns between consecutive samples; index 0 is always `None`
pub(crate) fn log_returns(prices: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(prices.len());
    out.push(None);
    for pair in prices.windows(2) {
        out.push(match (pair[0], pair[1]) {
            (Some(prev), Some(curr)) => Some((curr / prev).ln()),
            _ => None,
        });
    }
    out.truncate(prices.len());
    out
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (N - 1 denominator)
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}
