//! Local-maximum detection with height, distance and prominence criteria.
//!
//! Criteria are applied in the order height, distance, prominence. Flat
//! peaks (plateaus) are reported at their midpoint, rounded down.

/// Filters applied by [`find_peaks`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PeakCriteria {
    /// Minimum peak value.
    pub height: Option<f64>,
    /// Minimum prominence.
    pub prominence: Option<f64>,
    /// Minimum index distance between kept peaks (0 or 1 disables).
    pub distance: usize,
}

impl PeakCriteria {
    /// Criteria with only a prominence bound.
    pub fn prominence(prominence: f64) -> Self {
        Self {
            prominence: Some(prominence),
            ..Self::default()
        }
    }
}

/// Indices of strict local maxima, plateaus reported at their midpoint.
/// The first and last samples are never peaks.
pub fn local_maxima(x: &[f64]) -> Vec<usize> {
    let n = x.len();
    let mut peaks = Vec::new();
    if n < 3 {
        return peaks;
    }
    let mut i = 1;
    while i < n - 1 {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < n - 1 && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }
    peaks
}

/// Prominence of the peak at `peak`: its height above the higher of the two
/// lowest points reached before the signal climbs above it on either side.
pub fn peak_prominence(x: &[f64], peak: usize) -> f64 {
    let height = x[peak];

    let mut left_min = height;
    for &v in x[..=peak].iter().rev() {
        if v > height {
            break;
        }
        left_min = left_min.min(v);
    }

    let mut right_min = height;
    for &v in &x[peak..] {
        if v > height {
            break;
        }
        right_min = right_min.min(v);
    }

    height - left_min.max(right_min)
}

/// Find peaks of `x` satisfying `criteria`, in ascending index order.
pub fn find_peaks(x: &[f64], criteria: &PeakCriteria) -> Vec<usize> {
    let mut peaks = local_maxima(x);

    if let Some(height) = criteria.height {
        peaks.retain(|&p| x[p] >= height);
    }

    if criteria.distance > 1 && peaks.len() > 1 {
        peaks = select_by_distance(x, &peaks, criteria.distance);
    }

    if let Some(prominence) = criteria.prominence {
        peaks.retain(|&p| peak_prominence(x, p) >= prominence);
    }

    peaks
}

/// Drop peaks closer than `distance` to a taller kept peak.
fn select_by_distance(x: &[f64], peaks: &[usize], distance: usize) -> Vec<usize> {
    let mut keep = vec![true; peaks.len()];
    let mut order: Vec<usize> = (0..peaks.len()).collect();
    // Tallest first; ties resolved towards the later peak
    order.sort_by(|&a, &b| x[peaks[b]].total_cmp(&x[peaks[a]]).then(b.cmp(&a)));

    for &j in &order {
        if !keep[j] {
            continue;
        }
        for k in (0..j).rev() {
            if peaks[j] - peaks[k] >= distance {
                break;
            }
            keep[k] = false;
        }
        for k in j + 1..peaks.len() {
            if peaks[k] - peaks[j] >= distance {
                break;
            }
            keep[k] = false;
        }
    }

    peaks
        .iter()
        .zip(&keep)
        .filter_map(|(&p, &k)| k.then_some(p))
        .collect()
}
