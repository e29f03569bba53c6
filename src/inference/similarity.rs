// Relative-tolerance equality used by the cross-curve correlation rules
//
// Two positive values are "similar" when the larger one exceeds the smaller
// by less than a fraction `tolerance` of the smaller. The relation is
// symmetric but NOT transitive: similar(a, b) and similar(b, c) do not imply
// similar(a, c).

/// Default tolerance for generic comparisons
pub const DEFAULT_TOLERANCE: f64 = 0.2;

/// Returns true iff `max(a, b) / min(a, b) < 1 + tolerance`
///
/// Both inputs must be positive and finite. Zero, negative or non-finite
/// inputs never compare as similar (the ratio is meaningless for them).
///
/// # Example
/// ```
/// use cachescope::inference::similar;
///
/// assert!(similar(10.0, 11.0, 0.2)); // ratio 1.1
/// assert!(!similar(10.0, 13.0, 0.2)); // ratio 1.3
/// ```
pub fn similar(a: f64, b: f64, tolerance: f64) -> bool {
    if !(a.is_finite() && b.is_finite()) || a <= 0.0 || b <= 0.0 {
        return false;
    }
    a.max(b) / a.min(b) < 1.0 + tolerance
}
