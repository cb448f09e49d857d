pub const EPSILON: f64 = 1e-9;

/// True when `value` is within `EPSILON` of zero.
pub fn approx_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

/// True when `a` and `b` differ by less than `EPSILON`.
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_comparisons() {
        assert!(approx_zero(0.0));
        assert!(approx_zero(1e-10));
        assert!(!approx_zero(1e-8));
        assert!(approx_eq(4.0, 4.0 + 1e-10));
        assert!(!approx_eq(4.0, 4.1));
        assert!(!approx_eq(f64::INFINITY, 0.0));
    }
}
