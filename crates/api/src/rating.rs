/// Evaluation-type codes as stored in `evaluation_type.code`.
pub const BINARY: &str = "BINARY";
pub const HIGHER_BETTER_SUM: &str = "HIGHER_BETTER_SUM";
pub const HIGHER_BETTER_PCT: &str = "HIGHER_BETTER_PCT";
pub const LOWER_BETTER_SUM: &str = "LOWER_BETTER_SUM";
pub const LOWER_BETTER_PCT: &str = "LOWER_BETTER_PCT";

/// Whether an achieved value meets its goal under the given evaluation
/// type. Unknown codes never pass; the UI renders the result as a
/// green/red indicator only.
pub fn rate_kpi(achieved: f64, goal: f64, code: &str) -> bool {
    match code {
        BINARY => achieved == goal,
        HIGHER_BETTER_SUM | HIGHER_BETTER_PCT => achieved >= goal,
        LOWER_BETTER_SUM | LOWER_BETTER_PCT => achieved <= goal,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_requires_exact_match() {
        assert!(rate_kpi(1.0, 1.0, BINARY));
        assert!(!rate_kpi(0.0, 1.0, BINARY));
        assert!(!rate_kpi(1.0001, 1.0, BINARY));
    }

    #[test]
    fn higher_is_better_passes_at_or_above_goal() {
        for code in [HIGHER_BETTER_SUM, HIGHER_BETTER_PCT] {
            assert!(rate_kpi(10.0, 10.0, code));
            assert!(rate_kpi(12.5, 10.0, code));
            assert!(!rate_kpi(9.9, 10.0, code));
        }
    }

    #[test]
    fn lower_is_better_passes_at_or_below_goal() {
        for code in [LOWER_BETTER_SUM, LOWER_BETTER_PCT] {
            assert!(rate_kpi(10.0, 10.0, code));
            assert!(rate_kpi(3.0, 10.0, code));
            assert!(!rate_kpi(10.1, 10.0, code));
        }
    }

    #[test]
    fn unknown_codes_never_pass() {
        assert!(!rate_kpi(1.0, 1.0, "UNKNOWN"));
        assert!(!rate_kpi(1.0, 1.0, ""));
        assert!(!rate_kpi(1.0, 1.0, "binary"));
    }

    #[test]
    fn nan_never_passes() {
        assert!(!rate_kpi(f64::NAN, 1.0, BINARY));
        assert!(!rate_kpi(f64::NAN, 1.0, HIGHER_BETTER_SUM));
        assert!(!rate_kpi(f64::NAN, 1.0, LOWER_BETTER_PCT));
    }
}
