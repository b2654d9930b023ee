use lmsr_markets::domain::Fixed;

/// Assert `actual` is within `tolerance_raw` raw units (1e-18) of `expected`.
pub fn assert_fixed_near(actual: Fixed, expected: Fixed, tolerance_raw: i128) {
    let diff = (actual.raw() - expected.raw()).abs();
    assert!(
        diff <= tolerance_raw,
        "expected {expected} ± {tolerance_raw} raw units, got {actual}"
    );
}

/// Parse a decimal literal into `Fixed`.
pub fn fixed(text: &str) -> Fixed {
    text.parse().unwrap_or_else(|e| panic!("bad fixed literal {text}: {e}"))
}
