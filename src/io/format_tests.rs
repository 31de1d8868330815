use crate::io::format::{round_9dp, scientific_17_9, triplet_17_9};

#[test]
fn test_format_round_9dp() {
    assert_eq!(round_9dp(2.0820000004), 2.082);
    assert_eq!(round_9dp(2.0820000006), 2.082000001);
    assert_eq!(round_9dp(-4.164), -4.164);
}

#[test]
fn test_format_round_9dp_folds_negative_zero() {
    let rounded = round_9dp(-1.0e-12);
    assert_eq!(rounded, 0.0);
    assert!(rounded.is_sign_positive());
    assert!(round_9dp(-0.0).is_sign_positive());
}

#[test]
fn test_format_scientific_17_9() {
    assert_eq!(scientific_17_9(2.082), "  2.082000000E+00");
    assert_eq!(scientific_17_9(-4.164), " -4.164000000E+00");
    assert_eq!(scientific_17_9(0.5), "  5.000000000E-01");
    assert_eq!(scientific_17_9(0.0), "  0.000000000E+00");
}

#[test]
fn test_format_scientific_17_9_width() {
    for value in [0.0, 1.0, -1.0, 123.456, -0.000987] {
        assert_eq!(scientific_17_9(value).len(), 17);
    }
}

#[test]
fn test_format_scientific_17_9_no_negative_zero() {
    assert_eq!(scientific_17_9(-0.0), "  0.000000000E+00");
    assert_eq!(scientific_17_9(-4.9e-10), "  0.000000000E+00");
}

#[test]
fn test_format_triplet_17_9() {
    assert_eq!(
        triplet_17_9(&[0.0, -2.082, -2.082]),
        "  0.000000000E+00  -2.082000000E+00  -2.082000000E+00"
    );
}
