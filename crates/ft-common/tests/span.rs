use super::*;

#[test]
fn half_open_len() {
    let s = Span::new(3, 10);
    assert_eq!(s.len(), 7);
    assert!(!s.is_empty());
}

#[test]
fn dummy_span_is_detected() {
    assert!(Span::dummy().is_dummy());
    assert!(!Span::new(0, 1).is_dummy());
}

#[test]
fn merge_covers_both() {
    let a = Span::new(5, 10);
    let b = Span::new(2, 7);
    let merged = a.merge(b);
    assert_eq!(merged, Span::new(2, 10));
}

#[test]
fn slice_safe_clamps_to_text_bounds() {
    let s = Span::new(2, 100);
    assert_eq!(s.slice_safe("hi"), "");
    assert_eq!(Span::new(0, 2).slice_safe("hi"), "hi");
}
