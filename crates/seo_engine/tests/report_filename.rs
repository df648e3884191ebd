use seo_engine::report_filename;

#[test]
fn filename_is_deterministic_and_safe() {
    let name = report_filename("https://Example.com/blog/My Post?x=1", "json");
    assert!(name.starts_with("example-com-blog-my-post-x-1--"));
    assert!(name.ends_with(".json"));
    assert!(!name.contains('/'));

    assert_eq!(
        name,
        report_filename("https://Example.com/blog/My Post?x=1", "json")
    );
}

#[test]
fn distinct_targets_with_same_slug_differ_by_hash() {
    let a = report_filename("https://a.com/x", "pdf");
    let b = report_filename("http://a.com/x", "pdf");
    assert_ne!(a, b);
    assert_eq!(a.split("--").next(), b.split("--").next());
}

#[test]
fn empty_slug_falls_back() {
    let name = report_filename("https://", "json");
    assert!(name.starts_with("report--"));
}
