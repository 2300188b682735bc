use meterwire_core::tags::{classify, LabelSet, Outcome, RequestOutcome, RouteTagsProvider, TagsProvider};

#[test]
fn unmatched_request_is_unknown() {
    for status in [200, 302, 404, 500] {
        let labels = classify(None, status, None);
        assert_eq!(labels.route(), "unknown", "status {status}");
    }
}

#[test]
fn root_path_is_root() {
    assert_eq!(classify(Some("/"), 200, None).route(), "root");
    assert_eq!(classify(Some(""), 200, None).route(), "root");
    assert_eq!(classify(Some("   "), 500, None).route(), "root");
}

#[test]
fn redirects_collapse_into_one_bucket() {
    for (path, status) in [("/hello/:name", 301), ("/hi/:name", 302), ("/", 307), ("/boom", 399)] {
        assert_eq!(classify(Some(path), status, None).route(), "REDIRECTION");
    }
    assert_eq!(classify(Some("/boom"), 400, None).route(), "/boom");
}

#[test]
fn not_found_from_matched_route() {
    assert_eq!(classify(Some("/hello/:name"), 404, None).route(), "NOT_FOUND");
    assert_eq!(classify(Some("/"), 404, None).route(), "NOT_FOUND");
}

#[test]
fn template_is_kept_verbatim() {
    let labels = classify(Some("/hello/:name"), 200, None);
    assert_eq!(labels.route(), "/hello/:name");
    assert_eq!(labels.exception(), "None");
}

#[test]
fn exception_name_is_passed_through() {
    let labels = classify(Some("/boom"), 500, Some("IllegalArgumentException"));
    assert_eq!(labels.route(), "/boom");
    assert_eq!(labels.exception(), "IllegalArgumentException");
}

#[test]
fn blank_exception_name_degrades_to_none() {
    assert_eq!(classify(Some("/boom"), 500, Some("")).exception(), "None");
    assert_eq!(classify(Some("/boom"), 500, Some(" ")).exception(), "None");
}

#[test]
fn label_set_always_has_route_then_exception() {
    let labels = classify(None, 0, None);
    let keys: Vec<_> = labels.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, LabelSet::KEYS);
    let values: Vec<_> = labels.iter().map(|(_, v)| v).collect();
    assert_eq!(values, ["unknown", "None"]);
}

#[test]
fn outcome_follows_status_class() {
    assert_eq!(Outcome::from_status(101), Outcome::Informational);
    assert_eq!(Outcome::from_status(204), Outcome::Success);
    assert_eq!(Outcome::from_status(308), Outcome::Redirection);
    assert_eq!(Outcome::from_status(404).as_str(), "CLIENT_ERROR");
    assert_eq!(Outcome::from_status(503).as_str(), "SERVER_ERROR");
    assert_eq!(Outcome::from_status(42), Outcome::Unknown);
}

#[test]
fn default_provider_matches_classify() {
    let outcome = RequestOutcome::new(Some("/hi/:name"), 200, None);
    assert_eq!(RouteTagsProvider.tags(&outcome), classify(Some("/hi/:name"), 200, None));
}

fn dash_for_unmatched(o: &RequestOutcome<'_>) -> LabelSet {
    LabelSet::new(o.matched_path.unwrap_or("-"), "x")
}

#[test]
fn plain_functions_are_providers() {
    let labels = dash_for_unmatched.tags(&RequestOutcome::new(None, 200, None));
    assert_eq!(labels, LabelSet::new("-", "x"));
}
