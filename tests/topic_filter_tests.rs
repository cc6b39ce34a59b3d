use tripllm::topic_filter::{is_travel_related, matched_keyword, TRAVEL_KEYWORDS};

#[test]
fn accepts_requests_with_travel_terms() {
    assert!(is_travel_related("Plan a trip to Kyoto"));
    assert!(is_travel_related(
        "Plan a 7-day trip to Kyoto for two, focusing on culture and food, with a moderate budget."
    ));
    assert!(is_travel_related("Cheapest FLIGHT to Lisbon?"));
    assert!(is_travel_related("Where should we go for our honeymoon? Somewhere with a beach"));
}

#[test]
fn rejects_requests_without_travel_terms() {
    assert!(!is_travel_related("What is the capital of France"));
    assert!(!is_travel_related("Write me a poem about rust"));
    assert!(!is_travel_related(""));
}

#[test]
fn matching_is_case_insensitive_substring() {
    assert!(is_travel_related("SIGHTSEEING"));
    // substrings count: "planning" contains "plan", "tourism" contains "tour"
    assert!(is_travel_related("I'm planning something"));
    assert!(is_travel_related("tourism statistics"));
    assert_eq!(matched_keyword("Tourism"), Some("tour"));
    assert_eq!(matched_keyword("quantum physics"), None);
}

#[test]
fn every_keyword_is_accepted_on_its_own() {
    assert_eq!(TRAVEL_KEYWORDS.len(), 20);
    for keyword in TRAVEL_KEYWORDS {
        assert!(is_travel_related(keyword), "{} should be accepted", keyword);
        assert!(is_travel_related(&keyword.to_uppercase()));
    }
}
