//! Keyword gate that keeps the planner on topic.

/// Terms that mark a request as travel related.
pub const TRAVEL_KEYWORDS: [&str; 20] = [
    "trip",
    "travel",
    "destination",
    "itinerary",
    "vacation",
    "holiday",
    "tour",
    "beach",
    "culture",
    "adventure",
    "city",
    "country",
    "flight",
    "hotel",
    "accommodation",
    "budget",
    "plan",
    "visit",
    "explore",
    "sightseeing",
];

/// `true` iff the lowercased query contains at least one of [`TRAVEL_KEYWORDS`].
///
/// Matching is by substring, so "planning" and "tourism" count as well.
///
/// ```rust
/// use tripllm::topic_filter::is_travel_related;
///
/// assert!(is_travel_related("Plan a trip to Kyoto"));
/// assert!(!is_travel_related("What is the capital of France"));
/// ```
pub fn is_travel_related(query: &str) -> bool {
    let query = query.to_lowercase();
    TRAVEL_KEYWORDS
        .iter()
        .any(|keyword| query.contains(keyword))
}

/// The first keyword found in `query`, for logging.
pub fn matched_keyword(query: &str) -> Option<&'static str> {
    let query = query.to_lowercase();
    TRAVEL_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| query.contains(keyword))
}
