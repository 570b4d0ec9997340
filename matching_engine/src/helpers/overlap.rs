//! The overlap-matching algorithm at the heart of schedule negotiation.
//!
//! Both sides of a pair submit candidate dates and locations. The date overlap is a plain set
//! intersection. The location overlap is hierarchical: a bare region (`"Seoul"`) matches any tag
//! in that region, while two districted tags (`"Seoul Gangnam"`, `"Seoul Jongno"`) match each
//! other through their shared region. Matched tags are ranked most-specific-first, then lexically,
//! so the result is independent of input order and symmetric in its arguments.
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{DateChoices, LocationTag};

/// The agreed schedule produced when both date and location overlaps are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleMatch {
    /// The earliest date common to both sides.
    pub final_date: NaiveDate,
    /// Matched location tags, most specific first.
    pub locations: Vec<LocationTag>,
}

impl ScheduleMatch {
    /// The matched tags joined into the single string persisted as `final_location`.
    pub fn final_location(&self) -> String {
        self.locations.iter().map(LocationTag::to_string).collect::<Vec<_>>().join(", ")
    }
}

/// Set intersection over candidate dates. The result is sorted and deduplicated, so it is
/// symmetric in its arguments; its first element is the earliest common date.
pub fn date_overlap(lhs: &[NaiveDate], rhs: &[NaiveDate]) -> Vec<NaiveDate> {
    let mut common: Vec<NaiveDate> = lhs.iter().filter(|d| rhs.contains(d)).copied().collect();
    common.sort_unstable();
    common.dedup();
    common
}

/// Hierarchical location overlap. Every matching pair contributes its tags to the candidate set;
/// bare-region fallbacks are only kept when no districted tag matched at all.
pub fn location_overlap(lhs: &[LocationTag], rhs: &[LocationTag]) -> Vec<LocationTag> {
    let mut matched: Vec<LocationTag> = Vec::new();
    for a in lhs {
        for b in rhs {
            if a.matches(b) {
                matched.push(a.clone());
                matched.push(b.clone());
            }
        }
    }
    let any_specific = matched.iter().any(LocationTag::is_specific);
    if any_specific {
        matched.retain(LocationTag::is_specific);
    }
    // Most specific first, then lexically. With the retain above this orders districted tags
    // amongst themselves, or bare regions amongst themselves.
    matched.sort_unstable_by(|a, b| b.is_specific().cmp(&a.is_specific()).then_with(|| a.cmp(b)));
    matched.dedup();
    matched
}

/// Computes the full schedule overlap, or `None` when either axis has no common ground.
pub fn schedule_overlap(lhs: &DateChoices, rhs: &DateChoices) -> Option<ScheduleMatch> {
    let dates = date_overlap(&lhs.dates, &rhs.dates);
    let final_date = *dates.first()?;
    let locations = location_overlap(&lhs.locations, &rhs.locations);
    if locations.is_empty() {
        return None;
    }
    Some(ScheduleMatch { final_date, locations })
}

/// Partner photos unlock shortly before the meeting: 30 minutes before midnight UTC of the
/// agreed date.
pub fn photo_visible_at(final_date: NaiveDate) -> DateTime<Utc> {
    final_date.and_time(NaiveTime::MIN).and_utc() - Duration::minutes(30)
}

#[cfg(test)]
mod test {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn tags(specs: &[&str]) -> Vec<LocationTag> {
        specs.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn date_overlap_is_symmetric_and_sorted() {
        let a = vec![d("2025-09-02"), d("2025-09-01")];
        let b = vec![d("2025-09-01"), d("2025-09-02"), d("2025-09-03")];
        let ab = date_overlap(&a, &b);
        let ba = date_overlap(&b, &a);
        assert_eq!(ab, ba);
        assert_eq!(ab, vec![d("2025-09-01"), d("2025-09-02")]);
    }

    #[test]
    fn disjoint_dates_have_empty_overlap() {
        let a = vec![d("2025-09-01")];
        let b = vec![d("2025-09-05")];
        assert!(date_overlap(&a, &b).is_empty());
    }

    #[test]
    fn district_matches_bare_region() {
        let overlap = location_overlap(&tags(&["Seoul Gangnam"]), &tags(&["Seoul"]));
        assert_eq!(overlap, tags(&["Seoul Gangnam"]));
    }

    #[test]
    fn different_regions_do_not_match() {
        assert!(location_overlap(&tags(&["Seoul Gangnam"]), &tags(&["Busan"])).is_empty());
    }

    #[test]
    fn location_overlap_is_symmetric() {
        let a = tags(&["Seoul Gangnam", "Busan"]);
        let b = tags(&["Seoul", "Busan Haeundae"]);
        assert_eq!(location_overlap(&a, &b), location_overlap(&b, &a));
    }

    #[test]
    fn specific_matches_shadow_bare_fallbacks() {
        let a = tags(&["Seoul Gangnam", "Incheon"]);
        let b = tags(&["Seoul Jongno", "Incheon"]);
        let overlap = location_overlap(&a, &b);
        // Gangnam and Jongno both match through the shared region and outrank the bare Incheon
        // match; ordering within the rank is lexical.
        assert_eq!(overlap, tags(&["Seoul Gangnam", "Seoul Jongno"]));
    }

    #[test]
    fn bare_regions_fall_back_to_first_match() {
        let overlap = location_overlap(&tags(&["Incheon", "Busan"]), &tags(&["Busan", "Incheon"]));
        assert_eq!(overlap, tags(&["Busan", "Incheon"]));
    }

    #[test]
    fn negotiation_example_from_the_product_brief() {
        let a = DateChoices::new(vec![d("2025-09-01"), d("2025-09-02")], tags(&["Seoul Gangnam"]));
        let b = DateChoices::new(vec![d("2025-09-02")], tags(&["Seoul"]));
        let matched = schedule_overlap(&a, &b).unwrap();
        assert_eq!(matched.final_date, d("2025-09-02"));
        assert!(matched.final_location().contains("Seoul Gangnam"));
        let visible = photo_visible_at(matched.final_date);
        assert_eq!(visible.to_rfc3339(), "2025-09-01T23:30:00+00:00");
    }

    #[test]
    fn overlap_requires_both_axes() {
        let a = DateChoices::new(vec![d("2025-09-01")], tags(&["Seoul"]));
        let b = DateChoices::new(vec![d("2025-09-05")], tags(&["Seoul"]));
        assert!(schedule_overlap(&a, &b).is_none());
        let c = DateChoices::new(vec![d("2025-09-01")], tags(&["Busan"]));
        assert!(schedule_overlap(&a, &c).is_none());
    }
}
