// Integration tests for Roomie Match

use roomie_match::core::{filters::nearby_listings, ListingQuery, MatchEngine, MatchOptions};
use roomie_match::models::{
    BudgetRange, Coordinates, Gender, Listing, Location, MatchTier, Profile, ProfileRecord, SmokingTolerance,
};
use roomie_match::{generate_matches, nearby, score_profiles, MatchError, Settings};

const LEKKI: Coordinates = Coordinates::new(6.4281, 3.4216);
const IKEJA: Coordinates = Coordinates::new(6.6018, 3.3515);

fn load_fixtures() -> Vec<Profile> {
    let records: Vec<ProfileRecord> =
        serde_json::from_str(include_str!("fixtures/profiles.json")).expect("fixture parses");
    records
        .into_iter()
        .map(|record| Profile::try_from(record).expect("fixture is valid"))
        .collect()
}

fn fixture(profiles: &[Profile], id: &str) -> Profile {
    profiles.iter().find(|p| p.id == id).cloned().expect("fixture exists")
}

fn create_test_profile(id: &str, gender: Gender, min: f64, max: f64, point: Coordinates) -> Profile {
    let mut profile = Profile::new(id, 25, gender, BudgetRange { min, max });
    profile.location = Location::at(point);
    profile
}

#[test]
fn test_integration_end_to_end_matching() {
    let profiles = load_fixtures();
    let subject = fixture(&profiles, "ng_demo_1");

    let matches = generate_matches(&subject, &profiles, 0.45).unwrap();
    let ids: Vec<&str> = matches.iter().map(|m| m.candidate_id.as_str()).collect();

    // ng_demo_2 has no budget overlap and only one-sided gender fit
    assert_eq!(ids, vec!["ng_demo_3", "ng_demo_6", "ng_demo_5", "ng_demo_4"]);
    assert!(matches.iter().all(|m| m.score >= 0.45 && m.score <= 1.0));
}

#[test]
fn test_integration_best_fixture_pair() {
    let profiles = load_fixtures();
    let subject = fixture(&profiles, "ng_demo_1");
    let candidate = fixture(&profiles, "ng_demo_3");

    let result = score_profiles(&subject, &candidate, None).unwrap();

    assert!((result.score - 0.8697).abs() < 1e-3, "got {}", result.score);
    assert_eq!(result.tier(), MatchTier::VeryGood);
    assert_eq!(result.breakdown.location, Some(0.85));
    assert_eq!(result.breakdown.gender, Some(1.0));
    assert_eq!(result.shared_activities, vec!["cooking-together", "exercise-gym"]);
    assert!(!result.vetoed);
    // Different coordinate coverage, so no distance
    assert!(result.distance_miles.is_none());
}

#[test]
fn test_integration_vetoes_follow_deal_breakers() {
    let profiles = load_fixtures();
    let subject = fixture(&profiles, "ng_demo_1");
    let engine = MatchEngine::with_default_weights();

    // ng_demo_5 is very social and ng_demo_6 rules out pets
    let flagged = engine.generate_matches(&subject, &profiles, 0.45).unwrap();
    let vetoed: Vec<(&str, &[String])> = flagged
        .iter()
        .filter(|m| m.vetoed)
        .map(|m| (m.candidate_id.as_str(), m.vetoed_by.as_slice()))
        .collect();
    assert_eq!(vetoed.len(), 2);
    assert!(vetoed.contains(&("ng_demo_5", &["loud-music-noise".to_string()][..])));
    assert!(vetoed.contains(&("ng_demo_6", &["pets".to_string()][..])));

    let result = engine.find_matches(&subject, &profiles, &MatchOptions::default()).unwrap();
    let ids: Vec<&str> = result.matches.iter().map(|m| m.candidate_id.as_str()).collect();
    assert_eq!(ids, vec!["ng_demo_3", "ng_demo_4"]);
    assert_eq!(result.total_candidates, 5);
    assert_eq!(result.vetoed, 2);
    assert_eq!(result.below_cutoff, 1);
}

#[test]
fn test_integration_score_is_symmetric_over_fixtures() {
    let profiles = load_fixtures();

    for a in &profiles {
        for b in &profiles {
            let ab = score_profiles(a, b, None).unwrap();
            let ba = score_profiles(b, a, None).unwrap();
            assert!((ab.score - ba.score).abs() < 1e-12, "{} vs {}", a.id, b.id);
            assert_eq!(ab.vetoed_by, ba.vetoed_by);
        }
    }
}

#[test]
fn test_integration_lagos_proximity() {
    let subject = create_test_profile("lekki", Gender::Female, 200_000.0, 350_000.0, LEKKI);
    let candidate = create_test_profile("ikeja", Gender::Female, 300_000.0, 500_000.0, IKEJA);
    let pool = vec![candidate];

    let hits = nearby(&LEKKI, 13.0, &pool).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].distance_miles, 12.9);

    assert!(nearby(&LEKKI, 12.0, &pool).unwrap().is_empty());
    assert!(nearby(&LEKKI, 5.0, &pool).unwrap().is_empty());

    let result = score_profiles(&subject, &pool[0], None).unwrap();
    assert!((result.breakdown.budget.unwrap() - 0.1667).abs() < 1e-3);
    assert_eq!(result.distance_miles, Some(12.9));
    // 12.9 miles on a 1..30 mile linear decay
    let expected_location = 1.0 - (12.9 - 1.0) / 29.0;
    assert!((result.breakdown.location.unwrap() - expected_location).abs() < 1e-9);
}

#[test]
fn test_integration_proximity_prefilter_counts() {
    let engine = MatchEngine::with_default_weights();
    let subject = create_test_profile("subject", Gender::Female, 200_000.0, 350_000.0, LEKKI);
    let pool = vec![
        create_test_profile("near", Gender::Female, 200_000.0, 350_000.0, Coordinates::new(6.43, 3.42)),
        create_test_profile("ikeja", Gender::Female, 200_000.0, 350_000.0, IKEJA),
        create_test_profile("abuja", Gender::Female, 200_000.0, 350_000.0, Coordinates::new(9.0765, 7.3986)),
    ];
    let options = MatchOptions {
        min_score: 0.0,
        proximity: Some(5.0),
        ..MatchOptions::default()
    };

    let result = engine.find_matches(&subject, &pool, &options).unwrap();
    assert_eq!(result.total_candidates, 3);
    assert_eq!(result.prefiltered_out, 2);
    assert_eq!(result.matches[0].candidate_id, "near");
}

#[test]
fn test_integration_smoking_conflict_lowers_score() {
    let profiles = load_fixtures();
    let subject = fixture(&profiles, "ng_demo_1");
    let twin = Profile { id: "twin".to_string(), ..subject.clone() };
    let smoker = Profile {
        id: "smoker".to_string(),
        smoking: Some(SmokingTolerance::Anywhere),
        ..subject.clone()
    };

    let identical = score_profiles(&subject, &twin, None).unwrap();
    let conflicting = score_profiles(&subject, &smoker, None).unwrap();

    assert_eq!(identical.score, 1.0);
    assert!(conflicting.score < identical.score);
    // The smoker also trips the subject's smoking-indoors deal-breaker
    assert!(conflicting.vetoed);
}

#[test]
fn test_integration_no_overlapping_data_scores_zero() {
    let a = Profile::new("a", 30, Gender::Male, BudgetRange { min: 100.0, max: 100.0 });
    let mut b = Profile::new("b", 30, Gender::Male, BudgetRange { min: 200.0, max: 300.0 });
    b.smoking = Some(SmokingTolerance::Anywhere);

    let result = score_profiles(&a, &b, None).unwrap();
    assert_eq!(result.score, 0.0);
    assert_eq!(result.breakdown.included().count(), 1);
}

#[test]
fn test_integration_invalid_input_names_field() {
    let subject = create_test_profile("subject", Gender::Female, 200_000.0, 350_000.0, LEKKI);
    let broken = create_test_profile("broken", Gender::Male, 100.0, 200.0, Coordinates::new(95.0, 3.0));

    let err = generate_matches(&subject, &[broken], 0.45).unwrap_err();
    match err {
        MatchError::InvalidInput { field, .. } => assert_eq!(field, "broken.location.lat"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_integration_listing_search() {
    let listings: Vec<Listing> = serde_json::from_value(serde_json::json!([
        { "id": "vi-flat", "latitude": 6.4281, "longitude": 3.4216, "price": 450000 },
        { "id": "ikeja-room", "latitude": 6.6018, "longitude": 3.3515, "price": 180000 },
        { "id": "let-out", "latitude": 6.43, "longitude": 3.42, "price": 200000, "isAvailable": false },
        { "id": "abuja", "latitude": 9.0765, "longitude": 7.3986, "price": 150000 }
    ]))
    .unwrap();

    let query = ListingQuery {
        price_range: Some(BudgetRange { min: 100_000.0, max: 300_000.0 }),
        available_only: true,
    };
    let hits = nearby_listings(&LEKKI, 20.0, &listings, &query).unwrap();
    let ids: Vec<&str> = hits.iter().map(|h| h.item.id.as_str()).collect();
    assert_eq!(ids, vec!["ikeja-room"]);
}

#[test]
fn test_integration_settings_drive_engine() {
    let settings = Settings::from_toml(include_str!("../config/default.toml")).unwrap();
    assert_eq!(settings, Settings::default());

    let engine = settings.match_engine().unwrap();
    let profiles = load_fixtures();
    let subject = fixture(&profiles, "ng_demo_1");

    let result = engine.find_default_matches(&subject, &profiles).unwrap();
    assert!(result.matches.len() <= settings.matching.default_limit);
    assert!(result.matches.iter().all(|m| !m.vetoed));
}
