use bookshelf_core::{
    Criterion, CriterionScore, CriterionScores, Rating, RatingKey, RecommendationKey,
    SuggestedBookCount,
};

#[test]
fn rating_serializes_with_snake_case_fields() {
    let mut rating = Rating::new(
        RatingKey::new("ada", 12),
        "Salotto",
        CriterionScores {
            style: CriterionScore::with_note(5, "crisp"),
            content: CriterionScore::new(4),
            pleasantness: CriterionScore::new(4),
            originality: CriterionScore::new(3),
            edition: CriterionScore::new(4),
        },
    );
    rating.final_comment = Some("a keeper".to_string());

    let json = serde_json::to_value(&rating).unwrap();
    assert_eq!(json["key"]["user_id"], "ada");
    assert_eq!(json["key"]["book_id"], 12);
    assert_eq!(json["library_name"], "Salotto");
    assert_eq!(json["scores"]["style"]["score"], 5);
    assert_eq!(json["scores"]["style"]["note"], "crisp");
    assert!(json["scores"]["content"]["note"].is_null());
    assert_eq!(json["overall_score"], 4.0);
    assert!(json["recorded_at"].is_null());

    let decoded: Rating = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, rating);
}

#[test]
fn criterion_names_are_stable() {
    let names: Vec<String> = Criterion::ALL
        .into_iter()
        .map(|criterion| serde_json::to_value(criterion).unwrap())
        .map(|value| value.as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        names,
        ["style", "content", "pleasantness", "originality", "edition"]
    );
    for criterion in Criterion::ALL {
        assert_eq!(criterion.to_string(), criterion.as_str());
    }
}

#[test]
fn suggested_count_without_catalog_entry_keeps_raw_id() {
    let entry = SuggestedBookCount {
        book_id: 77,
        book: None,
        count: 2,
    };
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["book_id"], 77);
    assert!(json["book"].is_null());
    assert_eq!(json["count"], 2);
}

#[test]
fn keys_display_as_key_value_pairs() {
    assert_eq!(
        RecommendationKey::new("ada", 1, 10, 11).to_string(),
        "user=ada library=1 book_read=10 book_suggested=11"
    );
    assert_eq!(RatingKey::new("bob", 4).to_string(), "user=bob book=4");
}
