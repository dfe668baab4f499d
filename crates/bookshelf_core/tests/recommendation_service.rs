use bookshelf_core::db::open_db_in_memory;
use bookshelf_core::{
    Book, BusinessRule, RecommendationKey, RecommendationService, ServiceError, SqliteCatalog,
    SqliteRecommendationRepository, ValidationError, RECOMMENDATION_LIMIT,
};
use rusqlite::Connection;

type Service<'conn> = RecommendationService<
    SqliteRecommendationRepository<'conn>,
    SqliteCatalog<'conn>,
    SqliteCatalog<'conn>,
>;

fn setup() -> Connection {
    let conn = open_db_in_memory().unwrap();
    let catalog = SqliteCatalog::new(&conn);
    for (id, title, authors) in [
        (10, "Il barone rampante", "Calvino, Italo"),
        (11, "Le citta invisibili", "Calvino, Italo"),
        (12, "Se una notte d'inverno un viaggiatore", "Calvino, Italo"),
        (13, "Il nome della rosa", "Eco, Umberto"),
        (14, "La coscienza di Zeno", "Svevo, Italo"),
    ] {
        catalog.upsert_book(&Book::new(id, title, authors)).unwrap();
    }
    conn
}

fn service(conn: &Connection) -> Service<'_> {
    let catalog = SqliteCatalog::new(conn);
    RecommendationService::new(SqliteRecommendationRepository::new(conn), catalog, catalog)
}

#[test]
fn add_then_list_by_user_contains_record() {
    let conn = setup();
    let service = service(&conn);

    let key = RecommendationKey::new("ada", 1, 10, 11);
    let stored = service.add(&key, Some("same imagination")).unwrap();
    assert_eq!(stored.key, key);
    assert_eq!(stored.comment.as_deref(), Some("same imagination"));
    assert!(stored.created_at.is_some());

    let listed = service.list_by_user("ada").unwrap();
    assert_eq!(listed, vec![stored]);
}

#[test]
fn blank_comment_is_stored_as_none() {
    let conn = setup();
    let service = service(&conn);

    let stored = service
        .add(&RecommendationKey::new("ada", 1, 10, 11), Some("   "))
        .unwrap();
    assert_eq!(stored.comment, None);
}

#[test]
fn self_recommendation_is_a_business_rule_violation() {
    let conn = setup();
    let service = service(&conn);

    let err = service
        .add(&RecommendationKey::new("ada", 1, 10, 10), Some("x"))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::BusinessRuleViolation(BusinessRule::SelfRecommendation { book_id: 10 })
    ));
    assert!(service.list_by_user("ada").unwrap().is_empty());
}

#[test]
fn invalid_arguments_are_rejected_before_store_access() {
    let conn = setup();
    let service = service(&conn);

    let blank = service
        .add(&RecommendationKey::new("  ", 1, 10, 11), None)
        .unwrap_err();
    assert!(matches!(
        blank,
        ServiceError::InvalidArgument(ValidationError::Blank { field: "user_id" })
    ));

    for key in [
        RecommendationKey::new("ada", 0, 10, 11),
        RecommendationKey::new("ada", 1, -1, 11),
        RecommendationKey::new("ada", 1, 10, 0),
    ] {
        let err = service.add(&key, None).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)), "{key}");
    }

    assert!(matches!(
        service.recommended_books(0, 10),
        Err(ServiceError::InvalidArgument(_))
    ));
    assert!(matches!(
        service.recommended_with_count_global(-3),
        Err(ServiceError::InvalidArgument(_))
    ));
    assert!(matches!(
        service.list_by_user(""),
        Err(ServiceError::InvalidArgument(_))
    ));
}

#[test]
fn fourth_recommendation_for_same_book_read_fails_across_libraries() {
    let conn = setup();
    let service = service(&conn);

    service.add(&RecommendationKey::new("ada", 1, 10, 11), None).unwrap();
    service.add(&RecommendationKey::new("ada", 2, 10, 12), None).unwrap();
    service.add(&RecommendationKey::new("ada", 3, 10, 13), None).unwrap();

    let err = service
        .add(&RecommendationKey::new("ada", 4, 10, 14), None)
        .unwrap_err();
    match err {
        ServiceError::BusinessRuleViolation(BusinessRule::RecommendationLimitReached {
            book_read_id,
            existing,
            limit,
        }) => {
            assert_eq!(book_read_id, 10);
            assert_eq!(existing, 3);
            assert_eq!(limit, RECOMMENDATION_LIMIT);
        }
        other => panic!("unexpected error: {other}"),
    }

    // Other users and other books read are unaffected.
    service.add(&RecommendationKey::new("bob", 4, 10, 14), None).unwrap();
    service.add(&RecommendationKey::new("ada", 4, 11, 14), None).unwrap();
}

#[test]
fn deleting_frees_a_slot_under_the_limit() {
    let conn = setup();
    let service = service(&conn);

    let first = RecommendationKey::new("ada", 1, 10, 11);
    service.add(&first, None).unwrap();
    service.add(&RecommendationKey::new("ada", 1, 10, 12), None).unwrap();
    service.add(&RecommendationKey::new("ada", 1, 10, 13), None).unwrap();
    assert!(service.add(&RecommendationKey::new("ada", 1, 10, 14), None).is_err());

    assert!(service.delete(&first).unwrap());
    service.add(&RecommendationKey::new("ada", 1, 10, 14), None).unwrap();
}

#[test]
fn adding_the_same_key_twice_is_a_duplicate() {
    let conn = setup();
    let service = service(&conn);

    let key = RecommendationKey::new("ada", 1, 10, 11);
    service.add(&key, Some("first")).unwrap();
    let err = service.add(&key, Some("second")).unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateKey(_)));

    let listed = service.list_by_user("ada").unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].comment.as_deref(), Some("first"));
}

#[test]
fn recommended_books_are_scoped_to_library_and_deduplicated() {
    let conn = setup();
    let service = service(&conn);

    service.add(&RecommendationKey::new("ada", 1, 10, 11), None).unwrap();
    service.add(&RecommendationKey::new("bob", 1, 10, 11), None).unwrap();
    service.add(&RecommendationKey::new("bob", 1, 10, 13), None).unwrap();
    service.add(&RecommendationKey::new("cy", 2, 10, 14), None).unwrap();

    let books = service.recommended_books(1, 10).unwrap();
    let ids: Vec<i64> = books.iter().map(|book| book.id).collect();
    assert_eq!(ids, vec![11, 13]);
    assert_eq!(books[0].title, "Le citta invisibili");

    assert!(service.recommended_books(1, 12).unwrap().is_empty());
}

#[test]
fn recommended_books_skip_books_missing_from_catalog() {
    let conn = setup();
    let service = service(&conn);

    service.add(&RecommendationKey::new("ada", 1, 10, 99), None).unwrap();
    service.add(&RecommendationKey::new("ada", 1, 10, 11), None).unwrap();

    let books = service.recommended_books(1, 10).unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id, 11);
}

#[test]
fn counts_per_library_are_sorted_descending() {
    let conn = setup();
    let service = service(&conn);

    service.add(&RecommendationKey::new("ada", 1, 10, 11), None).unwrap();
    service.add(&RecommendationKey::new("bob", 1, 10, 13), None).unwrap();
    service.add(&RecommendationKey::new("cy", 1, 10, 13), None).unwrap();
    service.add(&RecommendationKey::new("dee", 2, 10, 11), None).unwrap();

    let ranked = service.recommended_with_count(1, 10).unwrap();
    let pairs: Vec<(i64, u32)> = ranked.iter().map(|entry| (entry.book_id, entry.count)).collect();
    assert_eq!(pairs, vec![(13, 2), (11, 1)]);
    assert_eq!(
        ranked[0].book.as_ref().map(|book| book.title.as_str()),
        Some("Il nome della rosa")
    );
}

#[test]
fn global_counts_pool_all_libraries_and_are_sorted_descending() {
    let conn = setup();
    let service = service(&conn);

    for (user, library, suggested) in [
        ("ada", 1, 11),
        ("bob", 2, 13),
        ("cy", 3, 13),
        ("dee", 4, 14),
        ("eve", 5, 13),
        ("fay", 6, 14),
        ("gus", 7, 12),
    ] {
        service
            .add(&RecommendationKey::new(user, library, 10, suggested), None)
            .unwrap();
    }
    service.add(&RecommendationKey::new("ada", 1, 11, 13), None).unwrap();

    let ranked = service.recommended_with_count_global(10).unwrap();
    assert!(ranked.windows(2).all(|pair| pair[0].count >= pair[1].count));
    assert_eq!(ranked[0].book_id, 13);
    assert_eq!(ranked[0].count, 3);
    assert_eq!(ranked[1].book_id, 14);
    assert_eq!(ranked[1].count, 2);
    let total: u32 = ranked.iter().map(|entry| entry.count).sum();
    assert_eq!(total, 7);

    assert!(service.recommended_with_count_global(14).unwrap().is_empty());
}

#[test]
fn detailed_listing_resolves_library_and_both_books() {
    let conn = setup();
    let catalog = SqliteCatalog::new(&conn);
    let library = catalog.create_library("ada", "Salotto").unwrap();
    let service = service(&conn);

    service
        .add(&RecommendationKey::new("ada", library.id, 10, 11), Some("more Calvino"))
        .unwrap();
    service
        .add(&RecommendationKey::new("ada", 777, 13, 98), None)
        .unwrap();

    let details = service.list_detailed_by_user("ada").unwrap();
    assert_eq!(details.len(), 2);

    let known = &details[0];
    assert_eq!(known.library_name.as_deref(), Some("Salotto"));
    assert_eq!(
        known.book_read.as_ref().map(|book| book.title.as_str()),
        Some("Il barone rampante")
    );
    assert_eq!(
        known.book_suggested.as_ref().map(|book| book.authors.as_str()),
        Some("Calvino, Italo")
    );
    assert_eq!(known.comment.as_deref(), Some("more Calvino"));

    let unknown = &details[1];
    assert_eq!(unknown.library_name, None);
    assert!(unknown.book_read.is_some());
    assert_eq!(unknown.book_suggested, None);
    assert_eq!(unknown.key.book_suggested_id, 98);
}

#[test]
fn update_comment_replaces_only_the_exact_key() {
    let conn = setup();
    let service = service(&conn);

    let key = RecommendationKey::new("ada", 1, 10, 11);
    let other = RecommendationKey::new("ada", 2, 10, 11);
    service.add(&key, Some("old")).unwrap();
    service.add(&other, Some("untouched")).unwrap();

    assert!(service.update_comment(&key, Some("new")).unwrap());
    assert!(!service
        .update_comment(&RecommendationKey::new("ada", 1, 10, 12), Some("new"))
        .unwrap());

    let listed = service.list_by_user("ada").unwrap();
    assert_eq!(listed[0].comment.as_deref(), Some("new"));
    assert_eq!(listed[1].comment.as_deref(), Some("untouched"));

    assert!(service.update_comment(&key, None).unwrap());
    assert_eq!(service.list_by_user("ada").unwrap()[0].comment, None);
}

#[test]
fn delete_missing_key_returns_false_and_repeat_delete_is_idempotent() {
    let conn = setup();
    let service = service(&conn);

    let key = RecommendationKey::new("ada", 1, 10, 11);
    let kept = RecommendationKey::new("ada", 1, 10, 12);
    service.add(&key, None).unwrap();
    service.add(&kept, None).unwrap();

    assert!(!service
        .delete(&RecommendationKey::new("ada", 1, 10, 13))
        .unwrap());
    assert_eq!(service.list_by_user("ada").unwrap().len(), 2);

    assert!(service.delete(&key).unwrap());
    assert!(!service.delete(&key).unwrap());
    assert!(!service.delete(&key).unwrap());

    let remaining = service.list_by_user("ada").unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].key, kept);
}
