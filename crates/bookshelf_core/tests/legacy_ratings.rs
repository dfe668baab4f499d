use bookshelf_core::db::open_db_in_memory;
use bookshelf_core::legacy::{
    import_ratings_file, read_ratings_file, write_ratings_file, ImportReport, LegacyError,
    LineError,
};
use bookshelf_core::{
    CriterionScore, CriterionScores, Rating, RatingKey, RatingService, SqliteCatalog,
    SqliteRatingRepository,
};
use std::fs;

fn rating(user: &str, book: i64, values: [i32; 5]) -> Rating {
    Rating::new(
        RatingKey::new(user, book),
        "Studio",
        CriterionScores::from_values(values),
    )
}

#[test]
fn written_file_reads_back_with_escaped_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ratings.txt");

    let mut first = Rating::new(
        RatingKey::new("ada", 3),
        "Studio",
        CriterionScores {
            style: CriterionScore::with_note(5, "dense; rewarding"),
            content: CriterionScore::new(4),
            pleasantness: CriterionScore::new(4),
            originality: CriterionScore::new(5),
            edition: CriterionScore::with_note(3, "tiny\nfont"),
        },
    );
    first.final_comment = Some("read it twice".to_string());
    let second = rating("bob", 4, [2, 3, 2, 3, 2]);

    write_ratings_file(&path, &[first.clone(), second.clone()]).unwrap();
    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 2);

    let decoded = read_ratings_file(&path).unwrap();
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0].key, first.key);
    assert_eq!(
        decoded[0].scores.style.note.as_deref(),
        Some("dense, rewarding")
    );
    assert_eq!(decoded[0].scores.edition.note.as_deref(), Some("tinyfont"));
    assert_eq!(decoded[0].overall_score, 4.2);
    assert_eq!(decoded[0].final_comment.as_deref(), Some("read it twice"));
    assert_eq!(decoded[1].scores, second.scores);
    assert_eq!(decoded[1].final_comment, None);
    assert!(decoded.iter().all(|rating| rating.library_name.is_empty()));
}

#[test]
fn read_reports_line_number_of_first_malformed_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.txt");
    fs::write(
        &path,
        "ada;1;3;;3;;3;;3;;3;;3.0;\n\nbob;2;three;;3;;3;;3;;3;;3.0;\n",
    )
    .unwrap();

    let err = read_ratings_file(&path).unwrap_err();
    match err {
        LegacyError::Line { line, source } => {
            assert_eq!(line, 3);
            assert!(matches!(
                source,
                LineError::InvalidNumber { field: "style", .. }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_ratings_file(dir.path().join("absent.txt")).unwrap_err();
    assert!(matches!(err, LegacyError::Io(_)));
}

#[test]
fn import_counts_imported_existing_and_rejected_lines() {
    let conn = open_db_in_memory().unwrap();
    let service = RatingService::new(SqliteRatingRepository::new(&conn), SqliteCatalog::new(&conn));
    service.save(&rating("ada", 1, [4, 4, 4, 4, 4])).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.txt");
    fs::write(
        &path,
        [
            "ada;1;1;;1;;1;;1;;1;;1.0;",
            "bob;1;5;;4;;5;;4;;5;;4.6;loved it",
            "cy;2;3;;3;;3;;3;;3;;3.0;",
            "dee;2;7;;3;;3;;3;;3;;3.8;",
            "eve;2;3;3;3",
            "",
        ]
        .join("\n"),
    )
    .unwrap();

    let report = import_ratings_file(&service, &path, "Imported").unwrap();
    assert_eq!(
        report,
        ImportReport {
            imported: 2,
            already_rated: 1,
            rejected: 2,
        }
    );

    let book_one = service.load_ratings(1).unwrap();
    assert_eq!(book_one.len(), 2);
    assert_eq!(book_one[0].library_name, "Studio");
    assert_eq!(book_one[0].scores.style.score, 4);
    assert_eq!(book_one[1].library_name, "Imported");
    assert_eq!(book_one[1].final_comment.as_deref(), Some("loved it"));
    assert_eq!(service.count_ratings(2).unwrap(), 1);
}
