//! Command-line front end over `bookshelf_core`.
//!
//! # Responsibility
//! - Map subcommands onto recommendation, rating and catalog operations.
//! - Print results as pretty JSON on stdout; errors go to stderr.
//!
//! Configuration comes from `BOOKSHELF_*` environment variables (and an
//! optional `.env`); `--db` overrides the configured database path.

use anyhow::{bail, Context, Result};
use bookshelf_core::db::open_db;
use bookshelf_core::legacy::{import_ratings_file, write_ratings_file};
use bookshelf_core::{
    init_logging_from_config, AppConfig, Book, BookId, CriterionScore, CriterionScores,
    LibraryId, Rating, RatingKey, RatingService, RecommendationKey, RecommendationService,
    SqliteCatalog, SqliteRatingRepository, SqliteRecommendationRepository,
};
use clap::{Args, Parser, Subcommand};
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bookshelf")]
#[command(about = "Book recommendations and five-criterion ratings")]
#[command(version)]
struct Cli {
    /// SQLite database file; defaults to BOOKSHELF_DB_PATH
    #[arg(long, global = true, value_name = "FILE")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Catalog maintenance
    #[command(subcommand)]
    Catalog(CatalogCommand),
    /// Recommendations between books
    #[command(subcommand)]
    Recommend(RecommendCommand),
    /// Five-criterion ratings
    #[command(subcommand)]
    Rate(RateCommand),
}

#[derive(Subcommand)]
enum CatalogCommand {
    /// Inserts or replaces a book
    AddBook {
        id: BookId,
        title: String,
        authors: String,
        #[arg(long)]
        publisher: Option<String>,
        #[arg(long)]
        year: Option<i32>,
    },
    /// Creates a library for a user, or returns the existing one
    AddLibrary { user: String, name: String },
}

#[derive(Args)]
struct KeyArgs {
    user: String,
    library: LibraryId,
    book_read: BookId,
    book_suggested: BookId,
}

impl KeyArgs {
    fn key(&self) -> RecommendationKey {
        RecommendationKey::new(
            self.user.as_str(),
            self.library,
            self.book_read,
            self.book_suggested,
        )
    }
}

#[derive(Subcommand)]
enum RecommendCommand {
    /// Records a recommendation
    Add {
        #[command(flatten)]
        key: KeyArgs,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Books suggested after a book inside one library
    Books { library: LibraryId, book_read: BookId },
    /// Suggested books with counts; all libraries when --library is omitted
    Counts {
        book_read: BookId,
        #[arg(long)]
        library: Option<LibraryId>,
    },
    /// Recommendations given by a user, with names resolved
    List { user: String },
    /// Replaces the comment of one recommendation
    Comment {
        #[command(flatten)]
        key: KeyArgs,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Removes one recommendation
    Delete {
        #[command(flatten)]
        key: KeyArgs,
    },
}

#[derive(Args)]
struct RatingArgs {
    user: String,
    book: BookId,
    style: i32,
    content: i32,
    pleasantness: i32,
    originality: i32,
    edition: i32,
    #[arg(long, default_value = "")]
    library: String,
    #[arg(long)]
    style_note: Option<String>,
    #[arg(long)]
    content_note: Option<String>,
    #[arg(long)]
    pleasantness_note: Option<String>,
    #[arg(long)]
    originality_note: Option<String>,
    #[arg(long)]
    edition_note: Option<String>,
    #[arg(long)]
    comment: Option<String>,
}

impl RatingArgs {
    fn rating(self) -> Rating {
        let score = |score: i32, note: Option<String>| CriterionScore { score, note };
        let scores = CriterionScores {
            style: score(self.style, self.style_note),
            content: score(self.content, self.content_note),
            pleasantness: score(self.pleasantness, self.pleasantness_note),
            originality: score(self.originality, self.originality_note),
            edition: score(self.edition, self.edition_note),
        };
        let mut rating = Rating::new(RatingKey::new(self.user, self.book), self.library, scores);
        rating.final_comment = self.comment;
        rating
    }
}

#[derive(Subcommand)]
enum RateCommand {
    /// Records a rating; prints false when the user already rated the book
    Save(RatingArgs),
    /// Whether a user already rated a book
    Check { user: String, book: BookId },
    /// Count and averages for a book
    Summary { book: BookId },
    /// Ratings given by a user, with book metadata
    List { user: String },
    /// Replaces scores, notes and final comment of an existing rating
    Update(RatingArgs),
    /// Removes one rating
    Delete { user: String, book: BookId },
    /// Migrates a legacy delimited file into the store
    Import {
        file: PathBuf,
        #[arg(long, default_value = "")]
        library: String,
    },
    /// Writes every rating of a book to a legacy delimited file
    Export { book: BookId, file: PathBuf },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("invalid BOOKSHELF_* configuration")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    init_logging_from_config(&config).context("failed to initialize logging")?;
    info!(
        "event=cli_start module=cli status=ok version={}",
        bookshelf_core::core_version()
    );

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open `{}`", config.db_path.display()))?;

    match cli.command {
        Command::Catalog(command) => run_catalog(&conn, command),
        Command::Recommend(command) => run_recommend(&conn, command),
        Command::Rate(command) => run_rate(&conn, command),
    }
}

fn run_catalog(conn: &Connection, command: CatalogCommand) -> Result<()> {
    let catalog = SqliteCatalog::new(conn);
    match command {
        CatalogCommand::AddBook {
            id,
            title,
            authors,
            publisher,
            year,
        } => {
            let book = Book {
                id,
                title,
                authors,
                publisher,
                publication_year: year,
            };
            catalog.upsert_book(&book)?;
            print_json(&book)
        }
        CatalogCommand::AddLibrary { user, name } => {
            print_json(&catalog.create_library(&user, &name)?)
        }
    }
}

fn run_recommend(conn: &Connection, command: RecommendCommand) -> Result<()> {
    let catalog = SqliteCatalog::new(conn);
    let service =
        RecommendationService::new(SqliteRecommendationRepository::new(conn), catalog, catalog);

    match command {
        RecommendCommand::Add { key, comment } => {
            print_json(&service.add(&key.key(), comment.as_deref())?)
        }
        RecommendCommand::Books { library, book_read } => {
            print_json(&service.recommended_books(library, book_read)?)
        }
        RecommendCommand::Counts { book_read, library } => {
            let ranked = match library {
                Some(library) => service.recommended_with_count(library, book_read)?,
                None => service.recommended_with_count_global(book_read)?,
            };
            print_json(&ranked)
        }
        RecommendCommand::List { user } => print_json(&service.list_detailed_by_user(&user)?),
        RecommendCommand::Comment { key, comment } => {
            let key = key.key();
            if !service.update_comment(&key, comment.as_deref())? {
                bail!("no recommendation for {key}");
            }
            print_json(&true)
        }
        RecommendCommand::Delete { key } => print_json(&service.delete(&key.key())?),
    }
}

fn run_rate(conn: &Connection, command: RateCommand) -> Result<()> {
    let service = RatingService::new(SqliteRatingRepository::new(conn), SqliteCatalog::new(conn));

    match command {
        RateCommand::Save(args) => print_json(&service.save(&args.rating())?),
        RateCommand::Check { user, book } => print_json(&service.is_already_rated(book, &user)?),
        RateCommand::Summary { book } => print_json(&service.summarize(book)?),
        RateCommand::List { user } => print_json(&service.list_detailed_by_user(&user)?),
        RateCommand::Update(args) => {
            let rating = args.rating();
            if !service.update(&rating)? {
                bail!("no rating for {}", rating.key);
            }
            print_json(&true)
        }
        RateCommand::Delete { user, book } => print_json(&service.delete(&user, book)?),
        RateCommand::Import { file, library } => {
            let report = import_ratings_file(&service, &file, &library)
                .with_context(|| format!("failed to import `{}`", file.display()))?;
            println!(
                "imported={} already_rated={} rejected={}",
                report.imported, report.already_rated, report.rejected
            );
            Ok(())
        }
        RateCommand::Export { book, file } => {
            let ratings = service.load_ratings(book)?;
            write_ratings_file(&file, &ratings)
                .with_context(|| format!("failed to write `{}`", file.display()))?;
            println!("exported={}", ratings.len());
            Ok(())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
