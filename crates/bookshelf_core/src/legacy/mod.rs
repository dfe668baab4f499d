//! Legacy delimited-text rating files.
//!
//! # Responsibility
//! - Read and write rating files in the flat one-line-per-rating format.
//! - Migrate legacy files into the structured rating store.
//!
//! # Invariants
//! - The escaping rules of [`line`] are applied unchanged in both directions.
//! - Import never overwrites an existing `(user, book)` rating.

use crate::model::rating::Rating;
use crate::repo::catalog_repo::BookCatalog;
use crate::repo::rating_repo::RatingRepository;
use crate::service::error::ServiceError;
use crate::service::rating_service::RatingService;
use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

pub mod line;

pub use line::{decode_rating_line, encode_rating_line, LineError};

pub type LegacyResult<T> = Result<T, LegacyError>;

#[derive(Debug, thiserror::Error)]
pub enum LegacyError {
    #[error("legacy file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: LineError,
    },
    #[error("{0}")]
    Service(#[from] ServiceError),
}

/// Counters reported by [`import_ratings_file`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: u32,
    pub already_rated: u32,
    pub rejected: u32,
}

/// Writes `ratings` one per line, replacing any existing file.
pub fn write_ratings_file(path: impl AsRef<Path>, ratings: &[Rating]) -> LegacyResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for rating in ratings {
        writeln!(writer, "{}", encode_rating_line(rating))?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads every rating of a legacy file, failing on the first malformed line.
///
/// Blank lines are skipped. Decoded ratings carry an empty `library_name`.
pub fn read_ratings_file(path: impl AsRef<Path>) -> LegacyResult<Vec<Rating>> {
    let reader = BufReader::new(File::open(path)?);
    let mut ratings = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let rating = decode_rating_line(&line).map_err(|source| LegacyError::Line {
            line: index + 1,
            source,
        })?;
        ratings.push(rating);
    }
    Ok(ratings)
}

/// Migrates a legacy file into the structured store through `service`.
///
/// Malformed lines and ratings refused by validation are counted as
/// rejected and skipped. Ratings whose key already exists are counted as
/// `already_rated`. Store failures abort the import.
pub fn import_ratings_file<R, C>(
    service: &RatingService<R, C>,
    path: impl AsRef<Path>,
    library_name: &str,
) -> LegacyResult<ImportReport>
where
    R: RatingRepository,
    C: BookCatalog,
{
    let path = path.as_ref();
    info!(
        "event=legacy_import module=legacy status=start path={}",
        path.display()
    );

    let reader = BufReader::new(File::open(path)?);
    let mut report = ImportReport::default();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let mut rating = match decode_rating_line(&line) {
            Ok(rating) => rating,
            Err(err) => {
                warn!(
                    "event=legacy_import module=legacy status=rejected line={} error={err}",
                    index + 1
                );
                report.rejected += 1;
                continue;
            }
        };
        rating.library_name = library_name.to_string();

        match service.save(&rating) {
            Ok(true) => report.imported += 1,
            Ok(false) => report.already_rated += 1,
            Err(err) if err.is_rejection() => {
                warn!(
                    "event=legacy_import module=legacy status=rejected line={} error_code={}",
                    index + 1,
                    err.code()
                );
                report.rejected += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    info!(
        "event=legacy_import module=legacy status=ok imported={} already_rated={} rejected={}",
        report.imported, report.already_rated, report.rejected
    );
    Ok(report)
}
