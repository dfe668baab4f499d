//! Flat semicolon-delimited rating line codec.
//!
//! Field order: `user; book; style; style-note; content; content-note;
//! pleasantness; pleasantness-note; originality; originality-note; edition;
//! edition-note; overall(%.1f); final-comment`.
//!
//! Free text is escaped on write by turning every `;` into `,` and dropping
//! line breaks. Reading keeps the text exactly as stored, so a `;` written
//! out comes back as `,`. The loss is part of the format and stays.
//!
//! Decoding deliberately does not map `,` back to `;`: that substitution
//! would also rewrite every comma the author actually typed, and existing
//! readers of these files expect the comma form.

use crate::model::rating::{CriterionScore, CriterionScores, Rating, RatingKey};

pub const FIELD_SEPARATOR: char = ';';
pub const FIELD_COUNT: usize = 14;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    #[error("expected {FIELD_COUNT} fields, found {found}")]
    FieldCount { found: usize },
    #[error("invalid {field} value `{value}`")]
    InvalidNumber { field: &'static str, value: String },
}

/// Escapes one free-text field for the delimited representation.
pub fn escape_text(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !matches!(ch, '\n' | '\r'))
        .map(|ch| if ch == FIELD_SEPARATOR { ',' } else { ch })
        .collect()
}

/// Encodes one rating as a line, without trailing newline.
///
/// `library_name` and `recorded_at` are not part of the format.
pub fn encode_rating_line(rating: &Rating) -> String {
    let mut fields: Vec<String> = Vec::with_capacity(FIELD_COUNT);
    fields.push(escape_text(&rating.key.user_id));
    fields.push(rating.key.book_id.to_string());
    for (_, entry) in rating.scores.iter() {
        fields.push(entry.score.to_string());
        fields.push(escape_text(entry.note.as_deref().unwrap_or_default()));
    }
    fields.push(format!("{:.1}", rating.overall_score));
    fields.push(escape_text(rating.final_comment.as_deref().unwrap_or_default()));
    fields.join(";")
}

/// Decodes one line; `library_name` is left empty for the caller to fill.
pub fn decode_rating_line(line: &str) -> Result<Rating, LineError> {
    let line = line.trim_end_matches(['\n', '\r']);
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() != FIELD_COUNT {
        return Err(LineError::FieldCount {
            found: fields.len(),
        });
    }

    let score = |index: usize, field: &'static str| -> Result<CriterionScore, LineError> {
        Ok(CriterionScore {
            score: parse_number(field, fields[index])?,
            note: optional_text(fields[index + 1]),
        })
    };

    Ok(Rating {
        key: RatingKey {
            user_id: fields[0].trim().to_string(),
            book_id: parse_number("book_id", fields[1])?,
        },
        library_name: String::new(),
        scores: CriterionScores {
            style: score(2, "style")?,
            content: score(4, "content")?,
            pleasantness: score(6, "pleasantness")?,
            originality: score(8, "originality")?,
            edition: score(10, "edition")?,
        },
        overall_score: parse_overall(fields[12])?,
        final_comment: optional_text(fields[13]),
        recorded_at: None,
    })
}

fn parse_number<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, LineError> {
    raw.trim().parse().map_err(|_| LineError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

// Locale-formatted files may carry a decimal comma; it cannot collide with
// the `;` separator.
fn parse_overall(raw: &str) -> Result<f64, LineError> {
    raw.trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| LineError::InvalidNumber {
            field: "overall_score",
            value: raw.to_string(),
        })
}

fn optional_text(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}
