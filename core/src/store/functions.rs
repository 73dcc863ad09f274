//! SQL scalar functions registered on every catalog connection.
//!
//! `release_year(text)` parses the catalog's release-date string and yields
//! NULL when it does not parse, so unparseable dates drop out inside the
//! data source. `has_genre(genres, genre)` is exact membership in the split
//! genre list.

use chrono::{Datelike, NaiveDate};
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

use crate::{shaper::split_genres, types::Year};

pub const RELEASE_DATE_FORMAT: &str = "%b %d, %Y";

/// Parse a release date such as `"Oct 21, 2008"` into its year.
pub fn parse_release_year(raw: &str) -> Option<Year> {
    NaiveDate::parse_from_str(raw.trim(), RELEASE_DATE_FORMAT)
        .ok()
        .map(|date| date.year())
}

pub(super) fn register(conn: &Connection) -> rusqlite::Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;

    conn.create_scalar_function("release_year", 1, flags, |ctx| {
        let raw = ctx.get::<Option<String>>(0)?;
        Ok(raw.as_deref().and_then(parse_release_year))
    })?;

    conn.create_scalar_function("has_genre", 2, flags, |ctx| {
        let genres = ctx.get::<Option<String>>(0)?;
        let wanted = ctx.get::<Option<String>>(1)?;
        let found = match (genres, wanted) {
            (Some(genres), Some(wanted)) => split_genres(&genres).any(|g| g == wanted),
            _ => false,
        };
        Ok(found)
    })?;

    Ok(())
}
