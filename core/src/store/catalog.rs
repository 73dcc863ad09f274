use super::DashStore;
use crate::error::DashResult;
use rusqlite::params;
use serde::{Deserialize, Serialize};

/// A title row to be written into `app_info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTitle {
    pub name: String,
    pub release_date: Option<String>,
    pub genres: Option<String>,
    pub price: f64,
}

/// A metric row to be written into `app` for an existing title.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMetric {
    pub peak_ccu: i64,
    pub positive_reviews: i64,
    pub negative_reviews: i64,
    pub average_playtime_forever: i64,
    pub average_playtime_twoweeks: i64,
    pub user_score: i64,
}

impl DashStore {
    // ── Catalog writes (seeding and tests) ───────────────────────

    /// Insert a title and its metrics. Returns the new `info_id`.
    pub fn insert_title(&self, title: &NewTitle, metric: &NewMetric) -> DashResult<i64> {
        self.conn.execute(
            "INSERT INTO app_info (name, release_date, Genres, Price) VALUES (?1, ?2, ?3, ?4)",
            params![
                &title.name,
                title.release_date.as_deref(),
                title.genres.as_deref(),
                title.price,
            ],
        )?;
        let info_id = self.conn.last_insert_rowid();

        self.conn.execute(
            "INSERT INTO app (
                info_id, peak_ccu, positive_reviews, negative_reviews,
                average_playtime_forever, average_playtime_twoweeks, user_score
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                info_id,
                metric.peak_ccu,
                metric.positive_reviews,
                metric.negative_reviews,
                metric.average_playtime_forever,
                metric.average_playtime_twoweeks,
                metric.user_score,
            ],
        )?;
        Ok(info_id)
    }

    /// Insert a batch of titles inside one transaction.
    pub fn insert_titles(&mut self, rows: &[(NewTitle, NewMetric)]) -> DashResult<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut title_stmt = tx.prepare(
                "INSERT INTO app_info (name, release_date, Genres, Price) VALUES (?1, ?2, ?3, ?4)",
            )?;
            let mut metric_stmt = tx.prepare(
                "INSERT INTO app (
                    info_id, peak_ccu, positive_reviews, negative_reviews,
                    average_playtime_forever, average_playtime_twoweeks, user_score
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (title, metric) in rows {
                let info_id = title_stmt.insert(params![
                    &title.name,
                    title.release_date.as_deref(),
                    title.genres.as_deref(),
                    title.price,
                ])?;
                metric_stmt.execute(params![
                    info_id,
                    metric.peak_ccu,
                    metric.positive_reviews,
                    metric.negative_reviews,
                    metric.average_playtime_forever,
                    metric.average_playtime_twoweeks,
                    metric.user_score,
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    pub fn title_count(&self) -> DashResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM app_info", [], |row| row.get(0))
            .map_err(Into::into)
    }
}
