// src/core/net.rs

// Blocking HTTP GET for leaderboard pages

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::config::consts::{HOST, PLAYERS_PAGE, PREFIX, TIMEOUT_SECS, USER_AGENT};
use crate::error::FetchError;

/// `http://<host>/rwr_stats/view_players.php?sort=<sort>&start=<start>`
pub fn leaderboard_url(sort: &str, start: u32) -> String {
    format!("http://{HOST}{PREFIX}{PLAYERS_PAGE}?sort={sort}&start={start}")
}

pub fn client() -> Result<Client, FetchError> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(TIMEOUT_SECS))
        .build()?)
}

/// GET `url` and return the body text. Non-2xx statuses are errors.
pub fn http_get(client: &Client, url: &str) -> Result<String, FetchError> {
    debug!("GET {url}");
    let resp = client.get(url).send()?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status { code: status.as_u16(), url: s!(url) });
    }
    Ok(resp.text()?)
}
