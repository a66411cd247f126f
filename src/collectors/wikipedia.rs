//! Company profile from the Wikipedia infobox.

use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use super::ProfileSource;
use crate::http;
use crate::model::Profile;
use crate::text::{non_empty, normalize_text};

const WIKI_BASE: &str = "https://en.wikipedia.org/wiki";

static RE_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title>\s*(.*?)\s*-\s*Wikipedia\s*</title>").expect("title regex"));
static RE_INFOBOX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<table[^>]*class="[^"]*infobox[^"]*"[^>]*>(.*?)</table>"#).expect("infobox regex"));
static RE_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<tr[^>]*>\s*<th[^>]*>(.*?)</th>\s*<td[^>]*>(.*?)</td>").expect("row regex")
});
static RE_NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<sup[^>]*>.*?</sup>|<style[^>]*>.*?</style>").expect("noise regex")
});
static RE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>|</li>|</p>|</div>").expect("break regex"));
static RE_FOOTNOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]").expect("footnote regex"));
static RE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("year regex"));
static RE_COUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d[\d,]*").expect("count regex"));

pub struct WikipediaProfile {
    client: reqwest::Client,
}

impl WikipediaProfile {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProfileSource for WikipediaProfile {
    async fn lookup_profile(&self, company_name: &str) -> Result<Option<Profile>> {
        let slug = company_name.trim().replace(' ', "_");
        let url = format!("{WIKI_BASE}/{slug}");
        match http::get_text_if_found(&self.client, &url, &[]).await? {
            Some(html) => Ok(Some(parse_profile(&html, company_name))),
            None => {
                tracing::debug!(company = %company_name, "no wikipedia article; name-only profile");
                Ok(Some(name_only(company_name)))
            }
        }
    }
}

/// Profile carrying just the input name as its canonical name.
pub fn name_only(company_name: &str) -> Profile {
    Profile {
        company_name: non_empty(company_name),
        ..Profile::default()
    }
}

/// Page title as the canonical name (input name when absent), plus infobox
/// facts when the page has an infobox.
pub fn parse_profile(html: &str, fallback_name: &str) -> Profile {
    let mut p = Profile {
        company_name: RE_TITLE
            .captures(html)
            .and_then(|c| c.get(1))
            .and_then(|m| non_empty(m.as_str()))
            .or_else(|| non_empty(fallback_name)),
        ..Profile::default()
    };
    let Some(infobox) = RE_INFOBOX.captures(html).and_then(|c| c.get(1)) else {
        return p;
    };
    let infobox = RE_NOISE.replace_all(infobox.as_str(), "");

    for row in RE_ROW.captures_iter(&infobox) {
        let label = normalize_text(&row[1]).to_lowercase();
        let cell = &row[2];

        if p.headquarters.is_none() && (label.contains("headquarters") || label == "location") {
            p.headquarters = cell_text(cell);
        } else if p.founded.is_none() && (label.contains("founded") || label.contains("established")) {
            p.founded = RE_YEAR
                .find(&cell_text(cell).unwrap_or_default())
                .and_then(|m| m.as_str().parse().ok());
        } else if p.industry.is_none() && label.starts_with("industry") {
            p.industry = cell_lines(cell).into_iter().next();
        } else if p.ceo.is_none() && label.contains("key people") {
            p.ceo = pick_ceo(&cell_lines(cell));
        } else if p.employees.is_none() && label.contains("employees") {
            p.employees = cell_text(cell).and_then(|t| parse_count(&t));
        }
    }

    p
}

fn cell_text(cell: &str) -> Option<String> {
    let t = normalize_text(&RE_BREAK.replace_all(cell, " "));
    non_empty(&RE_FOOTNOTE.replace_all(&t, ""))
}

fn cell_lines(cell: &str) -> Vec<String> {
    RE_BREAK
        .split(cell)
        .filter_map(|part| non_empty(&RE_FOOTNOTE.replace_all(&normalize_text(part), "")))
        .collect()
}

/// Person marked as CEO, else the first listed person; role suffix dropped.
fn pick_ceo(lines: &[String]) -> Option<String> {
    let chosen = lines
        .iter()
        .find(|l| l.contains("CEO") || l.to_lowercase().contains("chief executive"))
        .or_else(|| lines.first())?;
    let name = chosen.split('(').next().unwrap_or(chosen).trim();
    non_empty(name)
}

fn parse_count(text: &str) -> Option<u64> {
    RE_COUNT
        .find(text)
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
}
