// src/services/portal.rs

//! Moodle portal access.
//!
//! Logs in with a form post, finds the plan's download link on the course
//! page and downloads the document. Nothing here retries; a failed step ends
//! the cycle and the scheduler tries again next interval.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::PortalConfig;
use crate::utils::{http, resolve};

/// Source of the current plan document.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Start an authenticated session.
    async fn login(&self) -> Result<()>;

    /// URL of the current plan document.
    async fn locate_current_document(&self) -> Result<String>;

    /// Raw document bytes.
    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}

/// Moodle client sharing one cookie session across requests.
pub struct PortalClient {
    client: Client,
    config: PortalConfig,
}

impl PortalClient {
    pub fn new(client: Client, config: PortalConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl DocumentSource for PortalClient {
    async fn login(&self) -> Result<()> {
        let form = [
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
            ("submit", ""),
        ];
        let response = self
            .client
            .post(&self.config.login_url)
            .form(&form)
            .send()
            .await?;
        let body = http::read_text(response, "logging into moodle").await?;

        check_login(
            &body,
            &self.config.login_info_selector,
            &self.config.login_success,
        )?;
        log::debug!("Logged into moodle as {}", self.config.username);
        Ok(())
    }

    async fn locate_current_document(&self) -> Result<String> {
        let response = self.client.get(&self.config.course_url).send().await?;
        let body = http::read_text(response, "querying download url").await?;

        let href = find_document_link(&body, &self.config.table_name)?;
        let url = resolve(&self.config.course_url, &href).unwrap_or(href);
        log::debug!("Moodle table download link is {url}");
        Ok(url)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        http::read_bytes(response, "downloading table").await
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Check the page returned by the login form for the success text.
///
/// The first element matching `info_selector` must contain `marker`,
/// compared case-insensitively.
pub fn check_login(html: &str, info_selector: &str, marker: &str) -> Result<()> {
    let document = Html::parse_document(html);
    let selector = parse_selector(info_selector)?;

    let info = document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().to_lowercase())
        .unwrap_or_default();

    if info.contains(&marker.to_lowercase()) {
        Ok(())
    } else {
        Err(AppError::auth(format!(
            "{info_selector} didn't indicate a successful login"
        )))
    }
}

/// Find the href of the first anchor with a `span` child whose text starts
/// with `label`.
pub fn find_document_link(html: &str, label: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let anchors = parse_selector("a")?;
    let spans = parse_selector("span")?;

    for anchor in document.select(&anchors) {
        let labelled = anchor
            .child_elements()
            .filter(|child| spans.matches(child))
            .any(|span| span.text().collect::<String>().starts_with(label));
        if !labelled {
            continue;
        }

        let href = anchor.value().attr("href").unwrap_or_default().trim();
        if href.is_empty() {
            return Err(AppError::not_found(
                "Empty href element while querying download url",
            ));
        }
        return Ok(href.to_string());
    }

    Err(AppError::not_found(format!(
        "Failed to find download url labelled '{label}'"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COURSE_PAGE: &str = r#"
        <html><body>
          <a href="/mod/forum/view.php?id=1"><span class="instancename">Ankündigungen</span></a>
          <a href="/mod/resource/view.php?id=42"><img src="pdf.png"><span class="instancename">Vertretungsplan Klasse 5-12</span></a>
          <a href="/mod/resource/view.php?id=43"><span class="instancename">Vertretungsplan (alt)</span></a>
        </body></html>
    "#;

    #[test]
    fn first_matching_anchor_wins() {
        let href = find_document_link(COURSE_PAGE, "Vertretungsplan").unwrap();
        assert_eq!(href, "/mod/resource/view.php?id=42");
    }

    #[test]
    fn missing_label_is_not_found() {
        let result = find_document_link(COURSE_PAGE, "Speiseplan");
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn empty_href_is_not_found() {
        let page = r#"<a href="  "><span>Vertretungsplan</span></a>"#;
        assert!(matches!(
            find_document_link(page, "Vertretungsplan"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn label_must_be_on_direct_span_child() {
        let page = r#"<a href="/x"><div><span>Vertretungsplan</span></div></a>"#;
        assert!(find_document_link(page, "Vertretungsplan").is_err());
    }

    #[test]
    fn login_marker_is_case_insensitive() {
        let page = r#"<div class="logininfo">Sie sind angemeldet als <a>Max</a></div>"#;
        assert!(check_login(page, ".logininfo", "sie sind angemeldet als").is_ok());
    }

    #[test]
    fn login_without_marker_fails() {
        let page = r#"<div class="logininfo">Sie sind nicht angemeldet.</div>"#;
        assert!(matches!(
            check_login(page, ".logininfo", "sie sind angemeldet als"),
            Err(AppError::Auth(_))
        ));
    }

    #[test]
    fn login_page_without_info_box_fails() {
        assert!(check_login("<html></html>", ".logininfo", "angemeldet").is_err());
    }
}
