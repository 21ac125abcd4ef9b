// src/pipeline/scrape.rs

use crate::error::{AppError, Result};
use crate::models::TableInformation;
use crate::parser::LessonTableParser;
use crate::services::{DocumentSource, extract_lines};
use crate::storage::{PlanArchive, fingerprint};

/// Fetch, extract and parse the current plan.
///
/// Archiving is best effort: a failed write is logged and the plan is
/// returned without `pdf_path`.
pub async fn scrape_plan(
    source: &dyn DocumentSource,
    archive: Option<&dyn PlanArchive>,
) -> Result<TableInformation> {
    log::info!("Starting scrape cycle");
    source.login().await?;
    let url = source.locate_current_document().await?;
    log::info!("Current plan document is {url}");
    let document = source.download(&url).await?;
    log::info!(
        "Downloaded plan document ({} bytes, sha256 {})",
        document.len(),
        fingerprint(&document)
    );

    let (lines, document) = tokio::task::spawn_blocking(move || {
        extract_lines(&document).map(|lines| (lines, document))
    })
    .await
    .map_err(|e| AppError::parse(format!("extraction task failed: {e}")))??;

    let mut plan = LessonTableParser::parse(&lines);
    if plan.time_info.day_numerical == 0 {
        log::warn!("No plan header found in {} lines", lines.len());
    }
    log::info!(
        "Parsed plan for {}.{} with {} substitutions",
        plan.time_info.day_numerical,
        plan.time_info.month_numerical,
        plan.lessons.len()
    );

    if let Some(archive) = archive {
        match archive.store(&document, &plan).await {
            Ok(path) => plan.pdf_path = Some(path),
            Err(e) => log::warn!("Failed to archive plan document: {e}"),
        }
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct FakeSource {
        fail_login: bool,
        calls: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl DocumentSource for FakeSource {
        async fn login(&self) -> Result<()> {
            self.calls.lock().unwrap().push("login");
            if self.fail_login {
                return Err(AppError::auth("Failed to log into moodle"));
            }
            Ok(())
        }

        async fn locate_current_document(&self) -> Result<String> {
            self.calls.lock().unwrap().push("locate");
            Ok("https://moodle.example/plan.pdf".into())
        }

        async fn download(&self, _url: &str) -> Result<Vec<u8>> {
            self.calls.lock().unwrap().push("download");
            Ok(b"not a pdf".to_vec())
        }
    }

    #[tokio::test]
    async fn login_failure_stops_the_cycle() {
        let source = FakeSource {
            fail_login: true,
            ..FakeSource::default()
        };

        let err = scrape_plan(&source, None).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
        assert_eq!(*source.calls.lock().unwrap(), vec!["login"]);
    }

    #[tokio::test]
    async fn unreadable_document_is_a_parse_error() {
        let source = FakeSource::default();

        let err = scrape_plan(&source, None).await.unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
        assert_eq!(
            *source.calls.lock().unwrap(),
            vec!["login", "locate", "download"]
        );
    }
}
