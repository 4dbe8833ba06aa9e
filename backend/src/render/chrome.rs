use super::{CardSize, PdfRenderer, RenderError};
use async_trait::async_trait;
use log::{debug, warn};
use std::io::Write;
use tempfile::NamedTempFile;
use tokio::process::Command;

/// Renders through a headless Chromium `--print-to-pdf` run.
///
/// The page size is forced with an injected `@page` rule so the PDF matches
/// the card's physical dimensions regardless of the template's own CSS.
pub struct HeadlessChromeRenderer {
    binary: String,
}

impl HeadlessChromeRenderer {
    pub fn new(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
        }
    }
}

/// Prepends the `@page` rule to the document's `<head>`, or to the whole
/// document when it has none.
pub(crate) fn with_page_size(html: &str, size: CardSize) -> String {
    let rule = format!(
        "<style>@page {{ size: {w}mm {h}mm; margin: 0; }} html, body {{ -webkit-print-color-adjust: exact; print-color-adjust: exact; }}</style>",
        w = size.width_mm,
        h = size.height_mm
    );
    match html.find("<head>") {
        Some(pos) => {
            let at = pos + "<head>".len();
            format!("{}{}{}", &html[..at], rule, &html[at..])
        }
        None => format!("{}{}", rule, html),
    }
}

#[async_trait]
impl PdfRenderer for HeadlessChromeRenderer {
    async fn render(&self, html: &str, size: CardSize) -> Result<Vec<u8>, RenderError> {
        // Both files are removed when dropped at the end of this call.
        let mut page = tempfile::Builder::new().suffix(".html").tempfile()?;
        page.write_all(with_page_size(html, size).as_bytes())?;
        page.flush()?;
        let output = NamedTempFile::new()?;

        let (width_px, height_px) = size.pixels(96);
        debug!("Rendering {}x{}mm card with {}", size.width_mm, size.height_mm, self.binary);

        let result = Command::new(&self.binary)
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--no-pdf-header-footer")
            .arg(format!("--window-size={},{}", width_px, height_px))
            .arg(format!("--print-to-pdf={}", output.path().display()))
            .arg(format!("file://{}", page.path().display()))
            .kill_on_drop(true)
            .output()
            .await?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            warn!("Renderer failed: {}", stderr);
            return Err(RenderError::Failed {
                status: result.status.to_string(),
                stderr,
            });
        }

        let pdf = tokio::fs::read(output.path()).await?;
        if pdf.is_empty() {
            return Err(RenderError::Empty);
        }
        Ok(pdf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: CardSize = CardSize {
        width_mm: 85.6,
        height_mm: 53.98,
    };

    #[test]
    fn page_rule_goes_into_head() {
        let html = with_page_size("<html><head><title>x</title></head><body></body></html>", SIZE);
        assert!(html.starts_with("<html><head><style>@page { size: 85.6mm 53.98mm; margin: 0; }"));
        assert!(html.contains("<title>x</title>"));
    }

    #[test]
    fn page_rule_prepended_without_head() {
        let html = with_page_size("<div>card</div>", SIZE);
        assert!(html.starts_with("<style>@page"));
        assert!(html.ends_with("<div>card</div>"));
    }

    #[tokio::test]
    async fn missing_binary_is_an_io_error() {
        let renderer = HeadlessChromeRenderer::new("/nonexistent/chromium-binary");
        let err = renderer.render("<p>x</p>", SIZE).await.unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
    }
}
