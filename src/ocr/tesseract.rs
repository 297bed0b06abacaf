//! Tesseract OCR via command-line tools.

use std::path::Path;
use std::process::Command;
use std::time::Instant;

use tempfile::TempDir;
use tracing::{debug, warn};

use super::pdf_utils::{collect_page_images, parse_pdfinfo_pages};
use super::{is_supported_image, Extraction, ExtractionError, ExtractionMethod, Extractor, OcrConfig};

/// Tools this extractor shells out to.
const REQUIRED_TOOLS: [&str; 3] = ["pdfinfo", "pdftoppm", "tesseract"];

/// Handle command output, extracting stdout on success or returning appropriate error.
fn handle_cmd_output(
    result: std::io::Result<std::process::Output>,
    tool_name: &str,
    error_prefix: &str,
) -> Result<String, ExtractionError> {
    match result {
        Ok(output) => {
            if output.status.success() {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(ExtractionError::Failed(format!(
                    "{}: {}",
                    error_prefix,
                    stderr.trim()
                )))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ExtractionError::ToolNotFound(tool_name.to_string()))
        }
        Err(e) => Err(ExtractionError::Io(e)),
    }
}

/// Extractor backed by Tesseract and Poppler.
#[derive(Debug, Clone, Default)]
pub struct TesseractExtractor {
    config: OcrConfig,
}

impl TesseractExtractor {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    /// Check which of the required tools can be found.
    pub fn check_tools(&self) -> Vec<(String, bool)> {
        REQUIRED_TOOLS
            .iter()
            .map(|tool| {
                let found = match &self.config.tools_dir {
                    Some(dir) => dir.join(tool).is_file(),
                    None => which::which(tool).is_ok(),
                };
                (tool.to_string(), found)
            })
            .collect()
    }

    fn command(&self, tool: &str) -> Command {
        match &self.config.tools_dir {
            Some(dir) => Command::new(dir.join(tool)),
            None => Command::new(tool),
        }
    }

    /// Run Tesseract OCR on an image.
    fn run_tesseract(&self, image_path: &Path) -> Result<String, ExtractionError> {
        let output = self
            .command("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.config.language])
            .output();

        handle_cmd_output(output, "tesseract (install tesseract-ocr)", "tesseract failed")
    }

    /// Get the page count of a PDF.
    fn pdf_page_count(&self, file_path: &Path) -> Option<u32> {
        let output = self.command("pdfinfo").arg(file_path).output().ok()?;
        if !output.status.success() {
            return None;
        }
        parse_pdfinfo_pages(&String::from_utf8_lossy(&output.stdout))
    }

    /// Rasterize every page of a PDF, then OCR the pages in order.
    fn extract_pdf(&self, file_path: &Path) -> Result<Extraction, ExtractionError> {
        let expected_pages = self.pdf_page_count(file_path);
        let temp_dir = TempDir::new()?;
        let dpi = self.config.dpi.to_string();

        let output = self
            .command("pdftoppm")
            .args(["-png", "-r", &dpi])
            .arg(file_path)
            .arg(temp_dir.path().join("page"))
            .output();
        handle_cmd_output(
            output,
            "pdftoppm (install poppler-utils)",
            "pdftoppm failed to convert PDF",
        )?;

        let images = collect_page_images(temp_dir.path())?;
        if images.is_empty() {
            return Err(ExtractionError::Failed(
                "No images generated from PDF".to_string(),
            ));
        }
        if let Some(expected) = expected_pages {
            if expected as usize != images.len() {
                warn!(
                    "pdfinfo reported {} pages but {} were rasterized",
                    expected,
                    images.len()
                );
            }
        }

        let mut text = String::new();
        for (i, image_path) in images.iter().enumerate() {
            let page_text = self.run_tesseract(image_path).map_err(|e| {
                ExtractionError::Failed(format!(
                    "OCR failed on page {} of {}: {}",
                    i + 1,
                    images.len(),
                    e
                ))
            })?;
            text.push_str(&page_text);
            text.push('\n');
        }

        Ok(Extraction {
            text,
            method: ExtractionMethod::PdfOcr,
            page_count: Some(images.len() as u32),
        })
    }
}

impl Extractor for TesseractExtractor {
    fn extract(&self, path: &Path, mime_type: &str) -> Result<Extraction, ExtractionError> {
        let start = Instant::now();
        let result = match mime_type {
            "application/pdf" => self.extract_pdf(path),
            m if is_supported_image(m) => self.run_tesseract(path).map(|text| Extraction {
                text,
                method: ExtractionMethod::ImageOcr,
                page_count: Some(1),
            }),
            "text/plain" => {
                let bytes = std::fs::read(path)?;
                Ok(Extraction {
                    text: String::from_utf8_lossy(&bytes).into_owned(),
                    method: ExtractionMethod::PlainText,
                    page_count: None,
                })
            }
            other => Err(ExtractionError::UnsupportedFormat(other.to_string())),
        };
        debug!(
            "Extraction of {} ({}) took {} ms",
            path.display(),
            mime_type,
            start.elapsed().as_millis()
        );
        result
    }

    fn name(&self) -> &'static str {
        "tesseract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_check_tools() {
        let tools = TesseractExtractor::default().check_tools();
        assert_eq!(tools.len(), 3);
        for (tool, available) in tools {
            println!("{}: {}", tool, if available { "found" } else { "missing" });
        }
    }

    #[cfg(unix)]
    fn write_script(dir: &Path, name: &str, body: &str) {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// Fake Poppler and Tesseract: three pages, OCR fails on `fail_page`.
    #[cfg(unix)]
    fn fake_tools(fail_page: Option<u32>) -> TempDir {
        let dir = tempdir().unwrap();
        write_script(dir.path(), "pdfinfo", "echo 'Pages:          3'");
        write_script(
            dir.path(),
            "pdftoppm",
            r#"for last; do :; done
for n in 1 2 3; do : > "$last-$n.png"; done"#,
        );
        let fail = match fail_page {
            Some(n) => format!(
                r#"case "$1" in *page-{}.png) echo 'page unreadable' >&2; exit 1;; esac"#,
                n
            ),
            None => String::new(),
        };
        write_script(
            dir.path(),
            "tesseract",
            &format!("{}\necho \"TEXT OF $(basename \"$1\")\"", fail),
        );
        dir
    }

    #[cfg(unix)]
    fn extractor_with(tools: &TempDir) -> TesseractExtractor {
        TesseractExtractor::new(OcrConfig {
            tools_dir: Some(tools.path().to_path_buf()),
            ..OcrConfig::default()
        })
    }

    #[cfg(unix)]
    #[test]
    fn test_pdf_pages_joined_in_order() {
        let tools = fake_tools(None);
        let docs = tempdir().unwrap();
        let pdf = docs.path().join("scan.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();

        let extractor = extractor_with(&tools);
        assert!(extractor.check_tools().iter().all(|(_, found)| *found));

        let extraction = extractor.extract(&pdf, "application/pdf").unwrap();
        assert_eq!(extraction.method, ExtractionMethod::PdfOcr);
        assert_eq!(extraction.page_count, Some(3));
        assert_eq!(
            extraction.text,
            "TEXT OF page-1.png\n\nTEXT OF page-2.png\n\nTEXT OF page-3.png\n\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_pdf_page_failure_fails_extraction() {
        let tools = fake_tools(Some(2));
        let docs = tempdir().unwrap();
        let pdf = docs.path().join("scan.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();

        let err = extractor_with(&tools)
            .extract(&pdf, "application/pdf")
            .unwrap_err();
        match err {
            ExtractionError::Failed(msg) => {
                assert!(msg.contains("page 2 of 3"), "{}", msg);
                assert!(msg.contains("page unreadable"), "{}", msg);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_tools_dir_reports_tool_not_found() {
        let empty = tempdir().unwrap();
        let extractor = TesseractExtractor::new(OcrConfig {
            tools_dir: Some(empty.path().to_path_buf()),
            ..OcrConfig::default()
        });
        assert!(extractor.check_tools().iter().all(|(_, found)| !*found));

        let image = empty.path().join("scan.png");
        std::fs::write(&image, b"png").unwrap();
        let err = extractor.extract(&image, "image/png").unwrap_err();
        assert!(matches!(err, ExtractionError::ToolNotFound(_)));
    }

    #[test]
    fn test_plain_text_is_read_directly() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Invoice for March\nPayment due").unwrap();

        let extraction = TesseractExtractor::default()
            .extract(&path, "text/plain")
            .unwrap();
        assert_eq!(extraction.method, ExtractionMethod::PlainText);
        assert!(extraction.text.contains("Payment due"));
    }

    #[test]
    fn test_unsupported_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("archive.zip");
        std::fs::write(&path, b"PK").unwrap();

        let err = TesseractExtractor::default()
            .extract(&path, "application/zip")
            .unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat(m) if m == "application/zip"));
    }

    #[test]
    fn test_handle_cmd_output_missing_tool() {
        let result = Command::new("definitely-not-a-real-binary-docshelf").output();
        let err = handle_cmd_output(result, "fake-tool", "fake failed").unwrap_err();
        assert!(matches!(err, ExtractionError::ToolNotFound(t) if t == "fake-tool"));
    }
}
