//! HTML templates for the web interface.

use crate::models::{DocumentRecord, Domain};
use crate::reporting::Report;
use crate::utils::{format_size, html_escape};

/// Base HTML template.
pub fn base_template(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - docshelf</title>
    <link rel="stylesheet" href="/static/style.css">
</head>
<body>
    <header id="main-header">
        <nav>
            <a href="/" class="logo">docshelf</a>
            <a href="/upload">upload</a>
            <a href="/report">report</a>
        </nav>
    </header>
    <main>
        <h1>{}</h1>
        {}
    </main>
</body>
</html>"#,
        html_escape(title),
        html_escape(title),
        content
    )
}

/// Page shown when a request cannot be served.
pub fn error_page(title: &str, message: &str) -> String {
    base_template(
        title,
        &format!(
            r#"<p class="error">{}</p><p><a href="/">Back to documents</a></p>"#,
            html_escape(message)
        ),
    )
}

fn domain_tabs(active: Option<Domain>, report: &Report) -> String {
    let mut tabs = format!(
        r#"<a href="/documents" class="tab{}">All <span class="count">{}</span></a>"#,
        if active.is_none() { " active" } else { "" },
        report.total
    );
    for count in &report.by_domain {
        tabs.push_str(&format!(
            r#"<a href="/documents?domain={}" class="tab{}">{} <span class="count">{}</span></a>"#,
            count.domain.slug(),
            if active == Some(count.domain) {
                " active"
            } else {
                ""
            },
            count.domain,
            count.count
        ));
    }
    format!(r#"<nav class="domain-tabs">{}</nav>"#, tabs)
}

/// Document listing with domain filter tabs.
///
/// `report` supplies the tab counts; `documents` is already filtered.
pub fn document_list(
    documents: &[DocumentRecord],
    active: Option<Domain>,
    report: &Report,
) -> String {
    let tabs = domain_tabs(active, report);

    if documents.is_empty() {
        return format!(
            r#"{}<p class="empty">No documents yet. <a href="/upload">Upload one</a>.</p>"#,
            tabs
        );
    }

    let mut rows = String::new();
    for doc in documents {
        let status = if doc.has_analysis() {
            String::new()
        } else {
            r#" <span class="badge warn">no analysis</span>"#.to_string()
        };
        rows.push_str(&format!(
            r#"
        <tr>
            <td><a href="/documents/{}">{}</a>{}</td>
            <td><span class="domain domain-{}">{}</span></td>
            <td class="summary">{}</td>
            <td class="date">{}</td>
        </tr>"#,
            urlencoding::encode(&doc.id),
            html_escape(&doc.original_filename),
            status,
            doc.domain.slug(),
            doc.domain,
            html_escape(&doc.summary_excerpt(160)),
            doc.created_at.format("%Y-%m-%d %H:%M")
        ));
    }

    format!(
        r#"{}
    <table class="file-listing">
        <thead>
            <tr>
                <th>File</th>
                <th>Domain</th>
                <th>Summary</th>
                <th>Processed</th>
            </tr>
        </thead>
        <tbody>{}
        </tbody>
    </table>"#,
        tabs, rows
    )
}

/// Detail view of one record.
///
/// `file_url` links to the stored upload when it can be served.
pub fn document_detail(doc: &DocumentRecord, file_url: Option<&str>, size: Option<u64>) -> String {
    let file_link = match file_url {
        Some(url) => format!(
            r#"<a href="{}">{}</a>{}"#,
            html_escape(url),
            html_escape(&doc.original_filename),
            size.map(|s| format!(" ({})", format_size(s)))
                .unwrap_or_default()
        ),
        None => html_escape(&doc.original_filename),
    };

    let pages = doc
        .page_count
        .map(|p| format!("<dt>Pages</dt><dd>{}</dd>", p))
        .unwrap_or_default();
    let model = doc
        .model
        .as_ref()
        .map(|m| format!("<dt>Model</dt><dd>{}</dd>", html_escape(m)))
        .unwrap_or_default();

    let summary = if doc.has_analysis() {
        format!(
            r#"<section class="summary"><h2>Summary</h2><div class="prose">{}</div></section>"#,
            html_escape(&doc.summary)
        )
    } else {
        r#"<section class="summary"><h2>Summary</h2><p class="warn">The AI analysis was unavailable when this document was processed.</p></section>"#.to_string()
    };

    format!(
        r#"
    <dl class="metadata">
        <dt>File</dt><dd>{}</dd>
        <dt>Domain</dt><dd><a href="/documents?domain={}" class="domain domain-{}">{}</a></dd>
        <dt>Type</dt><dd>{}</dd>
        {}
        <dt>Processed</dt><dd>{}</dd>
        {}
        <dt>SHA-256</dt><dd class="hash">{}</dd>
    </dl>
    {}
    <section class="analysis"><h2>Analysis</h2><div class="prose">{}</div></section>
    <details class="extracted-text">
        <summary>Extracted text ({} characters)</summary>
        <pre>{}</pre>
    </details>
    <form method="post" action="/documents/{}/delete" class="delete-form">
        <button type="submit" class="btn-danger">Delete document</button>
    </form>"#,
        file_link,
        doc.domain.slug(),
        doc.domain.slug(),
        doc.domain,
        html_escape(&doc.mime_type),
        pages,
        doc.created_at.format("%Y-%m-%d %H:%M UTC"),
        model,
        html_escape(&doc.content_hash),
        summary,
        html_escape(&doc.analysis),
        doc.extracted_text.chars().count(),
        html_escape(&doc.extracted_text),
        urlencoding::encode(&doc.id)
    )
}

/// Upload form.
pub fn upload_form() -> String {
    r#"
    <form method="post" action="/upload" enctype="multipart/form-data" class="upload-form">
        <p>Upload a PDF or an image (PNG, JPEG, TIFF). Text is extracted with OCR,
        tagged with a domain and summarized.</p>
        <input type="file" name="file" accept=".pdf,.png,.jpg,.jpeg,.tif,.tiff,.bmp,.gif,.webp,.txt" required>
        <button type="submit">Process</button>
        <p class="hint">Processing can take a minute or two for multi-page PDFs.</p>
    </form>"#
        .to_string()
}

/// Report page: per-domain table and per-day bars.
pub fn report_page(report: &Report) -> String {
    let mut domain_rows = String::new();
    for count in &report.by_domain {
        domain_rows.push_str(&format!(
            r#"
            <tr><td><a href="/documents?domain={}">{}</a></td><td class="num">{}</td></tr>"#,
            count.domain.slug(),
            count.domain,
            count.count
        ));
    }

    let timeline = if report.timeline.is_empty() {
        r#"<p class="empty">Nothing processed yet.</p>"#.to_string()
    } else {
        let max = report.max_daily().max(1);
        let mut rows = String::new();
        for bucket in &report.timeline {
            let width = bucket.count * 100 / max;
            rows.push_str(&format!(
                r#"
            <tr>
                <td class="date">{}</td>
                <td class="bar-cell"><span class="bar" style="width: {}%"></span></td>
                <td class="num">{}</td>
            </tr>"#,
                bucket.date, width, bucket.count
            ));
        }
        format!(
            r#"<table class="timeline"><thead><tr><th>Day</th><th></th><th>Documents</th></tr></thead><tbody>{}
        </tbody></table>"#,
            rows
        )
    };

    format!(
        r#"
    <p>{} documents in total.</p>
    <h2>By domain</h2>
    <table class="file-listing">
        <thead><tr><th>Domain</th><th>Documents</th></tr></thead>
        <tbody>{}
        </tbody>
    </table>
    <h2>By day</h2>
    {}"#,
        report.total, domain_rows, timeline
    )
}
