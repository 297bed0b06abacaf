//! PDF rasterization helpers.

use std::path::{Path, PathBuf};

/// Collect every page image in `dir`, in page order.
pub fn collect_page_images(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut images: Vec<(u32, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter_map(|p| page_number(&p).map(|n| (n, p)))
        .collect();
    images.sort_by_key(|(n, _)| *n);
    Ok(images.into_iter().map(|(_, p)| p).collect())
}

/// Page number from a `page-NN.png` filename.
fn page_number(path: &Path) -> Option<u32> {
    if path.extension()? != "png" {
        return None;
    }
    path.file_stem()?
        .to_str()?
        .strip_prefix("page-")?
        .parse()
        .ok()
}

/// Read the page count out of `pdfinfo` output.
pub fn parse_pdfinfo_pages(output: &str) -> Option<u32> {
    output
        .lines()
        .find(|line| line.starts_with("Pages:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse().ok())
}
