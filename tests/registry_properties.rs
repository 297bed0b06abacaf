//! Registry and classifier properties exercised through the public API.

use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use docshelf::classify::{classify, Classifier, Rule};
use docshelf::models::{AnalysisStatus, DocumentRecord, Domain};
use docshelf::registry::{load_records, save_records, Registry};

fn record_in(dir: &Path, id: &str, domain: Domain, hour: u32) -> DocumentRecord {
    let stored_path: PathBuf = dir.join(format!("{}.pdf", id));
    std::fs::write(&stored_path, id.as_bytes()).unwrap();
    DocumentRecord {
        id: id.to_string(),
        original_filename: format!("{}.pdf", id),
        stored_path,
        content_hash: DocumentRecord::compute_hash(id.as_bytes()),
        mime_type: "application/pdf".to_string(),
        page_count: Some(2),
        extracted_text: format!("text of {}", id),
        domain,
        summary: "summary".to_string(),
        analysis: "analysis".to_string(),
        analysis_status: AnalysisStatus::Complete,
        model: None,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
    }
}

#[test]
fn save_of_load_leaves_file_unchanged() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("document_registry.json");
    let mut registry = Registry::open(&path).unwrap();
    registry
        .insert(record_in(dir.path(), "b", Domain::Legal, 3))
        .unwrap();
    registry
        .insert(record_in(dir.path(), "a", Domain::Finance, 1))
        .unwrap();

    let before = std::fs::read(&path).unwrap();
    let loaded = load_records(&path).unwrap();
    save_records(&path, &loaded).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn distinct_inserts_are_all_listed() {
    let dir = TempDir::new().unwrap();
    let mut registry = Registry::open(dir.path().join("r.json")).unwrap();
    let domains = [Domain::Finance, Domain::Medical, Domain::Finance, Domain::General];
    for (i, domain) in domains.iter().enumerate() {
        registry
            .insert(record_in(dir.path(), &format!("doc{}", i), *domain, i as u32))
            .unwrap();
    }

    let all = registry.list(None);
    assert_eq!(all.len(), domains.len());
    assert!(all.windows(2).all(|w| w[0].created_at <= w[1].created_at));

    for domain in Domain::ALL {
        let filtered = registry.list(Some(domain));
        assert!(filtered.iter().all(|r| r.domain == domain));
        assert!(filtered.iter().all(|r| all.iter().any(|a| a.id == r.id)));
    }
    assert_eq!(registry.list(Some(Domain::Finance)).len(), 2);
}

#[test]
fn duplicate_id_overwrites() {
    let dir = TempDir::new().unwrap();
    let mut registry = Registry::open(dir.path().join("r.json")).unwrap();
    registry
        .insert(record_in(dir.path(), "same", Domain::Technical, 1))
        .unwrap();
    let previous = registry
        .insert(record_in(dir.path(), "same", Domain::Education, 2))
        .unwrap();

    assert_eq!(previous.map(|r| r.domain), Some(Domain::Technical));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get("same").unwrap().domain, Domain::Education);
}

#[test]
fn classify_single_keyword_per_domain() {
    assert_eq!(classify("Please find the invoice attached"), Domain::Finance);
    assert_eq!(classify("Signed CONTRACT"), Domain::Legal);
    assert_eq!(classify("hospital discharge"), Domain::Medical);
    assert_eq!(classify("course syllabus"), Domain::Education);
    assert_eq!(classify("algorithm notes"), Domain::Technical);
    assert_eq!(classify("a poem about autumn"), Domain::General);
    assert_eq!(classify(""), Domain::General);
}

#[test]
fn classify_priority_is_deterministic() {
    // Finance outranks every other domain
    let mixed = "The patient paid the invoice under the contract";
    for _ in 0..10 {
        assert_eq!(classify(mixed), Domain::Finance);
    }
    // Legal outranks Medical and Technical
    assert_eq!(
        classify("Software license agreement for the hospital"),
        Domain::Legal
    );
}

#[test]
fn custom_rule_table() {
    let classifier = Classifier::from_rules(vec![
        Rule {
            domain: Domain::Technical,
            keywords: vec!["Kernel".to_string()],
        },
        Rule {
            domain: Domain::General,
            keywords: vec!["anything".to_string()],
        },
    ]);
    assert_eq!(classifier.classify("linux KERNEL panic"), Domain::Technical);
    assert_eq!(classifier.classify("anything else"), Domain::General);
    assert_eq!(classifier.rules().len(), 1);
}
