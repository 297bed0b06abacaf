//! Keyword-based domain classification.
//!
//! Rules are an ordered table of `(Domain, keywords)`. The first rule with a
//! keyword occurring in the lowercased text decides the domain; text matching
//! no rule is `General`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::Domain;

/// Default rules, in priority order.
const DEFAULT_RULES: &[(Domain, &[&str])] = &[
    (
        Domain::Finance,
        &[
            "invoice",
            "payment",
            "receipt",
            "amount due",
            "balance",
            "taxes",
            "bank",
            "account number",
            "billing",
        ],
    ),
    (
        Domain::Legal,
        &[
            "contract",
            "agreement",
            "clause",
            "plaintiff",
            "defendant",
            "lawsuit",
            "attorney",
            "hereby",
            "jurisdiction",
        ],
    ),
    (
        Domain::Medical,
        &[
            "patient",
            "diagnosis",
            "prescription",
            "hospital",
            "clinic",
            "physician",
            "dosage",
            "medical",
        ],
    ),
    (
        Domain::Education,
        &[
            "student",
            "syllabus",
            "university",
            "semester",
            "transcript",
            "curriculum",
            "enrollment",
            "lecture",
        ],
    ),
    (
        Domain::Technical,
        &[
            "software",
            "algorithm",
            "server",
            "database",
            "configuration",
            "architecture",
            "source code",
            "specification",
        ],
    ),
];

/// Extra keywords supplied through configuration.
///
/// Keys are domain labels; unknown labels are rejected when the config is
/// turned into a [`Classifier`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub keywords: HashMap<String, Vec<String>>,
}

impl ClassifierConfig {
    pub fn is_default(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// One entry of the rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub domain: Domain,
    /// Lowercased keywords.
    pub keywords: Vec<String>,
}

/// Deterministic text classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    rules: Vec<Rule>,
}

impl Default for Classifier {
    fn default() -> Self {
        let rules = DEFAULT_RULES
            .iter()
            .map(|(domain, keywords)| Rule {
                domain: *domain,
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
            })
            .collect();
        Self { rules }
    }
}

impl Classifier {
    /// Build a classifier from an explicit rule table.
    ///
    /// Keywords are lowercased and blank ones dropped. Rules for `General`
    /// are ignored since it is the fallback.
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        let rules = rules
            .into_iter()
            .filter(|r| r.domain != Domain::General)
            .map(|r| Rule {
                domain: r.domain,
                keywords: normalize_keywords(r.keywords),
            })
            .collect();
        Self { rules }
    }

    /// Default rules extended with configured keywords.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, crate::models::UnknownDomain> {
        let mut classifier = Self::default();
        for (label, extra) in &config.keywords {
            let domain: Domain = label.parse()?;
            if domain == Domain::General {
                tracing::warn!("Ignoring keywords configured for General (it is the fallback)");
                continue;
            }
            if let Some(rule) = classifier.rules.iter_mut().find(|r| r.domain == domain) {
                let mut merged = std::mem::take(&mut rule.keywords);
                merged.extend(extra.iter().cloned());
                rule.keywords = normalize_keywords(merged);
            }
        }
        Ok(classifier)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Classify text into exactly one domain.
    pub fn classify(&self, text: &str) -> Domain {
        self.explain(text)
            .map(|(domain, _)| domain)
            .unwrap_or(Domain::General)
    }

    /// Like [`classify`](Self::classify), but also returns the keyword that
    /// decided it. `None` means the text fell through to `General`.
    pub fn explain(&self, text: &str) -> Option<(Domain, &str)> {
        let haystack = text.to_lowercase();
        self.rules.iter().find_map(|rule| {
            rule.keywords
                .iter()
                .find(|k| haystack.contains(k.as_str()))
                .map(|k| (rule.domain, k.as_str()))
        })
    }
}

fn normalize_keywords(keywords: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        let k = keyword.trim().to_lowercase();
        if !k.is_empty() && !out.contains(&k) {
            out.push(k);
        }
    }
    out
}

/// Classify with the default rule table.
pub fn classify(text: &str) -> Domain {
    Classifier::default().classify(text)
}
