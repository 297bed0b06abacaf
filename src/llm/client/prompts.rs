//! Default prompts for document summarization and analysis.

/// Prompt for the short summary. Placeholders: `{title}`, `{domain}`, `{content}`.
pub const DEFAULT_SUMMARY_PROMPT: &str = r#"You are reviewing an uploaded document that was filed under the "{domain}" category.

Read the ENTIRE text and write a summary of what the document is and what it says. Mention the most important facts (parties, dates, amounts, decisions) if present.

Document Title: {title}

Document Content:
{content}

Respond with ONLY a 2-3 sentence summary. No formatting or preamble."#;

/// Prompt for the detailed analysis. Placeholders: `{title}`, `{domain}`, `{content}`.
pub const DEFAULT_ANALYSIS_PROMPT: &str = r#"Analyze the following document text and provide a structured analysis including:
1. Document type/category
2. Key information (dates, amounts, names, email addresses)
3. Main topics or subjects discussed
4. Important entities mentioned (companies, people, locations)
5. Any action items or important deadlines

The document was filed under the "{domain}" category.

Document Title: {title}

Document text:
{content}

Provide the analysis in a clear, structured format."#;

/// Fill a prompt template in one pass.
///
/// Substituted values are never scanned again, so placeholders inside a
/// filename or the document text stay literal.
pub fn render(template: &str, title: &str, domain: &str, content: &str) -> String {
    let placeholders = [("{title}", title), ("{domain}", domain), ("{content}", content)];
    let mut out = String::with_capacity(template.len() + content.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match placeholders.iter().find(|(key, _)| tail.starts_with(*key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fills_placeholders() {
        let prompt = render(DEFAULT_SUMMARY_PROMPT, "march.png", "Finance", "Invoice total 40");
        assert!(prompt.contains("march.png"));
        assert!(prompt.contains("\"Finance\""));
        assert!(prompt.contains("Invoice total 40"));
        assert!(!prompt.contains("{content}"));
    }

    #[test]
    fn test_render_does_not_expand_placeholders_in_values() {
        let prompt = render(
            "T={title} D={domain} C={content}",
            "{content}{domain}.pdf",
            "Legal",
            "body with {title}",
        );
        assert_eq!(prompt, "T={content}{domain}.pdf D=Legal C=body with {title}");
    }

    #[test]
    fn test_render_keeps_unknown_braces() {
        let prompt = render("{ \"json\": {x} } {domain}", "t", "Finance", "c");
        assert_eq!(prompt, "{ \"json\": {x} } Finance");
    }

    #[test]
    fn test_analysis_prompt_lists_sections() {
        assert!(DEFAULT_ANALYSIS_PROMPT.contains("action items"));
        assert!(DEFAULT_ANALYSIS_PROMPT.contains("{content}"));
    }
}
