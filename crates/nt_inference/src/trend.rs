use nt_core::ReportEntry;

/// Flattens report entries into the digest handed to the trend analyst.
///
/// One paragraph per article: `[date] title` followed by `Summary: ...`.
pub fn format_articles_for_prompt(articles: &[ReportEntry]) -> String {
    articles
        .iter()
        .map(|a| {
            format!(
                "[{}] {}\nSummary: {}",
                a.published_date,
                a.title,
                a.summary.as_deref().unwrap_or("None")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
