use crate::models::AnalysisResult;

/// Render the downloadable plain-text report. Section order is fixed: title
/// naming the language, SUMMARY, POTENTIAL RISK FACTORS (bulleted),
/// ACTIONABLE CHECKLIST, each separated by a blank line.
pub fn render_report(analysis: &AnalysisResult, language: &str) -> String {
    let risks = analysis
        .risk_factors
        .iter()
        .map(|r| format!("- {r}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Legal Document Analysis ({language})\n\n\
         SUMMARY\n-------\n{summary}\n\n\
         POTENTIAL RISK FACTORS\n----------------------\n{risks}\n\n\
         ACTIONABLE CHECKLIST\n--------------------\n{checklist}",
        summary = analysis.summary,
        checklist = analysis.checklist,
    )
}
