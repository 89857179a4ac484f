//! Plain-text rendering of a [`FinalDesign`].

use std::fmt::{self, Display, Formatter};

use super::FinalDesign;

fn heading(f: &mut Formatter<'_>, text: &str, underline: char) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{}", text)?;
    writeln!(f, "{}", underline.to_string().repeat(text.chars().count()))
}

fn bullets(f: &mut Formatter<'_>, label: &str, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(f, "{}", label)?;
    for item in items {
        writeln!(f, "  - {}", item)?;
    }
    Ok(())
}

fn paragraph(f: &mut Formatter<'_>, label: &str, text: &str) -> fmt::Result {
    if text.is_empty() {
        return Ok(());
    }
    if !label.is_empty() {
        writeln!(f, "{}", label)?;
    }
    writeln!(f, "{}", text)
}

/// `Title (a • b)` with empty parts skipped.
fn titled(title: &str, fallback: String, meta: &[&str]) -> String {
    let title = if title.is_empty() { fallback } else { title.to_string() };
    let meta: Vec<&str> = meta.iter().copied().filter(|part| !part.is_empty()).collect();
    if meta.is_empty() {
        title
    } else {
        format!("{} ({})", title, meta.join(" • "))
    }
}

impl Display for FinalDesign {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.chars().count()))?;
        writeln!(f, "Exported: {}", self.exported_at)?;
        writeln!(f, "Session ID: {}", self.session.id)?;

        let session = &self.session;
        heading(f, "Course Context", '-')?;
        writeln!(f, "Course Title: {}", session.course_title)?;
        writeln!(f, "Level: {}", session.level)?;
        writeln!(f, "Modality: {}", session.modality)?;
        paragraph(f, "Constraints:", &session.constraints)?;

        if !session.learning_objectives_lines.is_empty() {
            heading(f, "Learning Objectives", '-')?;
            for line in &session.learning_objectives_lines {
                writeln!(f, "  - {}", line)?;
            }
        }

        if let Some(analysis) = &self.objective_analysis {
            heading(f, "Objective Analysis (AI)", '-')?;
            paragraph(f, "", &analysis.overall_assessment)?;
            paragraph(f, "Alignment Notes:", &analysis.alignment_notes)?;
            if !analysis.bloom_analysis.is_empty() {
                writeln!(f, "Bloom's Taxonomy Notes:")?;
                for item in &analysis.bloom_analysis {
                    let line = match (item.objective.is_empty(), item.current_level.is_empty()) {
                        (false, false) => {
                            format!("{} - level: {}", item.objective, item.current_level)
                        }
                        (false, true) => item.objective.clone(),
                        (true, false) => format!("level: {}", item.current_level),
                        (true, true) => String::new(),
                    };
                    if !line.is_empty() {
                        writeln!(f, "  - {}", line)?;
                    }
                    if !item.suggestion.is_empty() {
                        writeln!(f, "    {}", item.suggestion)?;
                    }
                }
            }
            bullets(f, "Missing Coverage:", &analysis.missing_coverage)?;
            bullets(f, "Improved Objectives:", &analysis.improved_objectives)?;
        }

        if let Some(plan) = self.activity_plan.as_ref().filter(|p| !p.activities.is_empty()) {
            heading(f, "Learning Activities", '-')?;
            paragraph(f, "", &plan.selection_note)?;
            if !plan.total_estimated_time.is_empty() {
                writeln!(f, "Total estimated time: {}", plan.total_estimated_time)?;
            }
            paragraph(f, "Sequence Rationale:", &plan.sequence_rationale)?;

            for (index, planned) in plan.activities.iter().enumerate() {
                let activity = &planned.activity;
                let title = titled(
                    &activity.title,
                    format!("Activity {}", index + 1),
                    &[activity.activity_type.as_str(), activity.duration.as_str()],
                );
                heading(f, &title, '~')?;
                paragraph(f, "", &activity.description)?;
                bullets(f, "Aligns with objectives:", &activity.objective_alignment)?;
                bullets(f, "Materials:", &activity.materials_needed)?;
                bullets(f, "Instructions:", &activity.instructions)?;
                paragraph(f, "Assessment criteria:", &activity.assessment_criteria)?;
                let adaptations: Vec<String> = activity
                    .adaptations
                    .iter()
                    .filter(|(_, value)| !value.is_empty())
                    .map(|(key, value)| format!("{}: {}", key, value))
                    .collect();
                bullets(f, "Adaptations:", &adaptations)?;
            }
        }

        if let Some(plan) = self.assessment_plan.as_ref().filter(|p| !p.assessments.is_empty()) {
            heading(f, "Assessments (AI)", '-')?;
            paragraph(f, "", &plan.assessment_strategy_rationale)?;
            paragraph(f, "", &plan.formative_summative_balance)?;

            for (index, assessment) in plan.assessments.iter().enumerate() {
                let title = titled(
                    &assessment.title,
                    format!("Assessment {}", index + 1),
                    &[
                        assessment.assessment_type.as_str(),
                        assessment.timing.as_str(),
                        assessment.weight.as_str(),
                    ],
                );
                heading(f, &title, '~')?;
                paragraph(f, "", &assessment.description)?;
                bullets(f, "Aligns with objectives:", &assessment.objective_alignment)?;
                bullets(f, "Rubric criteria:", &assessment.rubric_criteria)?;
                paragraph(f, "Feedback strategy:", &assessment.feedback_strategy)?;
            }
        }
        Ok(())
    }
}
