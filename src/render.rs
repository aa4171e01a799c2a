use std::fmt::Write;

use crate::models::StudyMaterial;

/// Markdown study guide. Only the fields that are present get a section.
pub fn render_markdown(material: &StudyMaterial) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Study Guide\n");

    let summary = &material.summary;
    let _ = writeln!(out, "## Summary\n\n> {}\n", summary.ultra_short.trim());
    bullet_list(&mut out, "### Key Points", &summary.medium);
    if !summary.detailed.trim().is_empty() {
        let _ = writeln!(out, "### In Detail\n\n{}\n", summary.detailed.trim());
    }

    let viz = &material.visualization;
    if !viz.ideas.is_empty() || viz.mermaid.is_some() {
        let _ = writeln!(out, "## Visualization\n");
        bullet_list(&mut out, "### Ideas", &viz.ideas);
        if let Some(mermaid) = &viz.mermaid {
            let _ = writeln!(out, "### Diagram\n\n```mermaid\n{}\n```\n", mermaid.trim());
        }
    }

    let quiz = &material.quiz;
    let _ = writeln!(out, "## Quiz\n");
    if !quiz.mcq.is_empty() {
        let _ = writeln!(out, "### Multiple Choice\n");
        for (i, mcq) in quiz.mcq.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, mcq.question);
            for (j, option) in mcq.options.iter().enumerate() {
                let label = char::from(b'a' + (j % 26) as u8);
                let _ = writeln!(out, "   {label}) {option}");
            }
            let _ = writeln!(out, "   *Answer:* {}\n", mcq.answer);
        }
    }
    numbered_list(&mut out, "### Short Answer", &quiz.short_answer);
    if !quiz.flashcards.is_empty() {
        let _ = writeln!(out, "### Flashcards\n\n| Front | Back |\n| --- | --- |");
        for card in &quiz.flashcards {
            let _ = writeln!(out, "| {} | {} |", table_cell(&card.front), table_cell(&card.back));
        }
        out.push('\n');
    }
    numbered_list(&mut out, "### Critical Thinking", &quiz.critical_thinking);

    let simplified = &material.simplified;
    let _ = writeln!(out, "## Simplified\n\n{}\n", simplified.beginner_friendly.trim());
    if let Some(hindi) = &simplified.hindi {
        let _ = writeln!(out, "### हिंदी में\n\n{}\n", hindi.trim());
    }

    if !material.resources.is_empty() {
        let _ = writeln!(out, "## Resources\n");
        for r in &material.resources {
            let _ = writeln!(out, "- **{}**: [{}]({})", r.kind, r.title, r.url);
        }
        out.push('\n');
    }

    out.trim_end().to_string() + "\n"
}

fn bullet_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{heading}\n");
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
    out.push('\n');
}

fn numbered_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{heading}\n");
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(out, "{}. {item}", i + 1);
    }
    out.push('\n');
}

fn table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
