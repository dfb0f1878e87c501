// Presentation-neutral layout of an analysis report, shared by the plain
// printer and the TUI.

use unicode_width::UnicodeWidthStr;

use crate::analysis::{AnalysisResult, TechSolution};

pub const IDEA_TITLE: &str = "Таны санаа";
pub const SCORE_TITLE: &str = "Хэрэгжих боломж";

#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    Text(String),
    Bullets(Vec<String>),
    Solutions(Vec<TechSolution>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub title: &'static str,
    pub body: SectionBody,
}

/// Report sections in display order, after the score block.
pub fn sections(result: &AnalysisResult) -> Vec<ReportSection> {
    vec![
        ReportSection {
            title: "Эдийн засгийн бодит байдал",
            body: SectionBody::Text(result.economic_reality.clone()),
        },
        ReportSection {
            title: "Шинжээчийн дүгнэлт",
            body: SectionBody::Text(result.summary.clone()),
        },
        ReportSection {
            title: "Давуу тал",
            body: SectionBody::Bullets(result.strengths.clone()),
        },
        ReportSection {
            title: "Эрсдэл ба Сул тал",
            body: SectionBody::Bullets(result.weaknesses.clone()),
        },
        ReportSection {
            title: "Зах зээлийн багтаамж",
            body: SectionBody::Text(result.market_fit.clone()),
        },
        ReportSection {
            title: "Салбарын төлөв",
            body: SectionBody::Text(result.category_context.clone()),
        },
        ReportSection {
            title: "Технологид суурилсан өсөлтийн шийдэл",
            body: SectionBody::Solutions(result.tech_solutions.clone()),
        },
    ]
}

pub fn score_label(score: f64) -> String {
    if score.fract() == 0.0 && score.abs() < 1e15 {
        format!("{}/10", score as i64)
    } else {
        format!("{score:.1}/10")
    }
}

/// Fixed-width bar; out-of-range scores are clamped for drawing only.
pub fn score_bar(score: f64, width: usize) -> String {
    let ratio = (score / 10.0).clamp(0.0, 1.0);
    let filled = (ratio * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if width <= 1 {
        return vec![line.to_string()];
    }
    let mut out = Vec::new();
    let mut cur = String::new();

    for word in line.split_whitespace() {
        if cur.is_empty() {
            cur.push_str(word);
            continue;
        }
        if cur.as_str().width() + 1 + word.width() <= width {
            cur.push(' ');
            cur.push_str(word);
        } else {
            out.push(cur);
            cur = word.to_string();
        }
    }

    if !cur.is_empty() {
        out.push(cur);
    }

    if out.is_empty() {
        out.push(String::new());
    }

    out
}

fn push_wrapped(out: &mut Vec<String>, text: &str, first: &str, rest: &str, width: usize) {
    let inner = width.saturating_sub(first.width()).max(8);
    for (idx, line) in wrap_line(text, inner).into_iter().enumerate() {
        let prefix = if idx == 0 { first } else { rest };
        out.push(format!("{prefix}{line}"));
    }
}

/// Plain-text report for terminals without the TUI.
pub fn render_plain(
    idea: &str,
    category_label: &str,
    result: &AnalysisResult,
    width: usize,
) -> String {
    let mut out: Vec<String> = Vec::new();

    out.push(format!("{IDEA_TITLE} ({category_label})"));
    push_wrapped(&mut out, idea, "  ", "  ", width);
    out.push(String::new());

    out.push(format!(
        "{SCORE_TITLE}: {}  {}",
        score_label(result.feasibility_score),
        score_bar(result.feasibility_score, 20)
    ));

    for section in sections(result) {
        out.push(String::new());
        out.push(section.title.to_string());
        out.push("-".repeat(section.title.width()));
        match section.body {
            SectionBody::Text(text) => push_wrapped(&mut out, &text, "", "", width),
            SectionBody::Bullets(items) => {
                if items.is_empty() {
                    out.push("  -".to_string());
                }
                for item in items {
                    push_wrapped(&mut out, &item, "  • ", "    ", width);
                }
            }
            SectionBody::Solutions(items) => {
                for (idx, sol) in items.iter().enumerate() {
                    out.push(format!("  {}. {}", idx + 1, sol.title));
                    push_wrapped(&mut out, &sol.description, "     ", "     ", width);
                }
            }
        }
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::result::sample_result;

    #[test]
    fn score_label_drops_trailing_zero() {
        assert_eq!(score_label(7.0), "7/10");
        assert_eq!(score_label(6.5), "6.5/10");
    }

    #[test]
    fn score_label_keeps_out_of_range_values() {
        assert_eq!(score_label(-3.0), "-3/10");
        assert_eq!(score_label(1e20), "100000000000000000000.0/10");
        assert!(!score_label(1e300).contains("9223372036854775807"));
        assert_eq!(score_label(f64::INFINITY), "inf/10");
        assert_eq!(score_label(f64::NAN), "NaN/10");
    }

    #[test]
    fn score_bar_is_clamped() {
        assert_eq!(score_bar(5.0, 10), "█████░░░░░");
        assert_eq!(score_bar(14.0, 4), "████");
        assert_eq!(score_bar(-2.0, 4), "░░░░");
    }

    #[test]
    fn wrap_respects_display_width() {
        let lines = wrap_line("Монгол хээтэй орчин үеийн спорт гутал", 14);
        assert!(lines.iter().all(|l| l.width() <= 14));
        assert_eq!(lines.join(" "), "Монгол хээтэй орчин үеийн спорт гутал");
    }

    #[test]
    fn plain_report_lists_every_section() {
        let result = sample_result(7.0);
        let text = render_plain("Монгол хээтэй гутал", "Хувцас загвар", &result, 80);
        assert!(text.starts_with("Таны санаа (Хувцас загвар)"));
        assert!(text.contains("Хэрэгжих боломж: 7/10"));
        for section in sections(&result) {
            assert!(text.contains(section.title), "{} missing", section.title);
        }
        assert!(text.contains("  • Импортын түүхий эд"));
        assert!(text.contains("  1. Онлайн захиалга"));
    }
}
