//! Final-answer recovery from the last generation pass.
//!
//! The marker protocol is best effort: the model embeds `Final Answer:` in
//! free-form text and may omit it. Keeping the heuristic behind this module
//! lets a structured final-vs-intermediate tag from the agent replace it
//! without touching the orchestrator.

const ANSWER_MARKER: &str = "Final Answer:";

const SCRATCH_MARKERS: [&str; 4] = ["Thought:", "Action:", "Action Input:", "Observation:"];

/// Recover the user-facing answer from the final step's concatenated text.
///
/// Phase 1 extracts the `Final Answer:`-delimited section; when that yields
/// nothing, phase 2 falls back to dropping scratchpad lines. Pure and
/// deterministic.
pub fn extract_final_answer(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();

    let delimited = delimited_answer(&lines);
    let trimmed = delimited.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    filtered_answer(&lines)
}

/// Phase 1: accumulate from the first line containing the marker; the first
/// blank line after the marker is a strict boundary.
fn delimited_answer(lines: &[&str]) -> String {
    let mut answer = String::new();
    let mut in_answer = false;

    for line in lines {
        if line.contains(ANSWER_MARKER) {
            in_answer = true;
            answer.push_str(line.replace(ANSWER_MARKER, "").trim());
            answer.push('\n');
        } else if in_answer {
            if line.trim().is_empty() {
                break;
            }
            answer.push_str(line);
            answer.push('\n');
        }
    }

    answer
}

/// Phase 2: drop every line containing a scratchpad marker, keep the rest.
fn filtered_answer(lines: &[&str]) -> String {
    let surviving: Vec<&str> = lines
        .iter()
        .filter(|line| !SCRATCH_MARKERS.iter().any(|marker| line.contains(marker)))
        .copied()
        .collect();
    surviving.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimited_answer_stops_at_blank_line() {
        let text = "Thought: x\nFinal Answer: The sky is blue.\n\nignored trailer";
        assert_eq!(extract_final_answer(text), "The sky is blue.");
    }

    #[test]
    fn test_multiline_answer_before_boundary() {
        let text = "Final Answer: First line.\nSecond line.\nThird line.\n\ndropped";
        assert_eq!(
            extract_final_answer(text),
            "First line.\nSecond line.\nThird line."
        );
    }

    #[test]
    fn test_fallback_filters_scratchpad_lines() {
        let text = "Thought: planning\nAction: search\nThe answer is 42.";
        assert_eq!(extract_final_answer(text), "The answer is 42.");
    }

    #[test]
    fn test_fallback_drops_all_marker_kinds() {
        let text = "Thought: a\nAction: b\nAction Input: c\nObservation: d\nkeep me";
        assert_eq!(extract_final_answer(text), "keep me");
    }

    #[test]
    fn test_marker_with_empty_section_falls_back() {
        // The marker line itself is blank after stripping, and the section
        // ends immediately; phase 2 takes over.
        let text = "Final Answer:\n\nThought: x\nactual content";
        assert_eq!(extract_final_answer(text), "Final Answer:\n\nactual content");
    }

    #[test]
    fn test_all_noise_yields_empty() {
        let text = "Thought: a\nObservation: b";
        assert_eq!(extract_final_answer(text), "");
    }

    #[test]
    fn test_deterministic() {
        let text = "Thought: x\nFinal Answer: Paris.\n";
        assert_eq!(extract_final_answer(text), extract_final_answer(text));
        assert_eq!(extract_final_answer(text), "Paris.");
    }
}
