/// One buffered generation-token fragment. Created for every token event,
/// retained in arrival order, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferedToken {
    pub content: String,
    pub step: u32,
}

/// Buffers streamed generation tokens and, at stream end, isolates the text
/// belonging to the final (maximum) step.
///
/// The agent framework re-invokes the model at several internal steps; only
/// the last pass is the real answer. Lower-step tokens are intermediate
/// reasoning and must never become the visible answer.
#[derive(Debug, Default)]
pub struct StepAggregator {
    buffer: Vec<BufferedToken>,
}

impl StepAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// O(1) amortized append.
    pub fn ingest(&mut self, token: BufferedToken) {
        self.buffer.push(token);
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Concatenation, in arrival order, of exactly the tokens whose step
    /// equals the maximum step seen. Runs at the maximum step need not be
    /// contiguous; non-matching tokens are skipped in place. Empty buffer
    /// yields an empty string.
    pub fn finalize(&self) -> String {
        let Some(max_step) = self.buffer.iter().map(|t| t.step).max() else {
            return String::new();
        };
        self.buffer
            .iter()
            .filter(|t| t.step == max_step)
            .map(|t| t.content.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(content: &str, step: u32) -> BufferedToken {
        BufferedToken {
            content: content.to_string(),
            step,
        }
    }

    #[test]
    fn test_empty_buffer_finalizes_to_empty_string() {
        let aggregator = StepAggregator::new();
        assert!(aggregator.is_empty());
        assert_eq!(aggregator.finalize(), "");
    }

    #[test]
    fn test_only_max_step_tokens_survive() {
        let mut aggregator = StepAggregator::new();
        for t in [
            token("Thought: ", 0),
            token("searching", 0),
            token("Inter", 1),
            token("mediate", 1),
            token("Final ", 2),
            token("Answer", 2),
        ] {
            aggregator.ingest(t);
        }
        assert_eq!(aggregator.finalize(), "Final Answer");
    }

    #[test]
    fn test_interleaved_max_step_runs_keep_arrival_order() {
        let mut aggregator = StepAggregator::new();
        for t in [
            token("A", 2),
            token("x", 0),
            token("B", 2),
            token("y", 1),
            token("C", 2),
        ] {
            aggregator.ingest(t);
        }
        assert_eq!(aggregator.finalize(), "ABC");
    }

    #[test]
    fn test_out_of_order_steps_are_tolerated() {
        let mut aggregator = StepAggregator::new();
        for t in [token("late", 3), token("early", 1), token(" again", 3)] {
            aggregator.ingest(t);
        }
        assert_eq!(aggregator.finalize(), "late again");
    }
}
