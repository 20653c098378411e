/// Client-visible chunk size, in characters. Decouples internal token
/// granularity from what the UI renders per frame.
pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// Lazy, finite, non-restartable sequence of fixed-size character chunks of
/// the recovered answer. The last chunk may be shorter; an empty answer
/// yields no chunks at all.
pub struct AnswerChunks {
    chars: std::vec::IntoIter<char>,
    size: usize,
}

pub fn chunks(answer: &str, size: usize) -> AnswerChunks {
    debug_assert!(size > 0, "chunk size must be positive");
    AnswerChunks {
        chars: answer.chars().collect::<Vec<_>>().into_iter(),
        size,
    }
}

impl Iterator for AnswerChunks {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let chunk: String = self.chars.by_ref().take(self.size).collect();
        if chunk.is_empty() {
            None
        } else {
            Some(chunk)
        }
    }
}
