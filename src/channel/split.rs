//! Splitting long announcements into platform-sized messages.

use unicode_segmentation::UnicodeSegmentation;

/// Discord's per-message character limit.
pub const MESSAGE_LIMIT: usize = 2000;

/// Split `text` into chunks of at most `limit` characters.
///
/// Chunks break at line boundaries; a single line longer than `limit` is cut
/// on grapheme boundaries. Empty text yields one empty chunk.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split('\n') {
        for piece in split_line(line, limit) {
            let piece_len = piece.chars().count();
            let needed = if current.is_empty() {
                piece_len
            } else {
                current_len + 1 + piece_len
            };

            if needed > limit && !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if !current.is_empty() {
                current.push('\n');
                current_len += 1;
            }
            current.push_str(&piece);
            current_len += piece_len;
        }
    }

    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn split_line(line: &str, limit: usize) -> Vec<String> {
    if line.chars().count() <= limit {
        return vec![line.to_string()];
    }

    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_len = 0;
    for grapheme in line.graphemes(true) {
        let len = grapheme.chars().count();
        if piece_len + len > limit && !piece.is_empty() {
            pieces.push(std::mem::take(&mut piece));
            piece_len = 0;
        }
        piece.push_str(grapheme);
        piece_len += len;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_message("a\nb", 10), vec!["a\nb"]);
    }

    #[test]
    fn splits_on_line_boundaries() {
        let chunks = split_message("aaaa\nbbbb\ncccc", 9);
        assert_eq!(chunks, vec!["aaaa\nbbbb", "cccc"]);
    }

    #[test]
    fn long_line_is_cut() {
        let chunks = split_message("abcdefgh", 3);
        assert_eq!(chunks, vec!["abc", "def", "gh"]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let chunks = split_message("äöü\nß", 5);
        assert_eq!(chunks, vec!["äöü\nß"]);
    }

    #[test]
    fn every_chunk_respects_limit() {
        let text = (0..500)
            .map(|i| format!("7A {i} Ma mit Herr Mustermann in R{i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let chunks = split_message(&text, MESSAGE_LIMIT);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= MESSAGE_LIMIT));
        assert_eq!(chunks.join("\n"), text);
    }
}
