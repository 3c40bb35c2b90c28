// Splicing a chosen suggestion into the lyrics at the cursor

use super::{byte_offset, char_len};

/// Replace the `[cursor_start, cursor_end)` span of `text` with `chosen`.
///
/// Offsets are in characters and are clamped to the text. A single space is
/// put in front of `chosen` when the character before the cursor is anything
/// other than a space or newline, never at the very start of the document.
/// Returns the new text and the cursor position right after the insertion.
pub fn insert(text: &str, cursor_start: usize, cursor_end: usize, chosen: &str) -> (String, usize) {
    let len = char_len(text);
    let start = cursor_start.min(len);
    let end = cursor_end.clamp(start, len);

    let start_byte = byte_offset(text, start);
    let end_byte = byte_offset(text, end);

    let needs_space = start > 0
        && text[..start_byte]
            .chars()
            .next_back()
            .is_some_and(|prev| prev != ' ' && prev != '\n');

    let inserted = if needs_space {
        format!(" {}", chosen)
    } else {
        chosen.to_string()
    };

    let mut new_text = String::with_capacity(text.len() + inserted.len());
    new_text.push_str(&text[..start_byte]);
    new_text.push_str(&inserted);
    new_text.push_str(&text[end_byte..]);

    (new_text, start + char_len(&inserted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_added_after_word() {
        assert_eq!(insert("cat", 3, 3, "hat"), ("cat hat".to_string(), 7));
    }

    #[test]
    fn test_no_space_at_document_start() {
        assert_eq!(insert("", 0, 0, "hat"), ("hat".to_string(), 3));
        assert_eq!(insert("rest", 0, 0, "hat"), ("hatrest".to_string(), 3));
    }

    #[test]
    fn test_no_space_after_space_or_newline() {
        assert_eq!(insert("cat ", 4, 4, "hat"), ("cat hat".to_string(), 7));
        assert_eq!(insert("cat\n", 4, 4, "hat"), ("cat\nhat".to_string(), 7));
    }

    #[test]
    fn test_selection_is_replaced() {
        // "dog" selected, preceded by a space
        assert_eq!(insert("cat dog run", 4, 7, "hat"), ("cat hat run".to_string(), 7));
        // selection right after a letter gets the separating space
        assert_eq!(insert("catdog", 3, 6, "hat"), ("cat hat".to_string(), 7));
    }

    #[test]
    fn test_offsets_clamped_and_multibyte() {
        assert_eq!(insert("ação", 99, 99, "mão"), ("ação mão".to_string(), 8));
        assert_eq!(insert("ação", 2, 1, "x"), ("aç xão".to_string(), 4));
    }
}
