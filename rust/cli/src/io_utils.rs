//! File I/O utilities for hand scripts and JSONL histories.
//!
//! Plain and Zstandard-compressed (`.zst`) files are read the same way; a
//! UTF-8 BOM left by some editors is stripped. Errors are plain strings that
//! already name the offending path.

/// Read a text file, decompressing it first when the path ends in `.zst`.
///
/// # Example
///
/// ```rust,no_run
/// # use tablelog_cli::io_utils::read_text_auto;
/// let script = read_text_auto("session.hand").unwrap();
/// let history = read_text_auto("hands.jsonl.zst").unwrap();
/// ```
pub fn read_text_auto(path: &str) -> Result<String, String> {
    let fail = |e: &dyn std::fmt::Display| format!("Failed to read {}: {}", path, e);
    let mut content = if path.ends_with(".zst") {
        let comp = std::fs::read(path).map_err(|e| fail(&e))?;
        let dec = zstd::bulk::decompress(&comp, 64 * 1024 * 1024).map_err(|e| fail(&e))?;
        String::from_utf8(dec).map_err(|e| fail(&e))?
    } else {
        std::fs::read_to_string(path).map_err(|e| fail(&e))?
    };
    strip_utf8_bom(&mut content);
    Ok(content)
}

/// Non-blank lines with their 1-based line numbers. Lines starting with `#`
/// are skipped when `comments` is set.
pub fn numbered_lines(content: &str, comments: bool) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(move |(_, l)| !l.is_empty() && !(comments && l.starts_with('#')))
}

fn strip_utf8_bom(s: &mut String) {
    const UTF8_BOM: &str = "\u{feff}";
    if s.starts_with(UTF8_BOM) {
        s.drain(..UTF8_BOM.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_utf8_bom() {
        let mut s = "\u{feff}seats 6".to_string();
        strip_utf8_bom(&mut s);
        assert_eq!(s, "seats 6");
    }

    #[test]
    fn test_read_zst_matches_plain() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("hands.jsonl");
        let packed = dir.path().join("hands.jsonl.zst");
        let body = "{\"hand_number\":1}\n{\"hand_number\":2}\n";
        std::fs::write(&plain, body).unwrap();
        std::fs::write(&packed, zstd::bulk::compress(body.as_bytes(), 3).unwrap()).unwrap();

        let a = read_text_auto(plain.to_str().unwrap()).unwrap();
        let b = read_text_auto(packed.to_str().unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_file_names_path() {
        let msg = read_text_auto("no/such/script.hand").unwrap_err();
        assert!(msg.starts_with("Failed to read no/such/script.hand"));
    }

    #[test]
    fn test_numbered_lines_skip_blanks_and_comments() {
        let text = "# header\nseats 6\n\n  hand  \n";
        let lines: Vec<_> = numbered_lines(text, true).collect();
        assert_eq!(lines, vec![(2, "seats 6"), (4, "hand")]);
        assert_eq!(numbered_lines(text, false).count(), 3);
    }
}
