//! Canonical text form used by every pattern and hint match.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Strips accents, upper-cases and collapses whitespace runs to one space.
///
/// `"  Espaço\tconfinado "` becomes `"ESPACO CONFINADO"`.
pub fn normalize_text(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let stripped: String = input.nfkd().filter(|ch| !is_combining_mark(*ch)).collect();
    stripped
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncates on a character boundary, for log lines and warnings.
pub fn truncate_chars(input: &str, max_chars: usize) -> &str {
    match input.char_indices().nth(max_chars) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents_and_case() {
        assert_eq!(normalize_text("Espaço Confinado"), "ESPACO CONFINADO");
        assert_eq!(normalize_text("maçarico"), "MACARICO");
        assert_eq!(normalize_text("Não"), "NAO");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize_text("  chama \n\t aberta  "), "CHAMA ABERTA");
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("   "), "");
    }

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate_chars("ÁÉÍÓÚ", 2), "ÁÉ");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
