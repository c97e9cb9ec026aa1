// src/core/sanitize.rs

/// Collapse whitespace runs (including NBSP) into one space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Directory/file stem for a box's store. Box names are SEI unit sigla such as
/// `MGI-SGP-DECIPEX-CGPAG-ANIST`; anything outside `[A-Za-z0-9._-]` becomes `_`.
pub fn box_dir_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_us = false;
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '.' {
            out.push(ch);
            last_us = false;
        } else if !last_us {
            out.push('_');
            last_us = true;
        }
    }
    let out = out.trim_matches(|c| c == '_' || c == '.').to_string();
    if out.is_empty() { s!("caixa") } else { out }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_collapses_nbsp_and_newlines() {
        assert_eq!(normalize_ws("  1000.000001/2024-01\u{a0}\n "), "1000.000001/2024-01");
        assert_eq!(normalize_ws("a \t b"), "a b");
    }

    #[test]
    fn unit_sigla_is_kept_verbatim() {
        assert_eq!(box_dir_name("MGI-SGP-DECIPEX-CGPAG-ANIST"), "MGI-SGP-DECIPEX-CGPAG-ANIST");
    }

    #[test]
    fn path_separators_and_accents_are_replaced() {
        assert_eq!(box_dir_name("técnicos / caixa"), "t_cnicos_caixa");
        assert_eq!(box_dir_name("../../etc"), "etc");
        assert_eq!(box_dir_name("   "), "caixa");
    }
}
