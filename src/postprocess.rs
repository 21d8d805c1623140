use crate::config::Config;
use anyhow::Result;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Light text cleanup on renderer output. Each step is toggled in
/// `[postprocess]`; nothing here parses Markdown.
pub fn clean_markdown(cfg: &Config, markdown: &str) -> Result<String> {
    let pp = &cfg.postprocess;
    let mut out = markdown.to_string();

    if pp.normalize_newlines {
        out = out.replace("\r\n", "\n");
    }

    if pp.normalize_unicode {
        out = out.nfkc().collect::<String>();
    }

    out = sanitize_control_chars(&out, &pp.control_chars_to_sanitize);

    if pp.trim_trailing_whitespace {
        out = map_lines(&out, |l| l.trim_end());
    }

    if pp.collapse_blank_lines {
        out = collapse_blank_lines(&out, pp.max_blank_lines)?;
    }

    Ok(out)
}

/// Applies `f` to every line and keeps a trailing newline if there was one.
fn map_lines<'a>(s: &'a str, f: impl Fn(&'a str) -> &'a str) -> String {
    let mut joined = s.lines().map(f).collect::<Vec<_>>().join("\n");
    if s.ends_with('\n') {
        joined.push('\n');
    }
    joined
}

fn sanitize_control_chars(s: &str, codes: &[u8]) -> String {
    if codes.is_empty() {
        return s.to_string();
    }

    let mut mask = [false; 128];
    for &code in codes {
        if (code as usize) < mask.len() {
            mask[code as usize] = true;
        }
    }

    s.chars()
        .filter(|&ch| {
            if ch == '\n' || ch == '\r' || ch == '\t' {
                return true;
            }
            let cp = ch as u32;
            cp >= 128 || !mask[cp as usize]
        })
        .collect()
}

fn collapse_blank_lines(s: &str, max_blank: u32) -> Result<String> {
    // N blank lines means N+1 consecutive newlines, whitespace-only lines included.
    let limit = max_blank as usize + 1;
    let re = Regex::new(&format!(r"\n(?:[ \t]*\n){{{},}}", limit))?;
    let replacement = "\n".repeat(limit);
    Ok(re.replace_all(s, replacement.as_str()).into_owned())
}
