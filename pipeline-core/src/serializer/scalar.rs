// Scalar styles
// Chooses between plain, quoted and literal block rendering so values survive a YAML 1.1 reader

/// How a piece of text is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Style {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
}

/// Literal block scalar: header such as `|+` or `|2-` plus unindented content lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LiteralBlock<'a> {
    pub header: String,
    pub lines: Vec<&'a str>,
    pub keep: bool,
    pub explicit_indent: bool,
}

const INDICATORS: &[char] = &[
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`',
];

const RESERVED_WORDS: &[&str] = &[
    "true", "false", "yes", "no", "on", "off", "y", "n", "null", "~",
];

pub(crate) fn style_of(text: &str) -> Style {
    if text.chars().any(is_unprintable) {
        return Style::DoubleQuoted;
    }
    if text.contains('\n') {
        return if literal_is_safe(text) {
            Style::Literal
        } else {
            Style::DoubleQuoted
        };
    }
    if needs_quotes(text) {
        Style::SingleQuoted
    } else {
        Style::Plain
    }
}

/// Renders text on a single line. Literal candidates fall back to double quotes.
pub(crate) fn inline(text: &str) -> String {
    match style_of(text) {
        Style::Plain => text.to_string(),
        Style::SingleQuoted => single_quoted(text),
        Style::DoubleQuoted | Style::Literal => double_quoted(text),
    }
}

pub(crate) fn literal(text: &str) -> LiteralBlock<'_> {
    let keep = text.ends_with('\n');
    let body = if keep { &text[..text.len() - 1] } else { text };
    let lines: Vec<&str> = body.split('\n').collect();
    let explicit_indent = lines
        .iter()
        .find(|line| !line.is_empty())
        .is_some_and(|line| line.starts_with([' ', '\t']));

    let mut header = String::from("|");
    if explicit_indent {
        header.push('2');
    }
    header.push(if keep { '+' } else { '-' });

    LiteralBlock {
        header,
        lines,
        keep,
        explicit_indent,
    }
}

fn is_unprintable(c: char) -> bool {
    (c.is_control() && c != '\n' && c != '\t') || matches!(c, '\u{feff}' | '\u{2028}' | '\u{2029}')
}

// Leading lines made only of whitespace would confuse indentation detection
fn literal_is_safe(text: &str) -> bool {
    for line in text.split('\n') {
        if line.trim().is_empty() {
            if !line.is_empty() {
                return false;
            }
        } else {
            return true;
        }
    }
    false
}

fn needs_quotes(text: &str) -> bool {
    let Some(first) = text.chars().next() else {
        return true;
    };

    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        return true;
    }
    if INDICATORS.contains(&first) {
        return true;
    }
    if text.contains(": ") || text.contains(":\t") || text.contains(" #") || text.contains("\t#") {
        return true;
    }
    if text.ends_with(':') {
        return true;
    }

    let lower = text.to_ascii_lowercase();
    RESERVED_WORDS.contains(&lower.as_str()) || looks_numeric(&lower)
}

fn looks_numeric(text: &str) -> bool {
    let unsigned = text.trim_start_matches(['+', '-']);
    if matches!(unsigned, ".inf" | ".nan") {
        return true;
    }

    let compact = unsigned.replace('_', "");
    if compact.is_empty() {
        return false;
    }

    for prefix in ["0x", "0o", "0b"] {
        if let Some(digits) = compact.strip_prefix(prefix) {
            return !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit());
        }
    }

    if compact.contains(':') {
        return is_sexagesimal(&compact);
    }

    compact.parse::<f64>().is_ok()
}

// YAML 1.1 base 60 numbers, e.g. `1:20` or `190:20:30.15`
fn is_sexagesimal(text: &str) -> bool {
    let parts: Vec<&str> = text.split(':').collect();
    let (last, head) = match parts.split_last() {
        Some(split) => split,
        None => return false,
    };
    !head.is_empty()
        && head
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
        && !last.is_empty()
        && last.parse::<f64>().is_ok()
}

fn single_quoted(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

pub(crate) fn double_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if is_unprintable(c) => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
