//! Text-level repair strategies for malformed JSON.
//!
//! Each strategy rewrites the candidate text or declines. The parser applies
//! them in order, attempting a parse after every rewrite.

/// A single repair step.
pub trait RepairStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Rewritten text, or `None` when the strategy does not apply.
    fn repair(&self, text: &str) -> Option<String>;
}

/// Removes markdown code fences around the payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripFencing;

impl RepairStrategy for StripFencing {
    fn name(&self) -> &'static str {
        "strip_fencing"
    }

    fn repair(&self, text: &str) -> Option<String> {
        let start = text.find("```")?;
        let after_fence = &text[start + 3..];
        // skip an optional language tag on the fence line
        let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &after_fence[body_start..];
        let body = match body.find("```") {
            Some(end) => &body[..end],
            None => body,
        };
        Some(body.trim().to_string())
    }
}

/// Cuts surrounding prose and closes brackets left open.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceBrackets;

impl RepairStrategy for BalanceBrackets {
    fn name(&self) -> &'static str {
        "balance_brackets"
    }

    fn repair(&self, text: &str) -> Option<String> {
        let start = text.find(['{', '['])?;
        let scan = scan(&text[start..]);
        let body = match scan.closed_at {
            Some(end) => text[start..start + end + 1].to_string(),
            None => {
                let mut body = text[start..].trim_end().to_string();
                if scan.in_string {
                    body.push('"');
                }
                close_all(&mut body, &scan.open);
                body
            }
        };
        (body != text).then_some(body)
    }
}

/// Inserts commas missing between adjacent values and drops commas left
/// before a closing bracket. String contents are never touched.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertMissingSeparators;

impl RepairStrategy for InsertMissingSeparators {
    fn name(&self) -> &'static str {
        "insert_missing_separators"
    }

    fn repair(&self, text: &str) -> Option<String> {
        let mut out = String::with_capacity(text.len() + 8);
        let mut in_string = false;
        let mut escaped = false;
        // last significant character outside a string
        let mut prev: Option<char> = None;
        let mut changed = false;

        for c in text.chars() {
            if in_string {
                out.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    in_string = false;
                    prev = Some('"');
                }
                continue;
            }
            match c {
                '"' | '{' | '[' => {
                    if prev.is_some_and(ends_value) {
                        let after_value = out.trim_end().len();
                        out.insert(after_value, ',');
                        changed = true;
                    }
                    in_string = c == '"';
                    out.push(c);
                    prev = Some(c);
                }
                '}' | ']' => {
                    if prev == Some(',') {
                        if let Some(comma) = out.rfind(',') {
                            out.remove(comma);
                            changed = true;
                        }
                    }
                    out.push(c);
                    prev = Some(c);
                }
                c if c.is_whitespace() => out.push(c),
                c => {
                    out.push(c);
                    prev = Some(c);
                }
            }
        }
        changed.then_some(out)
    }
}

fn ends_value(c: char) -> bool {
    matches!(c, '"' | '}' | ']') || c.is_ascii_alphanumeric()
}

/// Drops a trailing incomplete element, then closes the remaining brackets.
#[derive(Debug, Clone, Copy, Default)]
pub struct TruncateIncomplete;

impl RepairStrategy for TruncateIncomplete {
    fn name(&self) -> &'static str {
        "truncate_incomplete"
    }

    fn repair(&self, text: &str) -> Option<String> {
        let start = text.find(['{', '['])?;
        let body = &text[start..];
        let cut = scan(body).last_separator?;
        let mut truncated = body[..cut].trim_end().to_string();
        let open = scan(&truncated).open;
        close_all(&mut truncated, &open);
        Some(truncated)
    }
}

/// The default repair order.
pub fn default_strategies() -> Vec<Box<dyn RepairStrategy>> {
    vec![
        Box::new(StripFencing),
        Box::new(BalanceBrackets),
        Box::new(InsertMissingSeparators),
        Box::new(TruncateIncomplete),
    ]
}

struct Scan {
    /// Brackets still open at the end of input, innermost last.
    open: Vec<char>,
    in_string: bool,
    /// Index of the bracket closing the outermost value.
    closed_at: Option<usize>,
    /// Byte index of the last comma outside a string.
    last_separator: Option<usize>,
}

fn scan(text: &str) -> Scan {
    let mut open = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut last_separator = None;

    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '{' | '[' => open.push(c),
            '}' | ']' => {
                open.pop();
                if open.is_empty() {
                    return Scan {
                        open,
                        in_string,
                        closed_at: Some(i),
                        last_separator,
                    };
                }
            }
            ',' => last_separator = Some(i),
            _ => {}
        }
    }
    Scan {
        open,
        in_string,
        closed_at: None,
        last_separator,
    }
}

fn close_all(text: &mut String, open: &[char]) {
    while text.ends_with(',') || text.ends_with(':') {
        text.pop();
    }
    for bracket in open.iter().rev() {
        text.push(if *bracket == '{' { '}' } else { ']' });
    }
}
