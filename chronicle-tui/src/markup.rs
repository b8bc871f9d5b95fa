//! Sanitation of event body markup.
//!
//! Event bodies are untrusted and may carry inline HTML. Nothing from a body
//! is written to the terminal directly: [`sanitize`] reduces it to plain text
//! lines with a small set of emphasis flags. Tags are never echoed, the
//! contents of `<script>` and `<style>` are dropped, entities are decoded and
//! control characters (including escape sequences) are removed.

/// A run of text sharing one emphasis.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkupSpan {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

/// One display line of sanitised body text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkupLine {
    pub spans: Vec<MarkupSpan>,
    /// Line opens a list item
    pub bullet: bool,
}

impl MarkupLine {
    fn is_blank(&self) -> bool {
        !self.bullet && self.spans.iter().all(|s| s.text.trim().is_empty())
    }
}

/// Elements whose whole content is discarded.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "iframe", "object", "template"];

/// Builder tracking emphasis depth and whitespace collapsing.
#[derive(Default)]
struct LineBuilder {
    lines: Vec<MarkupLine>,
    current: MarkupLine,
    bold: u32,
    italic: u32,
    pending_space: bool,
}

impl LineBuilder {
    fn push_char(&mut self, c: char) {
        if c.is_whitespace() {
            self.pending_space = true;
            return;
        }
        if c.is_control() {
            return;
        }

        let at_line_start = self.current.spans.iter().all(|s| s.text.is_empty());
        let space = self.pending_space && !at_line_start;
        self.pending_space = false;

        let bold = self.bold > 0;
        let italic = self.italic > 0;
        let new_run = self
            .current
            .spans
            .last()
            .map_or(true, |last| last.bold != bold || last.italic != italic);
        if new_run {
            self.current.spans.push(MarkupSpan {
                text: String::new(),
                bold,
                italic,
            });
        }
        if let Some(span) = self.current.spans.last_mut() {
            if space {
                span.text.push(' ');
            }
            span.text.push(c);
        }
    }

    fn break_line(&mut self) {
        let line = std::mem::take(&mut self.current);
        self.lines.push(line);
        self.pending_space = false;
    }

    fn start_bullet(&mut self) {
        if !self.current.is_blank() {
            self.break_line();
        }
        self.current.bullet = true;
    }

    fn open(&mut self, name: &str) {
        match name {
            "b" | "strong" => self.bold += 1,
            "i" | "em" => self.italic += 1,
            "br" => self.break_line(),
            "li" => self.start_bullet(),
            "p" | "div" | "ul" | "ol" | "h1" | "h2" | "h3" | "h4" | "blockquote" => {
                if !self.current.is_blank() {
                    self.break_line();
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &str) {
        match name {
            "b" | "strong" => self.bold = self.bold.saturating_sub(1),
            "i" | "em" => self.italic = self.italic.saturating_sub(1),
            "p" | "div" | "li" | "h1" | "h2" | "h3" | "h4" | "blockquote" => {
                if !self.current.is_blank() {
                    self.break_line();
                }
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<MarkupLine> {
        if !self.current.is_blank() {
            self.break_line();
        }

        // Collapse runs of blank lines and trim them at both ends.
        let mut out: Vec<MarkupLine> = Vec::with_capacity(self.lines.len());
        for line in self.lines {
            let blank = line.is_blank();
            if blank && out.last().map_or(true, MarkupLine::is_blank) {
                continue;
            }
            out.push(line);
        }
        while out.last().is_some_and(MarkupLine::is_blank) {
            out.pop();
        }
        out
    }
}

/// Parse a tag body (the text between `<` and `>`) into `(name, closing, self_closing)`.
fn parse_tag(raw: &str) -> (String, bool, bool) {
    let raw = raw.trim();
    let closing = raw.starts_with('/');
    let self_closing = raw.ends_with('/');
    let name = raw
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    (name, closing, self_closing)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "mdash" => Some('—'),
        "ndash" => Some('–'),
        "hellip" => Some('…'),
        "rsquo" => Some('’'),
        "lsquo" => Some('‘'),
        "rdquo" => Some('”'),
        "ldquo" => Some('“'),
        _ => {
            let numeric = entity.strip_prefix('#')?;
            let code = match numeric.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => numeric.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Reduce untrusted body markup to display lines.
pub fn sanitize(body: &str) -> Vec<MarkupLine> {
    let mut builder = LineBuilder::default();
    let mut skipping: Option<String> = None;
    let mut chars = body.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            '<' => {
                let rest = &body[start + 1..];
                let Some(end) = rest.find('>') else {
                    // Unterminated tag: drop the remainder.
                    break;
                };
                let raw = &rest[..end];
                // Advance past the tag.
                while chars.next_if(|&(i, _)| i <= start + end + 1).is_some() {}

                if raw.starts_with('!') {
                    continue;
                }
                let (name, closing, self_closing) = parse_tag(raw);
                if let Some(skipped) = &skipping {
                    if closing && *skipped == name {
                        skipping = None;
                    }
                    continue;
                }
                if closing {
                    builder.close(&name);
                } else if SKIPPED_ELEMENTS.contains(&name.as_str()) && !self_closing {
                    skipping = Some(name);
                } else {
                    builder.open(&name);
                }
            }
            _ if skipping.is_some() => {}
            '&' => {
                let rest = &body[start + 1..];
                let decoded = rest
                    .find(';')
                    .filter(|&end| end <= 10)
                    .and_then(|end| decode_entity(&rest[..end]).map(|c| (c, end)));
                match decoded {
                    Some((ch, end)) => {
                        while chars.next_if(|&(i, _)| i <= start + end + 1).is_some() {}
                        builder.push_char(ch);
                    }
                    None => builder.push_char('&'),
                }
            }
            _ => builder.push_char(c),
        }
    }

    builder.finish()
}
