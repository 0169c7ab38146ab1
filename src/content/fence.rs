/// One source line, tagged with whether it sits inside a fenced code block.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    pub text: &'a str,
    pub fenced: bool,
}

/// Split markdown on `\r?\n` and tag every line with its fence state.
///
/// Delimiter lines (```` ``` ```` / `~~~`) count as fenced themselves so they are
/// never mistaken for prose. A fence closes on a delimiter using the same
/// character that is at least as long as the opener; an unterminated fence
/// runs to the end of the document.
pub fn scan_lines(markdown: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut open: Option<(char, usize)> = None;

    for raw in markdown.split('\n') {
        let text = raw.strip_suffix('\r').unwrap_or(raw);
        match (open, fence_marker(text)) {
            (None, Some(marker)) => {
                open = Some(marker);
                lines.push(Line { text, fenced: true });
            }
            (Some((ch, len)), Some((m_ch, m_len))) if ch == m_ch && m_len >= len => {
                open = None;
                lines.push(Line { text, fenced: true });
            }
            (Some(_), _) => lines.push(Line { text, fenced: true }),
            (None, None) => lines.push(Line { text, fenced: false }),
        }
    }

    lines
}

/// Join lines back with `\n`.
pub fn join_lines(lines: &[Line<'_>]) -> String {
    lines.iter().map(|l| l.text).collect::<Vec<_>>().join("\n")
}

fn fence_marker(line: &str) -> Option<(char, usize)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let ch = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = rest.chars().take_while(|c| *c == ch).count();
    if len < 3 {
        return None;
    }
    // Backtick fences can't carry backticks in their info string.
    if ch == '`' && rest[len..].contains('`') {
        return None;
    }
    Some((ch, len))
}
