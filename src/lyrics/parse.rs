use once_cell::sync::Lazy;
use regex::Regex;

static LYRIC_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d+):(\d+(?:\.\d+)?)\]").unwrap());

/// One timestamped line of a lyric document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LyricEntry {
    /// Offset from the start of the track, in seconds.
    pub time: f64,
    pub text: String,
}

/// Parse a raw timestamped lyric block into ordered entries.
///
/// Tags look like `[MM:SS.fff]text`. Matching runs over the whole input
/// rather than per physical line, so several tags packed onto one line each
/// produce their own entry, in left-to-right order. The text of an entry is
/// everything up to the next tag (or end of input), trimmed. Anything that
/// is not a well-formed tag (metadata headers like `[ar:...]`, blank lines)
/// is ignored; a malformed tag drops only that entry.
///
/// Entries come back in source order. The selection in [`cursor`] assumes
/// ascending timestamps; documents that are not ascending are out of
/// contract and left as-is.
///
/// [`cursor`]: crate::lyrics::cursor
pub fn parse_lyric_document(raw: &str) -> Vec<LyricEntry> {
    let caps: Vec<_> = LYRIC_TAG_RE.captures_iter(raw).collect();
    let mut entries = Vec::with_capacity(caps.len());
    for (i, cap) in caps.iter().enumerate() {
        let Some(tag) = cap.get(0) else {
            continue;
        };
        let Ok(min) = cap[1].parse::<u32>() else {
            continue;
        };
        let Ok(sec) = cap[2].parse::<f64>() else {
            continue;
        };
        let text_end = caps
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(raw.len());
        let text = raw[tag.end()..text_end].trim();
        entries.push(LyricEntry {
            time: f64::from(min) * 60.0 + sec,
            text: text.to_string(),
        });
    }
    entries
}
