use crate::lyrics::parse::LyricEntry;

/// Pick the lyric line active at `progress` seconds.
///
/// Scans entries in order, keeping the text of the last entry whose
/// timestamp is at or before `progress`, and stops at the first entry past
/// it (relies on ascending timestamps). Returns an empty string when no
/// entry qualifies, including for an empty document.
pub fn select_active_line(entries: &[LyricEntry], progress: f64) -> String {
    let mut current = "";
    for entry in entries {
        if entry.time <= progress {
            current = &entry.text;
        } else {
            break;
        }
    }
    current.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<LyricEntry> {
        [(0.0, "a"), (10.0, "b"), (20.0, "c")]
            .into_iter()
            .map(|(time, text)| LyricEntry {
                time,
                text: text.to_string(),
            })
            .collect()
    }

    #[test]
    fn picks_last_entry_at_or_before_progress() {
        assert_eq!(select_active_line(&entries(), 15.0), "b");
    }

    #[test]
    fn exact_timestamp_qualifies() {
        assert_eq!(select_active_line(&entries(), 0.0), "a");
    }

    #[test]
    fn before_first_entry_is_empty() {
        assert_eq!(select_active_line(&entries(), -1.0), "");
    }

    #[test]
    fn past_last_entry_keeps_last_line() {
        assert_eq!(select_active_line(&entries(), 25.0), "c");
    }

    #[test]
    fn empty_document_is_empty() {
        assert_eq!(select_active_line(&[], 5.0), "");
    }

    #[test]
    fn pure_function_of_inputs() {
        let e = entries();
        let first = select_active_line(&e, 12.0);
        let second = select_active_line(&e, 12.0);
        assert_eq!(first, second);
    }
}
