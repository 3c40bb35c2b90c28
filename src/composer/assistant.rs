// Rhyme assistant - decides when to ask for rhymes and which answer to show
//
// Every request carries a sequence number. Only the answer to the most
// recently issued request is applied; older ones that finish late are dropped.

use super::{analyze, PageWindow, RhymeList, RhymeResult, SuggestionPager, TargetMode};
use crate::rhyme::RhymeSet;
use tracing::debug;

/// Where a query came from. Manual searches bypass the repeat guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOrigin {
    Enter,
    Manual,
}

/// A rhyme lookup to run against the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RhymeRequest {
    pub seq: u64,
    pub word: String,
    pub origin: QueryOrigin,
}

impl RhymeRequest {
    /// Pair this request's tag with the provider's answer.
    pub fn into_response(self, rhymes: RhymeSet) -> RhymeResponse {
        RhymeResponse {
            seq: self.seq,
            word: self.word,
            rhymes,
        }
    }
}

/// Provider answer, tagged with the request it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RhymeResponse {
    pub seq: u64,
    pub word: String,
    pub rhymes: RhymeSet,
}

#[derive(Debug, Default)]
pub struct RhymeAssistant {
    mode: TargetMode,
    last_analyzed_word: Option<String>,
    next_seq: u64,
    pending: Option<u64>, // seq of the latest request still waiting for an answer
    live: Option<RhymeResult>,
    pager: SuggestionPager,
}

impl RhymeAssistant {
    pub fn new(mode: TargetMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> TargetMode {
        self.mode
    }

    /// Changing the mode only affects the next Enter, it never queries by itself.
    pub fn set_mode(&mut self, mode: TargetMode) {
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) -> TargetMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    pub fn last_analyzed_word(&self) -> Option<&str> {
        self.last_analyzed_word.as_deref()
    }

    /// Called after Enter was pressed in the lyrics.
    ///
    /// Returns a request when the target line has a word and it differs from
    /// the last word we asked about.
    pub fn on_enter(&mut self, text: &str, cursor: usize) -> Option<RhymeRequest> {
        let word = analyze(text, cursor, self.mode)?;

        if self.last_analyzed_word.as_deref() == Some(word.as_str()) {
            debug!("Skipping rhyme lookup, '{}' was already analyzed", word);
            return None;
        }

        Some(self.issue(word, QueryOrigin::Enter))
    }

    /// Explicit search box lookup. Always issues unless the term is blank.
    pub fn manual_search(&mut self, term: &str) -> Option<RhymeRequest> {
        let word = term.trim().to_lowercase();
        if word.is_empty() {
            return None;
        }

        Some(self.issue(word, QueryOrigin::Manual))
    }

    fn issue(&mut self, word: String, origin: QueryOrigin) -> RhymeRequest {
        self.next_seq += 1;
        let seq = self.next_seq;

        self.last_analyzed_word = Some(word.clone());
        self.pending = Some(seq);

        debug!("Issuing rhyme request #{} for '{}' ({:?})", seq, word, origin);
        RhymeRequest { seq, word, origin }
    }

    /// Apply a provider answer. Returns `false` when it was superseded and dropped.
    pub fn apply(&mut self, response: RhymeResponse) -> bool {
        if self.pending != Some(response.seq) {
            debug!(
                "Discarding stale rhymes for '{}' (#{}, latest is {:?})",
                response.word, response.seq, self.pending
            );
            return false;
        }

        self.pending = None;
        self.live = Some(RhymeResult::new(response.word, response.rhymes));
        self.pager.on_new_result();
        true
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn result(&self) -> Option<&RhymeResult> {
        self.live.as_ref()
    }

    fn list(&self, which: RhymeList) -> &[String] {
        self.live.as_ref().map(|r| r.list(which)).unwrap_or(&[])
    }

    pub fn window(&self, which: RhymeList) -> PageWindow {
        self.pager.window(which)
    }

    /// The page currently shown for `which`.
    pub fn visible(&self, which: RhymeList) -> &[String] {
        self.pager.window(which).visible_slice(self.list(which))
    }

    pub fn can_page_forward(&self, which: RhymeList) -> bool {
        self.pager.window(which).can_page_forward(self.list(which))
    }

    pub fn can_page_backward(&self, which: RhymeList) -> bool {
        self.pager.window(which).can_page_backward()
    }

    pub fn page_forward(&mut self, which: RhymeList) {
        let list = self.live.as_ref().map(|r| r.list(which)).unwrap_or(&[]);
        self.pager.page_forward(which, list);
    }

    pub fn page_backward(&mut self, which: RhymeList) {
        self.pager.page_backward(which);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rhymes(perfect: &[&str], phonetic: &[&str]) -> RhymeSet {
        RhymeSet {
            perfect: perfect.iter().map(|s| s.to_string()).collect(),
            phonetic: phonetic.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_enter_issues_request_for_target_word() {
        let mut assistant = RhymeAssistant::default();
        let request = assistant.on_enter("love\nhate\n", 10).unwrap();
        assert_eq!(request.word, "hate");
        assert_eq!(request.origin, QueryOrigin::Enter);
        assert!(assistant.is_loading());
        assert_eq!(assistant.last_analyzed_word(), Some("hate"));
    }

    #[test]
    fn test_enter_with_same_word_is_suppressed() {
        let mut assistant = RhymeAssistant::default();
        assert!(assistant.on_enter("love\nhate\n", 10).is_some());
        assert!(assistant.on_enter("love\nhate\n", 10).is_none());
        // a blank line in between still resolves to "hate"
        assert!(assistant.on_enter("love\nhate\n\n", 11).is_none());
    }

    #[test]
    fn test_manual_search_bypasses_guard() {
        let mut assistant = RhymeAssistant::default();
        assistant.on_enter("love\nhate\n", 10).unwrap();

        let request = assistant.manual_search("  HATE ").unwrap();
        assert_eq!(request.word, "hate");
        assert_eq!(request.origin, QueryOrigin::Manual);

        let again = assistant.manual_search("hate").unwrap();
        assert!(again.seq > request.seq);
        assert_eq!(assistant.last_analyzed_word(), Some("hate"));
    }

    #[test]
    fn test_manual_search_resets_last_word() {
        let mut assistant = RhymeAssistant::default();
        assistant.manual_search("night").unwrap();
        assert!(assistant.on_enter("all night\n", 10).is_none());
        assert!(assistant.manual_search("   ").is_none());
    }

    #[test]
    fn test_no_word_no_request() {
        let mut assistant = RhymeAssistant::default();
        assert!(assistant.on_enter("", 0).is_none());
        assert!(assistant.on_enter("123 456\n", 8).is_none());
        assert!(!assistant.is_loading());
    }

    #[test]
    fn test_mode_change_does_not_query() {
        let mut assistant = RhymeAssistant::default();
        assert_eq!(assistant.toggle_mode(), TargetMode::Penultimate);
        assert!(!assistant.is_loading());
        let request = assistant.on_enter("love\n\nhate\n", 11).unwrap();
        assert_eq!(request.word, "love");
    }

    #[test]
    fn test_new_result_resets_both_windows() {
        let mut assistant = RhymeAssistant::default();
        let first = assistant.manual_search("amor").unwrap();
        let many: Vec<&str> = vec!["a1", "a2", "a3", "a4", "a5", "a6", "a7"];
        assert!(assistant.apply(first.into_response(rhymes(&many, &many))));

        assistant.page_forward(RhymeList::Perfect);
        assistant.page_forward(RhymeList::Perfect);
        assistant.page_forward(RhymeList::Phonetic);
        assert_eq!(assistant.window(RhymeList::Perfect).start(), 6);
        assert_eq!(assistant.visible(RhymeList::Perfect), &["a7".to_string()][..]);

        let second = assistant.manual_search("dor").unwrap();
        assert!(assistant.apply(second.into_response(rhymes(&many, &many))));
        assert_eq!(assistant.window(RhymeList::Perfect).start(), 0);
        assert_eq!(assistant.window(RhymeList::Phonetic).start(), 0);
        assert_eq!(assistant.result().unwrap().target_word, "dor");
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut assistant = RhymeAssistant::default();
        let old = assistant.manual_search("amor").unwrap();
        let new = assistant.manual_search("dor").unwrap();

        // the newer request finishes first
        assert!(assistant.apply(new.into_response(rhymes(&["flor"], &[]))));
        assert!(!assistant.apply(old.into_response(rhymes(&["calor"], &[]))));

        let live = assistant.result().unwrap();
        assert_eq!(live.target_word, "dor");
        assert_eq!(live.perfect, vec!["flor"]);
        assert!(!assistant.is_loading());
    }

    #[test]
    fn test_older_response_while_newer_pending_is_discarded() {
        let mut assistant = RhymeAssistant::default();
        let old = assistant.manual_search("amor").unwrap();
        let _new = assistant.manual_search("dor").unwrap();
        assert!(!assistant.apply(old.into_response(rhymes(&["calor"], &[]))));
        assert!(assistant.result().is_none());
        assert!(assistant.is_loading());
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let mut assistant = RhymeAssistant::default();
        let request = assistant.manual_search("xyz").unwrap();
        assert!(assistant.apply(request.into_response(RhymeSet::default())));
        assert!(assistant.visible(RhymeList::Perfect).is_empty());
        assert!(!assistant.can_page_forward(RhymeList::Phonetic));
        assert!(!assistant.can_page_backward(RhymeList::Phonetic));
    }

    #[test]
    fn test_paging_without_result_is_a_noop() {
        let mut assistant = RhymeAssistant::default();
        assistant.page_forward(RhymeList::Perfect);
        assistant.page_backward(RhymeList::Phonetic);
        assert_eq!(assistant.window(RhymeList::Perfect), PageWindow::default());
    }
}
