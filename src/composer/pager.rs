// Suggestion paging - each list is shown three at a time
// Windows are small Copy values, always replaced whole instead of mutated

use super::RhymeList;

pub const PAGE_SIZE: usize = 3;

/// Start of the visible slice for one suggestion list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageWindow {
    start: usize,
}

impl PageWindow {
    pub fn start(self) -> usize {
        self.start
    }

    /// Up to `PAGE_SIZE` items from `start` (fewer at the tail).
    pub fn visible_slice<T>(self, list: &[T]) -> &[T] {
        let start = self.start.min(list.len());
        let end = (start + PAGE_SIZE).min(list.len());
        &list[start..end]
    }

    pub fn can_page_forward<T>(self, list: &[T]) -> bool {
        self.start + PAGE_SIZE < list.len()
    }

    pub fn can_page_backward(self) -> bool {
        self.start > 0
    }

    /// Next page, or the same window at the last page (clamped, no wrap).
    pub fn page_forward<T>(self, list: &[T]) -> Self {
        if self.can_page_forward(list) {
            Self {
                start: self.start + PAGE_SIZE,
            }
        } else {
            self
        }
    }

    pub fn page_backward(self) -> Self {
        Self {
            start: self.start.saturating_sub(PAGE_SIZE),
        }
    }
}

/// One independent window per list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuggestionPager {
    perfect: PageWindow,
    phonetic: PageWindow,
}

impl SuggestionPager {
    pub fn window(&self, which: RhymeList) -> PageWindow {
        match which {
            RhymeList::Perfect => self.perfect,
            RhymeList::Phonetic => self.phonetic,
        }
    }

    fn replace(&mut self, which: RhymeList, window: PageWindow) {
        match which {
            RhymeList::Perfect => self.perfect = window,
            RhymeList::Phonetic => self.phonetic = window,
        }
    }

    pub fn page_forward<T>(&mut self, which: RhymeList, list: &[T]) {
        let next = self.window(which).page_forward(list);
        self.replace(which, next);
    }

    pub fn page_backward(&mut self, which: RhymeList) {
        let prev = self.window(which).page_backward();
        self.replace(which, prev);
    }

    /// A fresh result always starts both lists at their first page.
    pub fn on_new_result(&mut self) {
        *self = Self::default();
    }
}
