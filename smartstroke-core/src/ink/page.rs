//! Pages and the notebook that holds them

use alloc::vec::Vec;

use super::stroke::Stroke;

/// An ordered sequence of sealed strokes
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Page {
    strokes: Vec<Stroke>,
}

impl Page {
    /// Empty page
    pub fn new() -> Self {
        Self::default()
    }

    /// Sealed strokes in drawing order
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Number of strokes
    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    /// True if there are no entries
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}

/// All pages written in a session, plus which one receives ink
///
/// Always holds at least one page. Strokes only ever land on the active page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Notebook {
    pages: Vec<Page>,
    active: usize,
}

impl Default for Notebook {
    fn default() -> Self {
        Self::new()
    }
}

impl Notebook {
    /// A notebook with one empty page
    pub fn new() -> Self {
        let mut pages = Vec::new();
        pages.push(Page::new());
        Self { pages, active: 0 }
    }

    /// Append an empty page and make it active; returns its index
    pub fn next_page(&mut self) -> usize {
        self.pages.push(Page::new());
        self.active = self.pages.len() - 1;
        log_debug!("Turned to page {}", self.active);
        self.active
    }

    /// Store a sealed stroke on the active page
    pub fn seal(&mut self, stroke: Stroke) {
        log_debug!(
            "Sealed stroke of {} points on page {}",
            stroke.len(),
            self.active
        );
        if let Some(page) = self.pages.get_mut(self.active) {
            page.strokes.push(stroke);
        }
    }

    /// Index of the page receiving ink
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Page receiving ink
    pub fn active_page(&self) -> &Page {
        // `active` always indexes an existing page
        &self.pages[self.active]
    }

    /// Page at `index`, if it exists
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// All pages in order
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Total strokes across all pages
    pub fn stroke_count(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }
}
