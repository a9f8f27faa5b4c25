// Galleria - Viewer state machine
// Full-screen one-at-a-time presentation. Button presses, paging gestures and
// collection changes all pass through `settle`, which is the only place the
// index and its derived fields are written.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ViewerState {
    Closed,
    Open { index: usize },
}

/// Derived display state. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerPosition {
    pub current_index: usize,
    /// 1-based, display only
    pub slide_number: usize,
    pub prev_disabled: bool,
    pub next_disabled: bool,
}

impl ViewerPosition {
    /// Position shown while closed: back at the start, controls inert.
    pub fn start() -> Self {
        Self {
            current_index: 0,
            slide_number: 1,
            prev_disabled: true,
            next_disabled: true,
        }
    }

    fn at(index: usize, len: usize) -> Self {
        Self {
            current_index: index,
            slide_number: index + 1,
            prev_disabled: index == 0,
            next_disabled: index + 1 >= len,
        }
    }
}

/// Instruction for the paging surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScrollCommand {
    ToIndex { index: usize, animated: bool },
    ToOffset { offset: f64, animated: bool },
}

/// Report from the paging surface that a scroll-to-index target was not yet
/// measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollFailure {
    pub index: usize,
    pub average_item_length: f64,
}

/// Layout of one page: every page is exactly one page width wide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ItemLayout {
    pub length: f64,
    pub offset: f64,
    pub index: usize,
}

impl ItemLayout {
    pub fn for_index(page_width: f64, index: usize) -> Self {
        Self {
            length: page_width,
            offset: page_width * index as f64,
            index,
        }
    }
}

/// Inputs to the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerEvent {
    /// Grid item at this position was selected.
    Open(usize),
    Previous,
    Next,
    /// Paging gesture settled on this page.
    PageSettled(usize),
    /// Raw scroll offset from the paging surface.
    Scrolled { offset: f64, page_width: f64 },
    Close,
    /// The record at `index` was removed; `len` passed to `apply` is the new length.
    Removed { index: usize },
    /// Collection was reloaded; `keep` is the new position of the shown record, if it survived.
    Reloaded { keep: Option<usize> },
}

#[derive(Debug, Clone)]
pub struct Viewer {
    state: ViewerState,
    position: ViewerPosition,
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewer {
    pub fn new() -> Self {
        Self {
            state: ViewerState::Closed,
            position: ViewerPosition::start(),
        }
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn position(&self) -> ViewerPosition {
        self.position
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ViewerState::Open { .. })
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            ViewerState::Open { index } => Some(index),
            ViewerState::Closed => None,
        }
    }

    /// Apply one event against a collection of `len` records.
    ///
    /// Returns the scroll the paging surface must perform, if any. Events that
    /// would leave the valid range are rejected and leave the state unchanged.
    pub fn apply(&mut self, event: ViewerEvent, len: usize) -> Option<ScrollCommand> {
        log::debug!("Viewer {:?} <- {:?} (len {})", self.state, event, len);

        match event {
            ViewerEvent::Open(index) => {
                if len == 0 {
                    log::warn!("Ignoring viewer open on an empty collection");
                    return None;
                }
                let index = self.settle(index, len);
                Some(ScrollCommand::ToIndex { index, animated: true })
            }
            ViewerEvent::Previous => {
                let index = self.current_index()?;
                if index == 0 {
                    return None;
                }
                let index = self.settle(index - 1, len);
                Some(ScrollCommand::ToIndex { index, animated: true })
            }
            ViewerEvent::Next => {
                let index = self.current_index()?;
                if index + 1 >= len {
                    return None;
                }
                let index = self.settle(index + 1, len);
                Some(ScrollCommand::ToIndex { index, animated: true })
            }
            ViewerEvent::PageSettled(page) => {
                self.current_index()?;
                if len == 0 {
                    self.close();
                    return None;
                }
                // The surface already shows the page; nothing to scroll
                self.settle(page, len);
                None
            }
            ViewerEvent::Scrolled { offset, page_width } => {
                let page = page_for_offset(offset, page_width)?;
                self.apply(ViewerEvent::PageSettled(page), len)
            }
            ViewerEvent::Close => {
                self.close();
                None
            }
            ViewerEvent::Removed { index: removed } => {
                let current = self.current_index()?;
                if len == 0 {
                    self.close();
                    return None;
                }
                // Removing an earlier record shifts the shown one down by one.
                // Removing the shown record leaves the index on its successor.
                let target = if removed < current { current - 1 } else { current };
                let index = self.settle(target, len);
                Some(ScrollCommand::ToIndex { index, animated: false })
            }
            ViewerEvent::Reloaded { keep } => {
                let current = self.current_index()?;
                if len == 0 {
                    self.close();
                    return None;
                }
                let index = self.settle(keep.unwrap_or(current), len);
                Some(ScrollCommand::ToIndex { index, animated: false })
            }
        }
    }

    /// Fallback for a scroll-to-index the surface could not perform yet.
    pub fn scroll_failed(failure: ScrollFailure) -> ScrollCommand {
        ScrollCommand::ToOffset {
            offset: failure.average_item_length * failure.index as f64,
            animated: true,
        }
    }

    /// True when the state and derived fields agree with a collection of `len`.
    pub fn is_consistent(&self, len: usize) -> bool {
        match self.state {
            ViewerState::Closed => self.position == ViewerPosition::start(),
            ViewerState::Open { index } => {
                index < len && self.position == ViewerPosition::at(index, len)
            }
        }
    }

    fn settle(&mut self, index: usize, len: usize) -> usize {
        let index = index.min(len.saturating_sub(1));
        self.state = ViewerState::Open { index };
        self.position = ViewerPosition::at(index, len);
        index
    }

    fn close(&mut self) {
        self.state = ViewerState::Closed;
        self.position = ViewerPosition::start();
    }
}

/// Page under a horizontal scroll offset, floored. None for unusable widths.
pub fn page_for_offset(offset: f64, page_width: f64) -> Option<usize> {
    if !(page_width.is_finite() && page_width > 0.0) || !offset.is_finite() {
        return None;
    }
    Some((offset / page_width).floor().max(0.0) as usize)
}
