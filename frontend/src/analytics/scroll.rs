use std::cell::Cell;

/// Depth thresholds are reported only at exact multiples of this step.
pub const DEPTH_STEP: u8 = 25;

thread_local! {
    // Lives for the page load, across bootstrapper remounts.
    static PAGE_WATERMARK: Cell<ScrollWatermark> = Cell::new(ScrollWatermark::new());
}

/// Feeds `percent` to the page-wide watermark; see [`ScrollWatermark::observe`].
pub fn observe_page_depth(percent: u8) -> Option<u8> {
    PAGE_WATERMARK.with(|cell| {
        let mut watermark = cell.get();
        let crossed = watermark.observe(percent);
        cell.set(watermark);
        crossed
    })
}

/// Page scroll position, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_y: f64,
    pub document_height: f64,
    pub viewport_height: f64,
}

impl ScrollMetrics {
    /// Rounded percentage of the scrollable range covered so far, clamped to 0..=100.
    /// `None` when the page fits in the viewport and there is nothing to scroll.
    pub fn percent(&self) -> Option<u8> {
        let scrollable = self.document_height - self.viewport_height;
        if !scrollable.is_finite() || scrollable <= 0.0 || !self.scroll_y.is_finite() {
            return None;
        }
        let percent = (self.scroll_y / scrollable * 100.0).round();
        Some(percent.clamp(0.0, 100.0) as u8)
    }
}

/// Highest scroll depth seen during this page load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollWatermark {
    max: u8,
}

impl ScrollWatermark {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the watermark when `percent` exceeds it and returns the new value
    /// if it lands on a reporting threshold.
    pub fn observe(&mut self, percent: u8) -> Option<u8> {
        let percent = percent.min(100);
        if percent <= self.max {
            return None;
        }
        self.max = percent;
        (percent % DEPTH_STEP == 0).then_some(percent)
    }
}
