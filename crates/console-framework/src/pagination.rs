//! # Pagination Contract
//!
//! One pagination contract shared by every resource manager:
//!
//! - [`compute_visible_pages`] turns `(current, total, max_visible)` into a
//!   bounded, ellipsis-compressed marker sequence. Pure.
//! - [`render`] turns that sequence into Previous/page/Next controls inside
//!   a container and binds the page-change callback.
//!
//! ```rust
//! use console_framework::pagination::{compute_visible_pages, PageMarker::*};
//!
//! let pages = compute_visible_pages(7, 12, 5);
//! assert_eq!(pages, vec![Page(1), Ellipsis, Page(5), Page(6), Page(7), Page(8), Page(9), Ellipsis, Page(12)]);
//! ```

use crate::dom::{
    Control, ControlKind, ContainerContent, Document, PageChangeHandler, PaginationControls,
};
use crate::error::ConsoleError;
use std::fmt;

/// One entry of the visible page sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMarker {
    Page(u32),
    Ellipsis,
}

impl fmt::Display for PageMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageMarker::Page(n) => write!(f, "{n}"),
            PageMarker::Ellipsis => f.write_str("..."),
        }
    }
}

/// Computes the page markers to display.
///
/// When everything fits, all pages are listed. Otherwise a window of
/// `max_visible` pages is centred on `current_page` and shifted (never shrunk)
/// at the boundaries; page 1 and `total_pages` are always kept, with an
/// ellipsis standing in for each elided range.
pub fn compute_visible_pages(current_page: u32, total_pages: u32, max_visible: u32) -> Vec<PageMarker> {
    if total_pages == 0 {
        return Vec::new();
    }
    let max_visible = max_visible.max(1);
    if total_pages <= max_visible {
        return (1..=total_pages).map(PageMarker::Page).collect();
    }

    let current = current_page.clamp(1, total_pages);
    let half = max_visible / 2;
    let mut start = current.saturating_sub(half).max(1);
    let mut end = start + max_visible - 1;
    if end > total_pages {
        end = total_pages;
        start = total_pages - max_visible + 1;
    }

    let mut markers = Vec::with_capacity(max_visible as usize + 4);
    if start > 1 {
        markers.push(PageMarker::Page(1));
        if start > 2 {
            markers.push(PageMarker::Ellipsis);
        }
    }
    markers.extend((start..=end).map(PageMarker::Page));
    if end < total_pages {
        if end < total_pages - 1 {
            markers.push(PageMarker::Ellipsis);
        }
        markers.push(PageMarker::Page(total_pages));
    }
    markers
}

/// Input of [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub current_page: u32,
    pub total_pages: u32,
    pub max_visible: u32,
}

/// Builds the controls for a page request without touching any container.
pub fn build_controls(request: PageRequest) -> Vec<Control> {
    let PageRequest {
        current_page,
        total_pages,
        max_visible,
    } = request;
    let current = current_page.clamp(1, total_pages.max(1));

    let mut controls = Vec::new();
    controls.push(Control {
        kind: ControlKind::Previous,
        target: (current > 1).then(|| current - 1),
        disabled: current <= 1,
        current: false,
    });
    for marker in compute_visible_pages(current, total_pages, max_visible) {
        controls.push(match marker {
            PageMarker::Page(n) => Control {
                kind: ControlKind::Page(n),
                target: Some(n),
                disabled: false,
                current: n == current,
            },
            PageMarker::Ellipsis => Control {
                kind: ControlKind::Ellipsis,
                target: None,
                disabled: true,
                current: false,
            },
        });
    }
    controls.push(Control {
        kind: ControlKind::Next,
        target: (current < total_pages).then(|| current + 1),
        disabled: current >= total_pages,
        current: false,
    });
    controls
}

/// Renders pagination controls into `container`, replacing whatever was there.
///
/// With one page or fewer the container is cleared: there is nothing to paginate.
pub fn render(
    document: &Document,
    container: &str,
    request: PageRequest,
    on_page_change: PageChangeHandler,
) -> Result<(), ConsoleError> {
    if request.total_pages <= 1 {
        return document.clear(container);
    }
    document.replace(
        container,
        ContainerContent::Pagination(PaginationControls {
            controls: build_controls(request),
            on_page_change,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::PageMarker::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    fn pages_only(markers: &[PageMarker]) -> Vec<u32> {
        markers
            .iter()
            .filter_map(|m| match m {
                Page(n) => Some(*n),
                Ellipsis => None,
            })
            .collect()
    }

    #[test]
    fn everything_fits_returns_all_pages() {
        for max_visible in 1..=8 {
            for total in 0..=max_visible {
                let markers = compute_visible_pages(1, total, max_visible);
                assert_eq!(markers.len() as u32, total);
                assert_eq!(pages_only(&markers), (1..=total).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn sequence_properties_hold_for_every_current_page() {
        for max_visible in 1..=7 {
            for total in 1..=25 {
                for current in 1..=total {
                    let markers = compute_visible_pages(current, total, max_visible);
                    let pages = pages_only(&markers);
                    assert!(pages.contains(&current), "{current}/{total} max {max_visible}: {markers:?}");
                    assert!(pages.windows(2).all(|w| w[0] < w[1]), "not increasing: {markers:?}");
                    assert_eq!(pages.first(), Some(&1));
                    assert_eq!(pages.last(), Some(&total));
                    assert!(
                        markers.windows(2).all(|w| !(w[0] == Ellipsis && w[1] == Ellipsis)),
                        "adjacent ellipses: {markers:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn window_keeps_its_width_at_the_boundaries() {
        assert_eq!(
            compute_visible_pages(1, 12, 5),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(12)]
        );
        assert_eq!(
            compute_visible_pages(12, 12, 5),
            vec![Page(1), Ellipsis, Page(8), Page(9), Page(10), Page(11), Page(12)]
        );
        assert_eq!(
            compute_visible_pages(4, 12, 5),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Page(6), Ellipsis, Page(12)]
        );
    }

    #[test]
    fn middle_of_twelve_pages() {
        assert_eq!(
            compute_visible_pages(7, 12, 5),
            vec![Page(1), Ellipsis, Page(5), Page(6), Page(7), Page(8), Page(9), Ellipsis, Page(12)]
        );
    }

    #[test]
    fn out_of_range_current_page_is_clamped() {
        assert_eq!(compute_visible_pages(40, 12, 5), compute_visible_pages(12, 12, 5));
        assert_eq!(compute_visible_pages(0, 12, 5), compute_visible_pages(1, 12, 5));
        assert_eq!(compute_visible_pages(3, 12, 0), vec![Page(1), Ellipsis, Page(3), Ellipsis, Page(12)]);
    }

    fn counting_handler() -> (PageChangeHandler, Arc<Mutex<Vec<u32>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler: PageChangeHandler = Arc::new(move |page| sink.lock().unwrap().push(page));
        (handler, seen)
    }

    #[test]
    fn single_page_renders_nothing() {
        let doc = Document::new();
        doc.declare_container("pager");
        let (handler, _) = counting_handler();
        let request = PageRequest {
            current_page: 1,
            total_pages: 3,
            max_visible: 5,
        };
        render(&doc, "pager", request, handler.clone()).unwrap();
        assert!(doc.content("pager").unwrap().controls().is_some());

        let single = PageRequest { total_pages: 1, ..request };
        render(&doc, "pager", single, handler).unwrap();
        assert!(doc.content("pager").unwrap().is_empty());
    }

    #[test]
    fn three_pages_on_first_page() {
        let doc = Document::new();
        doc.declare_container("pager");
        let (handler, seen) = counting_handler();
        let request = PageRequest {
            current_page: 1,
            total_pages: 3,
            max_visible: 5,
        };
        render(&doc, "pager", request, handler).unwrap();

        let content = doc.content("pager").unwrap();
        let controls = content.controls().unwrap();
        let kinds: Vec<_> = controls.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ControlKind::Previous,
                ControlKind::Page(1),
                ControlKind::Page(2),
                ControlKind::Page(3),
                ControlKind::Next
            ]
        );
        assert!(controls[0].disabled);
        assert!(!controls[4].disabled);
        assert_eq!(controls[4].target, Some(2));

        // Previous (disabled) and page 1 (current) are inert.
        assert!(!doc.click("pager", 0).unwrap());
        assert!(!doc.click("pager", 1).unwrap());
        assert!(doc.click("pager", 3).unwrap());
        assert!(doc.click("pager", 4).unwrap());
        assert_eq!(*seen.lock().unwrap(), vec![3, 2]);
    }

    #[test]
    fn ellipsis_controls_are_inert_and_render_is_idempotent() {
        let doc = Document::new();
        doc.declare_container("pager");
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let handler: PageChangeHandler = Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let request = PageRequest {
            current_page: 7,
            total_pages: 12,
            max_visible: 5,
        };
        render(&doc, "pager", request, handler.clone()).unwrap();
        let first = doc.content("pager").unwrap().controls().unwrap().to_vec();
        render(&doc, "pager", request, handler).unwrap();
        let second = doc.content("pager").unwrap().controls().unwrap().to_vec();
        assert_eq!(first, second);

        let ellipsis = first.iter().position(|c| c.kind == ControlKind::Ellipsis).unwrap();
        assert!(!doc.click("pager", ellipsis).unwrap());
        assert!(doc.click_page("pager", 12).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
