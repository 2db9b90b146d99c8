//! Range and selection box mapping
//!
//! Walks the window's runs in reading order, classifying each against the
//! target range: the run holding the range start gets a left trim, the run
//! holding the end gets a right cut, runs strictly inside get a full box.
//! Output is grouped per page in page-relative coordinates, ready for an
//! overlay layer.

use std::collections::BTreeMap;
use std::ops::Range;

use thiserror::Error;

use super::cache::GeometryCache;
use super::locator::ConcatenatedIndex;
use super::types::{HighlightBox, HighlightEnd};
use crate::geometry::RectPx;
use crate::provider::LayoutProbe;
use crate::text_layer::RunId;

/// Highlight boxes grouped by page number.
pub type PageBoxes = BTreeMap<usize, Vec<HighlightBox>>;

/// Geometry lookup failures that abort a mapping pass. A pass never
/// produces partial output: the caller keeps its previous boxes and
/// retries once the text layer signals ready again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MapFault {
    #[error("no layout box for page {0}")]
    StalePage(usize),
    #[error("no layout box for run {0:?}")]
    StaleRun(RunId),
    #[error("no character box at index {index} of run {run:?}")]
    StaleChar { run: RunId, index: usize },
}

/// Map a located byte range onto per-page highlight boxes.
pub fn boxes_for_range<P>(
    index: &ConcatenatedIndex,
    range: Range<usize>,
    cache: &mut GeometryCache,
    probe: &P,
) -> Result<PageBoxes, MapFault>
where
    P: LayoutProbe + ?Sized,
{
    let mut out = PageBoxes::new();
    let mut start_seen = false;

    for entry in index.entries() {
        let starts_here = entry.contains(range.start);
        let ends_here = range.end > entry.start && range.end <= entry.end;

        if starts_here {
            start_seen = true;
            let run_box = measure(cache, entry.run, probe)?;
            let run_text = &index.text()[entry.start..entry.end];
            let first = char_index(run_text, range.start - entry.start);
            let (left, _) = char_span(probe, entry.run, first, run_box)?;

            if ends_here {
                let last = char_index(run_text, range.end - entry.start) - 1;
                let (_, right) = char_span(probe, entry.run, last, run_box)?;
                out.entry(entry.run.page)
                    .or_default()
                    .push(HighlightBox::trimmed(run_box, Some(left), Some(right)));
                break;
            }

            out.entry(entry.run.page)
                .or_default()
                .push(HighlightBox::trimmed(run_box, Some(left), None));
        } else if ends_here && start_seen {
            let run_box = measure(cache, entry.run, probe)?;
            let run_text = &index.text()[entry.start..entry.end];
            let last = char_index(run_text, range.end - entry.start) - 1;
            let (_, right) = char_span(probe, entry.run, last, run_box)?;
            out.entry(entry.run.page)
                .or_default()
                .push(HighlightBox::trimmed(run_box, None, Some(right)));
            break;
        } else if start_seen && range.start <= entry.start && entry.end <= range.end {
            let run_box = measure(cache, entry.run, probe)?;
            out.entry(entry.run.page)
                .or_default()
                .push(HighlightBox::full(run_box));
        }
    }

    Ok(out)
}

/// Map a drag selection onto per-page highlight boxes.
///
/// Endpoints carry their own character pixel offsets; absent offsets mean
/// run edge (nearest-focus endpoints). When `backwards`, the selection
/// ends at the anchor character's left edge, excluding it.
pub fn boxes_for_selection<P>(
    index: &ConcatenatedIndex,
    anchor: &HighlightEnd,
    current: &HighlightEnd,
    backwards: bool,
    cache: &mut GeometryCache,
    probe: &P,
) -> Result<PageBoxes, MapFault>
where
    P: LayoutProbe + ?Sized,
{
    let (first, last) = if backwards {
        (current, anchor)
    } else {
        (anchor, current)
    };
    let last_right = if backwards {
        last.px_start
    } else {
        last.px_end
    };

    // An endpoint can sit on a page evicted mid-drag. Its runs are then
    // absent from the index and the walk below would skip them, so abort
    // up front.
    index
        .entry_for(first.run)
        .ok_or(MapFault::StaleRun(first.run))?;
    index
        .entry_for(last.run)
        .ok_or(MapFault::StaleRun(last.run))?;

    let mut out = PageBoxes::new();

    for entry in index.entries() {
        if entry.run < first.run {
            continue;
        }
        if entry.run > last.run {
            break;
        }

        let run_box = measure(cache, entry.run, probe)?;
        let b = if first.run == last.run {
            HighlightBox::trimmed(run_box, first.px_start, last_right)
        } else if entry.run == first.run {
            HighlightBox::trimmed(run_box, first.px_start, None)
        } else if entry.run == last.run {
            HighlightBox::trimmed(run_box, None, last_right)
        } else {
            HighlightBox::full(run_box)
        };
        out.entry(entry.run.page).or_default().push(b);

        if entry.run == last.run {
            break;
        }
    }

    Ok(out)
}

fn measure<P>(cache: &mut GeometryCache, run: RunId, probe: &P) -> Result<RectPx, MapFault>
where
    P: LayoutProbe + ?Sized,
{
    cache
        .get_or_measure(run, probe)
        .ok_or(MapFault::StaleRun(run))
}

/// Run-relative left and right pixel edges of one character.
fn char_span<P>(
    probe: &P,
    run: RunId,
    index: usize,
    run_box: RectPx,
) -> Result<(f32, f32), MapFault>
where
    P: LayoutProbe + ?Sized,
{
    let page_box = probe
        .page_box(run.page)
        .ok_or(MapFault::StalePage(run.page))?;
    let rel = probe
        .char_box(run, index)
        .ok_or(MapFault::StaleChar { run, index })?
        .relative_to(&page_box);
    Ok((rel.left - run_box.left, rel.right() - run_box.left))
}

/// Characters strictly before `byte`. Counts instead of slicing so an
/// off-boundary byte cannot panic.
fn char_index(text: &str, byte: usize) -> usize {
    text.char_indices().take_while(|(i, _)| *i < byte).count()
}
