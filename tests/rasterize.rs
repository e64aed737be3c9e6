//! Rasteriser integration tests driven through a fake rendering backend.
//!
//! The fake produces deterministic synthetic pages of controlled height, so
//! every slicing property can be checked without a PDF library or fixture
//! files: ordering, chunk heights, progress sequencing, and the
//! all-or-nothing failure policy.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use design2code::{
    rasterize, rasterize_bytes, Design2CodeError, RasterizeOptions, Slice, SliceProgressCallback,
    SourceDocument,
};
use image::{DynamicImage, Rgba, RgbaImage};
use std::sync::Mutex;

// ── Test doubles ─────────────────────────────────────────────────────────────

/// Interleaved event log shared by the fake document and the callback, used
/// to assert that progress for page N fires before page N renders.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Progress { current: usize, total: usize },
    Render { page: usize },
}

#[derive(Default)]
struct EventLog(Mutex<Vec<Event>>);

impl EventLog {
    fn push(&self, e: Event) {
        self.0.lock().unwrap().push(e);
    }
    fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }
}

/// A document whose pages have fixed nominal heights (at scale 1.0).
struct FakeDocument<'a> {
    width: u32,
    nominal_heights: Vec<u32>,
    fail_on_page: Option<usize>,
    log: Option<&'a EventLog>,
}

impl<'a> FakeDocument<'a> {
    fn new(nominal_heights: Vec<u32>) -> Self {
        Self {
            width: 400,
            nominal_heights,
            fail_on_page: None,
            log: None,
        }
    }
}

impl SourceDocument for FakeDocument<'_> {
    fn page_count(&self) -> usize {
        self.nominal_heights.len()
    }

    fn render_page(
        &self,
        page_number: usize,
        scale: f32,
    ) -> Result<DynamicImage, Design2CodeError> {
        if let Some(log) = self.log {
            log.push(Event::Render { page: page_number });
        }
        if self.fail_on_page == Some(page_number) {
            return Err(Design2CodeError::RenderSurface {
                page: page_number,
                detail: "synthetic render failure".into(),
            });
        }

        let height = (self.nominal_heights[page_number - 1] as f32 * scale).round() as u32;
        let width = (self.width as f32 * scale).round() as u32;
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([200, 200, 200, 255]),
        )))
    }
}

struct LoggingCallback<'a>(&'a EventLog);

impl SliceProgressCallback for LoggingCallback<'_> {
    fn on_page_start(&self, current: usize, total: usize) {
        self.0.push(Event::Progress { current, total });
    }
}

fn options() -> RasterizeOptions {
    RasterizeOptions::default()
}

fn assert_ordering_invariant(slices: &[Slice]) {
    for (i, s) in slices.iter().enumerate() {
        assert_eq!(s.ordinal, i, "ordinals must be the sequence position");
    }
    for pair in slices.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            a.page_number < b.page_number
                || (a.page_number == b.page_number && a.y_offset < b.y_offset),
            "slices must be sorted by (page, vertical position): {a:?} then {b:?}"
        );
    }
}

// ── Short-page behaviour ─────────────────────────────────────────────────────

#[test]
fn short_pages_produce_one_slice_each() {
    // Three pages, all comfortably under the cap at scale 2.0.
    let doc = FakeDocument::new(vec![500, 800, 1000]);
    let slices = rasterize(&doc, &options(), None).unwrap();

    assert_eq!(slices.len(), 3);
    let pages: Vec<usize> = slices.iter().map(|s| s.page_number).collect();
    assert_eq!(pages, vec![1, 2, 3]);
    assert_ordering_invariant(&slices);
}

#[test]
fn nominal_1000_at_scale_2_is_one_slice() {
    // 1000 px nominal → 2000 px viewport, under the 2500 cap.
    let doc = FakeDocument::new(vec![1000]);
    let slices = rasterize(&doc, &options(), None).unwrap();

    assert_eq!(slices.len(), 1);
    assert_eq!(slices[0].page_number, 1);
    assert_eq!(slices[0].height, 2000);
    assert_eq!(slices[0].y_offset, 0);
}

#[test]
fn page_within_tolerance_is_not_split() {
    // 1280 nominal → 2560 px: over 2500 but within the 100 px tolerance.
    let doc = FakeDocument::new(vec![1280]);
    let slices = rasterize(&doc, &options(), None).unwrap();

    assert_eq!(slices.len(), 1);
    assert_eq!(slices[0].height, 2560);
}

// ── Tall-page slicing ────────────────────────────────────────────────────────

#[test]
fn tall_page_splits_into_contiguous_bands() {
    // 3100 nominal → 6200 px viewport → 3 bands: [2500, 2500, 1200].
    let doc = FakeDocument::new(vec![3100]);
    let slices = rasterize(&doc, &options(), None).unwrap();

    assert_eq!(slices.len(), 3);
    let heights: Vec<u32> = slices.iter().map(|s| s.height).collect();
    assert_eq!(heights, vec![2500, 2500, 1200]);

    let offsets: Vec<u32> = slices.iter().map(|s| s.y_offset).collect();
    assert_eq!(offsets, vec![0, 2500, 5000]);
    assert!(slices.iter().all(|s| s.page_number == 1));
    assert_ordering_invariant(&slices);
}

#[test]
fn mixed_document_keeps_page_order_across_split_pages() {
    // Page 1 short, page 2 tall (3 bands), page 3 short.
    let doc = FakeDocument::new(vec![600, 4000, 900]);
    let slices = rasterize(&doc, &options(), None).unwrap();

    let keys: Vec<(usize, u32)> = slices.iter().map(|s| (s.page_number, s.y_offset)).collect();
    assert_eq!(
        keys,
        vec![(1, 0), (2, 0), (2, 2500), (2, 5000), (2, 7500), (3, 0)]
    );
    assert_ordering_invariant(&slices);
}

#[test]
fn slice_payloads_are_real_jpegs_with_matching_dimensions() {
    let doc = FakeDocument::new(vec![2000]);
    let slices = rasterize(&doc, &options(), None).unwrap();

    // 4000 px viewport → [2500, 1500].
    assert_eq!(slices.len(), 2);
    for s in &slices {
        let bytes = STANDARD.decode(&s.image).expect("valid base64");
        let img = image::load_from_memory(&bytes).expect("decodable JPEG");
        assert_eq!(img.width(), s.width);
        assert_eq!(img.height(), s.height);
    }
}

// ── Progress sequencing ──────────────────────────────────────────────────────

#[test]
fn progress_fires_once_per_page_before_its_render() {
    let log = EventLog::default();
    let mut doc = FakeDocument::new(vec![500, 4000, 700]);
    doc.log = Some(&log);
    let cb = LoggingCallback(&log);

    rasterize(&doc, &options(), Some(&cb)).unwrap();

    let events = log.events();
    let expected: Vec<Event> = (1..=3)
        .flat_map(|p| {
            [
                Event::Progress { current: p, total: 3 },
                Event::Render { page: p },
            ]
        })
        .collect();
    assert_eq!(events, expected);
}

// ── Failure policy ───────────────────────────────────────────────────────────

#[test]
fn empty_document_is_rejected() {
    let doc = FakeDocument::new(vec![]);
    let err = rasterize(&doc, &options(), None).unwrap_err();
    assert!(matches!(err, Design2CodeError::EmptyDocument));
}

#[test]
fn render_failure_aborts_the_whole_call() {
    // Page 1 succeeds, page 2 fails: no partial slice list may escape.
    let mut doc = FakeDocument::new(vec![500, 500, 500]);
    doc.fail_on_page = Some(2);

    let err = rasterize(&doc, &options(), None).unwrap_err();
    match err {
        Design2CodeError::RenderSurface { page, .. } => assert_eq!(page, 2),
        other => panic!("expected RenderSurface, got {other:?}"),
    }
}

#[test]
fn render_failure_stops_rendering_later_pages() {
    let log = EventLog::default();
    let mut doc = FakeDocument::new(vec![500, 500, 500]);
    doc.fail_on_page = Some(2);
    doc.log = Some(&log);

    rasterize(&doc, &options(), None).unwrap_err();

    let rendered: Vec<usize> = log
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::Render { page } => Some(page),
            _ => None,
        })
        .collect();
    assert_eq!(rendered, vec![1, 2], "page 3 must never be touched");
}

// ── Byte-buffer entry point ──────────────────────────────────────────────────

#[tokio::test]
async fn bytes_without_pdf_magic_are_rejected() {
    // The buffer round-trips through a managed tempfile; validation must
    // still fire on the written file before any backend work.
    let err = rasterize_bytes(b"<svg>not a pdf</svg>", options(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Design2CodeError::NotAPdf { .. }));
}

#[tokio::test]
#[ignore = "needs a pdfium shared library at runtime"]
async fn truncated_pdf_bytes_surface_as_corrupt() {
    let err = rasterize_bytes(b"%PDF-1.7\ngarbage", options(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Design2CodeError::CorruptPdf { .. }));
}

// ── Option plumbing ──────────────────────────────────────────────────────────

#[test]
fn custom_chunk_height_is_honoured() {
    let opts = RasterizeOptions {
        scale: 1.0,
        max_chunk_height: 1000,
        chunk_tolerance: 0,
        jpeg_quality: 85,
    };
    let doc = FakeDocument::new(vec![2500]);
    let slices = rasterize(&doc, &opts, None).unwrap();

    let heights: Vec<u32> = slices.iter().map(|s| s.height).collect();
    assert_eq!(heights, vec![1000, 1000, 500]);
}
