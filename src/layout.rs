//! Connector layout for the rendered bracket.
//!
//! The overlay page lays out one column per bracket round, each holding team
//! slots. This module takes the rectangles of those slots and produces the
//! line segments joining every slot to the slot it advances into:
//!
//! ```text
//!  [team a]──┐
//!            ├──[winner]
//!  [team b]──┘
//! ```
//!
//! Geometry is read from a [`SlotGeometry`] and drawn into a [`LineSink`].
//! A pass snapshots all slot rectangles first, then computes, then clears the
//! sink and redraws every connector, so running it again on unchanged
//! geometry yields the same segments.

use serde::{Deserialize, Serialize};

pub const LINE_STROKE: &str = "black";
pub const LINE_STROKE_WIDTH: u32 = 2;

/// Slot rectangles per round, `None` where a slot is empty or not rendered yet.
pub type BracketGeometry = Vec<Vec<Option<SlotRect>>>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl SlotRect {
    pub fn from_origin_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        SlotRect {
            left: x,
            top: y,
            right: x + width,
            bottom: y + height,
        }
    }

    pub fn center_x(&self) -> f64 {
        (self.left + self.right) / 2.0
    }

    pub fn center_y(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }

    fn is_finite(&self) -> bool {
        [self.left, self.top, self.right, self.bottom]
            .iter()
            .all(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Segment {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Segment { x1, y1, x2, y2 }
    }
}

/// How slots of one round join the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectorStyle {
    /// Every surviving team has its own slot; slot `j` advances into `j / 2`.
    #[default]
    AdvanceWithBye,
    /// Slots `j` and `j + 1` merge into `j / 2`, drawn only when all three exist.
    MergeOfTwo,
}

/// The segments linking source slot(s) in `round` to `destination` in `round + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub round: usize,
    pub sources: Vec<usize>,
    pub destination: usize,
    pub segments: Vec<Segment>,
}

/// Read side of the rendering surface.
pub trait SlotGeometry {
    fn round_count(&self) -> usize;
    fn slot_count(&self, round: usize) -> usize;
    /// `None` when the slot has no occupant or could not be measured.
    fn slot_rect(&self, round: usize, slot: usize) -> Option<SlotRect>;
}

impl SlotGeometry for [Vec<Option<SlotRect>>] {
    fn round_count(&self) -> usize {
        self.len()
    }

    fn slot_count(&self, round: usize) -> usize {
        self.get(round).map_or(0, Vec::len)
    }

    fn slot_rect(&self, round: usize, slot: usize) -> Option<SlotRect> {
        *self.get(round)?.get(slot)?
    }
}

impl SlotGeometry for BracketGeometry {
    fn round_count(&self) -> usize {
        self.as_slice().round_count()
    }

    fn slot_count(&self, round: usize) -> usize {
        self.as_slice().slot_count(round)
    }

    fn slot_rect(&self, round: usize, slot: usize) -> Option<SlotRect> {
        self.as_slice().slot_rect(round, slot)
    }
}

/// Draw side of the rendering surface.
pub trait LineSink {
    fn clear(&mut self);
    fn draw(&mut self, segment: Segment);
}

impl LineSink for Vec<Segment> {
    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn draw(&mut self, segment: Segment) {
        self.push(segment);
    }
}

/// SVG `<line>` elements for an overlay's connector layer.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SvgLayer {
    lines: Vec<String>,
}

impl SvgLayer {
    pub fn new() -> Self {
        SvgLayer::default()
    }

    pub fn to_fragment(&self) -> String {
        self.lines.concat()
    }
}

impl LineSink for SvgLayer {
    fn clear(&mut self) {
        self.lines.clear();
    }

    fn draw(&mut self, segment: Segment) {
        self.lines.push(format!(
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{LINE_STROKE}\" stroke-width=\"{LINE_STROKE_WIDTH}\"/>",
            segment.x1, segment.y1, segment.x2, segment.y2
        ));
    }
}

/// Measures every slot up front. Rectangles with non-finite coordinates
/// count as not rendered.
pub fn snapshot<G: SlotGeometry + ?Sized>(geometry: &G) -> BracketGeometry {
    (0..geometry.round_count())
        .map(|round| {
            (0..geometry.slot_count(round))
                .map(|slot| geometry.slot_rect(round, slot).filter(SlotRect::is_finite))
                .collect()
        })
        .collect()
}

pub fn connectors<G: SlotGeometry + ?Sized>(geometry: &G, style: ConnectorStyle) -> Vec<Connector> {
    let rounds = snapshot(geometry);
    rounds
        .windows(2)
        .enumerate()
        .flat_map(|(round, pair)| match style {
            ConnectorStyle::AdvanceWithBye => advance_with_bye(round, &pair[0], &pair[1]),
            ConnectorStyle::MergeOfTwo => merge_of_two(round, &pair[0], &pair[1]),
        })
        .collect()
}

pub fn segments<G: SlotGeometry + ?Sized>(geometry: &G, style: ConnectorStyle) -> Vec<Segment> {
    connectors(geometry, style)
        .into_iter()
        .flat_map(|connector| connector.segments)
        .collect()
}

/// Clears `sink` and draws every connector. Returns the number of segments drawn.
pub fn redraw<G, S>(geometry: &G, sink: &mut S, style: ConnectorStyle) -> usize
where
    G: SlotGeometry + ?Sized,
    S: LineSink + ?Sized,
{
    let segments = segments(geometry, style);
    sink.clear();
    let count = segments.len();
    for segment in segments {
        sink.draw(segment);
    }
    count
}

fn advance_with_bye(round: usize, current: &[Option<SlotRect>], next: &[Option<SlotRect>]) -> Vec<Connector> {
    let mut out = Vec::new();
    for (slot, source) in current.iter().enumerate() {
        let destination = slot / 2;
        let (Some(source), Some(Some(target))) = (source, next.get(destination)) else {
            continue;
        };

        let mid_x = (source.center_x() + target.center_x()) / 2.0;
        let source_y = source.center_y();
        let target_y = target.center_y();

        // the even sibling carries the line into the winner slot, unless the
        // slot before this one is empty
        let feeds_forward = slot % 2 == 0 || matches!(current.get(slot.wrapping_sub(1)), Some(None));

        let mut segments = vec![
            Segment::new(source.right, source_y, mid_x, source_y),
            Segment::new(mid_x, source_y, mid_x, target_y),
        ];
        if feeds_forward {
            segments.push(Segment::new(mid_x, target_y, target.left, target_y));
        }
        out.push(Connector {
            round,
            sources: vec![slot],
            destination,
            segments,
        });
    }
    out
}

fn merge_of_two(round: usize, current: &[Option<SlotRect>], next: &[Option<SlotRect>]) -> Vec<Connector> {
    let mut out = Vec::new();
    for slot in (0..current.len()).step_by(2) {
        let destination = slot / 2;
        let (Some(Some(first)), Some(Some(second)), Some(Some(target))) =
            (current.get(slot), current.get(slot + 1), next.get(destination))
        else {
            continue;
        };

        let teams_center = (first.center_x() + second.center_x()) / 2.0;
        let mid_x = (teams_center + target.center_x()) / 2.0;
        let first_y = first.center_y();
        let second_y = second.center_y();
        let target_y = target.center_y();

        out.push(Connector {
            round,
            sources: vec![slot, slot + 1],
            destination,
            segments: vec![
                Segment::new(first.right, first_y, mid_x, first_y),
                Segment::new(second.right, second_y, mid_x, second_y),
                Segment::new(mid_x, first_y, mid_x, second_y),
                Segment::new(mid_x, target_y, target.left, target_y),
            ],
        });
    }
    out
}
