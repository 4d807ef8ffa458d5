use glam::Vec2;

use crate::canvas::Surface;

/// Direction of `delta` in radians, with the zero vector mapped to `0.0`.
#[inline]
pub(crate) fn heading(delta: Vec2) -> f32 {
    if delta.x == 0.0 && delta.y == 0.0 {
        0.0
    } else {
        delta.y.atan2(delta.x)
    }
}

/// One strand of a brush: a chain of rigid links trailing a head point.
///
/// Link `i` always sits `lengths[i]` away from the point ahead of it (the
/// head for link 0). Lengths count down from `n_links` to 1 and thicknesses
/// taper linearly, so strands are thick and loose near the head and thin at
/// the tip.
#[derive(Debug, Clone, PartialEq)]
pub struct Bristle {
    head: Vec2,
    positions: Vec<Vec2>,
    lengths: Vec<f32>,
    thicknesses: Vec<f32>,
}

impl Bristle {
    /// Creates a collapsed bristle with every link at `head`.
    ///
    /// The number of links is `max(1, floor(sqrt(2 * length)))`.
    pub fn new(head: Vec2, length: f32, thickness: f32) -> Self {
        let n_links = ((2.0 * length).sqrt().floor() as usize).max(1);
        let thickness_decrement = thickness / n_links as f32;

        let positions = vec![head; n_links];
        let lengths = (0..n_links).map(|i| (n_links - i) as f32).collect();
        let thicknesses = (0..n_links)
            .map(|i| thickness - i as f32 * thickness_decrement)
            .collect();

        Self {
            head,
            positions,
            lengths,
            thicknesses,
        }
    }

    pub fn n_links(&self) -> usize {
        self.positions.len()
    }

    pub fn head(&self) -> Vec2 {
        self.head
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub fn lengths(&self) -> &[f32] {
        &self.lengths
    }

    pub fn thicknesses(&self) -> &[f32] {
        &self.thicknesses
    }

    /// Teleports the head and collapses every link onto it.
    pub fn move_to(&mut self, head: Vec2) {
        self.head = head;
        self.positions.fill(head);
    }

    /// Drags the chain behind a new head position.
    ///
    /// Each link keeps its direction toward the (already updated) point ahead
    /// of it and is pulled back to its fixed length along that direction.
    pub fn update(&mut self, head: Vec2) {
        self.head = head;

        let mut anchor = head;
        for (pos, &length) in self.positions.iter_mut().zip(&self.lengths) {
            let angle = heading(anchor - *pos);
            *pos = anchor - length * Vec2::new(angle.cos(), angle.sin());
            anchor = *pos;
        }
    }

    /// Draws head → link 0 → link 1 → … with each segment at its link's
    /// thickness. Stroke color is left to the caller.
    pub fn paint(&self, surface: &mut impl Surface) {
        let mut from = self.head;
        for (&to, &thickness) in self.positions.iter().zip(&self.thicknesses) {
            surface.set_stroke_weight(thickness);
            surface.line(from, to);
            from = to;
        }
    }
}
