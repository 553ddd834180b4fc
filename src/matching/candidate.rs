//! Search window and deterministic best-candidate tracking.

use crate::util::{MotionError, MotionResult};
use crate::vector::MotionVector;
use std::cmp::Ordering;

/// Square window of integer displacements.
///
/// A search range `r` covers components in `[-floor(r/2), floor(r/2)]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchWindow {
    half: isize,
}

impl SearchWindow {
    /// Builds the window for a positive search range.
    pub fn new(search_range: usize) -> MotionResult<Self> {
        if search_range == 0 {
            return Err(MotionError::InvalidSearchRange { search_range });
        }
        Ok(Self {
            half: (search_range / 2) as isize,
        })
    }

    /// Largest displacement component magnitude.
    pub fn half_extent(&self) -> isize {
        self.half
    }

    /// All displacements in row-major order (`dy` outer, `dx` inner).
    pub fn displacements(&self) -> impl Iterator<Item = (isize, isize)> {
        let half = self.half;
        (-half..=half).flat_map(move |dy| (-half..=half).map(move |dx| (dx, dy)))
    }
}

/// A scored displacement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Candidate {
    pub(crate) dx: isize,
    pub(crate) dy: isize,
    pub(crate) cost: f64,
}

impl Candidate {
    pub(crate) fn vector(self) -> MotionVector {
        MotionVector::from((self.dx, self.dy))
    }
}

/// Lowest cost first; ties go to the smaller displacement magnitude, then the
/// smaller `dx`, then the smaller `dy`.
fn candidate_cmp(a: &Candidate, b: &Candidate) -> Ordering {
    let mag_a = a.dx * a.dx + a.dy * a.dy;
    let mag_b = b.dx * b.dx + b.dy * b.dy;
    a.cost
        .total_cmp(&b.cost)
        .then_with(|| mag_a.cmp(&mag_b))
        .then_with(|| a.dx.cmp(&b.dx))
        .then_with(|| a.dy.cmp(&b.dy))
}

/// Keeps the best candidate seen so far.
#[derive(Default)]
pub(crate) struct Best {
    best: Option<Candidate>,
}

impl Best {
    pub(crate) fn push(&mut self, cand: Candidate) {
        match self.best {
            Some(ref current) if candidate_cmp(&cand, current) != Ordering::Less => {}
            _ => self.best = Some(cand),
        }
    }

    /// The winning vector, or zero when nothing was scored.
    pub(crate) fn into_vector(self) -> MotionVector {
        self.best.map_or(MotionVector::ZERO, Candidate::vector)
    }

    pub(crate) fn into_inner(self) -> Option<Candidate> {
        self.best
    }
}
