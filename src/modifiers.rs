//! Modifiers: pure functions from an element's atoms to new atoms.
//!
//! Stroke elements take [`StrokeModifier`]s, markers take
//! [`MarkerModifier`]s. Both sets are closed; dispatch is static.

use enum_dispatch::enum_dispatch;

use crate::ast::{Marker, Stroke};
use crate::defaults;
use crate::log::trace;
use crate::transform::Affine;

/// Common behavior for modifiers of stroke elements
#[enum_dispatch]
pub trait StrokeModify {
    /// New strokes derived from `strokes`. The input is left untouched.
    fn apply(&self, strokes: &[Stroke]) -> Vec<Stroke>;
}

/// Common behavior for modifiers of marker elements
#[enum_dispatch]
pub trait MarkerModify {
    fn apply(&self, markers: &[Marker]) -> Vec<Marker>;
}

impl StrokeModify for Affine {
    fn apply(&self, strokes: &[Stroke]) -> Vec<Stroke> {
        strokes.iter().map(|s| self.apply_stroke(s)).collect()
    }
}

/// Copies of the input under successive powers of a transform.
///
/// Group `i` of the output is the input under `transform^i`, for
/// `i` in `0..count`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Array {
    pub count: usize,
    pub transform: Affine,
}

impl Array {
    pub fn new(count: usize, transform: Affine) -> Self {
        Self { count, transform }
    }
}

impl StrokeModify for Array {
    fn apply(&self, strokes: &[Stroke]) -> Vec<Stroke> {
        if strokes.is_empty() {
            return Vec::new();
        }
        let capacity = self
            .count
            .checked_mul(strokes.len())
            .unwrap_or(0)
            .min(defaults::MAX_ARRAY_COUNT);
        let mut out = Vec::with_capacity(capacity);
        let mut power = Affine::IDENTITY;
        for _ in 0..self.count {
            out.extend(power.apply(strokes));
            power = power * self.transform;
        }
        out
    }
}

/// ASCII letters to uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Uppercase;

impl MarkerModify for Uppercase {
    fn apply(&self, markers: &[Marker]) -> Vec<Marker> {
        markers
            .iter()
            .map(|m| Marker::new(m.text.to_ascii_uppercase()))
            .collect()
    }
}

#[enum_dispatch(StrokeModify)]
#[derive(Debug, Clone, PartialEq)]
pub enum StrokeModifier {
    Affine(Affine),
    Array(Array),
}

#[enum_dispatch(MarkerModify)]
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerModifier {
    Uppercase(Uppercase),
}

/// Merge runs of adjacent `Affine` modifiers into one.
///
/// Applying the result is equivalent to applying `modifiers` in order, with
/// fewer passes over the points and a single truncation per run.
pub fn fold_affines(modifiers: &[StrokeModifier]) -> Vec<StrokeModifier> {
    let mut folded: Vec<StrokeModifier> = Vec::with_capacity(modifiers.len());
    for modifier in modifiers {
        match (folded.last_mut(), modifier) {
            (Some(StrokeModifier::Affine(left)), StrokeModifier::Affine(right)) => {
                *left = left.then(*right);
            }
            _ => folded.push(modifier.clone()),
        }
    }
    if folded.len() != modifiers.len() {
        trace!(from = modifiers.len(), to = folded.len(), "folded affine modifiers");
    }
    folded
}

/// Fold, then apply every modifier left to right.
pub fn apply_stroke_modifiers(modifiers: &[StrokeModifier], strokes: &[Stroke]) -> Vec<Stroke> {
    let mut current = strokes.to_vec();
    for modifier in fold_affines(modifiers) {
        current = modifier.apply(&current);
    }
    current
}

pub fn apply_marker_modifiers(modifiers: &[MarkerModifier], markers: &[Marker]) -> Vec<Marker> {
    let mut current = markers.to_vec();
    for modifier in modifiers {
        current = modifier.apply(&current);
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Point;

    fn stroke(points: &[(i32, i32)]) -> Stroke {
        Stroke::new(3, points.iter().map(|&(x, y)| Point::new(x, y, 1.0)).collect())
    }

    #[test]
    fn array_yields_count_groups_of_powers() {
        let input = vec![stroke(&[(0, 0), (1, 0)]), stroke(&[(5, 5)])];
        let step = Affine::translation(10.0, 0.0);
        let out = Array::new(3, step).apply(&input);

        assert_eq!(out.len(), 3 * input.len());
        for (i, group) in out.chunks(input.len()).enumerate() {
            assert_eq!(group, step.pow(i).apply(&input).as_slice(), "group {i}");
        }
        assert_eq!(out[4], stroke(&[(20, 0), (21, 0)]));
    }

    #[test]
    fn array_of_zero_is_empty() {
        let out = Array::new(0, Affine::IDENTITY).apply(&[stroke(&[(1, 1)])]);
        assert!(out.is_empty());
    }

    #[test]
    fn array_of_nothing_is_empty_for_any_count() {
        assert!(Array::new(usize::MAX, Affine::IDENTITY).apply(&[]).is_empty());
    }

    #[test]
    fn adjacent_affines_fold_into_one() {
        let a = Affine::translation(3.0, 4.0);
        let b = Affine::scale(2.0, 2.0);
        let modifiers = vec![StrokeModifier::from(a), StrokeModifier::from(b)];

        let folded = fold_affines(&modifiers);
        assert_eq!(folded, vec![StrokeModifier::Affine(a.then(b))]);

        let input = vec![stroke(&[(1, 1), (-2, 7)])];
        let sequential = b.apply(&a.apply(&input));
        assert_eq!(apply_stroke_modifiers(&modifiers, &input), sequential);
    }

    #[test]
    fn folding_stops_at_arrays() {
        let shift = Affine::translation(1.0, 0.0);
        let modifiers = vec![
            StrokeModifier::from(shift),
            StrokeModifier::from(Array::new(2, shift)),
            StrokeModifier::from(shift),
            StrokeModifier::from(shift),
        ];
        let folded = fold_affines(&modifiers);
        assert_eq!(folded.len(), 3);
        assert_eq!(folded[2], StrokeModifier::Affine(shift.then(shift)));
    }

    #[test]
    fn folding_truncates_once() {
        // Two half-scales truncate twice when applied one by one.
        let half = Affine::scale(0.5, 0.5);
        let modifiers = vec![StrokeModifier::from(half), StrokeModifier::from(half)];
        let out = apply_stroke_modifiers(&modifiers, &[stroke(&[(7, 7)])]);
        assert_eq!(out, vec![stroke(&[(1, 1)])]);
    }

    #[test]
    fn modifiers_do_not_touch_their_input() {
        let input = vec![stroke(&[(1, 2)])];
        let _ = Affine::translation(9.0, 9.0).apply(&input);
        assert_eq!(input, vec![stroke(&[(1, 2)])]);
    }

    #[test]
    fn uppercase_only_touches_ascii_letters() {
        let out = Uppercase.apply(&[Marker::new("héllo, world 42")]);
        assert_eq!(out, vec![Marker::new("HéLLO, WORLD 42")]);
    }
}
