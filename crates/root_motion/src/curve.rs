//! Strength-over-time curves for forward forces.
//!
//! Curves are shared assets: a source holds a [`CurveHandle`] and the wire
//! format only carries its [`CurveId`], resolved again through the
//! [`CurveLibrary`] on the receiving side.

use std::collections::HashMap;
use std::sync::Arc;

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
}

/// Piecewise-linear float curve, flat beyond its first and last key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FloatCurve {
    keys: Vec<CurveKey>,
}

impl FloatCurve {
    pub fn new(keys: impl IntoIterator<Item = (f32, f32)>) -> Self {
        let mut keys: Vec<CurveKey> = keys
            .into_iter()
            .map(|(time, value)| CurveKey { time, value })
            .collect();
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// An empty curve is neutral and samples as `1.0`. NaN samples the first
    /// key.
    pub fn sample(&self, time: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 1.0;
        };
        if time.is_nan() || time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }
        let upper = self.keys.partition_point(|key| key.time <= time);
        let (a, b) = (self.keys[upper - 1], self.keys[upper]);
        let span = b.time - a.time;
        if span <= f32::EPSILON {
            return b.value;
        }
        a.value + (b.value - a.value) * ((time - a.time) / span)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CurveId(pub u32);

/// Shared reference to a registered curve. Equality is by id.
#[derive(Clone, Debug)]
pub struct CurveHandle {
    id: CurveId,
    curve: Arc<FloatCurve>,
}

impl CurveHandle {
    pub fn id(&self) -> CurveId {
        self.id
    }

    pub fn sample(&self, time: f32) -> f32 {
        self.curve.sample(time)
    }
}

impl PartialEq for CurveHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[derive(Resource, Default, Debug)]
pub struct CurveLibrary {
    curves: HashMap<CurveId, Arc<FloatCurve>>,
    names: HashMap<String, CurveId>,
    next_id: u32,
}

impl CurveLibrary {
    /// Registers `curve` under `name`, replacing any curve of the same name
    /// while keeping its id.
    pub fn register(&mut self, name: impl Into<String>, curve: FloatCurve) -> CurveHandle {
        let name = name.into();
        let id = match self.names.get(&name) {
            Some(id) => *id,
            None => {
                self.next_id += 1;
                let id = CurveId(self.next_id);
                self.names.insert(name, id);
                id
            }
        };
        let curve = Arc::new(curve);
        self.curves.insert(id, curve.clone());
        CurveHandle { id, curve }
    }

    pub fn get(&self, id: CurveId) -> Option<CurveHandle> {
        self.curves.get(&id).map(|curve| CurveHandle {
            id,
            curve: curve.clone(),
        })
    }

    pub fn find(&self, name: &str) -> Option<CurveHandle> {
        self.names.get(name).and_then(|id| self.get(*id))
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_interpolates_between_keys() {
        let curve = FloatCurve::new([(1.0, 2.0), (0.0, 0.0)]);
        assert_eq!(curve.sample(0.5), 1.0);
        assert_eq!(curve.sample(-3.0), 0.0);
        assert_eq!(curve.sample(10.0), 2.0);
    }

    #[test]
    fn sample_tolerates_nan_and_infinite_time() {
        let curve = FloatCurve::new([(0.0, 0.25), (0.5, 0.75), (1.0, 1.0)]);
        assert_eq!(curve.sample(f32::NAN), 0.25);
        assert_eq!(curve.sample(f32::NEG_INFINITY), 0.25);
        assert_eq!(curve.sample(f32::INFINITY), 1.0);
    }

    #[test]
    fn empty_curve_is_neutral() {
        assert_eq!(FloatCurve::default().sample(0.3), 1.0);
    }

    #[test]
    fn library_keeps_ids_stable_per_name() {
        let mut library = CurveLibrary::default();
        let first = library.register("dash", FloatCurve::new([(0.0, 1.0)]));
        let again = library.register("dash", FloatCurve::new([(0.0, 0.5)]));
        let other = library.register("lunge", FloatCurve::new([(0.0, 1.0)]));

        assert_eq!(first.id(), again.id());
        assert_ne!(first.id(), other.id());
        assert_eq!(library.len(), 2);
        assert_eq!(library.get(first.id()).map(|c| c.sample(0.0)), Some(0.5));
        assert!(library.find("missing").is_none());
    }
}
