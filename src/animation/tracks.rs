use crate::animation::values::Interpolatable;

/// Time-ordered keys of one animated property.
///
/// Times are in clip ticks. `times` and `values` are parallel arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f64>,
    pub values: Vec<T>,
}

impl<T: Interpolatable> Default for KeyframeTrack<T> {
    fn default() -> Self {
        Self {
            times: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f64>, values: Vec<T>) -> Self {
        Self { times, values }
    }

    /// Builds a track from `(time, value)` pairs.
    pub fn from_keys<I: IntoIterator<Item = (f64, T)>>(keys: I) -> Self {
        let (times, values) = keys.into_iter().unzip();
        Self { times, values }
    }

    /// Number of usable keys.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len().min(self.values.len())
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Time of the last key, or 0 for an empty track.
    #[must_use]
    pub fn end_time(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Index of the last key whose time is `<= time` (0 if there is none).
    fn frame_at(&self, time: f64) -> usize {
        let len = self.len();
        self.times[..len]
            .partition_point(|&t| t <= time)
            .saturating_sub(1)
    }

    /// Samples the track at `time` (ticks). Returns `None` for an empty track.
    ///
    /// The key after the last one is the first one, so between the last key
    /// and `duration` the value blends back toward the start of the clip.
    /// Before the first key the first value is held.
    #[must_use]
    pub fn sample(&self, time: f64, duration: f64) -> Option<T> {
        self.sample_with(time, duration, true)
    }

    /// Like [`sample`](Self::sample), but with `wrap == false` the last value
    /// is held past the last key instead of blending back to the first.
    #[must_use]
    pub fn sample_with(&self, time: f64, duration: f64, wrap: bool) -> Option<T> {
        let len = self.len();
        if len == 0 {
            return None;
        }

        let frame = self.frame_at(time);
        if !wrap && frame + 1 == len {
            return Some(self.values[frame]);
        }
        let next = (frame + 1) % len;

        let key_time = self.times[frame];
        let mut diff = self.times[next] - key_time;
        if diff < 0.0 {
            diff += duration;
        }

        if diff > 0.0 {
            let factor = ((time - key_time) / diff).clamp(0.0, 1.0) as f32;
            if factor == 0.0 {
                return Some(self.values[frame]);
            }
            Some(T::interpolate_linear(self.values[frame], self.values[next], factor))
        } else {
            Some(self.values[frame])
        }
    }
}
