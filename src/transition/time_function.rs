use std::str::FromStr;

use crate::error::SceneError;

#[derive(Clone, Copy, Debug)]
pub enum TimeFunction {
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
    CubicBezier(f32, f32, f32, f32),
    Custom(fn(f32) -> f32),
}

impl PartialEq for TimeFunction {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Linear, Self::Linear)
            | (Self::Ease, Self::Ease)
            | (Self::EaseIn, Self::EaseIn)
            | (Self::EaseOut, Self::EaseOut)
            | (Self::EaseInOut, Self::EaseInOut) => true,
            (Self::CubicBezier(a1, b1, c1, d1), Self::CubicBezier(a2, b2, c2, d2)) => {
                (a1, b1, c1, d1) == (a2, b2, c2, d2)
            }
            (Self::Custom(f), Self::Custom(g)) => std::ptr::fn_addr_eq(*f, *g),
            _ => false,
        }
    }
}

impl Default for TimeFunction {
    fn default() -> Self {
        Self::Linear
    }
}

impl TimeFunction {
    pub fn sample(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Ease => cubic_bezier(0.25, 0.1, 0.25, 1.0, t),
            Self::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Self::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Self::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            Self::CubicBezier(x1, y1, x2, y2) => cubic_bezier(x1, y1, x2, y2, t),
            Self::Custom(f) => f(t),
        }
    }

    /// Resolves a timing name, falling back to linear with a warning.
    pub fn from_name_or_linear(name: &str) -> Self {
        name.parse().unwrap_or_else(|err| {
            tracing::warn!("{err}, using linear");
            Self::Linear
        })
    }
}

impl FromStr for TimeFunction {
    type Err = SceneError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let name = raw.trim();
        match name {
            "linear" => return Ok(Self::Linear),
            "ease" => return Ok(Self::Ease),
            "ease-in" => return Ok(Self::EaseIn),
            "ease-out" => return Ok(Self::EaseOut),
            "ease-in-out" => return Ok(Self::EaseInOut),
            _ => {}
        }
        let unknown = || SceneError::UnknownTimingFunction(name.to_owned());
        let args = name
            .strip_prefix("cubic-bezier(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(unknown)?;
        let values: Vec<f32> = args
            .split(',')
            .map(|part| part.trim().parse::<f32>())
            .collect::<Result<_, _>>()
            .map_err(|_| unknown())?;
        match values.as_slice() {
            &[x1, y1, x2, y2] if (0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2) => {
                Ok(Self::CubicBezier(x1, y1, x2, y2))
            }
            _ => Err(unknown()),
        }
    }
}

/// Evaluates a CSS-style cubic bezier at time `t` (x axis) and returns y.
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, t: f32) -> f32 {
    if t <= 0.0 || t >= 1.0 {
        return t;
    }
    let cx = 3.0 * x1;
    let bx = 3.0 * (x2 - x1) - cx;
    let ax = 1.0 - cx - bx;
    let cy = 3.0 * y1;
    let by = 3.0 * (y2 - y1) - cy;
    let ay = 1.0 - cy - by;

    let curve_x = |s: f32| ((ax * s + bx) * s + cx) * s;
    let slope_x = |s: f32| (3.0 * ax * s + 2.0 * bx) * s + cx;

    let mut s = t;
    for _ in 0..8 {
        let err = curve_x(s) - t;
        if err.abs() < 1e-6 {
            return ((ay * s + by) * s + cy) * s;
        }
        let slope = slope_x(s);
        if slope.abs() < 1e-6 {
            break;
        }
        s -= err / slope;
    }

    // Newton failed to converge: bisect.
    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    s = t;
    for _ in 0..32 {
        let x = curve_x(s);
        if (x - t).abs() < 1e-6 {
            break;
        }
        if x < t {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) * 0.5;
    }
    ((ay * s + by) * s + cy) * s
}

pub fn normalized_timeline_progress(
    elapsed_ms: f32,
    delay_ms: f32,
    duration_ms: f32,
) -> Option<f32> {
    if elapsed_ms < delay_ms {
        return None;
    }
    if duration_ms <= f32::EPSILON {
        return Some(1.0);
    }
    Some(((elapsed_ms - delay_ms) / duration_ms).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_hit_both_endpoints() {
        for f in [
            TimeFunction::Linear,
            TimeFunction::Ease,
            TimeFunction::EaseIn,
            TimeFunction::EaseOut,
            TimeFunction::EaseInOut,
        ] {
            assert_eq!(f.sample(0.0), 0.0);
            assert_eq!(f.sample(1.0), 1.0);
        }
    }

    #[test]
    fn ease_in_starts_slow_and_ease_out_starts_fast() {
        assert!(TimeFunction::EaseIn.sample(0.25) < 0.25);
        assert!(TimeFunction::EaseOut.sample(0.25) > 0.25);
        let mid = TimeFunction::EaseInOut.sample(0.5);
        assert!((mid - 0.5).abs() < 1e-3);
    }

    #[test]
    fn parses_names_and_cubic_bezier() {
        assert_eq!("ease-out".parse::<TimeFunction>(), Ok(TimeFunction::EaseOut));
        assert_eq!(
            "cubic-bezier(0.1, 0.7, 1.0, 0.1)".parse::<TimeFunction>(),
            Ok(TimeFunction::CubicBezier(0.1, 0.7, 1.0, 0.1))
        );
        assert!("cubic-bezier(2, 0, 0, 1)".parse::<TimeFunction>().is_err());
        assert!("bounce".parse::<TimeFunction>().is_err());
    }

    #[test]
    fn unknown_name_falls_back_to_linear() {
        assert_eq!(TimeFunction::from_name_or_linear("wobble"), TimeFunction::Linear);
    }

    #[test]
    fn custom_function_is_applied_after_clamping() {
        fn square(t: f32) -> f32 {
            t * t
        }
        let f = TimeFunction::Custom(square);
        assert_eq!(f.sample(0.5), 0.25);
        assert_eq!(f.sample(3.0), 1.0);
    }

    #[test]
    fn timeline_waits_for_delay_and_clamps() {
        assert_eq!(normalized_timeline_progress(50.0, 100.0, 200.0), None);
        assert_eq!(normalized_timeline_progress(200.0, 100.0, 200.0), Some(0.5));
        assert_eq!(normalized_timeline_progress(900.0, 100.0, 200.0), Some(1.0));
        assert_eq!(normalized_timeline_progress(100.0, 100.0, 0.0), Some(1.0));
    }
}
