//! Display-side animation of health and damage.
//!
//! These types never touch combat state. They interpolate what is shown
//! towards the authoritative values reported by the fight.

use crate::combat::Hit;
use crate::damage::Side;
use std::time::{Duration, Instant};

/// Length of a health bar transition.
pub const HEALTH_ANIMATION: Duration = Duration::from_millis(500);

/// How long a damage callout stays on screen.
pub const CALLOUT_DURATION: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy)]
struct Transition {
    from_value: u32,
    from_percent: f64,
    started: Instant,
}

/// Smoothly animated health display.
#[derive(Debug, Clone)]
pub struct HealthBar {
    target: u32,
    max: u32,
    duration: Duration,
    transition: Option<Transition>,
}

impl HealthBar {
    /// A bar showing `current` immediately.
    pub fn new(current: u32, max: u32) -> Self {
        Self {
            target: current.min(max),
            max,
            duration: HEALTH_ANIMATION,
            transition: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Animate towards a new authoritative value, starting from whatever is
    /// displayed at `now`.
    pub fn set_target(&mut self, target: u32, now: Instant) {
        let target = target.min(self.max);
        let from_value = self.value(now);
        if from_value == target {
            self.target = target;
            self.transition = None;
            return;
        }
        self.transition = Some(Transition {
            from_value,
            from_percent: self.percent_of(from_value),
            started: now,
        });
        self.target = target;
    }

    /// Jump to a value without animating, possibly with a new maximum.
    pub fn reset(&mut self, current: u32, max: u32) {
        self.max = max;
        self.target = current.min(max);
        self.transition = None;
    }

    fn progress(&self, now: Instant) -> Option<(Transition, f64)> {
        let transition = self.transition?;
        if self.duration.is_zero() {
            return None;
        }
        let elapsed = now.saturating_duration_since(transition.started);
        let progress = (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0);
        Some((transition, progress))
    }

    /// Displayed health at `now`, floored to a whole number.
    pub fn value(&self, now: Instant) -> u32 {
        match self.progress(now) {
            Some((transition, progress)) => {
                let from = f64::from(transition.from_value);
                let to = f64::from(self.target);
                (from + (to - from) * progress).floor().max(0.0) as u32
            }
            None => self.target,
        }
    }

    /// Displayed fill percentage at `now`, in `0.0..=100.0`.
    pub fn percent(&self, now: Instant) -> f64 {
        match self.progress(now) {
            Some((transition, progress)) => {
                let to = self.percent_of(self.target);
                transition.from_percent + (to - transition.from_percent) * progress
            }
            None => self.percent_of(self.target),
        }
    }

    /// Displayed fill as a ratio in `0.0..=1.0`.
    pub fn ratio(&self, now: Instant) -> f64 {
        (self.percent(now) / 100.0).clamp(0.0, 1.0)
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        matches!(self.progress(now), Some((_, progress)) if progress < 1.0)
    }

    fn percent_of(&self, value: u32) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        f64::from(value) / f64::from(self.max) * 100.0
    }
}

/// A short-lived `-N` indicator shown over the fighter that was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageCallout {
    pub target: Side,
    pub amount: u32,
    pub is_critical: bool,
    pub shown_at: Instant,
}

impl DamageCallout {
    pub fn from_hit(hit: &Hit, now: Instant) -> Self {
        Self {
            target: hit.target(),
            amount: hit.damage,
            is_critical: hit.is_critical,
            shown_at: now,
        }
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < CALLOUT_DURATION
    }

    pub fn label(&self) -> String {
        format!("-{}", self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damage::AttackKind;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_new_bar_is_static() {
        let now = Instant::now();
        let bar = HealthBar::new(120, 120);
        assert_eq!(bar.value(now), 120);
        assert_eq!(bar.percent(now), 100.0);
        assert!(!bar.is_animating(now));
    }

    #[test]
    fn test_linear_interpolation() {
        let t0 = Instant::now();
        let mut bar = HealthBar::new(120, 120);
        bar.set_target(91, t0);

        assert_eq!(bar.value(t0), 120);
        // halfway: 120 - 14.5 = 105.5, floored
        assert_eq!(bar.value(t0 + ms(250)), 105);
        assert!(bar.is_animating(t0 + ms(250)));
        assert_eq!(bar.value(t0 + ms(500)), 91);
        assert_eq!(bar.value(t0 + ms(900)), 91);
        assert!(!bar.is_animating(t0 + ms(500)));

        let expected = 91.0 / 120.0 * 100.0;
        assert!((bar.percent(t0 + ms(500)) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_retarget_starts_from_displayed_value() {
        let t0 = Instant::now();
        let mut bar = HealthBar::new(100, 100);
        bar.set_target(0, t0);
        let t1 = t0 + ms(250);
        assert_eq!(bar.value(t1), 50);

        bar.set_target(80, t1);
        assert_eq!(bar.value(t1), 50);
        assert_eq!(bar.value(t1 + ms(250)), 65);
        assert_eq!(bar.value(t1 + ms(500)), 80);
    }

    #[test]
    fn test_reset_jumps() {
        let t0 = Instant::now();
        let mut bar = HealthBar::new(10, 100);
        bar.set_target(90, t0);
        bar.reset(140, 140);
        assert_eq!(bar.value(t0), 140);
        assert_eq!(bar.percent(t0), 100.0);
    }

    #[test]
    fn test_target_clamped_to_max() {
        let t0 = Instant::now();
        let mut bar = HealthBar::new(50, 100);
        bar.set_target(500, t0);
        assert_eq!(bar.target(), 100);
    }

    #[test]
    fn test_callout_visibility() {
        let t0 = Instant::now();
        let hit = Hit {
            attacker: Side::Player,
            kind: AttackKind::Normal,
            damage: 29,
            is_critical: false,
            remaining: 91,
        };
        let callout = DamageCallout::from_hit(&hit, t0);
        assert_eq!(callout.target, Side::Enemy);
        assert_eq!(callout.label(), "-29");
        assert!(callout.is_visible(t0 + ms(999)));
        assert!(!callout.is_visible(t0 + ms(1000)));
    }
}
