//! Timed progress for the wizard's long-running stages.
//!
//! [`StageProgressSimulator`] is a pure state machine advanced one tick at a
//! time (or by elapsed virtual time). [`IntervalTicker`] drives it from a
//! browser interval; dropping the ticker clears the interval, so no tick can
//! land after the owning view is gone.

use std::time::Duration;

use gloo_timers::callback::Interval;
use log::{debug, warn};
use wasm_bindgen::closure::Closure;

use crate::error::{StudioError, StudioResult};

pub const PROGRESS_MAX: u8 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressSchedule {
	step: u8,
	interval: Duration,
}

pub const FEATURE_SCHEDULE: ProgressSchedule = ProgressSchedule {
	step: 5,
	interval: Duration::from_millis(150),
};

pub const MODEL_SCHEDULE: ProgressSchedule = ProgressSchedule {
	step: 10,
	interval: Duration::from_millis(300),
};

impl ProgressSchedule {
	pub fn new(step: u32, interval_ms: u64) -> StudioResult<Self> {
		if step == 0 || step > PROGRESS_MAX as u32 || interval_ms == 0 {
			return Err(StudioError::InvalidSchedule { step, interval_ms });
		}
		Ok(Self {
			step: step as u8,
			interval: Duration::from_millis(interval_ms),
		})
	}

	pub fn step(&self) -> u8 {
		self.step
	}

	pub fn interval(&self) -> Duration {
		self.interval
	}

	/// Ticks needed to go from 0 to 100.
	pub fn ticks_to_complete(&self) -> u32 {
		(PROGRESS_MAX as u32).div_ceil(self.step as u32)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
	pub progress: u8,
	/// Set on exactly one tick: the one that reached 100.
	pub completed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
	Idle,
	Running,
	Completed,
}

#[derive(Clone, Debug)]
pub struct StageProgressSimulator {
	schedule: ProgressSchedule,
	progress: u8,
	phase: Phase,
	carry: Duration,
}

impl StageProgressSimulator {
	pub fn new(schedule: ProgressSchedule) -> Self {
		Self {
			schedule,
			progress: 0,
			phase: Phase::Idle,
			carry: Duration::ZERO,
		}
	}

	pub fn schedule(&self) -> ProgressSchedule {
		self.schedule
	}

	pub fn progress(&self) -> u8 {
		self.progress
	}

	pub fn is_running(&self) -> bool {
		self.phase == Phase::Running
	}

	pub fn is_complete(&self) -> bool {
		self.phase == Phase::Completed
	}

	/// Restarts from 0.
	pub fn start(&mut self) {
		self.progress = 0;
		self.carry = Duration::ZERO;
		self.phase = Phase::Running;
	}

	/// Cancels a running simulation without completing it.
	pub fn stop(&mut self) {
		if self.phase == Phase::Running {
			debug!("progress stopped at {}%", self.progress);
			self.phase = Phase::Idle;
		}
	}

	pub fn tick(&mut self) -> Option<Tick> {
		if self.phase != Phase::Running {
			return None;
		}
		self.progress = self
			.progress
			.saturating_add(self.schedule.step)
			.min(PROGRESS_MAX);
		let completed = self.progress == PROGRESS_MAX;
		if completed {
			self.phase = Phase::Completed;
		}
		Some(Tick {
			progress: self.progress,
			completed,
		})
	}

	/// Advances by `elapsed` of virtual time, one tick per full interval.
	pub fn advance(&mut self, elapsed: Duration) -> Vec<Tick> {
		let mut ticks = Vec::new();
		if !self.is_running() {
			return ticks;
		}
		self.carry += elapsed;
		while self.carry >= self.schedule.interval {
			self.carry -= self.schedule.interval;
			match self.tick() {
				Some(t) => ticks.push(t),
				None => break,
			}
		}
		ticks
	}
}

/// A browser interval that stops when cancelled or dropped.
pub struct IntervalTicker {
	interval: Option<Interval>,
	/// Callback of a cancelled interval, kept alive until the ticker drops.
	retired: Option<Closure<dyn FnMut()>>,
}

impl IntervalTicker {
	/// Returns `None` outside a browser window.
	pub fn start(interval: Duration, on_tick: impl FnMut() + 'static) -> Option<Self> {
		if web_sys::window().is_none() {
			warn!("no window to run an interval on");
			return None;
		}
		let millis = u32::try_from(interval.as_millis()).unwrap_or(u32::MAX);
		Some(Self {
			interval: Some(Interval::new(millis, on_tick)),
			retired: None,
		})
	}

	/// Clears the interval but keeps the callback alive, so this is safe to
	/// call from inside the callback itself.
	pub fn cancel(&mut self) {
		if let Some(interval) = self.interval.take() {
			self.retired = Some(interval.cancel());
		}
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	fn running(step: u32, interval_ms: u64) -> StageProgressSimulator {
		let mut sim = StageProgressSimulator::new(ProgressSchedule::new(step, interval_ms).unwrap());
		sim.start();
		sim
	}

	#[test]
	fn twenty_ticks_of_five_complete_once() {
		let mut sim = running(5, 150);
		let ticks: Vec<Tick> = (0..20).filter_map(|_| sim.tick()).collect();
		assert_eq!(ticks.len(), 20);
		assert_eq!(sim.progress(), 100);
		assert_eq!(ticks.iter().filter(|t| t.completed).count(), 1);
		assert!(ticks.last().unwrap().completed);
		assert_eq!(sim.tick(), None);
	}

	#[test]
	fn stop_after_three_ticks_never_completes() {
		let mut sim = running(5, 150);
		for _ in 0..3 {
			sim.tick();
		}
		sim.stop();
		assert_eq!(sim.progress(), 15);
		assert_eq!(sim.tick(), None);
		assert!(!sim.is_complete());
		assert!(sim.advance(Duration::from_secs(10)).is_empty());
	}

	#[test]
	fn stop_is_a_noop_when_not_running() {
		let mut sim = StageProgressSimulator::new(FEATURE_SCHEDULE);
		sim.stop();
		sim.stop();
		assert!(!sim.is_running());
		assert_eq!(sim.progress(), 0);
	}

	#[test]
	fn advance_uses_the_interval() {
		let mut sim = StageProgressSimulator::new(FEATURE_SCHEDULE);
		sim.start();
		assert!(sim.advance(Duration::from_millis(149)).is_empty());
		assert_eq!(sim.advance(Duration::from_millis(1)).len(), 1);
		let rest = sim.advance(Duration::from_millis(3000));
		assert_eq!(rest.len(), 19);
		assert_eq!(sim.progress(), 100);
	}

	#[test]
	fn model_schedule_completes_in_three_seconds() {
		let mut sim = StageProgressSimulator::new(MODEL_SCHEDULE);
		sim.start();
		let ticks = sim.advance(Duration::from_millis(3000));
		assert_eq!(ticks.len(), 10);
		assert!(sim.is_complete());
	}

	#[test]
	fn invalid_schedules_are_rejected() {
		assert_eq!(
			ProgressSchedule::new(0, 150),
			Err(StudioError::InvalidSchedule {
				step: 0,
				interval_ms: 150
			})
		);
		assert!(ProgressSchedule::new(5, 0).is_err());
		assert!(ProgressSchedule::new(101, 10).is_err());
	}

	#[test]
	fn restart_begins_at_zero() {
		let mut sim = running(10, 300);
		sim.advance(Duration::from_secs(5));
		sim.start();
		assert_eq!(sim.progress(), 0);
		assert_eq!(sim.tick().map(|t| t.progress), Some(10));
	}

	proptest! {
		#[test]
		fn progress_is_clamped_and_completes_once(step in 1u32..=100) {
			let mut sim = running(step, 10);
			let schedule = sim.schedule();
			let ticks: Vec<Tick> = std::iter::from_fn(|| sim.tick()).collect();
			prop_assert_eq!(ticks.len() as u32, schedule.ticks_to_complete());
			prop_assert!(ticks.iter().all(|t| t.progress <= PROGRESS_MAX));
			prop_assert!(ticks.windows(2).all(|w| w[0].progress < w[1].progress));
			prop_assert_eq!(ticks.iter().filter(|t| t.completed).count(), 1);
			prop_assert_eq!(sim.progress(), PROGRESS_MAX);
		}
	}
}
