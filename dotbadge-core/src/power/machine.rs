//! Button and power state machine
//!
//! Polled once per main-loop iteration with the buttons currently held.
//! Presses are latched into a mask and evaluated when every button is
//! released, so a press of one button followed by the other before
//! letting go is ignored.

use core::ops::{BitOr, BitOrAssign};

/// Set of pressed buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonMask(u8);

impl ButtonMask {
    pub const NONE: Self = Self(0);
    /// Previous pattern
    pub const LEFT: Self = Self(1 << 0);
    /// Next pattern
    pub const RIGHT: Self = Self(1 << 1);
    pub const BOTH: Self = Self(Self::LEFT.0 | Self::RIGHT.0);

    /// Build a mask from two pressed flags
    pub const fn from_pressed(left: bool, right: bool) -> Self {
        Self((left as u8) | ((right as u8) << 1))
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ButtonMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ButtonMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// What the caller should do after a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonAction {
    None,
    /// Show the next pattern
    Next,
    /// Show the previous pattern
    Previous,
    /// Both buttons held long enough: run the sleep sequence
    Sleep,
}

/// Power state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    Awake,
    /// Sleep requested, sequence running
    ShuttingDown,
    Asleep,
}

/// Long-press detection and button latching
#[derive(Debug, Clone)]
pub struct PowerMachine {
    threshold: u16,
    counter: u16,
    latched: ButtonMask,
    state: PowerState,
    /// Ignore the release of the press that woke us
    suppress_release: bool,
}

impl PowerMachine {
    pub const fn new(threshold: u16) -> Self {
        Self {
            threshold,
            counter: 0,
            latched: ButtonMask::NONE,
            state: PowerState::Awake,
            suppress_release: false,
        }
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    /// Consecutive polls with both buttons held
    pub fn counter(&self) -> u16 {
        self.counter
    }

    /// Process one sample of the buttons
    pub fn poll(&mut self, pressed: ButtonMask) -> ButtonAction {
        if self.state != PowerState::Awake {
            return ButtonAction::None;
        }

        if pressed == ButtonMask::BOTH {
            self.latched |= pressed;
            self.counter = self.counter.saturating_add(1);
            if self.counter >= self.threshold {
                self.counter = 0;
                self.latched = ButtonMask::NONE;
                self.state = PowerState::ShuttingDown;
                return ButtonAction::Sleep;
            }
            return ButtonAction::None;
        }
        self.counter = 0;

        if !pressed.is_empty() {
            self.latched |= pressed;
            return ButtonAction::None;
        }

        let mask = core::mem::take(&mut self.latched);
        if mask.is_empty() {
            // Nothing pending, so whatever woke us is already released
            self.suppress_release = false;
            return ButtonAction::None;
        }
        if core::mem::take(&mut self.suppress_release) {
            return ButtonAction::None;
        }
        match mask {
            ButtonMask::RIGHT => ButtonAction::Next,
            ButtonMask::LEFT => ButtonAction::Previous,
            _ => ButtonAction::None,
        }
    }

    /// The sequence reached the halt
    pub fn enter_sleep(&mut self) {
        self.state = PowerState::Asleep;
    }

    /// Back from sleep: start over, ignoring the wake press
    pub fn wake(&mut self) {
        self.state = PowerState::Awake;
        self.counter = 0;
        self.latched = ButtonMask::NONE;
        self.suppress_release = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: u16 = 2048;

    fn press_release(machine: &mut PowerMachine, mask: ButtonMask) -> ButtonAction {
        assert_eq!(machine.poll(mask), ButtonAction::None);
        machine.poll(ButtonMask::NONE)
    }

    #[test]
    fn test_mask_helpers() {
        assert_eq!(ButtonMask::from_pressed(true, false), ButtonMask::LEFT);
        assert_eq!(ButtonMask::from_pressed(false, true), ButtonMask::RIGHT);
        assert_eq!(ButtonMask::from_pressed(true, true), ButtonMask::BOTH);
        assert!(ButtonMask::from_pressed(false, false).is_empty());
        assert_eq!(ButtonMask::LEFT | ButtonMask::RIGHT, ButtonMask::BOTH);
    }

    #[test]
    fn test_single_presses() {
        let mut machine = PowerMachine::new(THRESHOLD);
        assert_eq!(press_release(&mut machine, ButtonMask::RIGHT), ButtonAction::Next);
        assert_eq!(press_release(&mut machine, ButtonMask::LEFT), ButtonAction::Previous);
        assert_eq!(machine.poll(ButtonMask::NONE), ButtonAction::None);
    }

    #[test]
    fn test_action_only_on_release() {
        let mut machine = PowerMachine::new(THRESHOLD);
        for _ in 0..100 {
            assert_eq!(machine.poll(ButtonMask::RIGHT), ButtonAction::None);
        }
        assert_eq!(machine.poll(ButtonMask::NONE), ButtonAction::Next);
    }

    #[test]
    fn test_overlapping_presses_do_nothing() {
        let mut machine = PowerMachine::new(THRESHOLD);
        machine.poll(ButtonMask::RIGHT);
        machine.poll(ButtonMask::LEFT);
        assert_eq!(machine.poll(ButtonMask::NONE), ButtonAction::None);

        // Short dual press
        machine.poll(ButtonMask::BOTH);
        assert_eq!(machine.poll(ButtonMask::NONE), ButtonAction::None);
    }

    #[test]
    fn test_one_short_of_threshold_does_not_sleep() {
        let mut machine = PowerMachine::new(THRESHOLD);
        for _ in 0..THRESHOLD - 1 {
            assert_eq!(machine.poll(ButtonMask::BOTH), ButtonAction::None);
        }
        assert_eq!(machine.counter(), THRESHOLD - 1);
        assert_eq!(machine.state(), PowerState::Awake);
        assert_eq!(machine.poll(ButtonMask::NONE), ButtonAction::None);
        assert_eq!(machine.counter(), 0);
    }

    #[test]
    fn test_threshold_sleeps_exactly_once() {
        let mut machine = PowerMachine::new(THRESHOLD);
        let mut sleeps = 0;
        for _ in 0..THRESHOLD * 2 {
            if machine.poll(ButtonMask::BOTH) == ButtonAction::Sleep {
                sleeps += 1;
            }
        }
        assert_eq!(sleeps, 1);
        assert_eq!(machine.state(), PowerState::ShuttingDown);
    }

    #[test]
    fn test_release_resets_counter() {
        let mut machine = PowerMachine::new(10);
        for _ in 0..9 {
            machine.poll(ButtonMask::BOTH);
        }
        machine.poll(ButtonMask::LEFT);
        for _ in 0..9 {
            assert_eq!(machine.poll(ButtonMask::BOTH), ButtonAction::None);
        }
        assert_eq!(machine.poll(ButtonMask::BOTH), ButtonAction::Sleep);
    }

    #[test]
    fn test_wake_press_release_is_ignored() {
        let mut machine = PowerMachine::new(THRESHOLD);
        machine.enter_sleep();
        assert_eq!(machine.state(), PowerState::Asleep);
        assert_eq!(machine.poll(ButtonMask::RIGHT), ButtonAction::None);

        machine.wake();
        assert_eq!(press_release(&mut machine, ButtonMask::RIGHT), ButtonAction::None);
        assert_eq!(press_release(&mut machine, ButtonMask::RIGHT), ButtonAction::Next);
    }

    #[test]
    fn test_wake_press_already_released() {
        let mut machine = PowerMachine::new(THRESHOLD);
        machine.enter_sleep();
        machine.wake();
        assert_eq!(machine.poll(ButtonMask::NONE), ButtonAction::None);
        assert_eq!(press_release(&mut machine, ButtonMask::LEFT), ButtonAction::Previous);
    }
}
