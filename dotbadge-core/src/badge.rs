//! Main-loop orchestrator
//!
//! Owns everything the main loop touches: the pattern store, the
//! framing receiver, the animation engine and the power machine. The
//! interrupt side (refresh, demodulator) only shares the ring buffer and
//! the front buffer with it, both of which live outside.

use dotbadge_hal::{PatternStorage, StorageError, RECORD_BUF_SIZE};
use dotbadge_protocol::{Receiver, RingBuffer, RxEvent};

use crate::anim::{Animation, AnimationEngine, ModelError, POWER_DOWN_IMAGE};
use crate::config::BadgeConfig;
use crate::power::{ButtonAction, ButtonMask, PowerMachine, SleepHooks};
use crate::traits::GlyphSource;
use crate::Frame;

/// Poll interval while waiting for the buttons to be released
pub const RELEASE_POLL_MS: u32 = 10;

/// Why a pattern could not be loaded
///
/// The default message is shown instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    /// Storage holds no patterns
    Empty,
    Storage(StorageError),
    Model(ModelError),
}

impl From<StorageError> for LoadError {
    fn from(e: StorageError) -> Self {
        LoadError::Storage(e)
    }
}

impl From<ModelError> for LoadError {
    fn from(e: ModelError) -> Self {
        LoadError::Model(e)
    }
}

/// The badge application
pub struct Badge<S, G> {
    storage: S,
    engine: AnimationEngine<G>,
    receiver: Receiver,
    power: PowerMachine,
    config: BadgeConfig,
    current: u8,
    /// A new animation was loaded and not yet handed out by `animate`
    pending: bool,
}

impl<S: PatternStorage, G: GlyphSource> Badge<S, G> {
    /// Create the badge and load pattern 0
    pub fn new(storage: S, glyphs: G, config: BadgeConfig) -> Self {
        let mut badge = Self {
            storage,
            engine: AnimationEngine::new(glyphs, config.animation.termination),
            receiver: Receiver::new(),
            power: PowerMachine::new(config.power.shutdown_threshold),
            config,
            current: 0,
            pending: true,
        };
        let _ = badge.load_pattern(0);
        badge
    }

    /// Make pattern `index` the active animation
    ///
    /// On error the built-in default message is loaded instead and the
    /// reason is returned.
    pub fn load_pattern(&mut self, index: u8) -> Result<(), LoadError> {
        self.current = index;
        self.pending = true;
        match self.read_pattern(index) {
            Ok(animation) => {
                self.engine.load(animation);
                Ok(())
            }
            Err(e) => {
                self.engine.load(Animation::default_message());
                Err(e)
            }
        }
    }

    fn read_pattern(&mut self, index: u8) -> Result<Animation, LoadError> {
        if !self.storage.has_data() {
            return Err(LoadError::Empty);
        }
        let mut record = [0u8; RECORD_BUF_SIZE];
        let len = self.storage.load(index, &mut record)?;
        Ok(Animation::from_record(&record[..len.min(RECORD_BUF_SIZE)])?)
    }

    /// Index of the active pattern
    pub fn current_pattern(&self) -> u8 {
        self.current
    }

    /// Feed one sample of the buttons
    ///
    /// `Next` and `Previous` are applied here; `Sleep` is returned for
    /// the caller to run [`Badge::sleep`].
    pub fn poll_buttons(&mut self, pressed: ButtonMask) -> ButtonAction {
        let action = self.power.poll(pressed);
        let count = self.storage.num_patterns();
        let target = match action {
            ButtonAction::Next if count > 1 => self.current.saturating_add(1) % count,
            ButtonAction::Previous if count > 1 => {
                if self.current == 0 || self.current >= count {
                    count - 1
                } else {
                    self.current - 1
                }
            }
            ButtonAction::Next | ButtonAction::Previous => 0,
            ButtonAction::None | ButtonAction::Sleep => return action,
        };
        let _ = self.load_pattern(target);
        action
    }

    /// Run every queued byte through the receiver
    ///
    /// `on_event` sees each receiver event; after a finished stream
    /// pattern 0 is loaded. Returns the number of bytes processed.
    pub fn drain<const N: usize>(
        &mut self,
        ring: &RingBuffer<N>,
        mut on_event: impl FnMut(RxEvent),
    ) -> usize {
        let mut count = 0;
        while let Some(byte) = ring.try_get() {
            count += 1;
            if let Some(event) = self.receiver.feed(byte, &mut self.storage) {
                if let RxEvent::StreamFinished(_) = event {
                    let _ = self.load_pattern(0);
                }
                on_event(event);
            }
        }
        count
    }

    /// Advance the animation by `ticks` refresh ticks
    ///
    /// Returns the frame to publish, if the window changed.
    pub fn animate(&mut self, ticks: u32) -> Option<Frame> {
        let stepped = self.engine.advance(ticks);
        if core::mem::take(&mut self.pending) {
            return Some(self.engine.frame());
        }
        stepped
    }

    /// Run the sleep sequence; returns after wake-up
    ///
    /// The wake press is not treated as a pattern switch.
    pub async fn sleep<H: SleepHooks, const N: usize>(
        &mut self,
        hooks: &mut H,
        ring: &RingBuffer<N>,
    ) {
        let power = self.config.power;

        hooks.set_receiver(false);
        let image = self.engine.load(Animation::still(&POWER_DOWN_IMAGE));
        hooks.show(&image);

        // Sleeping with a button held would wake us on its release
        let mut waited = 0;
        while !hooks.buttons().is_empty() && waited < power.release_timeout_ms {
            hooks.delay_ms(RELEASE_POLL_MS).await;
            waited += RELEASE_POLL_MS;
        }
        hooks.delay_ms(power.debounce_ms).await;
        hooks.set_display(false);

        self.power.enter_sleep();
        hooks.sleep_until_wake().await;
        hooks.delay_ms(power.debounce_ms).await;

        let _ = self.load_pattern(self.current);
        self.pending = false;
        hooks.show(&self.engine.frame());
        hooks.set_display(true);
        hooks.set_receiver(true);

        self.receiver.reset();
        ring.discard();
        self.power.wake();
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    pub fn power(&self) -> &PowerMachine {
        &self.power
    }

    pub fn engine(&self) -> &AnimationEngine<G> {
        &self.engine
    }

    pub fn config(&self) -> &BadgeConfig {
        &self.config
    }
}
