//! Animation engine
//!
//! Rebuilds the 8-column window from the loaded [`Animation`] on its own
//! cadence, independent of the refresh rate. The caller feeds it the
//! number of refresh ticks since the last call and publishes the frame
//! it returns.
//!
//! Text is rendered into a virtual strip: eight blank columns, then for
//! each character its glyph columns and one spacer column. The window
//! moves over that strip one column per step and wraps around, so a full
//! cycle always starts and ends on a blank display. Frames are shown one
//! per step.

use crate::anim::model::{Animation, AnimationKind, Direction};
use crate::traits::GlyphSource;
use crate::{Frame, BLANK_FRAME};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Blank columns in front of the text
const LEAD_IN: usize = 8;

/// How the end of a text payload is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Termination {
    /// The stored length is authoritative
    #[default]
    Length,
    /// Text also ends at the first zero byte
    NullTerminated,
}

/// Playback state for one animation
pub struct AnimationEngine<G> {
    glyphs: G,
    termination: Termination,
    animation: Animation,
    /// Bytes of `animation.data` that are rendered
    text_len: usize,
    /// Steps in one cycle (strip columns or frames)
    cycle: usize,
    position: usize,
    hold: u16,
    elapsed: u32,
    frame: Frame,
}

impl<G: GlyphSource> AnimationEngine<G> {
    /// Create an engine showing the built-in default message
    pub fn new(glyphs: G, termination: Termination) -> Self {
        let mut engine = Self {
            glyphs,
            termination,
            animation: Animation::default_message(),
            text_len: 0,
            cycle: 0,
            position: 0,
            hold: 0,
            elapsed: 0,
            frame: BLANK_FRAME,
        };
        engine.load(Animation::default_message());
        engine
    }

    /// Replace the current animation and restart it
    ///
    /// Returns the first frame.
    pub fn load(&mut self, animation: Animation) -> Frame {
        self.animation = animation;
        self.position = 0;
        self.hold = 0;
        self.elapsed = 0;

        match self.animation.kind {
            AnimationKind::Text => {
                let data = self.animation.data.as_slice();
                self.text_len = match self.termination {
                    Termination::Length => data.len(),
                    Termination::NullTerminated => {
                        data.iter().position(|&b| b == 0).unwrap_or(data.len())
                    }
                };
                self.cycle = LEAD_IN
                    + data[..self.text_len]
                        .iter()
                        .map(|&ch| self.glyphs.width(ch) + 1)
                        .sum::<usize>();
            }
            AnimationKind::Frames => {
                self.text_len = 0;
                self.cycle = self.animation.data.len() / 8;
            }
        }

        self.frame = self.render();
        self.frame
    }

    /// The animation being played
    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    /// The current window
    pub fn frame(&self) -> Frame {
        self.frame
    }

    /// Steps in one cycle of the current animation
    pub fn cycle_len(&self) -> usize {
        self.cycle
    }

    /// Account for `ticks` refresh ticks and step if one is due
    ///
    /// Returns the new window when it changed. At most one step is taken
    /// per call; a backlog of more than one step is dropped.
    pub fn advance(&mut self, ticks: u32) -> Option<Frame> {
        let interval = u32::from(self.interval());
        self.elapsed = self.elapsed.saturating_add(ticks);
        if self.elapsed < interval {
            return None;
        }
        self.elapsed = (self.elapsed - interval).min(interval - 1);

        if !self.step() {
            return None;
        }
        let frame = self.render();
        if frame == self.frame {
            return None;
        }
        self.frame = frame;
        Some(frame)
    }

    /// Move one step; returns false while holding
    fn step(&mut self) -> bool {
        if self.hold > 0 {
            self.hold -= 1;
            return false;
        }
        if self.cycle == 0 {
            return false;
        }

        self.position = (self.position + 1) % self.cycle;
        match self.animation.kind {
            // Hold on the blank window that starts each cycle
            AnimationKind::Text if self.position == 0 => self.hold = self.animation.delay,
            _ => {}
        }
        true
    }

    /// Refresh ticks per step
    ///
    /// Text scrolls every `speed` ticks. Frames swap every `delay` ticks,
    /// or every `speed` ticks when the delay is zero.
    fn interval(&self) -> u16 {
        let ticks = match self.animation.kind {
            AnimationKind::Frames if self.animation.delay > 0 => self.animation.delay,
            _ => self.animation.speed,
        };
        ticks.max(1)
    }

    fn render(&self) -> Frame {
        match self.animation.kind {
            AnimationKind::Text => self.render_text(),
            AnimationKind::Frames => self.render_frame(),
        }
    }

    fn render_frame(&self) -> Frame {
        let start = self.position * 8;
        let mut frame = BLANK_FRAME;
        if let Some(bytes) = self.animation.data.get(start..start + 8) {
            frame.copy_from_slice(bytes);
        }
        frame
    }

    fn render_text(&self) -> Frame {
        let mut frame = BLANK_FRAME;
        if self.cycle == 0 {
            return frame;
        }
        let offset = match self.animation.direction {
            Direction::RightToLeft => self.position,
            Direction::LeftToRight => (self.cycle - self.position) % self.cycle,
        };
        for (i, column) in frame.iter_mut().enumerate() {
            *column = self.strip_column((offset + i) % self.cycle);
        }
        frame
    }

    /// Column `index` of the virtual text strip
    fn strip_column(&self, index: usize) -> u8 {
        let Some(mut x) = index.checked_sub(LEAD_IN) else {
            return 0;
        };
        for &ch in &self.animation.data[..self.text_len] {
            let width = self.glyphs.width(ch);
            if x < width {
                return self.glyphs.column(ch, x);
            }
            if x == width {
                return 0;
            }
            x -= width + 1;
        }
        0
    }
}
