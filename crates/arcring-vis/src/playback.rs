//! Playback controls for the ring timeline.
//!
//! A frame index `n` means "the first `n` events have been applied", so the
//! valid range is `0..=total_frames()`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::events::RingEvent;

/// Playback speed multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackSpeed {
    Paused,
    Half,
    Normal,
    Double,
    Quadruple,
    /// Jump straight through, no delay between events
    Instant,
}

impl PlaybackSpeed {
    pub fn multiplier(&self) -> f64 {
        match self {
            PlaybackSpeed::Paused => 0.0,
            PlaybackSpeed::Half => 0.5,
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::Double => 2.0,
            PlaybackSpeed::Quadruple => 4.0,
            PlaybackSpeed::Instant => f64::INFINITY,
        }
    }

    /// Delay between events at this speed, `None` while paused.
    pub fn frame_interval(&self, base: Duration) -> Option<Duration> {
        match self {
            PlaybackSpeed::Paused => None,
            PlaybackSpeed::Instant => Some(Duration::ZERO),
            speed => Some(base.div_f64(speed.multiplier())),
        }
    }
}

/// Current state of playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
    Finished,
}

/// Playback controller for the event timeline.
pub struct Playback {
    events: Vec<RingEvent>,
    current_frame: usize,
    state: PlaybackState,
    speed: PlaybackSpeed,
    loop_enabled: bool,
}

impl Playback {
    /// Create a controller positioned at the end of `events`, showing the
    /// live ring.
    pub fn new(events: Vec<RingEvent>) -> Self {
        Self {
            current_frame: events.len(),
            events,
            state: PlaybackState::Stopped,
            speed: PlaybackSpeed::Normal,
            loop_enabled: false,
        }
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn total_frames(&self) -> usize {
        self.events.len()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    fn at_end(&self) -> bool {
        self.current_frame >= self.events.len()
    }

    /// Swap in a longer timeline after the ring changed.
    ///
    /// A controller that was following the live ring (at the end, not
    /// playing) jumps to the new end; otherwise the frame is kept.
    pub fn replace_events(&mut self, events: Vec<RingEvent>) {
        let following = self.at_end() && self.state != PlaybackState::Playing;
        self.events = events;
        if following {
            self.current_frame = self.events.len();
        } else {
            self.current_frame = self.current_frame.min(self.events.len());
        }
    }

    /// Seek to a specific frame, clamped to the timeline.
    pub fn seek(&mut self, frame: usize) {
        self.current_frame = frame.min(self.events.len());
        if self.at_end() && !self.loop_enabled {
            self.state = PlaybackState::Finished;
        } else if self.state == PlaybackState::Finished {
            self.state = PlaybackState::Paused;
        }
    }

    /// Start playback, rewinding first when at the end.
    pub fn play(&mut self) {
        if self.at_end() {
            self.current_frame = 0;
        }
        self.state = PlaybackState::Playing;
    }

    pub fn pause(&mut self) {
        self.state = PlaybackState::Paused;
    }

    /// Stop playback and return to the beginning.
    pub fn stop(&mut self) {
        self.current_frame = 0;
        self.state = PlaybackState::Stopped;
    }

    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.speed = speed;
        if speed == PlaybackSpeed::Paused {
            self.state = PlaybackState::Paused;
        }
    }

    pub fn set_loop(&mut self, enabled: bool) {
        self.loop_enabled = enabled;
    }

    /// Apply the next event and return it.
    pub fn step_forward(&mut self) -> Option<&RingEvent> {
        let index = self.current_frame;
        if index >= self.events.len() {
            return None;
        }

        self.current_frame += 1;
        if self.at_end() {
            if self.loop_enabled {
                self.current_frame = 0;
            } else {
                self.state = PlaybackState::Finished;
            }
        }
        self.events.get(index)
    }

    /// Un-apply the last event.
    pub fn step_backward(&mut self) {
        if self.current_frame > 0 {
            self.current_frame -= 1;
            self.state = PlaybackState::Paused;
        }
    }

    /// All events up to the current frame (for rebuilding state).
    pub fn events_to_current(&self) -> &[RingEvent] {
        &self.events[..self.current_frame]
    }

    /// Fraction of the timeline applied, 0.0 to 1.0.
    pub fn progress(&self) -> f64 {
        if self.events.is_empty() {
            0.0
        } else {
            self.current_frame as f64 / self.events.len() as f64
        }
    }

    /// Progress as the whole percentage shown in the frontend.
    pub fn progress_percent(&self) -> u8 {
        (self.progress() * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Playback status for sending to frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub current_frame: usize,
    pub total_frames: usize,
    pub state: PlaybackState,
    pub speed: PlaybackSpeed,
    pub progress: f64,
    pub progress_percent: u8,
    pub loop_enabled: bool,
}

impl From<&Playback> for PlaybackStatus {
    fn from(playback: &Playback) -> Self {
        Self {
            current_frame: playback.current_frame,
            total_frames: playback.total_frames(),
            state: playback.state,
            speed: playback.speed,
            progress: playback.progress(),
            progress_percent: playback.progress_percent(),
            loop_enabled: playback.loop_enabled,
        }
    }
}
