//! Named sound cues and the sink that plays them.
//!
//! The engine only announces events; whatever implements [`AudioSink`]
//! decides what to do with them (synthesize, log, or ignore).

use log::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Shoot,
    Hit,
    Explosion,
    PowerUp,
    PlayerHit,
    GameOver,
    Boss,
}

impl SoundCue {
    pub fn name(self) -> &'static str {
        match self {
            SoundCue::Shoot => "shoot",
            SoundCue::Hit => "hit",
            SoundCue::Explosion => "explosion",
            SoundCue::PowerUp => "powerup",
            SoundCue::PlayerHit => "playerHit",
            SoundCue::GameOver => "gameover",
            SoundCue::Boss => "boss",
        }
    }
}

pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
}

impl<F: FnMut(SoundCue)> AudioSink for F {
    fn play(&mut self, cue: SoundCue) {
        self(cue)
    }
}

/// Discards every cue.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl AudioSink for Silent {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Writes every cue to the debug log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, cue: SoundCue) {
        debug!("sound: {}", cue.name());
    }
}
