//! Playback and output control. Every method here is fire-and-forget: the
//! server replies with a bare `OK`, and state updates arrive through the
//! idle loop as `player`, `mixer`, `output`, or `options` changes.

use mpd_protocol::Command;

use crate::client::MpdClient;
use crate::error::Result;
use crate::wire::Wire;

impl<W: Wire> MpdClient<W> {
    /// Starts playback, at a queue position when given, otherwise resuming
    /// the current song.
    pub fn play(&self, position: Option<u32>) -> Result<()> {
        self.run(Command::new("play").opt_arg(position))
    }

    pub fn pause(&self, paused: bool) -> Result<()> {
        self.run(Command::new("pause").arg(u8::from(paused)))
    }

    pub fn stop(&self) -> Result<()> {
        self.run(Command::new("stop"))
    }

    pub fn next(&self) -> Result<()> {
        self.run(Command::new("next"))
    }

    pub fn previous(&self) -> Result<()> {
        self.run(Command::new("previous"))
    }

    /// Seeks within the song at a queue position. Fractional seconds are
    /// accepted by servers since protocol 0.17.
    pub fn seek(&self, position: u32, seconds: f64) -> Result<()> {
        self.run(Command::new("seek").arg(position).arg(seconds))
    }

    /// Sets the mixer volume, clamped to 0..=100.
    pub fn set_volume(&self, volume: u8) -> Result<()> {
        self.run(Command::new("setvol").arg(volume.min(100)))
    }

    pub fn enable_output(&self, id: u32) -> Result<()> {
        self.run(Command::new("enableoutput").arg(id))
    }

    pub fn disable_output(&self, id: u32) -> Result<()> {
        self.run(Command::new("disableoutput").arg(id))
    }

    pub fn toggle_output(&self, id: u32) -> Result<()> {
        self.run(Command::new("toggleoutput").arg(id))
    }

    /// Moves this connection to another partition. Needs protocol 0.22.
    pub fn switch_partition(&self, name: &str) -> Result<()> {
        self.run(Command::new("partition").arg(name))
    }

    fn run(&self, command: Command) -> Result<()> {
        self.exchange(command).map(|_| ())
    }
}
