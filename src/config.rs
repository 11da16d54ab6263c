use std::time::Duration;

/// Knobs for running a program. `Config::default()` is what the binary uses
/// unless told otherwise.
#[derive(Debug, Clone)]
pub struct Config {
    /// sleep after every instruction, which sets the emulation speed
    pub cycle_delay: Duration,
    /// window pixels per CHIP-8 pixel
    pub scale: u32,
    /// delay timer rate
    pub timer_hz: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cycle_delay: Duration::from_millis(2),
            scale: 10,
            timer_hz: 60,
        }
    }
}
