use std::collections::VecDeque;

use crate::error::{Error, Result};

/// left-hand side of a qwerty keyboard laid out like the COSMAC VIP hex keypad
///
/// ```text
/// 1 2 3 C      1 2 3 4
/// 4 5 6 D      q w e r
/// 7 8 9 E      a s d f
/// A 0 B F      z x c v
/// ```
pub const KEYMAP: [(char, u8); 16] = [
    ('x', 0x0),
    ('1', 0x1),
    ('2', 0x2),
    ('3', 0x3),
    ('q', 0x4),
    ('w', 0x5),
    ('e', 0x6),
    ('a', 0x7),
    ('s', 0x8),
    ('d', 0x9),
    ('z', 0xA),
    ('c', 0xB),
    ('4', 0xC),
    ('r', 0xD),
    ('f', 0xE),
    ('v', 0xF),
];

/// Raw events from the host, keyed by lowercase key character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    KeyDown(char),
    KeyUp(char),
    Quit,
}

/// Where key events come from (a window's event pump, a script, ...).
pub trait HostInput {
    /// next pending event, if any, without blocking
    fn poll_event(&mut self) -> Option<HostEvent>;

    /// block until the next event arrives
    fn wait_event(&mut self) -> HostEvent;
}

/// Replays a fixed list of events, then reports `Quit` forever.
pub struct ScriptedInput {
    events: VecDeque<HostEvent>,
}

impl ScriptedInput {
    pub fn new(events: &[HostEvent]) -> Self {
        Self {
            events: events.iter().copied().collect(),
        }
    }
}

impl HostInput for ScriptedInput {
    fn poll_event(&mut self) -> Option<HostEvent> {
        self.events.pop_front()
    }

    fn wait_event(&mut self) -> HostEvent {
        self.events.pop_front().unwrap_or(HostEvent::Quit)
    }
}

/// Hex keypad state: which of the 16 logical keys are held right now.
pub struct Keypad {
    input: Box<dyn HostInput>,
    keys: [bool; 16],
}

impl Keypad {
    pub fn new(input: Box<dyn HostInput>) -> Self {
        Self {
            input,
            keys: [false; 16],
        }
    }

    pub fn logical_key(host: char) -> Option<u8> {
        let host = host.to_ascii_lowercase();
        KEYMAP.iter().find(|(h, _)| *h == host).map(|&(_, k)| k)
    }

    pub fn host_key(key: u8) -> Result<char> {
        KEYMAP
            .iter()
            .find(|(_, k)| *k == key)
            .map(|&(h, _)| h)
            .ok_or(Error::InvalidKey { key })
    }

    /// Whether logical `key` is held. Keys with no host key are rejected.
    pub fn is_pressed(&self, key: u8) -> Result<bool> {
        Self::host_key(key).map(|_| self.keys[key as usize])
    }

    /// Apply one host event to the key state. Returns the logical key for a
    /// mapped key-down, which is what a key wait is looking for.
    fn apply(&mut self, event: HostEvent) -> Option<u8> {
        match event {
            HostEvent::KeyDown(host) => {
                let key = Self::logical_key(host)?;
                self.keys[key as usize] = true;
                Some(key)
            }
            HostEvent::KeyUp(host) => {
                if let Some(key) = Self::logical_key(host) {
                    self.keys[key as usize] = false;
                }
                None
            }
            HostEvent::Quit => None,
        }
    }

    /// Drain pending host events into the key state. Returns true once a quit
    /// has been requested.
    pub fn poll(&mut self) -> bool {
        let mut quit = false;
        while let Some(event) = self.input.poll_event() {
            if event == HostEvent::Quit {
                quit = true;
            }
            self.apply(event);
        }
        quit
    }

    /// Block until a mapped key goes down and return it. Unmapped keys are
    /// ignored. `None` means the host asked to quit while we were waiting.
    pub fn wait_for_key(&mut self) -> Option<u8> {
        loop {
            let event = self.input.wait_event();
            if event == HostEvent::Quit {
                return None;
            }
            if let Some(key) = self.apply(event) {
                return Some(key);
            }
        }
    }
}
