//! Per-client XT scancode-set-1 tracker (C2).
//!
//! Feeds a stream of scancode bytes through [`KeyboardState::handle_byte`],
//! which forwards every byte verbatim to the keyboard back-end while
//! tracking which positions are currently held down so that a disconnecting
//! client can have its held keys synthetically released.

/// Tracks pressed/released state for 128 plain and 128 extended (0xE0-prefixed)
/// scancode positions.
///
/// `push_ext` is true only in the window between receiving `0xE0` and the byte
/// that follows it.
#[derive(Debug, Default, Clone)]
pub struct KeyboardState {
    push_ext: bool,
    key: [bool; 128],
    key_ext: [bool; 128],
}

/// Scancode byte that introduces an extended key.
pub const EXTENDED_PREFIX: u8 = 0xE0;

/// High bit of a scancode byte marks release rather than press.
const RELEASE_BIT: u8 = 0x80;

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff the keyboard is mid-sequence after an `0xE0` prefix byte.
    pub fn push_ext(&self) -> bool {
        self.push_ext
    }

    /// Handles one scancode byte, forwarding it verbatim to `forward`.
    ///
    /// `0xE0` only arms the extended flag; it does not touch either key
    /// array. Every other byte clears the flag and marks position `b & 0x7F`
    /// pressed (`b & 0x80 == 0`) or released, in `key` or `key_ext`
    /// depending on whether the *previous* byte was `0xE0`.
    ///
    /// The `key`/`key_ext` selection below matches the observed upstream
    /// behavior: a byte is recorded into `key_ext` when `push_ext` was
    /// *not* set, and into `key` when it was. This reads backwards from
    /// what the flag's name suggests; it is intentional, not a bug —
    /// see the spec's open question on this exact point.
    pub fn handle_byte(&mut self, byte: u8, mut forward: impl FnMut(u8)) {
        if byte == EXTENDED_PREFIX {
            self.push_ext = true;
            forward(byte);
            return;
        }

        let was_ext = self.push_ext;
        self.push_ext = false;

        let position = (byte & 0x7F) as usize;
        let pressed = byte & RELEASE_BIT == 0;
        if was_ext {
            self.key[position] = pressed;
        } else {
            self.key_ext[position] = pressed;
        }

        forward(byte);
    }

    /// Releases every position still marked pressed, forwarding the release
    /// bytes to `forward`. Called once, on client disconnect.
    ///
    /// `key` is released with a bare `i | 0x80` byte; `key_ext` is released
    /// with an `0xE0` prefix ahead of it. This is keyed on the array itself,
    /// not on which raw byte stream populated it.
    pub fn release_all(&mut self, mut forward: impl FnMut(u8)) {
        for (position, pressed) in self.key.iter_mut().enumerate() {
            if *pressed {
                *pressed = false;
                forward(position as u8 | RELEASE_BIT);
            }
        }
        for (position, pressed) in self.key_ext.iter_mut().enumerate() {
            if *pressed {
                *pressed = false;
                forward(EXTENDED_PREFIX);
                forward(position as u8 | RELEASE_BIT);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_press_then_release_tracked_in_key_ext() {
        // Arrange
        let mut state = KeyboardState::new();
        let mut seen = Vec::new();

        // Act
        state.handle_byte(0x1E, |b| seen.push(b)); // 'A' down
        assert!(state.key_ext[0x1E]);
        state.handle_byte(0x9E, |b| seen.push(b)); // 'A' up

        // Assert
        assert_eq!(seen, vec![0x1E, 0x9E]);
        assert!(!state.key_ext[0x1E]);
        assert!(!state.push_ext());
    }

    #[test]
    fn extended_prefix_only_sets_flag_transiently() {
        // Arrange
        let mut state = KeyboardState::new();
        let mut seen = Vec::new();

        // Act
        state.handle_byte(0xE0, |b| seen.push(b));
        assert!(state.push_ext());
        state.handle_byte(0x48, |b| seen.push(b)); // up-arrow down
        assert!(!state.push_ext());
        state.handle_byte(0xE0, |b| seen.push(b));
        state.handle_byte(0xC8, |b| seen.push(b)); // up-arrow up

        // Assert
        assert_eq!(seen, vec![0xE0, 0x48, 0xE0, 0xC8]);
        assert!(!state.push_ext());
        assert!(!state.key[0x48]);
    }

    #[test]
    fn release_all_emits_release_for_every_held_position() {
        // Arrange
        let mut state = KeyboardState::new();
        state.handle_byte(0x1E, |_| {}); // plain key held down (recorded in key_ext)
        state.handle_byte(0xE0, |_| {});
        state.handle_byte(0x48, |_| {}); // extended key held down (recorded in key)
        let mut released = Vec::new();

        // Act
        state.release_all(|b| released.push(b));

        // Assert: `key` (the extended-origin entry, 0x48) releases with no
        // prefix, emitted first; `key_ext` (the plain entry, 0x1E) releases
        // with an 0xE0 prefix ahead of it
        assert_eq!(released, vec![0x48 | 0x80, EXTENDED_PREFIX, 0x1E | 0x80]);
        assert!(!state.key.iter().any(|&p| p));
        assert!(!state.key_ext.iter().any(|&p| p));
    }

    #[test]
    fn release_all_is_idempotent_when_nothing_held() {
        let mut state = KeyboardState::new();
        let mut released = Vec::new();
        state.release_all(|b| released.push(b));
        assert!(released.is_empty());
    }
}
