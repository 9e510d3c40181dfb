use crate::{
    definitions::{display, keyboard},
    DeviceError,
};

#[cfg_attr(test, mockall::automock)]
/// The traits responsible for the display based code
pub trait DisplayCommands {
    /// Will prepare the display for usage
    fn init(&mut self) -> Result<(), DeviceError>;
    /// Will release the display
    fn close(&mut self);
    /// Will clear the display
    fn clear(&mut self);
    /// Will XOR the sprite onto the display starting at `(x, y)` and
    /// return `1` if any set pixel was erased, `0` otherwise.
    fn draw(&mut self, x: u8, y: u8, sprite: &[u8]) -> u8;
    /// Will present the current state of the display
    fn update(&mut self) -> Result<(), DeviceError>;
}

/// What the user asked for during a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    /// Keep on running.
    Continue,
    /// The user wants to quit.
    Quit,
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for writing the keyboard data
pub trait KeyboardCommands {
    /// Will prepare the input for usage
    fn init(&mut self) -> Result<(), DeviceError>;
    /// Will release the input
    fn close(&mut self);
    /// Will write the currently pressed keys into the keyboard, without blocking.
    fn poll(&mut self, keyboard: &mut Keyboard) -> Result<InputState, DeviceError>;
    /// Will block until any event happens.
    fn wait_for_event(&mut self) -> Result<(), DeviceError>;
}

/// Will represent the last set key with the previous
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    index: usize,
    last: bool,
    current: bool,
}

impl Key {
    fn new(index: usize, last: bool, current: bool) -> Self {
        Self {
            index,
            last,
            current,
        }
    }

    pub fn get_index(&self) -> usize {
        self.index
    }

    pub fn get_last(&self) -> bool {
        self.last
    }

    pub fn get_current(&self) -> bool {
        self.current
    }

    /// The key went from released to pressed.
    pub fn is_press(&self) -> bool {
        !self.last && self.current
    }
}

/// Will store the last change to the given keybord
/// and represent the internal keyboard as well
///
/// Input is done with a hex keyboard that has 16 keys ranging `0-F`. The `8`, `4`, `6`, and
/// `2` keys are typically used for directional input. Three opcodes are used to detect input.
/// One skips an instruction if a specific key is pressed, while another does the same if a
/// specific key is not pressed. The third waits for a key press, and then stores it in one of
/// the data registers.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    keys: [bool; keyboard::SIZE],
    last: Option<Key>,
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    pub fn toggle_key(&mut self, key: usize) {
        self.set_key(key, !self.keys[key % keyboard::SIZE])
    }

    /// Sets a single key, keys outside of `0-F` are folded into the keypad.
    pub fn set_key(&mut self, key: usize, to: bool) {
        let key = key % keyboard::SIZE;
        if self.keys[key] == to {
            return;
        }
        // setup last
        self.last = Some(Key::new(key, self.keys[key], to));
        // write back solution
        self.keys[key] = to;
    }

    /// Overwrites the whole keypad, the transitions are recorded in key order.
    /// A press wins over any release in the same call.
    pub fn set_mult(&mut self, keys: &[bool; keyboard::SIZE]) {
        let mut press = None;
        for (index, &to) in keys.iter().enumerate() {
            if self.keys[index] == to {
                continue;
            }
            self.set_key(index, to);
            if to {
                press = self.last;
            }
        }
        if press.is_some() {
            self.last = press;
        }
    }

    pub fn is_pressed(&self, key: usize) -> bool {
        self.keys[key % keyboard::SIZE]
    }

    pub fn get_keys(&self) -> &[bool] {
        &self.keys
    }

    pub fn get_last(&self) -> Option<Key> {
        self.last
    }

    /// Returns the key of the last transition if it was a press
    /// and forgets it, so that it is reported only once.
    pub fn take_last_press(&mut self) -> Option<usize> {
        match self.last.take() {
            Some(key) if key.is_press() => Some(key.get_index()),
            _ => None,
        }
    }
}

/// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
/// `(64 x 32)`. This headless implementation holds the pixel state and does the actual
/// XOR drawing, backends wrap it and only take care of presenting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: Vec<Vec<bool>>,
    /// Set whenever the pixels changed since the last call to `take_dirty`.
    dirty: bool,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            pixels: vec![vec![false; display::WIDTH]; display::HEIGHT],
            dirty: true,
        }
    }

    /// The rows of the display, row `0` is the top.
    pub fn rows(&self) -> &[Vec<bool>] {
        &self.pixels
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.pixels[y % display::HEIGHT][x % display::WIDTH]
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

impl DisplayCommands for FrameBuffer {
    fn init(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }

    fn close(&mut self) {}

    fn clear(&mut self) {
        for row in self.pixels.iter_mut() {
            for pixel in row.iter_mut() {
                *pixel = false;
            }
        }
        self.dirty = true;
    }

    fn draw(&mut self, x: u8, y: u8, sprite: &[u8]) -> u8 {
        const BYTE: usize = 8;

        let coorx = x as usize % display::WIDTH;
        let coory = y as usize % display::HEIGHT;

        let mut collision = 0;
        for (i, row) in sprite.iter().enumerate() {
            let y = (coory + i) % display::HEIGHT;

            // most significant bit is the left most pixel
            for (m, j) in (0..BYTE).rev().zip(0..BYTE) {
                let mask = 1 << m;
                if row & mask != mask {
                    continue;
                }

                let x = (coorx + j) % display::WIDTH;
                let spixel = self.pixels[y][x];
                if spixel {
                    // only erasing a pixel counts as a collision
                    collision = 1;
                }
                self.pixels[y][x] = !spixel;
            }
        }
        self.dirty = true;
        collision
    }

    fn update(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_twice_collides() {
        let mut fb = FrameBuffer::new();
        let sprite = [0xF0, 0x90, 0x90, 0x90, 0xF0];

        assert_eq!(fb.draw(3, 4, &sprite), 0);
        assert!(fb.get(3, 4));
        assert!(fb.get(6, 4));
        assert!(!fb.get(7, 4));
        assert!(fb.get(3, 5));
        assert!(!fb.get(4, 5));

        assert_eq!(fb.draw(3, 4, &sprite), 1);
        assert!(fb.rows().iter().flatten().all(|p| !p));
    }

    #[test]
    fn test_overlap_without_erasing_is_no_collision() {
        let mut fb = FrameBuffer::new();
        assert_eq!(fb.draw(0, 0, &[0b1010_1010]), 0);
        // lights up the gaps only
        assert_eq!(fb.draw(0, 0, &[0b0101_0101]), 0);
        assert!((0..8).all(|x| fb.get(x, 0)));
        // erases a single pixel
        assert_eq!(fb.draw(7, 0, &[0b1000_0000]), 1);
        assert!(!fb.get(7, 0));
    }

    #[test]
    fn test_draw_wraps_around() {
        let mut fb = FrameBuffer::new();
        // start is taken modulo the size
        assert_eq!(fb.draw(64 + 2, 32 + 1, &[0x80]), 0);
        assert!(fb.get(2, 1));

        // the sprite itself wraps both ways
        let mut fb = FrameBuffer::new();
        assert_eq!(fb.draw(62, 31, &[0xF0, 0xF0]), 0);
        for (x, y) in [(62, 31), (63, 31), (0, 31), (1, 31), (62, 0), (1, 0)] {
            assert!(fb.get(x, y), "pixel ({}, {}) should be set", x, y);
        }
        assert!(!fb.get(2, 31));
    }

    #[test]
    fn test_clear() {
        let mut fb = FrameBuffer::new();
        assert!(fb.take_dirty());
        fb.draw(0, 0, &[0xFF]);
        assert!(fb.take_dirty());
        assert!(!fb.take_dirty());
        fb.clear();
        assert!(fb.take_dirty());
        assert!(fb.rows().iter().flatten().all(|p| !p));
        assert_eq!(fb.draw(0, 0, &[0xFF]), 0);
    }

    #[test]
    fn test_keyboard_last_press() {
        let mut keyboard = Keyboard::new();
        assert_eq!(keyboard.get_last(), None);
        assert_eq!(keyboard.take_last_press(), None);

        keyboard.set_key(0xA, true);
        assert!(keyboard.is_pressed(0xA));
        assert_eq!(keyboard.get_last(), Some(Key::new(0xA, false, true)));
        assert_eq!(keyboard.take_last_press(), Some(0xA));
        // reported only once
        assert_eq!(keyboard.take_last_press(), None);

        // holding is not a new press
        keyboard.set_key(0xA, true);
        assert_eq!(keyboard.take_last_press(), None);

        // releasing is not a press either
        keyboard.set_key(0xA, false);
        assert_eq!(keyboard.take_last_press(), None);
        assert!(!keyboard.is_pressed(0xA));
    }

    #[test]
    fn test_keyboard_set_mult_and_toggle() {
        let mut keyboard = Keyboard::new();
        let mut keys = [false; keyboard::SIZE];
        keys[3] = true;
        keys[0xF] = true;
        keyboard.set_mult(&keys);
        assert_eq!(keyboard.get_keys(), &keys[..]);
        assert_eq!(keyboard.get_last().map(|k| k.get_index()), Some(0xF));

        keyboard.toggle_key(3);
        assert!(!keyboard.is_pressed(3));
        // folded into the keypad
        assert!(keyboard.is_pressed(0x1F));
    }

    #[test]
    fn test_keyboard_set_mult_keeps_press_over_release() {
        let mut keyboard = Keyboard::new();
        keyboard.set_key(0xF, true);
        assert_eq!(keyboard.take_last_press(), Some(0xF));

        let mut keys = [false; keyboard::SIZE];
        keys[0x3] = true;
        keyboard.set_mult(&keys);
        assert!(keyboard.is_pressed(0x3));
        assert!(!keyboard.is_pressed(0xF));
        assert_eq!(keyboard.take_last_press(), Some(0x3));

        // a lone release is still recorded
        keyboard.set_mult(&[false; keyboard::SIZE]);
        assert_eq!(keyboard.get_last().map(|k| k.get_index()), Some(0x3));
        assert_eq!(keyboard.take_last_press(), None);
    }
}
