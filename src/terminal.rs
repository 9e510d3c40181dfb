//! The terminal backends, drawing with crossterm and reading the keypad from
//! the left hand block of a qwerty keyboard.
use {
    chip::{
        definitions::{display, keyboard},
        devices::{DisplayCommands, FrameBuffer, InputState, Keyboard, KeyboardCommands},
        DeviceError,
    },
    crossterm::{
        cursor,
        event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
        execute, queue,
        style::Print,
        terminal::{self, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
    },
    hashbrown::HashMap,
    once_cell::sync::Lazy,
    std::{
        io::{self, Stdout, Write},
        time::{Duration, Instant},
    },
};

/// The keys on the keyboard, in the same places as in the keypad layout.
const TERMINAL_LAYOUT: [[char; 4]; 4] = [
    ['1', '2', '3', '4'],
    ['q', 'w', 'e', 'r'],
    ['a', 's', 'd', 'f'],
    ['z', 'x', 'c', 'v'],
];

/// Terminals only report presses, so a key counts as held for this long.
const HOLD: Duration = Duration::from_millis(150);

/// maps the terminal keyboard layout to the keypad
fn map_key(key: char) -> Option<usize> {
    static LAYOUT_MAP: Lazy<HashMap<char, usize>> = Lazy::new(|| {
        let mut map = HashMap::new();
        for (row, keys) in TERMINAL_LAYOUT.iter().zip(keyboard::LAYOUT.iter()) {
            for (&cell, &key) in row.iter().zip(keys.iter()) {
                map.insert(cell, key);
            }
        }
        map
    });

    LAYOUT_MAP.get(&key.to_ascii_lowercase()).copied()
}

/// Two pixel rows share one character cell.
fn glyph(top: bool, bottom: bool) -> char {
    match (top, bottom) {
        (true, true) => '█',
        (true, false) => '▀',
        (false, true) => '▄',
        (false, false) => ' ',
    }
}

/// Draws the frame buffer into the terminal.
pub struct TerminalDisplay<W: Write = Stdout> {
    frame: FrameBuffer,
    out: W,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> TerminalDisplay<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            frame: FrameBuffer::new(),
            out,
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let rows = self.frame.rows();
        for (line, pair) in rows.chunks(2).enumerate() {
            let text: String = (0..display::WIDTH)
                .map(|x| glyph(pair[0][x], pair.get(1).map_or(false, |row| row[x])))
                .collect();
            queue!(self.out, cursor::MoveTo(0, line as u16), Print(text))?;
        }
        self.out.flush()
    }
}

impl<W: Write> DisplayCommands for TerminalDisplay<W> {
    fn init(&mut self) -> Result<(), DeviceError> {
        execute!(
            self.out,
            EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(ClearType::All)
        )
        .map_err(|err| DeviceError::Init(err.to_string()))
    }

    fn close(&mut self) {
        if let Err(err) = execute!(self.out, cursor::Show, LeaveAlternateScreen) {
            log::error!("unable to restore the terminal: {}", err);
        }
    }

    fn clear(&mut self) {
        self.frame.clear();
    }

    fn draw(&mut self, x: u8, y: u8, sprite: &[u8]) -> u8 {
        self.frame.draw(x, y, sprite)
    }

    fn update(&mut self) -> Result<(), DeviceError> {
        if self.frame.take_dirty() {
            self.render()?;
        }
        Ok(())
    }
}

/// Reads the keypad from the terminal, `Esc` quits.
pub struct TerminalKeyboard {
    pressed: [Option<Instant>; keyboard::SIZE],
}

impl TerminalKeyboard {
    pub fn new() -> Self {
        Self {
            pressed: [None; keyboard::SIZE],
        }
    }

    /// Will note the key press, returns if the user wants to quit.
    fn handle(&mut self, event: KeyEvent, now: Instant) -> InputState {
        match event.code {
            KeyCode::Esc => InputState::Quit,
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                InputState::Quit
            }
            KeyCode::Char(c) => {
                if let Some(key) = map_key(c) {
                    self.pressed[key] = Some(now);
                }
                InputState::Continue
            }
            _ => InputState::Continue,
        }
    }

    /// The keys that are still held at the given time.
    fn held(&mut self, now: Instant) -> [bool; keyboard::SIZE] {
        let mut keys = [false; keyboard::SIZE];
        for (key, pressed) in self.pressed.iter_mut().enumerate() {
            match *pressed {
                Some(at) if now.duration_since(at) < HOLD => keys[key] = true,
                _ => *pressed = None,
            }
        }
        keys
    }
}

impl Default for TerminalKeyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardCommands for TerminalKeyboard {
    fn init(&mut self) -> Result<(), DeviceError> {
        terminal::enable_raw_mode().map_err(|err| DeviceError::Init(err.to_string()))
    }

    fn close(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            log::error!("unable to leave the raw mode: {}", err);
        }
    }

    fn poll(&mut self, keyboard: &mut Keyboard) -> Result<InputState, DeviceError> {
        let now = Instant::now();
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if self.handle(key, now) == InputState::Quit {
                    return Ok(InputState::Quit);
                }
            }
        }
        keyboard.set_mult(&self.held(now));
        Ok(InputState::Continue)
    }

    fn wait_for_event(&mut self) -> Result<(), DeviceError> {
        loop {
            if let Event::Key(_) = event::read()? {
                return Ok(());
            }
        }
    }
}
