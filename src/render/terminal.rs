use super::compositor::{Cell, Compositor, Frame};
use crate::runner::Host;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal,
};
use std::{
    io::{self, Write},
    time::Duration,
};

/// An upper half block: the foreground paints the top pixel, the background the bottom one.
const HALF_BLOCK: char = '▀';

/// Presents a document on the terminal's alternate screen.
///
/// The terminal is restored when this is dropped.
pub(crate) struct TerminalHost<W: Write> {
    writer: W,
    compositor: Compositor,
    last_frame: Option<Frame>,
}

impl<W: Write> TerminalHost<W> {
    pub(crate) fn new(writer: W, mut compositor: Compositor) -> io::Result<Self> {
        let (columns, rows) = terminal::size()?;
        compositor.resize(columns, rows);
        terminal::enable_raw_mode()?;

        let mut host = Self { writer, compositor, last_frame: None };
        execute!(host.writer, terminal::EnterAlternateScreen, cursor::Hide)?;
        Ok(host)
    }
}

impl<W: Write> Host for TerminalHost<W> {
    fn present(&mut self, now: Duration) -> io::Result<()> {
        if self.compositor.update(now) {
            let frame = self.compositor.compose();
            draw(&mut self.writer, &frame, self.last_frame.as_ref())?;
            self.last_frame = Some(frame);
        }
        Ok(())
    }

    fn is_animating(&self) -> bool {
        self.compositor.is_animating()
    }

    fn wait(&mut self, timeout: Duration) -> io::Result<bool> {
        if !event::poll(timeout)? {
            return Ok(false);
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(is_quit(&key)),
            Event::Resize(columns, rows) => {
                self.compositor.resize(columns, rows);
                Ok(false)
            }
            _ => Ok(false),
        }
    }
}

impl<W: Write> Drop for TerminalHost<W> {
    fn drop(&mut self) {
        let _ = execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Write the cells of `frame` that differ from `previous`.
///
/// Colors are only emitted when they differ from the last cell written.
fn draw<W: Write>(writer: &mut W, frame: &Frame, previous: Option<&Frame>) -> io::Result<()> {
    let previous = previous.filter(|previous| previous.size() == frame.size());
    let mut position: Option<(u16, u16)> = None;
    let mut colors: Option<Cell> = None;
    for (row, cells) in frame.rows().enumerate() {
        let row = row as u16;
        for (column, cell) in cells.iter().enumerate() {
            let column = column as u16;
            if previous.and_then(|previous| previous.cell(column, row)) == Some(*cell) {
                continue;
            }
            if position != Some((column, row)) {
                queue!(writer, cursor::MoveTo(column, row))?;
            }
            if colors.map(|c| c.top) != Some(cell.top) {
                queue!(writer, SetForegroundColor(cell.top.into()))?;
            }
            if colors.map(|c| c.bottom) != Some(cell.bottom) {
                queue!(writer, SetBackgroundColor(cell.bottom.into()))?;
            }
            queue!(writer, Print(HALF_BLOCK))?;
            position = Some((column + 1, row));
            colors = Some(*cell);
        }
    }
    queue!(writer, ResetColor)?;
    writer.flush()
}
