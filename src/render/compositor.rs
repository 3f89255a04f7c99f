use super::fade::{OpacityFade, Pollable, PollableState};
use crate::{
    color::Color,
    document::{Document, Element},
    gradient::LinearGradient,
};
use std::time::Duration;
use tracing::debug;

/// A terminal cell, holding two vertically stacked pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) top: Color,
    pub(crate) bottom: Color,
}

/// A fully composed screen.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Frame {
    columns: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl Frame {
    fn new(columns: u16, rows: u16, fill: Color) -> Self {
        let cells = vec![Cell { top: fill, bottom: fill }; columns as usize * rows as usize];
        Self { columns, rows, cells }
    }

    /// The frame's size as `(columns, rows)`.
    pub(crate) fn size(&self) -> (u16, u16) {
        (self.columns, self.rows)
    }

    pub(crate) fn cell(&self, column: u16, row: u16) -> Option<Cell> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells.get(row as usize * self.columns as usize + column as usize).copied()
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.columns.max(1) as usize)
    }

    fn cell_mut(&mut self, column: u16, row: u16) -> &mut Cell {
        &mut self.cells[row as usize * self.columns as usize + column as usize]
    }
}

/// The area of the screen an element covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Rect {
    x: u16,
    y: u16,
    width: u16,
    height: u16,
}

impl Rect {
    fn inset(columns: u16, rows: u16, margin: u16) -> Self {
        let width = columns.saturating_sub(margin.saturating_mul(2));
        let height = rows.saturating_sub(margin.saturating_mul(2));
        Self { x: margin, y: margin, width, height }
    }
}

#[derive(Debug)]
struct Layer {
    element: Element,
    background: Option<LinearGradient>,
    fade: OpacityFade,
}

/// Paints a document's elements on top of a backdrop color.
#[derive(Debug)]
pub(crate) struct Compositor {
    layers: Vec<Layer>,
    backdrop: Color,
    columns: u16,
    rows: u16,
    dirty: bool,
}

impl Compositor {
    pub(crate) fn new(document: &Document, backdrop: Color, transition: Duration) -> Self {
        let layers = document
            .elements()
            .iter()
            .map(|element| {
                let style = element.style();
                Layer {
                    element: element.clone(),
                    background: style.background_image,
                    fade: OpacityFade::new(style.opacity, transition),
                }
            })
            .collect();
        Self { layers, backdrop, columns: 0, rows: 0, dirty: true }
    }

    pub(crate) fn resize(&mut self, columns: u16, rows: u16) {
        if (columns, rows) != (self.columns, self.rows) {
            self.columns = columns;
            self.rows = rows;
            self.dirty = true;
        }
    }

    /// Catch up with the elements' styles at time `now`. Returns whether the screen needs a redraw.
    pub(crate) fn update(&mut self, now: Duration) -> bool {
        for layer in &mut self.layers {
            for mutation in layer.element.take_mutations() {
                debug!(element = layer.element.id(), %mutation, "style changed");
            }
            let style = layer.element.style();
            if style.background_image != layer.background {
                layer.background = style.background_image;
                self.dirty = true;
            }
            layer.fade.retarget(style.opacity, now);
            if layer.fade.poll(now) != PollableState::Unmodified {
                self.dirty = true;
            }
        }
        std::mem::take(&mut self.dirty)
    }

    /// Whether any fade is still in progress.
    pub(crate) fn is_animating(&self) -> bool {
        self.layers.iter().any(|layer| !layer.fade.is_settled())
    }

    pub(crate) fn compose(&self) -> Frame {
        let mut frame = Frame::new(self.columns, self.rows, self.backdrop);
        for layer in &self.layers {
            // Elements without a background are transparent.
            let Some(gradient) = &layer.background else {
                continue;
            };
            let opacity = layer.fade.current().value();
            let rect = Rect::inset(self.columns, self.rows, layer.element.margin());
            let width = rect.width as f32;
            // Every cell holds two pixels.
            let height = rect.height as f32 * 2.0;
            for row in 0..rect.height {
                for column in 0..rect.width {
                    let x = column as f32 + 0.5;
                    let top_y = row as f32 * 2.0 + 0.5;
                    let top = gradient.sample(x, top_y, width, height);
                    let bottom = gradient.sample(x, top_y + 1.0, width, height);

                    let cell = frame.cell_mut(rect.x + column, rect.y + row);
                    cell.top = cell.top.lerp(top, opacity);
                    cell.bottom = cell.bottom.lerp(bottom, opacity);
                }
            }
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{DocumentConfig, ElementConfig},
        document::{Opacity, Surface},
        gradient::Angle,
    };

    const BACKDROP: Color = Color::new(10, 10, 10);
    const RED: Color = Color::new(255, 0, 0);

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn document(elements: &[(&str, u16)]) -> Document {
        let elements =
            elements.iter().map(|(id, margin)| ElementConfig { id: id.to_string(), margin: *margin }).collect();
        Document::from_config(&DocumentConfig { elements })
    }

    fn solid(color: Color) -> LinearGradient {
        LinearGradient::new(Angle::new(90), color, color)
    }

    #[test]
    fn empty_document_shows_backdrop() {
        let document = document(&[("a", 0)]);
        let mut compositor = Compositor::new(&document, BACKDROP, ms(100));
        compositor.resize(4, 2);
        assert!(compositor.update(ms(0)));

        let frame = compositor.compose();
        assert_eq!(frame.rows().count(), 2);
        assert!(frame.rows().flatten().all(|cell| *cell == Cell { top: BACKDROP, bottom: BACKDROP }));
        assert!(!compositor.update(ms(10)));
    }

    #[test]
    fn gradient_spans_element() {
        let document = document(&[("a", 0)]);
        let mut element = document.element_by_id("a").expect("no element");
        element.set_background_image(LinearGradient::new(Angle::new(90), Color::BLACK, Color::new(200, 200, 200)));

        let mut compositor = Compositor::new(&document, BACKDROP, ms(100));
        compositor.resize(10, 1);
        compositor.update(ms(0));
        let frame = compositor.compose();

        let first = frame.cell(0, 0).expect("no cell");
        let last = frame.cell(9, 0).expect("no cell");
        assert_eq!(first.top, Color::new(10, 10, 10));
        assert_eq!(last.top, Color::new(190, 190, 190));
        assert_eq!(first.top, first.bottom);
    }

    #[test]
    fn vertical_gradient_splits_cells() {
        let document = document(&[("a", 0)]);
        let mut element = document.element_by_id("a").expect("no element");
        element.set_background_image(LinearGradient::new(Angle::new(180), Color::BLACK, Color::new(0, 0, 200)));

        let mut compositor = Compositor::new(&document, BACKDROP, ms(100));
        compositor.resize(1, 1);
        compositor.update(ms(0));
        let cell = compositor.compose().cell(0, 0).expect("no cell");
        assert_eq!(cell.top, Color::new(0, 0, 50));
        assert_eq!(cell.bottom, Color::new(0, 0, 150));
    }

    #[test]
    fn opacity_fades_towards_backdrop() {
        let document = document(&[("a", 0)]);
        let mut element = document.element_by_id("a").expect("no element");
        element.set_background_image(solid(RED));

        let mut compositor = Compositor::new(&document, Color::BLACK, ms(1000));
        compositor.resize(2, 2);
        compositor.update(ms(0));
        assert_eq!(compositor.compose().cell(1, 1).map(|c| c.top), Some(RED));

        element.set_opacity(Opacity::TRANSPARENT);
        assert!(compositor.update(ms(0)));
        assert!(compositor.is_animating());
        assert!(compositor.update(ms(500)));
        assert_eq!(compositor.compose().cell(1, 1).map(|c| c.top), Some(Color::new(128, 0, 0)));

        assert!(compositor.update(ms(1000)));
        assert!(!compositor.is_animating());
        assert_eq!(compositor.compose().cell(1, 1).map(|c| c.top), Some(Color::BLACK));
        assert!(!compositor.update(ms(1500)));
    }

    #[test]
    fn margins_and_layering() {
        let document = document(&[("back", 0), ("front", 1)]);
        document.element_by_id("back").expect("no element").set_background_image(solid(RED));
        let blue = Color::new(0, 0, 255);
        document.element_by_id("front").expect("no element").set_background_image(solid(blue));

        let mut compositor = Compositor::new(&document, BACKDROP, ms(100));
        compositor.resize(4, 3);
        compositor.update(ms(0));
        let frame = compositor.compose();

        assert_eq!(frame.cell(0, 0).map(|c| c.top), Some(RED));
        assert_eq!(frame.cell(1, 1).map(|c| c.top), Some(blue));
        assert_eq!(frame.cell(2, 1).map(|c| c.bottom), Some(blue));
        assert_eq!(frame.cell(3, 1).map(|c| c.top), Some(RED));
        assert_eq!(frame.cell(1, 2).map(|c| c.top), Some(RED));
        assert_eq!(frame.cell(4, 0), None);
    }

    #[test]
    fn margin_larger_than_screen() {
        let document = document(&[("a", 50)]);
        document.element_by_id("a").expect("no element").set_background_image(solid(RED));

        let mut compositor = Compositor::new(&document, BACKDROP, ms(100));
        compositor.resize(4, 2);
        compositor.update(ms(0));
        assert!(compositor.compose().rows().flatten().all(|cell| cell.top == BACKDROP));
    }

    #[test]
    fn resize_marks_dirty() {
        let document = document(&[("a", 0)]);
        let mut compositor = Compositor::new(&document, BACKDROP, ms(100));
        compositor.resize(4, 2);
        compositor.update(ms(0));

        compositor.resize(4, 2);
        assert!(!compositor.update(ms(1)));
        compositor.resize(5, 2);
        assert!(compositor.update(ms(2)));
        assert_eq!(compositor.compose().size(), (5, 2));
    }
}
