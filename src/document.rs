use crate::config::DocumentConfig;
use crate::gradient::LinearGradient;
use std::fmt;
use std::sync::{Arc, Mutex};

/// An opacity value in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub(crate) struct Opacity(f32);

impl Opacity {
    pub(crate) const TRANSPARENT: Self = Self(0.0);
    pub(crate) const OPAQUE: Self = Self(1.0);

    pub(crate) fn new(value: f32) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub(crate) fn value(&self) -> f32 {
        self.0
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Self::OPAQUE
    }
}

impl fmt::Display for Opacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Something whose visual style can be mutated.
pub(crate) trait Surface {
    fn set_opacity(&mut self, opacity: Opacity);

    fn set_background_image(&mut self, gradient: LinearGradient);
}

/// The styling properties of an element.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Style {
    pub(crate) opacity: Opacity,
    pub(crate) background_image: Option<LinearGradient>,
}

/// A single style property assignment.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum StyleMutation {
    Opacity(Opacity),
    BackgroundImage(LinearGradient),
}

impl fmt::Display for StyleMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opacity(opacity) => write!(f, "opacity: {opacity}"),
            Self::BackgroundImage(gradient) => write!(f, "background-image: {gradient}"),
        }
    }
}

#[derive(Debug, Default)]
struct ElementState {
    style: Style,
    /// Every assignment since the last drain, including repeated identical ones.
    mutations: Vec<StyleMutation>,
}

/// A handle to an element in a [Document].
///
/// Handles are cheap to clone and all clones share the same style.
#[derive(Clone, Debug)]
pub(crate) struct Element {
    id: Arc<str>,
    margin: u16,
    state: Arc<Mutex<ElementState>>,
}

impl Element {
    pub(crate) fn new(id: &str, margin: u16) -> Self {
        Self { id: id.into(), margin, state: Default::default() }
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    /// The number of cells this element is inset from each edge of the screen.
    pub(crate) fn margin(&self) -> u16 {
        self.margin
    }

    /// A snapshot of the current style.
    pub(crate) fn style(&self) -> Style {
        self.state.lock().unwrap().style.clone()
    }

    /// Drain the style assignments made since the last call.
    pub(crate) fn take_mutations(&self) -> Vec<StyleMutation> {
        std::mem::take(&mut self.state.lock().unwrap().mutations)
    }

    fn apply(&self, mutation: StyleMutation) {
        let mut state = self.state.lock().unwrap();
        match &mutation {
            StyleMutation::Opacity(opacity) => state.style.opacity = *opacity,
            StyleMutation::BackgroundImage(gradient) => state.style.background_image = Some(*gradient),
        };
        state.mutations.push(mutation);
    }
}

impl Surface for Element {
    fn set_opacity(&mut self, opacity: Opacity) {
        self.apply(StyleMutation::Opacity(opacity));
    }

    fn set_background_image(&mut self, gradient: LinearGradient) {
        self.apply(StyleMutation::BackgroundImage(gradient));
    }
}

/// A set of elements addressable by id, painted in order.
#[derive(Debug, Default)]
pub(crate) struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub(crate) fn from_config(config: &DocumentConfig) -> Self {
        let elements = config.elements.iter().map(|element| Element::new(&element.id, element.margin)).collect();
        Self { elements }
    }

    /// Find an element by its id. When ids are repeated the first element wins.
    pub(crate) fn element_by_id(&self, id: &str) -> Option<Element> {
        self.elements.iter().find(|element| element.id() == id).cloned()
    }

    pub(crate) fn elements(&self) -> &[Element] {
        &self.elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        color::Color,
        config::ElementConfig,
        gradient::Angle,
    };

    fn document(ids: &[&str]) -> Document {
        let elements = ids.iter().map(|id| ElementConfig { id: id.to_string(), margin: 0 }).collect();
        Document::from_config(&DocumentConfig { elements })
    }

    #[test]
    fn lookup() {
        let document = document(&["a", "b"]);
        assert_eq!(document.element_by_id("b").map(|e| e.id().to_string()), Some("b".into()));
        assert!(document.element_by_id("c").is_none());
    }

    #[test]
    fn duplicate_ids_resolve_to_first() {
        let document = document(&["a", "a"]);
        let mut first = document.element_by_id("a").expect("no element");
        first.set_opacity(Opacity::TRANSPARENT);
        assert_eq!(document.elements()[0].style().opacity, Opacity::TRANSPARENT);
        assert_eq!(document.elements()[1].style().opacity, Opacity::OPAQUE);
    }

    #[test]
    fn handles_share_style() {
        let document = document(&["a"]);
        let mut handle = document.element_by_id("a").expect("no element");
        let gradient = LinearGradient::new(Angle::new(3), Color::BLACK, Color::new(1, 1, 1));
        handle.set_background_image(gradient);

        let style = document.elements()[0].style();
        assert_eq!(style.background_image, Some(gradient));
        assert_eq!(style.opacity, Opacity::OPAQUE);
    }

    #[test]
    fn repeated_assignments_are_journaled_but_idempotent() {
        let mut element = Element::new("a", 0);
        element.set_opacity(Opacity::TRANSPARENT);
        element.set_opacity(Opacity::TRANSPARENT);

        assert_eq!(element.style().opacity, Opacity::TRANSPARENT);
        assert_eq!(
            element.take_mutations(),
            vec![StyleMutation::Opacity(Opacity::TRANSPARENT), StyleMutation::Opacity(Opacity::TRANSPARENT)]
        );
        assert!(element.take_mutations().is_empty());
    }

    #[test]
    fn mutation_display() {
        let gradient = LinearGradient::new(Angle::new(0), Color::BLACK, Color::new(255, 255, 255));
        assert_eq!(StyleMutation::Opacity(Opacity::OPAQUE).to_string(), "opacity: 1");
        assert_eq!(StyleMutation::Opacity(Opacity::TRANSPARENT).to_string(), "opacity: 0");
        assert_eq!(
            StyleMutation::BackgroundImage(gradient).to_string(),
            "background-image: linear-gradient(0deg, #000000, #ffffff)"
        );
    }

    #[test]
    fn opacity_is_clamped() {
        assert_eq!(Opacity::new(2.0), Opacity::OPAQUE);
        assert_eq!(Opacity::new(-1.0), Opacity::TRANSPARENT);
    }
}
