mod compositor;
mod fade;
mod terminal;

pub(crate) use compositor::Compositor;
pub(crate) use terminal::TerminalHost;
