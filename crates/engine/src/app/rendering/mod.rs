mod canvas;
mod renderer;
mod text;

pub(crate) use renderer::{HudView, Renderer};
