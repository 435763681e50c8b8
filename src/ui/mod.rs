//! Presentation layer - the screen model, the builders that fill it and its text rendering.

/// Text rendering of the screen
pub mod render;
/// Screen model types
pub mod screen;
/// Fragment builders and money formatting
pub mod views;

pub use render::render;
pub use screen::{
    Card, Cell, Fragment, Modal, NavBar, ProductOption, Row, RowAction, Screen, StatCard, Table,
    Tone,
};
