pub(crate) mod board;
pub mod ui;
