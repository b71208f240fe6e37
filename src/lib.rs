//! Snake on a sparse tile grid.
//!
//! The simulation core (tiles, the grid and the snake) knows nothing about
//! terminals: it is driven one frame at a time by a [`session::Session`] and
//! draws through the [`render::Canvas`] trait. The terminal front end lives in
//! [`game`] and [`term`].

pub mod config;
pub mod entity;
pub mod error;
pub mod game;
pub mod grid;
pub mod render;
pub mod session;
pub mod snake;
pub mod term;
pub mod tile;
