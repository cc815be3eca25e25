pub mod aggregate;
pub mod cache;
pub mod cards;
pub mod entrypoints;
pub mod error;
pub mod svg;
pub mod theme;
