pub mod error;
pub mod live;
pub mod markup;
pub mod models;
pub mod render;
