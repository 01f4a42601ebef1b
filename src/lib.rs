pub mod arena;
pub mod avl_tree;
pub mod error;
pub mod render;
pub mod shared_string_writer;
pub mod traverse;
pub mod validate;
