pub mod arrays;
pub mod inflector;
pub mod number;
pub mod string;
pub mod url;
