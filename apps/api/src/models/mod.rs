pub mod course;
pub mod recommendation;
pub mod scholarship;
pub mod transcript;
