pub mod native;
pub mod sim;
pub mod world;
