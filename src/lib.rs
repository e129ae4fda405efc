pub mod bench;
pub mod gen;
pub mod io;
pub mod solver;
pub mod types;
pub mod verify;
