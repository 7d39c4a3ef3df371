pub mod down;
pub mod list;
pub mod rename;
pub mod restart;
pub mod ssh;
pub mod up;
pub mod wait;
