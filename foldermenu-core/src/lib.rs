pub mod config;
pub mod icon;
pub mod launcher;
pub mod lister;
pub mod menu;
pub mod notify;
pub mod session;

#[cfg(test)]
mod testing;
