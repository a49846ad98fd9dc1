//! External delivery channels.

pub mod telegram;
