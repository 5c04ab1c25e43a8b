//! Data models

pub mod contact;
