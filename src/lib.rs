//! ASIT Daily - dose schedule and adherence journal for allergen immunotherapy

pub mod cli;
pub mod config;
pub mod db;
pub mod schedule;
pub mod therapy;
