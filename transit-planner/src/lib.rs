//! Transit route planner.
//!
//! Answers two questions over a fixed timetable: "what is the best way from
//! A to B leaving at this time?" and "in which order should I visit these
//! stops, starting and ending here?"

pub mod cache;
pub mod domain;
pub mod network;
pub mod planner;
pub mod sequencer;
pub mod web;
