// src/tripllm/mod.rs

pub mod agent;
pub mod client_wrapper;
pub mod clients;
pub mod config;
pub mod event;
pub mod group_chat;
pub mod pricing;
pub mod topic_filter;
pub mod travel_team;
pub mod web;

// Let's explicitly export TravelPlanner so we don't have to access it via tripllm::travel_team::TravelPlanner
// and instead as tripllm::TravelPlanner
pub use travel_team::TravelPlanner;
