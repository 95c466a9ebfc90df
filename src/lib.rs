pub mod analytics;
pub mod app_config;
pub mod company;
pub mod constants;
pub mod db;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod moderation;
pub mod orm;
pub mod permission;
pub mod post_lifecycle;
pub mod publish;
pub mod report_gate;
pub mod scoring;
pub mod vote_ledger;
pub mod web;
