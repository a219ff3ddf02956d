pub mod app_config;
pub mod db;
pub mod error;
pub mod identity;
pub mod lfg;
pub mod middleware;
pub mod moderation;
pub mod orm;
pub mod session;
pub mod user;
pub mod web;
