pub mod app_config;
pub mod auth;
pub mod captcha;
pub mod db;
pub mod middleware;
pub mod migrate;
pub mod orm;
pub mod rate_limit;
pub mod reports;
pub mod storage;
pub mod web;
