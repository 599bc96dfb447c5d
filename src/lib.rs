pub mod app_config;
pub mod ballot;
pub mod codes;
pub mod db;
pub mod orm;
pub mod web;
