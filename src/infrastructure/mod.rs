pub mod http;
pub mod observability;
pub mod persistence;
pub mod providers;
pub mod web;
