//! HTTP protocol layer module
//!
//! Response construction, decoupled from resolution logic. Every body this
//! gateway produces is JSON.

pub mod response;

pub use response::{
    error_response, health_response, json_response, method_not_allowed_response,
    options_response,
};
