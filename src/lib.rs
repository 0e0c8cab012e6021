#![warn(clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::wildcard_imports,
    clippy::too_many_lines,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::too_many_arguments,
    clippy::doc_markdown
)]

pub mod actions;
pub mod app;
pub mod capability;
pub mod cli;
pub mod error;
pub mod events;
pub mod input;
pub mod jenkins;
pub mod loader;
pub mod model;
pub mod row;
pub mod status;
pub mod timing;
pub mod tui;
pub mod url;
