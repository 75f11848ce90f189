//! Asset loading/parsers.
//! Project files: save and restore a solar system registry as plain text.

pub mod project;

pub use project::{
    ProjectData, load_project_from_path, load_project_from_reader, load_project_from_str,
    project_to_string, save_project_to_path, write_project,
};
