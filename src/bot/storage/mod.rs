// Exported structs and types
pub use self::document::Document;
pub use self::manager::{CrudError, Store};
pub use self::slogan::SloganTable;
pub use self::user::{UserScore, UserScores};

// Submodules
mod document;
mod file;
mod manager;
mod slogan;
mod user;

#[cfg(test)]
pub(crate) use self::file::{
    read_document,
    tests::{cleanup, temp_data_path},
};
