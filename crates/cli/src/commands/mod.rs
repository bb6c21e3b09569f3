pub mod config;
pub mod export;
pub mod inspect;
pub mod library;
pub mod publish;

pub use config::handle_config_command;
pub use export::handle_export_command;
pub use inspect::{handle_chapters_command, handle_dimensions_command};
pub use library::handle_list_command;
pub use publish::{handle_cover_proof_command, handle_publish_command, handle_unpublish_command};
