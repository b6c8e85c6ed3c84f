mod add;
mod list;
mod misc;
mod show;
mod sources;

pub use add::{handle_add, handle_update};
pub use list::handle_list;
pub use misc::{handle_completions, handle_config};
pub use show::handle_show;
pub use sources::handle_sources;
