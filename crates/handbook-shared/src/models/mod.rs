mod menu;
mod node;
mod settings;
mod user;

pub use menu::*;
pub use node::*;
pub use settings::*;
pub use user::*;
