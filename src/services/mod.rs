pub mod classifier;
pub mod dispatcher;
pub mod focus;
pub mod registry;
pub mod status;
pub mod window_manager;
pub mod window_server;

pub use window_manager::WindowManager;
pub use window_server::create_window_server;
