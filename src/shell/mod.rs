pub mod command;
pub mod command_shell;

pub use command::Command;
pub use command_shell::CommandShell;
