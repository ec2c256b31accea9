pub mod login;
pub mod whoami;

pub use login::login;
pub use whoami::whoami;
