pub mod console;
pub mod info;
pub mod system;
pub mod whitelist;
