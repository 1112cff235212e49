// Module messaging - Lock-free control → render communication

pub mod channels;
pub mod command;
