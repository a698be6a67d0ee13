pub mod error;
pub mod fabric;
pub mod mesg;
pub mod sched;
pub mod sim;
pub mod trace;
pub mod wire;

#[cfg(test)]
mod test;
