mod sim_handler;

pub use sim_handler::Simulation;
