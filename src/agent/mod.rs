pub mod executor;
pub mod factory;

pub use executor::{AgentExecutor, AgentOutcome, IntermediateStep};
pub use factory::AgentFactory;
