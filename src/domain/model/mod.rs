//! Domain model: validated identifiers and persisted record shapes

mod container;
mod movement;
mod tariff;
mod user;

pub use container::{ContainerId, ContainerIdError, PortOperation};
pub use movement::MovementLog;
pub use tariff::VesselTariff;
pub use user::{Role, User, UserAction};
