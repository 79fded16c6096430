pub mod config;
pub mod domain;
pub mod errors;
pub mod media;

pub use domain::action::{Action, ActionEnvelope, ActionType, EnvelopeError};
pub use domain::conversation::{ConversationState, ConversationTurn, TurnRole, HISTORY_CAP};
pub use domain::search::SearchCriteria;
pub use domain::vehicle::{
    FuelType, NewVehicle, Transmission, Vehicle, VehicleCategory, VehicleId,
};
pub use errors::{ApplicationError, DomainError, FailureClass, InterfaceError};
pub use media::{has_per_day_price, select_media, MAX_MEDIA_PER_REPLY};
