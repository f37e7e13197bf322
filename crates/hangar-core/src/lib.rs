pub mod error;
pub mod models;
pub mod validate;

pub use error::{Error, Result};
pub use models::{
    client_key, CreateDrone, CreateDroneType, CreateManufacturer, CreatePart, CreatePracticeDay, CreateRepair,
    DefaultPart, Drone, DroneType, DroneTypeUpdate, DroneUpdate, ImportSnapshot, LoginRequest,
    Manufacturer, ManufacturerUpdate, Part, PartUpdate, PracticeDay, PracticeDayUpdate,
    RegisterRequest, Repair, RepairUpdate, User,
};
pub use validate::{optional_trimmed, required_trimmed};
