pub mod availability;
pub mod calendar;
pub mod clock;
pub mod collaborators;
pub mod scheduling;
pub mod session;
pub mod wizard;
