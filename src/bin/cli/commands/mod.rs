pub mod add;
pub mod cards;
pub mod location;
pub mod serve;
