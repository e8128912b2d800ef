pub mod doctor;
pub mod remember;
pub mod research;
pub mod search;
