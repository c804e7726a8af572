pub mod app_error;
pub mod drafts;
pub mod dto;
pub mod interactors;
pub mod interface;
pub mod synchronizer;
