pub mod ai;
pub mod bonus;
pub mod entity;
pub mod ledger;
pub mod maze;
pub mod rules;
pub mod tile;
