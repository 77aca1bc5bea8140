//! Recharge card aggregate
//!
//! Cards, their append-only movement log and the balance projection.

pub mod model;
pub mod repository;

pub use model::{
    BalanceProjection, CardBalance, CardProvider, CardStats, CardStatus, MovementType,
    RechargeCard, RechargeMovement,
};
pub use repository::{MovementRepository, RechargeCardRepository};
